//! Cast resolution.
//!
//! A [`ConversionOperator`] is registered per target category and handles
//! every legal source category for it. The same operator instance serves the
//! row evaluator and the vectorized adaptor steps, so both paths resolve a
//! cast identically.

mod legality;
mod operators;
pub mod scalar;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::error::{Result, VexError};
use crate::types::{Category, Native, TypeDescriptor, Value};

pub use legality::{is_legal_cast, is_legal_category_pair};
pub use operators::{
    ToBinary, ToBoolean, ToDate, ToDecimal, ToFloating, ToIntegral, ToText, ToTimestamp,
};

/// A conversion into one target category.
pub trait ConversionOperator: fmt::Debug + Send + Sync {
    /// Short operator name used in logs and plan output.
    fn name(&self) -> &'static str;

    /// Category this operator produces.
    fn target_category(&self) -> Category;

    /// Checks that the operator can convert `source` into `target`.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedCast` if the pair is illegal or `target` is not of
    /// this operator's category.
    fn initialize(&self, source: &TypeDescriptor, target: &TypeDescriptor) -> Result<()> {
        if target.category() != self.target_category() || !is_legal_cast(source, target) {
            return Err(unsupported(source, target));
        }
        Ok(())
    }

    /// Converts one non-null value of category `source`.
    ///
    /// `source` is the category of the value actually handed over, which may
    /// differ from the declared one. Illegal pairs give `None`, as do
    /// contents that cannot be represented in `target`.
    fn convert(
        &self,
        source: Category,
        value: Native<'_>,
        target: &TypeDescriptor,
    ) -> Option<Value> {
        if !is_legal_category_pair(source, target.category()) {
            return None;
        }
        self.convert_native(source, value, target)
    }

    /// Converts a value whose category pair is already known to be legal.
    fn convert_native(
        &self,
        source: Category,
        value: Native<'_>,
        target: &TypeDescriptor,
    ) -> Option<Value>;
}

/// Applies `operator` to a boxed value: null in, null out, and content
/// failures become null.
#[must_use]
pub fn cast_value(
    operator: &dyn ConversionOperator,
    value: &Value,
    target: &TypeDescriptor,
) -> Value {
    let (Some(source), Some(native)) = (value.category(), value.native()) else {
        return Value::Null;
    };
    operator.convert(source, native, target).unwrap_or(Value::Null)
}

fn unsupported(source: &TypeDescriptor, target: &TypeDescriptor) -> VexError {
    VexError::UnsupportedCast {
        from: source.to_string(),
        to: target.to_string(),
    }
}

/// Registry of conversion operators keyed by target category.
#[derive(Debug, Clone)]
pub struct OperatorRegistry {
    operators: HashMap<Category, Arc<dyn ConversionOperator>>,
}

impl OperatorRegistry {
    /// Creates a registry with no operators.
    #[must_use]
    pub fn empty() -> Self {
        OperatorRegistry {
            operators: HashMap::new(),
        }
    }

    /// Creates a registry holding the built-in operators.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(ToBoolean));
        for category in [Category::Byte, Category::Short, Category::Int, Category::Long] {
            registry.register(Arc::new(ToIntegral::new(category)));
        }
        for category in [Category::Float, Category::Double] {
            registry.register(Arc::new(ToFloating::new(category)));
        }
        registry.register(Arc::new(ToDecimal));
        for category in [Category::String, Category::Char, Category::Varchar] {
            registry.register(Arc::new(ToText::new(category)));
        }
        registry.register(Arc::new(ToBinary));
        registry.register(Arc::new(ToDate));
        registry.register(Arc::new(ToTimestamp));
        registry
    }

    /// Shared registry of built-in operators.
    #[must_use]
    pub fn global() -> &'static OperatorRegistry {
        static GLOBAL: OnceLock<OperatorRegistry> = OnceLock::new();
        GLOBAL.get_or_init(OperatorRegistry::builtin)
    }

    /// Registers an operator for its target category, returning the one it replaces.
    pub fn register(
        &mut self,
        operator: Arc<dyn ConversionOperator>,
    ) -> Option<Arc<dyn ConversionOperator>> {
        self.operators.insert(operator.target_category(), operator)
    }

    /// Returns the number of registered operators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operators.len()
    }

    /// Returns true if no operator is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// Resolves the operator for a target type.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedCast` if no operator is registered for the
    /// target's category.
    pub fn resolve(&self, target: &TypeDescriptor) -> Result<Arc<dyn ConversionOperator>> {
        let operator = self
            .operators
            .get(&target.category())
            .cloned()
            .ok_or_else(|| VexError::UnsupportedCast {
                from: "*".to_string(),
                to: target.to_string(),
            })?;
        debug!(to = %target, operator = operator.name(), "resolved cast operator");
        Ok(operator)
    }

    /// Resolves the operator for `target` and initializes it for `source`.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedCast` if the pair is illegal or unregistered.
    pub fn resolve_for(
        &self,
        source: &TypeDescriptor,
        target: &TypeDescriptor,
    ) -> Result<Arc<dyn ConversionOperator>> {
        if !is_legal_cast(source, target) {
            return Err(unsupported(source, target));
        }
        let operator = self.resolve(target)?;
        operator.initialize(source, target)?;
        Ok(operator)
    }
}

impl Default for OperatorRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Resolves a built-in operator for `target`.
///
/// # Errors
///
/// Returns `UnsupportedCast` if no built-in operator produces the target's category.
pub fn resolve_cast_operator(target: &TypeDescriptor) -> Result<Arc<dyn ConversionOperator>> {
    OperatorRegistry::global().resolve(target)
}
