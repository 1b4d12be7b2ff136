//! Built-in conversion operators, one per target family.
//!
//! Each operator inspects the source category of the value it is handed and
//! dispatches to the matching native conversion in [`scalar`].

use crate::cast::{scalar, ConversionOperator};
use crate::types::{Category, Native, TypeDescriptor, Value};

/// Conversion to `boolean`.
#[derive(Debug, Default)]
pub struct ToBoolean;

impl ConversionOperator for ToBoolean {
    fn name(&self) -> &'static str {
        "to_boolean"
    }

    fn target_category(&self) -> Category {
        Category::Boolean
    }

    fn convert_native(
        &self,
        source: Category,
        value: Native<'_>,
        _target: &TypeDescriptor,
    ) -> Option<Value> {
        scalar::to_long(value, source, Category::Boolean).map(|v| Value::Boolean(v != 0))
    }
}

/// Conversion to one of the integer widths.
#[derive(Debug)]
pub struct ToIntegral {
    category: Category,
}

impl ToIntegral {
    /// Creates the operator for an integral category.
    ///
    /// # Panics
    ///
    /// Panics if `category` is not an integer width.
    #[must_use]
    pub fn new(category: Category) -> Self {
        assert!(category.is_integral(), "{category} is not an integral category");
        ToIntegral { category }
    }
}

impl ConversionOperator for ToIntegral {
    fn name(&self) -> &'static str {
        match self.category {
            Category::Byte => "to_tinyint",
            Category::Short => "to_smallint",
            Category::Int => "to_int",
            _ => "to_bigint",
        }
    }

    fn target_category(&self) -> Category {
        self.category
    }

    fn convert_native(
        &self,
        source: Category,
        value: Native<'_>,
        _target: &TypeDescriptor,
    ) -> Option<Value> {
        scalar::to_long(value, source, self.category)
            .map(|v| Value::from_long(self.category, v))
    }
}

/// Conversion to `float` or `double`.
#[derive(Debug)]
pub struct ToFloating {
    category: Category,
}

impl ToFloating {
    /// Creates the operator for `float` or `double`.
    ///
    /// # Panics
    ///
    /// Panics for any other category.
    #[must_use]
    pub fn new(category: Category) -> Self {
        assert!(
            matches!(category, Category::Float | Category::Double),
            "{category} is not a floating point category"
        );
        ToFloating { category }
    }
}

impl ConversionOperator for ToFloating {
    fn name(&self) -> &'static str {
        if self.category == Category::Float {
            "to_float"
        } else {
            "to_double"
        }
    }

    fn target_category(&self) -> Category {
        self.category
    }

    fn convert_native(
        &self,
        source: Category,
        value: Native<'_>,
        _target: &TypeDescriptor,
    ) -> Option<Value> {
        scalar::to_double(value, source, self.category)
            .map(|v| Value::from_double(self.category, v))
    }
}

/// Conversion to `decimal(p,s)`, enforcing the target's precision and scale.
#[derive(Debug, Default)]
pub struct ToDecimal;

impl ConversionOperator for ToDecimal {
    fn name(&self) -> &'static str {
        "to_decimal"
    }

    fn target_category(&self) -> Category {
        Category::Decimal
    }

    fn convert_native(
        &self,
        source: Category,
        value: Native<'_>,
        target: &TypeDescriptor,
    ) -> Option<Value> {
        let (precision, scale) = target.precision_scale()?;
        scalar::to_decimal(value, source, precision, scale).map(Value::Decimal)
    }
}

/// Conversion to `string`, `char(n)` or `varchar(n)`.
#[derive(Debug)]
pub struct ToText {
    category: Category,
}

impl ToText {
    /// Creates the operator for a string-family category.
    ///
    /// # Panics
    ///
    /// Panics for any other category.
    #[must_use]
    pub fn new(category: Category) -> Self {
        assert!(category.is_string_family(), "{category} is not a string category");
        ToText { category }
    }
}

impl ConversionOperator for ToText {
    fn name(&self) -> &'static str {
        match self.category {
            Category::Char => "to_char",
            Category::Varchar => "to_varchar",
            _ => "to_string",
        }
    }

    fn target_category(&self) -> Category {
        self.category
    }

    fn convert_native(
        &self,
        source: Category,
        value: Native<'_>,
        target: &TypeDescriptor,
    ) -> Option<Value> {
        let text = scalar::enforce_text(&scalar::to_text(value, source)?, target);
        Some(match self.category {
            Category::Char => Value::Char(text),
            Category::Varchar => Value::Varchar(text),
            _ => Value::String(text),
        })
    }
}

/// Conversion to `binary`.
#[derive(Debug, Default)]
pub struct ToBinary;

impl ConversionOperator for ToBinary {
    fn name(&self) -> &'static str {
        "to_binary"
    }

    fn target_category(&self) -> Category {
        Category::Binary
    }

    fn convert_native(
        &self,
        source: Category,
        value: Native<'_>,
        _target: &TypeDescriptor,
    ) -> Option<Value> {
        scalar::to_bytes(value, source).map(Value::Binary)
    }
}

/// Conversion to `date`.
#[derive(Debug, Default)]
pub struct ToDate;

impl ConversionOperator for ToDate {
    fn name(&self) -> &'static str {
        "to_date"
    }

    fn target_category(&self) -> Category {
        Category::Date
    }

    fn convert_native(
        &self,
        source: Category,
        value: Native<'_>,
        _target: &TypeDescriptor,
    ) -> Option<Value> {
        scalar::to_date(value, source)
            .and_then(|days| i32::try_from(days).ok())
            .map(Value::Date)
    }
}

/// Conversion to `timestamp`.
#[derive(Debug, Default)]
pub struct ToTimestamp;

impl ConversionOperator for ToTimestamp {
    fn name(&self) -> &'static str {
        "to_timestamp"
    }

    fn target_category(&self) -> Category {
        Category::Timestamp
    }

    fn convert_native(
        &self,
        source: Category,
        value: Native<'_>,
        _target: &TypeDescriptor,
    ) -> Option<Value> {
        scalar::to_timestamp(value, source).map(Value::Timestamp)
    }
}
