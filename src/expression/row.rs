//! Row-at-a-time expression evaluation.
//!
//! This is the reference path: vectorized evaluation must produce exactly
//! what [`RowEvaluator::evaluate`] produces for every row.

use std::sync::Arc;

use crate::cast::{cast_value, ConversionOperator, OperatorRegistry};
use crate::error::{Result, VexError};
use crate::expression::{validate_constant, Expression};
use crate::types::{TypeDescriptor, Value};

/// An expression bound to its resolved cast operators.
#[derive(Debug, Clone)]
pub struct RowEvaluator {
    root: RowNode,
    output_type: TypeDescriptor,
}

#[derive(Debug, Clone)]
enum RowNode {
    Column(usize),
    Constant(Value),
    Cast {
        child: Box<RowNode>,
        operator: Arc<dyn ConversionOperator>,
        target: TypeDescriptor,
    },
}

impl RowEvaluator {
    /// Binds `expr`, resolving and initializing every cast once.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedCast` for an illegal or unregistered cast pair and
    /// `InvalidExpression` for a constant whose value does not match its type.
    pub fn new(expr: &Expression, registry: &OperatorRegistry) -> Result<Self> {
        Ok(RowEvaluator {
            root: bind(expr, registry)?,
            output_type: expr.data_type(),
        })
    }

    /// Returns the type of the evaluated result.
    #[must_use]
    pub fn output_type(&self) -> TypeDescriptor {
        self.output_type
    }

    /// Evaluates the expression against one row.
    ///
    /// # Errors
    ///
    /// Returns `InvalidExpression` if a column index is outside the row.
    pub fn evaluate(&self, row: &[Value]) -> Result<Value> {
        eval_node(&self.root, row)
    }
}

fn bind(expr: &Expression, registry: &OperatorRegistry) -> Result<RowNode> {
    match expr {
        Expression::Column { index, .. } => Ok(RowNode::Column(*index)),
        Expression::Constant { value, data_type } => {
            validate_constant(value, data_type)?;
            Ok(RowNode::Constant(value.clone()))
        }
        Expression::Cast { child, target } => {
            let operator = registry.resolve_for(&child.data_type(), target)?;
            Ok(RowNode::Cast {
                child: Box::new(bind(child, registry)?),
                operator,
                target: *target,
            })
        }
    }
}

fn eval_node(node: &RowNode, row: &[Value]) -> Result<Value> {
    match node {
        RowNode::Column(index) => row.get(*index).cloned().ok_or_else(|| {
            VexError::InvalidExpression(format!(
                "column {index} out of bounds for row of {} values",
                row.len()
            ))
        }),
        RowNode::Constant(value) => Ok(value.clone()),
        RowNode::Cast {
            child,
            operator,
            target,
        } => {
            let input = eval_node(child, row)?;
            Ok(cast_value(operator.as_ref(), &input, target))
        }
    }
}

/// Binds `expr` with the built-in operators and evaluates it against `row`.
///
/// # Errors
///
/// Returns the errors of [`RowEvaluator::new`] and [`RowEvaluator::evaluate`].
pub fn evaluate_row(expr: &Expression, row: &[Value]) -> Result<Value> {
    RowEvaluator::new(expr, OperatorRegistry::global())?.evaluate(row)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;

    use super::*;

    #[test]
    fn test_nested_casts() {
        let expr = Expression::column(0, TypeDescriptor::double())
            .cast_to(TypeDescriptor::int())
            .cast_to(TypeDescriptor::string());
        assert_eq!(
            evaluate_row(&expr, &[Value::Double(-7.9)]).unwrap(),
            Value::String("-7".to_string())
        );
    }

    #[test]
    fn test_same_category_decimal_reapplies_scale() {
        let expr = Expression::column(0, TypeDescriptor::decimal(20, 8).unwrap())
            .cast_to(TypeDescriptor::decimal(10, 2).unwrap());
        let row = [Value::Decimal(BigDecimal::from_str("12.3456").unwrap())];
        assert_eq!(
            evaluate_row(&expr, &row).unwrap(),
            Value::Decimal(BigDecimal::from_str("12.35").unwrap())
        );
    }

    #[test]
    fn test_illegal_cast_fails_at_bind() {
        let expr = Expression::column(0, TypeDescriptor::date())
            .cast_to(TypeDescriptor::decimal(10, 2).unwrap());
        let err = RowEvaluator::new(&expr, &OperatorRegistry::builtin()).unwrap_err();
        assert!(err.is_unsupported_cast());
    }

    #[test]
    fn test_column_out_of_bounds() {
        let expr = Expression::column(3, TypeDescriptor::int());
        let err = evaluate_row(&expr, &[Value::Int(1)]).unwrap_err();
        assert!(matches!(err, VexError::InvalidExpression(_)));
    }

    #[test]
    fn test_null_skips_conversion() {
        let expr = Expression::null(TypeDescriptor::string()).cast_to(TypeDescriptor::int());
        assert_eq!(evaluate_row(&expr, &[]).unwrap(), Value::Null);
    }
}
