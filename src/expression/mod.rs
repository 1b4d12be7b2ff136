//! Expression trees over input columns, constants and casts.

mod row;

use std::fmt;

use crate::error::{Result, VexError};
use crate::types::{Category, TypeDescriptor, Value};

pub use row::{evaluate_row, RowEvaluator};

/// An immutable expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Reference to an input column.
    Column {
        index: usize,
        data_type: TypeDescriptor,
    },
    /// A literal value of a fixed type.
    Constant {
        value: Value,
        data_type: TypeDescriptor,
    },
    /// Conversion of the child's result to `target`.
    Cast {
        child: Box<Expression>,
        target: TypeDescriptor,
    },
}

impl Expression {
    /// Creates a column reference.
    #[must_use]
    pub fn column(index: usize, data_type: TypeDescriptor) -> Self {
        Expression::Column { index, data_type }
    }

    /// Creates a typed constant.
    #[must_use]
    pub fn constant(value: impl Into<Value>, data_type: TypeDescriptor) -> Self {
        Expression::Constant {
            value: value.into(),
            data_type,
        }
    }

    /// Creates a typed null constant.
    #[must_use]
    pub fn null(data_type: TypeDescriptor) -> Self {
        Expression::Constant {
            value: Value::Null,
            data_type,
        }
    }

    /// Wraps `child` in a cast to `target`.
    #[must_use]
    pub fn cast(child: Expression, target: TypeDescriptor) -> Self {
        Expression::Cast {
            child: Box::new(child),
            target,
        }
    }

    /// Casts this expression to `target`.
    #[must_use]
    pub fn cast_to(self, target: TypeDescriptor) -> Self {
        Expression::cast(self, target)
    }

    /// Returns the type this expression produces.
    #[must_use]
    pub fn data_type(&self) -> TypeDescriptor {
        match self {
            Expression::Column { data_type, .. } | Expression::Constant { data_type, .. } => {
                *data_type
            }
            Expression::Cast { target, .. } => *target,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Column { index, .. } => write!(f, "col{index}"),
            Expression::Constant { value, data_type } => match value {
                Value::Null => write!(f, "NULL::{data_type}"),
                Value::String(_) | Value::Char(_) | Value::Varchar(_) => {
                    write!(f, "'{value}'::{data_type}")
                }
                _ => write!(f, "{value}::{data_type}"),
            },
            Expression::Cast { child, target } => write!(f, "CAST({child} AS {target})"),
        }
    }
}

/// Checks that a constant's value has the physical shape of its declared type.
pub(crate) fn validate_constant(value: &Value, data_type: &TypeDescriptor) -> Result<()> {
    match value.category() {
        None => Ok(()),
        Some(category) if category == data_type.category() => Ok(()),
        Some(category) if data_type.category() == Category::Void => Err(
            VexError::InvalidExpression(format!("void constant holds a {category} value")),
        ),
        Some(category) => Err(VexError::InvalidExpression(format!(
            "constant of type {data_type} holds a {category} value"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_of_cast_is_target() {
        let expr = Expression::column(0, TypeDescriptor::string()).cast_to(TypeDescriptor::int());
        assert_eq!(expr.data_type(), TypeDescriptor::int());
    }

    #[test]
    fn test_display() {
        let expr = Expression::cast(
            Expression::constant("12", TypeDescriptor::string()),
            TypeDescriptor::decimal(10, 2).unwrap(),
        );
        assert_eq!(expr.to_string(), "CAST('12'::string AS decimal(10,2))");
        assert_eq!(
            Expression::null(TypeDescriptor::int()).to_string(),
            "NULL::int"
        );
    }

    #[test]
    fn test_validate_constant() {
        assert!(validate_constant(&Value::Int(1), &TypeDescriptor::int()).is_ok());
        assert!(validate_constant(&Value::Null, &TypeDescriptor::void()).is_ok());
        assert!(validate_constant(&Value::Long(1), &TypeDescriptor::int()).is_err());
    }
}
