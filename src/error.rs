//! Error types for vexcast operations.

use thiserror::Error;

/// Result type alias using [`VexError`].
pub type Result<T> = std::result::Result<T, VexError>;

/// Error types for type parsing, cast resolution and expression compilation.
///
/// Per-row conversion failures are not errors: they resolve to a null value
/// in both the row and the vectorized path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VexError {
    /// Malformed type name or out-of-range type parameters.
    #[error("Type parse error in '{type_name}': {message}")]
    TypeParse { type_name: String, message: String },

    /// No legal or registered conversion path for a (source, target) pair.
    ///
    /// `from` is `"*"` when no operator is registered for the target at all.
    #[error("Unsupported cast from {from} to {to}")]
    UnsupportedCast { from: String, to: String },

    /// Expression tree inconsistent with the input schema or row.
    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    /// Batch shapes handed to a batch source do not cover its rows.
    #[error("Invalid batch shape: {0}")]
    InvalidBatchShape(String),
}

impl VexError {
    /// Builds a [`VexError::TypeParse`] for the given type name.
    pub(crate) fn type_parse(type_name: &str, message: impl Into<String>) -> Self {
        VexError::TypeParse {
            type_name: type_name.to_string(),
            message: message.into(),
        }
    }

    /// Returns true for errors that mean "this cast pair is not exercised".
    #[must_use]
    pub fn is_unsupported_cast(&self) -> bool {
        matches!(self, VexError::UnsupportedCast { .. })
    }
}
