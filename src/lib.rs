//! vexcast - SQL value casting with row and vectorized evaluation.
//!
//! Values convert between SQL primitive types along two paths. The row
//! path ([`evaluate_row`], [`RowEvaluator`]) is the reference; the vector
//! path ([`compile`], [`CompiledExpression::evaluate`]) runs over columnar
//! batches and must agree with it value for value, nulls included.

pub mod cast;
pub mod error;
pub mod executor;
pub mod expression;
pub mod types;

pub use cast::{
    is_legal_cast, resolve_cast_operator, ConversionOperator, OperatorRegistry,
};
pub use error::{Result, VexError};
pub use executor::vectorized::{
    extract, extract_rows, Batch, BatchShape, BatchSource, CompiledExpression, RowBatchSource,
    Selection, VectorCompiler,
};
pub use executor::ExecutorConfig;
pub use expression::{evaluate_row, Expression, RowEvaluator};
pub use types::{parse_type, Category, TypeDescriptor, Value};

/// Compiles `expr` against `input_schema` with the built-in operators.
///
/// # Errors
///
/// Returns `UnsupportedCast` for an illegal cast anywhere in the tree and
/// `InvalidExpression` if the tree does not match the schema.
pub fn compile(
    expr: &Expression,
    input_schema: &[TypeDescriptor],
    config: &ExecutorConfig,
) -> Result<CompiledExpression> {
    VectorCompiler::new(OperatorRegistry::global(), config).compile(expr, input_schema)
}
