//! Vectorized execution module.
//!
//! Expressions are compiled into steps over typed column buffers and
//! evaluated batch by batch. Casts with a native kernel run directly on
//! the buffers; every other cast goes through an adaptor that reuses the
//! row-mode operator slot by slot.

pub mod batch;
pub mod compiler;
pub mod evaluator;
pub mod extract;
pub mod kernels;
pub mod source;

pub use batch::{ActiveRows, Batch, Column, ColumnData, Selection, DEFAULT_BATCH_SIZE};
pub use compiler::{CompiledExpression, StepStrategy, VectorCompiler};
pub use extract::{extract, extract_rows};
pub use kernels::{CastContext, Kernel};
pub use source::{BatchShape, BatchSource, RowBatchSource};
