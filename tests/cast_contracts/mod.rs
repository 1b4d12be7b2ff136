//! Contract tests for cast evaluation in row and vector mode.

mod row_contract;
mod vector_contract;
