//! Batch sources: producers that refill a reusable batch.

use tracing::trace;

use crate::error::{Result, VexError};
use crate::types::Value;

use super::batch::Batch;

/// Producer of input batches.
pub trait BatchSource {
    /// Rewinds to the first batch.
    fn reset(&mut self);

    /// Resets `batch` and fills it with the next set of rows.
    ///
    /// Returns false once the source is exhausted.
    fn fill_next(&mut self, batch: &mut Batch) -> bool;
}

/// Shape of one batch produced by a [`RowBatchSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchShape {
    /// The next `n` rows at positions `0..n`.
    Dense(usize),
    /// One row at each selected position of a batch of logical `size`.
    Sparse { size: usize, selected: Vec<usize> },
}

impl BatchShape {
    /// Returns the number of logical rows the shape consumes.
    #[must_use]
    pub fn row_count(&self) -> usize {
        match self {
            BatchShape::Dense(n) => *n,
            BatchShape::Sparse { selected, .. } => selected.len(),
        }
    }

    fn validate(&self) -> Result<()> {
        if let BatchShape::Sparse { size, selected } = self {
            if !selected.windows(2).all(|w| w[0] < w[1]) {
                return Err(VexError::InvalidBatchShape(
                    "selected positions must be strictly increasing".to_string(),
                ));
            }
            if selected.last().is_some_and(|last| last >= size) {
                return Err(VexError::InvalidBatchShape(format!(
                    "selected position out of range for size {size}"
                )));
            }
        }
        Ok(())
    }

    fn size(&self) -> usize {
        match self {
            BatchShape::Dense(n) => *n,
            BatchShape::Sparse { size, .. } => *size,
        }
    }
}

/// Replays owned rows through explicit batch shapes.
///
/// Each logical row is written at its selected physical position, so the
/// same rows can be fed with any fragmentation.
#[derive(Debug, Clone)]
pub struct RowBatchSource {
    rows: Vec<Vec<Value>>,
    shapes: Vec<BatchShape>,
    next_shape: usize,
    next_row: usize,
}

impl RowBatchSource {
    /// Splits `rows` into dense batches of at most `batch_size` rows.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBatchShape` if `batch_size` is zero.
    pub fn new(rows: Vec<Vec<Value>>, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(VexError::InvalidBatchShape(
                "batch size must be positive".to_string(),
            ));
        }
        let mut shapes = Vec::with_capacity(rows.len().div_ceil(batch_size));
        let mut remaining = rows.len();
        while remaining > 0 {
            let n = remaining.min(batch_size);
            shapes.push(BatchShape::Dense(n));
            remaining -= n;
        }
        Self::with_shapes(rows, shapes)
    }

    /// Creates a source that emits one batch per shape.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBatchShape` if a sparse shape is malformed or the
    /// shapes do not consume exactly `rows.len()` rows.
    pub fn with_shapes(rows: Vec<Vec<Value>>, shapes: Vec<BatchShape>) -> Result<Self> {
        for shape in &shapes {
            shape.validate()?;
        }
        let covered: usize = shapes.iter().map(BatchShape::row_count).sum();
        if covered != rows.len() {
            return Err(VexError::InvalidBatchShape(format!(
                "shapes cover {covered} rows, source has {}",
                rows.len()
            )));
        }
        Ok(RowBatchSource {
            rows,
            shapes,
            next_shape: 0,
            next_row: 0,
        })
    }

    /// Returns the logical rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Returns the batch shapes.
    #[must_use]
    pub fn shapes(&self) -> &[BatchShape] {
        &self.shapes
    }
}

impl BatchSource for RowBatchSource {
    fn reset(&mut self) {
        self.next_shape = 0;
        self.next_row = 0;
    }

    /// # Panics
    ///
    /// Panics if a shape does not fit the batch capacity or a row is wider
    /// than the batch.
    fn fill_next(&mut self, batch: &mut Batch) -> bool {
        let Some(shape) = self.shapes.get(self.next_shape) else {
            return false;
        };
        assert!(
            shape.size() <= batch.capacity(),
            "batch shape of size {} exceeds capacity {}",
            shape.size(),
            batch.capacity()
        );

        batch.reset();
        let count = shape.row_count();
        let rows = &self.rows[self.next_row..self.next_row + count];
        let positions: Box<dyn Iterator<Item = usize> + '_> = match shape {
            BatchShape::Dense(n) => Box::new(0..*n),
            BatchShape::Sparse { selected, .. } => Box::new(selected.iter().copied()),
        };
        for (row, position) in rows.iter().zip(positions) {
            for (column, value) in row.iter().enumerate() {
                batch.column_mut(column).set_value(position, value);
            }
        }
        match shape {
            BatchShape::Dense(n) => batch.set_dense(*n),
            BatchShape::Sparse { size, selected } => batch.set_sparse(*size, selected.clone()),
        }

        trace!(
            shape = self.next_shape,
            rows = count,
            first_row = self.next_row,
            "filled batch"
        );
        self.next_shape += 1;
        self.next_row += count;
        true
    }
}
