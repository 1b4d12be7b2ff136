//! Columnar batches with null flags and a selection.

use std::ops::Range;

use bigdecimal::BigDecimal;
use chrono::{NaiveDateTime, TimeDelta};

use crate::types::{Category, Native, PhysicalKind, TypeDescriptor, Value};

/// Default batch size for vectorized execution (rows per batch).
pub const DEFAULT_BATCH_SIZE: usize = 2048;

/// Typed slot buffer of a column.
#[derive(Debug, Clone)]
pub enum ColumnData {
    Long(Vec<i64>),
    Double(Vec<f64>),
    Bytes(Vec<Vec<u8>>),
    Decimal(Vec<BigDecimal>),
    Timestamp(Vec<NaiveDateTime>),
    IntervalDayTime(Vec<TimeDelta>),
}

impl ColumnData {
    fn with_capacity(kind: PhysicalKind, capacity: usize) -> Self {
        match kind {
            PhysicalKind::Long => ColumnData::Long(vec![0; capacity]),
            PhysicalKind::Double => ColumnData::Double(vec![0.0; capacity]),
            PhysicalKind::Bytes => ColumnData::Bytes(vec![Vec::new(); capacity]),
            PhysicalKind::Decimal => ColumnData::Decimal(vec![BigDecimal::default(); capacity]),
            PhysicalKind::Timestamp => {
                ColumnData::Timestamp(vec![NaiveDateTime::default(); capacity])
            }
            PhysicalKind::IntervalDayTime => {
                ColumnData::IntervalDayTime(vec![TimeDelta::zero(); capacity])
            }
        }
    }
}

/// A dense typed buffer with one null flag per slot.
#[derive(Debug, Clone)]
pub struct Column {
    data_type: TypeDescriptor,
    data: ColumnData,
    nulls: Vec<bool>,
}

macro_rules! typed_access {
    ($get:ident, $get_mut:ident, $variant:ident, $elem:ty) => {
        /// Returns the slots and null flags.
        ///
        /// # Panics
        ///
        /// Panics if the column uses a different physical layout.
        #[must_use]
        pub fn $get(&self) -> (&[$elem], &[bool]) {
            match &self.data {
                ColumnData::$variant(values) => (values, &self.nulls),
                _ => panic!(
                    concat!("column of type {} is not ", stringify!($variant), "-backed"),
                    self.data_type
                ),
            }
        }

        /// Returns the slots and null flags for writing.
        ///
        /// # Panics
        ///
        /// Panics if the column uses a different physical layout.
        pub fn $get_mut(&mut self) -> (&mut [$elem], &mut [bool]) {
            match &mut self.data {
                ColumnData::$variant(values) => (values, &mut self.nulls),
                _ => panic!(
                    concat!("column of type {} is not ", stringify!($variant), "-backed"),
                    self.data_type
                ),
            }
        }
    };
}

impl Column {
    /// Creates a column of `capacity` slots, none of them null.
    #[must_use]
    pub fn new(data_type: TypeDescriptor, capacity: usize) -> Self {
        Column {
            data_type,
            data: ColumnData::with_capacity(data_type.physical_kind(), capacity),
            nulls: vec![false; capacity],
        }
    }

    /// Returns the column type.
    #[must_use]
    pub fn data_type(&self) -> TypeDescriptor {
        self.data_type
    }

    /// Returns the number of slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.nulls.len()
    }

    /// Returns whether the slot is null.
    #[must_use]
    pub fn is_null(&self, row: usize) -> bool {
        self.nulls[row]
    }

    /// Marks the slot as null.
    pub fn set_null(&mut self, row: usize) {
        self.nulls[row] = true;
    }

    /// Clears every null flag.
    pub fn reset(&mut self) {
        self.nulls.fill(false);
    }

    typed_access!(longs, longs_mut, Long, i64);
    typed_access!(doubles, doubles_mut, Double, f64);
    typed_access!(bytes, bytes_mut, Bytes, Vec<u8>);
    typed_access!(decimals, decimals_mut, Decimal, BigDecimal);
    typed_access!(timestamps, timestamps_mut, Timestamp, NaiveDateTime);
    typed_access!(intervals, intervals_mut, IntervalDayTime, TimeDelta);

    /// Boxes the slot into a freshly allocated value.
    ///
    /// # Panics
    ///
    /// Panics for columns of category `unknown`.
    #[must_use]
    pub fn get_value(&self, row: usize) -> Value {
        if self.nulls[row] {
            return Value::Null;
        }
        let category = self.data_type.category();
        assert!(
            category != Category::Unknown,
            "cannot extract a value from an unknown-typed column"
        );
        match &self.data {
            ColumnData::Long(values) => Value::from_long(category, values[row]),
            ColumnData::Double(values) => Value::from_double(category, values[row]),
            ColumnData::Bytes(values) => Value::from_bytes(category, &values[row]),
            ColumnData::Decimal(values) => Value::Decimal(values[row].clone()),
            ColumnData::Timestamp(values) => Value::Timestamp(values[row]),
            ColumnData::IntervalDayTime(values) => Value::IntervalDayTime(values[row]),
        }
    }

    /// Unboxes `value` into the slot. `Null` sets the null flag.
    ///
    /// # Panics
    ///
    /// Panics if the value's category differs from the column's.
    pub fn set_value(&mut self, row: usize, value: &Value) {
        let Some(native) = value.native() else {
            self.nulls[row] = true;
            return;
        };
        assert!(
            value.category() == Some(self.data_type.category()),
            "cannot store {value:?} in a {} column",
            self.data_type
        );
        match (&mut self.data, native) {
            (ColumnData::Long(values), Native::Long(v)) => values[row] = v,
            (ColumnData::Double(values), Native::Double(v)) => values[row] = v,
            (ColumnData::Bytes(values), Native::Bytes(b)) => {
                values[row].clear();
                values[row].extend_from_slice(b);
            }
            (ColumnData::Decimal(values), Native::Decimal(d)) => values[row].clone_from(d),
            (ColumnData::Timestamp(values), Native::Timestamp(ts)) => values[row] = ts,
            (ColumnData::IntervalDayTime(values), Native::IntervalDayTime(iv)) => values[row] = iv,
            (_, native) => panic!("{native:?} does not match the {} layout", self.data_type),
        }
        self.nulls[row] = false;
    }
}

/// Which rows of a batch are active.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    /// Rows `0..size`.
    #[default]
    Dense,
    /// The listed positions, strictly increasing and below `size`.
    Sparse(Vec<usize>),
}

/// Iterator over the active row positions of a batch.
#[derive(Debug, Clone)]
pub enum ActiveRows<'a> {
    Dense(Range<usize>),
    Sparse(std::slice::Iter<'a, usize>),
}

impl Iterator for ActiveRows<'_> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        match self {
            ActiveRows::Dense(range) => range.next(),
            ActiveRows::Sparse(positions) => positions.next().copied(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            ActiveRows::Dense(range) => range.size_hint(),
            ActiveRows::Sparse(positions) => positions.size_hint(),
        }
    }
}

impl ExactSizeIterator for ActiveRows<'_> {}

/// A reusable set of equally sized columns plus a selection.
///
/// Input columns come first, followed by the scratch columns of the
/// compiled expressions that evaluate over the batch.
#[derive(Debug, Clone)]
pub struct Batch {
    columns: Vec<Column>,
    capacity: usize,
    size: usize,
    selection: Selection,
}

impl Batch {
    /// Creates an empty batch with one column per type.
    #[must_use]
    pub fn new(types: &[TypeDescriptor], capacity: usize) -> Self {
        Batch {
            columns: types.iter().map(|t| Column::new(*t, capacity)).collect(),
            capacity,
            size: 0,
            selection: Selection::Dense,
        }
    }

    /// Returns the number of slots per column.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the logical size: the bound on active positions.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Returns the current selection.
    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Returns a column by index.
    #[must_use]
    pub fn column(&self, index: usize) -> &Column {
        &self.columns[index]
    }

    /// Returns a column by index for writing.
    pub fn column_mut(&mut self, index: usize) -> &mut Column {
        &mut self.columns[index]
    }

    /// Returns the column types in order.
    #[must_use]
    pub fn types(&self) -> Vec<TypeDescriptor> {
        self.columns.iter().map(Column::data_type).collect()
    }

    /// Activates rows `0..size`.
    ///
    /// # Panics
    ///
    /// Panics if `size` exceeds the capacity.
    pub fn set_dense(&mut self, size: usize) {
        assert!(size <= self.capacity, "size {size} exceeds capacity {}", self.capacity);
        self.size = size;
        self.selection = Selection::Dense;
    }

    /// Activates the given positions.
    ///
    /// # Panics
    ///
    /// Panics if `size` exceeds the capacity or the positions are not
    /// strictly increasing and below `size`.
    pub fn set_sparse(&mut self, size: usize, selected: Vec<usize>) {
        assert!(size <= self.capacity, "size {size} exceeds capacity {}", self.capacity);
        assert!(
            selected.windows(2).all(|w| w[0] < w[1]),
            "selected positions must be strictly increasing"
        );
        assert!(
            selected.last().map_or(true, |&last| last < size),
            "selected position out of range for size {size}"
        );
        self.size = size;
        self.selection = Selection::Sparse(selected);
    }

    /// Empties the batch and clears every null flag.
    pub fn reset(&mut self) {
        self.size = 0;
        self.selection = Selection::Dense;
        for column in &mut self.columns {
            column.reset();
        }
    }

    /// Iterates the active row positions in increasing order.
    #[must_use]
    pub fn active_rows(&self) -> ActiveRows<'_> {
        active_rows(&self.selection, self.size)
    }

    /// Returns the number of active rows.
    #[must_use]
    pub fn active_count(&self) -> usize {
        match &self.selection {
            Selection::Dense => self.size,
            Selection::Sparse(selected) => selected.len(),
        }
    }

    /// Splits the batch into the active rows, one readable input column and
    /// one writable output column.
    ///
    /// # Panics
    ///
    /// Panics if `input == output`.
    pub(crate) fn step_view(
        &mut self,
        input: usize,
        output: usize,
    ) -> (ActiveRows<'_>, &Column, &mut Column) {
        assert_ne!(input, output, "step input and output alias column {input}");
        let rows = active_rows(&self.selection, self.size);
        let (source, target) = if input < output {
            let (head, tail) = self.columns.split_at_mut(output);
            (&head[input], &mut tail[0])
        } else {
            let (head, tail) = self.columns.split_at_mut(input);
            (&tail[0], &mut head[output])
        };
        (rows, source, target)
    }

    /// Returns the active rows and one writable column.
    pub(crate) fn output_view(&mut self, output: usize) -> (ActiveRows<'_>, &mut Column) {
        let rows = active_rows(&self.selection, self.size);
        (rows, &mut self.columns[output])
    }
}

fn active_rows(selection: &Selection, size: usize) -> ActiveRows<'_> {
    match selection {
        Selection::Dense => ActiveRows::Dense(0..size),
        Selection::Sparse(selected) => ActiveRows::Sparse(selected.iter()),
    }
}
