//! Native cast kernels.
//!
//! A kernel reads one column's typed slots and writes another's, touching
//! only active rows. Null inputs produce null outputs without running the
//! conversion; a failed conversion sets the output null flag.

use std::fmt;

use bigdecimal::BigDecimal;

use crate::cast::scalar;
use crate::types::{Category, TypeDescriptor};

use super::batch::{ActiveRows, Column};

/// Source and target types of a cast step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastContext {
    pub source: TypeDescriptor,
    pub target: TypeDescriptor,
}

/// Signature shared by every kernel.
pub type KernelFn = fn(&Column, &mut Column, ActiveRows<'_>, &CastContext);

/// A named native cast routine.
#[derive(Clone, Copy)]
pub struct Kernel {
    name: &'static str,
    func: KernelFn,
}

impl Kernel {
    fn new(name: &'static str, func: KernelFn) -> Self {
        Kernel { name, func }
    }

    /// Returns the kernel name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Runs the kernel over `rows`.
    pub fn apply(
        &self,
        input: &Column,
        output: &mut Column,
        rows: ActiveRows<'_>,
        cast: &CastContext,
    ) {
        (self.func)(input, output, rows, cast);
    }
}

impl fmt::Debug for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kernel").field("name", &self.name).finish()
    }
}

fn is_long_valued(category: Category) -> bool {
    category == Category::Boolean || category.is_integral()
}

fn is_floating(category: Category) -> bool {
    matches!(category, Category::Float | Category::Double)
}

/// Looks up the kernel for a category pair, if one exists.
///
/// Pairs without a kernel are evaluated through an adaptor step.
#[must_use]
pub fn lookup(source: Category, target: Category) -> Option<Kernel> {
    let kernel = match (source, target) {
        (s, t) if is_long_valued(s) && is_long_valued(t) => {
            Kernel::new("CastLongToLong", cast_long_to_long)
        }
        (s, t) if is_long_valued(s) && is_floating(t) => {
            Kernel::new("CastLongToDouble", cast_long_to_double)
        }
        (s, t) if is_long_valued(s) && t == Category::Decimal => {
            Kernel::new("CastLongToDecimal", cast_long_to_decimal)
        }
        (s, t) if is_long_valued(s) && t.is_string_family() => {
            Kernel::new("CastLongToString", cast_long_to_string)
        }
        (s, t) if is_floating(s) && is_long_valued(t) => {
            Kernel::new("CastDoubleToLong", cast_double_to_long)
        }
        (s, t) if is_floating(s) && is_floating(t) => {
            Kernel::new("CastDoubleToDouble", cast_double_to_double)
        }
        (s, Category::Decimal) if is_floating(s) => {
            Kernel::new("CastDoubleToDecimal", cast_double_to_decimal)
        }
        (s, t) if is_floating(s) && t.is_string_family() => {
            Kernel::new("CastDoubleToString", cast_double_to_string)
        }
        (Category::Decimal, t) if is_long_valued(t) => {
            Kernel::new("CastDecimalToLong", cast_decimal_to_long)
        }
        (Category::Decimal, t) if is_floating(t) => {
            Kernel::new("CastDecimalToDouble", cast_decimal_to_double)
        }
        (Category::Decimal, Category::Decimal) => {
            Kernel::new("CastDecimalToDecimal", cast_decimal_to_decimal)
        }
        (Category::Decimal, t) if t.is_string_family() => {
            Kernel::new("CastDecimalToString", cast_decimal_to_string)
        }
        (s, t) if s.is_string_family() && is_long_valued(t) => {
            Kernel::new("CastStringToLong", cast_string_to_long)
        }
        (s, t) if s.is_string_family() && is_floating(t) => {
            Kernel::new("CastStringToDouble", cast_string_to_double)
        }
        (s, Category::Decimal) if s.is_string_family() => {
            Kernel::new("CastStringToDecimal", cast_string_to_decimal)
        }
        (s, Category::Date) if s.is_string_family() => {
            Kernel::new("CastStringToDate", cast_string_to_date)
        }
        (s, Category::Timestamp) if s.is_string_family() => {
            Kernel::new("CastStringToTimestamp", cast_string_to_timestamp)
        }
        (s, t) if s.is_string_family() && t.is_string_family() => {
            Kernel::new("CastStringGroupToStringGroup", cast_string_to_string)
        }
        (Category::Date, t) if t.is_string_family() => {
            Kernel::new("CastDateToString", cast_long_to_string)
        }
        (Category::Date, Category::Timestamp) => {
            Kernel::new("CastDateToTimestamp", cast_date_to_timestamp)
        }
        (Category::Timestamp, Category::Date) => {
            Kernel::new("CastTimestampToDate", cast_timestamp_to_date)
        }
        (Category::Timestamp, t) if is_long_valued(t) => {
            Kernel::new("CastTimestampToLong", cast_timestamp_to_long)
        }
        (Category::Timestamp, t) if is_floating(t) => {
            Kernel::new("CastTimestampToDouble", cast_timestamp_to_double)
        }
        (Category::Timestamp, t) if t.is_string_family() => {
            Kernel::new("CastTimestampToString", cast_timestamp_to_string)
        }
        _ => return None,
    };
    Some(kernel)
}

/// Applies `convert` to every active non-null slot of `src`.
#[inline]
fn map_rows<S, T>(
    rows: ActiveRows<'_>,
    (src, src_nulls): (&[S], &[bool]),
    (dst, dst_nulls): (&mut [T], &mut [bool]),
    mut convert: impl FnMut(&S) -> Option<T>,
) {
    for row in rows {
        if src_nulls[row] {
            dst_nulls[row] = true;
            continue;
        }
        match convert(&src[row]) {
            Some(value) => {
                dst[row] = value;
                dst_nulls[row] = false;
            }
            None => dst_nulls[row] = true,
        }
    }
}

fn as_text(bytes: &[u8]) -> Option<&str> {
    std::str::from_utf8(bytes).ok()
}

fn decimal_target(cast: &CastContext) -> (u8, u8) {
    cast.target
        .precision_scale()
        .unwrap_or_else(|| panic!("decimal kernel compiled for {} target", cast.target))
}

// =============================================================================
// Long sources
// =============================================================================

fn cast_long_to_long(
    input: &Column,
    output: &mut Column,
    rows: ActiveRows<'_>,
    cast: &CastContext,
) {
    let (from, to) = (cast.source.category(), cast.target.category());
    map_rows(rows, input.longs(), output.longs_mut(), |v| scalar::long_to_long(*v, from, to));
}

fn cast_long_to_double(
    input: &Column,
    output: &mut Column,
    rows: ActiveRows<'_>,
    cast: &CastContext,
) {
    let (from, to) = (cast.source.category(), cast.target.category());
    map_rows(rows, input.longs(), output.doubles_mut(), |v| {
        scalar::long_to_double(*v, from, to)
    });
}

fn cast_long_to_decimal(
    input: &Column,
    output: &mut Column,
    rows: ActiveRows<'_>,
    cast: &CastContext,
) {
    let from = cast.source.category();
    let (precision, scale) = decimal_target(cast);
    map_rows(rows, input.longs(), output.decimals_mut(), |v| {
        scalar::long_to_decimal(*v, from, precision, scale)
    });
}

// Also serves date sources: the text rendering depends on the source category.
fn cast_long_to_string(
    input: &Column,
    output: &mut Column,
    rows: ActiveRows<'_>,
    cast: &CastContext,
) {
    let from = cast.source.category();
    let target = cast.target;
    map_rows(rows, input.longs(), output.bytes_mut(), |v| {
        scalar::long_to_text(*v, from).map(|text| scalar::enforce_text(&text, &target).into_bytes())
    });
}

fn cast_date_to_timestamp(
    input: &Column,
    output: &mut Column,
    rows: ActiveRows<'_>,
    cast: &CastContext,
) {
    let from = cast.source.category();
    map_rows(rows, input.longs(), output.timestamps_mut(), |v| {
        scalar::long_to_timestamp(*v, from)
    });
}

// =============================================================================
// Double sources
// =============================================================================

fn cast_double_to_long(
    input: &Column,
    output: &mut Column,
    rows: ActiveRows<'_>,
    cast: &CastContext,
) {
    let to = cast.target.category();
    map_rows(rows, input.doubles(), output.longs_mut(), |v| scalar::double_to_long(*v, to));
}

fn cast_double_to_double(
    input: &Column,
    output: &mut Column,
    rows: ActiveRows<'_>,
    cast: &CastContext,
) {
    let to = cast.target.category();
    map_rows(rows, input.doubles(), output.doubles_mut(), |v| {
        Some(scalar::double_to_double(*v, to))
    });
}

fn cast_double_to_decimal(
    input: &Column,
    output: &mut Column,
    rows: ActiveRows<'_>,
    cast: &CastContext,
) {
    let from = cast.source.category();
    let (precision, scale) = decimal_target(cast);
    map_rows(rows, input.doubles(), output.decimals_mut(), |v| {
        scalar::double_to_decimal(*v, from, precision, scale)
    });
}

fn cast_double_to_string(
    input: &Column,
    output: &mut Column,
    rows: ActiveRows<'_>,
    cast: &CastContext,
) {
    let from = cast.source.category();
    let target = cast.target;
    map_rows(rows, input.doubles(), output.bytes_mut(), |v| {
        Some(scalar::enforce_text(&scalar::double_to_text(*v, from), &target).into_bytes())
    });
}

// =============================================================================
// Decimal sources
// =============================================================================

fn cast_decimal_to_long(
    input: &Column,
    output: &mut Column,
    rows: ActiveRows<'_>,
    cast: &CastContext,
) {
    let to = cast.target.category();
    map_rows(rows, input.decimals(), output.longs_mut(), |d| scalar::decimal_to_long(d, to));
}

fn cast_decimal_to_double(
    input: &Column,
    output: &mut Column,
    rows: ActiveRows<'_>,
    cast: &CastContext,
) {
    let to = cast.target.category();
    map_rows(rows, input.decimals(), output.doubles_mut(), |d| {
        scalar::decimal_to_double(d, to)
    });
}

fn cast_decimal_to_decimal(
    input: &Column,
    output: &mut Column,
    rows: ActiveRows<'_>,
    cast: &CastContext,
) {
    let (precision, scale) = decimal_target(cast);
    map_rows(rows, input.decimals(), output.decimals_mut(), |d: &BigDecimal| {
        scalar::enforce_decimal(d, precision, scale)
    });
}

fn cast_decimal_to_string(
    input: &Column,
    output: &mut Column,
    rows: ActiveRows<'_>,
    cast: &CastContext,
) {
    let target = cast.target;
    map_rows(rows, input.decimals(), output.bytes_mut(), |d| {
        scalar::decimal_to_text(d).map(|text| scalar::enforce_text(&text, &target).into_bytes())
    });
}

// =============================================================================
// String-family sources
// =============================================================================

fn cast_string_to_long(
    input: &Column,
    output: &mut Column,
    rows: ActiveRows<'_>,
    cast: &CastContext,
) {
    let to = cast.target.category();
    map_rows(rows, input.bytes(), output.longs_mut(), |b| {
        scalar::text_to_long(as_text(b)?, to)
    });
}

fn cast_string_to_double(
    input: &Column,
    output: &mut Column,
    rows: ActiveRows<'_>,
    cast: &CastContext,
) {
    let to = cast.target.category();
    map_rows(rows, input.bytes(), output.doubles_mut(), |b| {
        scalar::text_to_double(as_text(b)?, to)
    });
}

fn cast_string_to_decimal(
    input: &Column,
    output: &mut Column,
    rows: ActiveRows<'_>,
    cast: &CastContext,
) {
    let (precision, scale) = decimal_target(cast);
    map_rows(rows, input.bytes(), output.decimals_mut(), |b| {
        scalar::text_to_decimal(as_text(b)?, precision, scale)
    });
}

fn cast_string_to_date(
    input: &Column,
    output: &mut Column,
    rows: ActiveRows<'_>,
    _cast: &CastContext,
) {
    map_rows(rows, input.bytes(), output.longs_mut(), |b| scalar::text_to_date(as_text(b)?));
}

fn cast_string_to_timestamp(
    input: &Column,
    output: &mut Column,
    rows: ActiveRows<'_>,
    _cast: &CastContext,
) {
    map_rows(rows, input.bytes(), output.timestamps_mut(), |b| {
        scalar::text_to_timestamp(as_text(b)?)
    });
}

fn cast_string_to_string(
    input: &Column,
    output: &mut Column,
    rows: ActiveRows<'_>,
    cast: &CastContext,
) {
    let target = cast.target;
    map_rows(rows, input.bytes(), output.bytes_mut(), |b| {
        Some(scalar::enforce_text(as_text(b)?, &target).into_bytes())
    });
}

// =============================================================================
// Timestamp sources
// =============================================================================

fn cast_timestamp_to_date(
    input: &Column,
    output: &mut Column,
    rows: ActiveRows<'_>,
    _cast: &CastContext,
) {
    map_rows(rows, input.timestamps(), output.longs_mut(), |ts| {
        Some(scalar::timestamp_to_date(*ts))
    });
}

fn cast_timestamp_to_long(
    input: &Column,
    output: &mut Column,
    rows: ActiveRows<'_>,
    cast: &CastContext,
) {
    let to = cast.target.category();
    map_rows(rows, input.timestamps(), output.longs_mut(), |ts| {
        scalar::timestamp_to_long(*ts, to)
    });
}

fn cast_timestamp_to_double(
    input: &Column,
    output: &mut Column,
    rows: ActiveRows<'_>,
    cast: &CastContext,
) {
    let to = cast.target.category();
    map_rows(rows, input.timestamps(), output.doubles_mut(), |ts| {
        Some(scalar::timestamp_to_double(*ts, to))
    });
}

fn cast_timestamp_to_string(
    input: &Column,
    output: &mut Column,
    rows: ActiveRows<'_>,
    cast: &CastContext,
) {
    let target = cast.target;
    map_rows(rows, input.timestamps(), output.bytes_mut(), |ts| {
        Some(scalar::enforce_text(&scalar::timestamp_to_text(*ts), &target).into_bytes())
    });
}
