//! Native-level conversion functions.
//!
//! Every conversion is expressed once here, on physical representations.
//! Row-mode operators reach these through the `to_*` dispatchers; vector
//! kernels call the per-representation functions directly on column slots.
//! A `None` result is a per-value content failure and becomes null.

use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};

use crate::types::{Category, Native, TypeDescriptor};

/// `NaiveDate::num_days_from_ce` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;
const SECONDS_PER_DAY: i64 = 86_400;
const NANOS_PER_SECOND: i64 = 1_000_000_000;
/// Decimal magnitudes past `10^400` are outside every float range.
const MAX_FLOAT_DIGITS: i128 = 400;
const MAX_PLAIN_SCALE: u64 = 4096;

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

// =============================================================================
// Integral and boolean targets (long layout)
// =============================================================================

/// Converts a long-layout value to an integral or boolean target.
#[must_use]
pub fn to_long(src: Native<'_>, from: Category, to: Category) -> Option<i64> {
    match src {
        Native::Long(v) => long_to_long(v, from, to),
        Native::Double(v) => double_to_long(v, to),
        Native::Bytes(b) => text_to_long(std::str::from_utf8(b).ok()?, to),
        Native::Decimal(d) => decimal_to_long(d, to),
        Native::Timestamp(ts) => timestamp_to_long(ts, to),
        Native::IntervalDayTime(_) => None,
    }
}

/// Wraps `v` into the width of `to` (two's complement). Boolean targets become 0/1.
#[must_use]
pub fn narrow_long(v: i64, to: Category) -> Option<i64> {
    match to {
        Category::Boolean => Some(i64::from(v != 0)),
        Category::Byte => Some(i64::from(v as i8)),
        Category::Short => Some(i64::from(v as i16)),
        Category::Int => Some(i64::from(v as i32)),
        Category::Long => Some(v),
        _ => None,
    }
}

/// Range-checks `v` against the width of `to`.
fn fit_long(v: i64, to: Category) -> Option<i64> {
    match to {
        Category::Boolean => Some(i64::from(v != 0)),
        Category::Byte => i8::try_from(v).ok().map(i64::from),
        Category::Short => i16::try_from(v).ok().map(i64::from),
        Category::Int => i32::try_from(v).ok().map(i64::from),
        Category::Long => Some(v),
        _ => None,
    }
}

fn integral_bounds(to: Category) -> Option<(i64, i64)> {
    match to {
        Category::Byte => Some((i64::from(i8::MIN), i64::from(i8::MAX))),
        Category::Short => Some((i64::from(i16::MIN), i64::from(i16::MAX))),
        Category::Int => Some((i64::from(i32::MIN), i64::from(i32::MAX))),
        Category::Long => Some((i64::MIN, i64::MAX)),
        _ => None,
    }
}

#[must_use]
pub fn long_to_long(v: i64, from: Category, to: Category) -> Option<i64> {
    match from {
        // A date carries no truth value.
        Category::Date if to == Category::Boolean => None,
        Category::Date => narrow_long(v.checked_mul(SECONDS_PER_DAY)?, to),
        _ => narrow_long(v, to),
    }
}

#[must_use]
pub fn double_to_long(v: f64, to: Category) -> Option<i64> {
    if to == Category::Boolean {
        return Some(i64::from(v != 0.0));
    }
    if !v.is_finite() {
        return None;
    }
    let (min, max) = integral_bounds(to)?;
    let truncated = v.trunc();
    if truncated < min as f64 || truncated >= max as f64 + 1.0 {
        return None;
    }
    Some(truncated as i64)
}

#[must_use]
pub fn decimal_to_long(d: &BigDecimal, to: Category) -> Option<i64> {
    if to == Category::Boolean {
        return Some(i64::from(!d.is_zero()));
    }
    let digits = integer_digits(d);
    if digits > 20 {
        return None;
    }
    if digits <= 0 {
        return fit_long(0, to);
    }
    let truncated = d.with_scale_round(0, RoundingMode::Down);
    fit_long(truncated.to_i64()?, to)
}

/// Parses an integer, accepting surrounding whitespace and truncating an
/// optional fractional part.
#[must_use]
pub fn text_to_long(text: &str, to: Category) -> Option<i64> {
    if to == Category::Boolean {
        return text_to_bool(text).map(i64::from);
    }
    let trimmed = text.trim();
    let integer_part = match trimmed.split_once('.') {
        Some((integer, fraction)) => {
            if !fraction.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            integer
        }
        None => trimmed,
    };
    fit_long(integer_part.parse::<i64>().ok()?, to)
}

/// Parses the textual boolean spellings, case-insensitively.
#[must_use]
pub fn text_to_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

#[must_use]
pub fn timestamp_to_long(ts: NaiveDateTime, to: Category) -> Option<i64> {
    let utc = ts.and_utc();
    if to == Category::Boolean {
        return Some(i64::from(
            utc.timestamp() != 0 || utc.timestamp_subsec_nanos() != 0,
        ));
    }
    narrow_long(utc.timestamp(), to)
}

// =============================================================================
// Float and double targets (double layout)
// =============================================================================

/// Converts to a float or double target. Float results are rounded to `f32`.
#[must_use]
pub fn to_double(src: Native<'_>, from: Category, to: Category) -> Option<f64> {
    match src {
        Native::Long(v) => long_to_double(v, from, to),
        Native::Double(v) => Some(double_to_double(v, to)),
        Native::Bytes(b) => text_to_double(std::str::from_utf8(b).ok()?, to),
        Native::Decimal(d) => decimal_to_double(d, to),
        Native::Timestamp(ts) => Some(timestamp_to_double(ts, to)),
        Native::IntervalDayTime(_) => None,
    }
}

#[must_use]
pub fn long_to_double(v: i64, from: Category, to: Category) -> Option<f64> {
    let v = if from == Category::Date {
        v.checked_mul(SECONDS_PER_DAY)?
    } else {
        v
    };
    Some(if to == Category::Float {
        f64::from(v as f32)
    } else {
        v as f64
    })
}

#[must_use]
pub fn double_to_double(v: f64, to: Category) -> f64 {
    if to == Category::Float {
        f64::from(v as f32)
    } else {
        v
    }
}

#[must_use]
pub fn decimal_to_double(d: &BigDecimal, to: Category) -> Option<f64> {
    let digits = integer_digits(d);
    if digits.abs() > MAX_FLOAT_DIGITS {
        let magnitude = if digits > 0 { f64::INFINITY } else { 0.0 };
        let signed = if d.is_negative() { -magnitude } else { magnitude };
        return Some(double_to_double(signed, to));
    }
    if to == Category::Float {
        d.to_f32().map(f64::from)
    } else {
        d.to_f64()
    }
}

#[must_use]
pub fn text_to_double(text: &str, to: Category) -> Option<f64> {
    let trimmed = text.trim();
    if to == Category::Float {
        trimmed.parse::<f32>().ok().map(f64::from)
    } else {
        trimmed.parse::<f64>().ok()
    }
}

#[must_use]
pub fn timestamp_to_double(ts: NaiveDateTime, to: Category) -> f64 {
    let utc = ts.and_utc();
    let seconds = utc.timestamp() as f64 + f64::from(utc.timestamp_subsec_nanos()) / 1e9;
    double_to_double(seconds, to)
}

// =============================================================================
// Decimal targets
// =============================================================================

/// Converts to `decimal(precision, scale)`.
#[must_use]
pub fn to_decimal(src: Native<'_>, from: Category, precision: u8, scale: u8) -> Option<BigDecimal> {
    match src {
        Native::Long(v) => long_to_decimal(v, from, precision, scale),
        Native::Double(v) => double_to_decimal(v, from, precision, scale),
        Native::Bytes(b) => text_to_decimal(std::str::from_utf8(b).ok()?, precision, scale),
        Native::Decimal(d) => enforce_decimal(d, precision, scale),
        Native::Timestamp(ts) => timestamp_to_decimal(ts, precision, scale),
        Native::IntervalDayTime(_) => None,
    }
}

/// Number of digits left of the decimal point (may be zero or negative).
///
/// Computed in `i128`: parsed exponents span the whole `i64` range.
fn integer_digits(d: &BigDecimal) -> i128 {
    let (_, exponent) = d.as_bigint_and_exponent();
    i128::from(d.digits()) - i128::from(exponent)
}

/// Rounds `d` HALF_UP to `scale` and rejects values whose integer part does
/// not fit in `precision - scale` digits.
#[must_use]
pub fn enforce_decimal(d: &BigDecimal, precision: u8, scale: u8) -> Option<BigDecimal> {
    let scale_digits = i64::from(scale);
    let max_integer_digits = i128::from(precision.saturating_sub(scale));
    if d.is_zero() {
        return Some(BigDecimal::zero().with_scale(scale_digits));
    }

    let digits = integer_digits(d);
    if digits > max_integer_digits {
        return None;
    }
    // Magnitude below half a unit in the last place: rounds to zero.
    if digits < -i128::from(scale_digits) - 1 {
        return Some(BigDecimal::zero().with_scale(scale_digits));
    }

    let rounded = d.with_scale_round(scale_digits, RoundingMode::HalfUp);
    if !rounded.is_zero() && integer_digits(&rounded) > max_integer_digits {
        return None;
    }
    Some(rounded)
}

#[must_use]
pub fn long_to_decimal(v: i64, from: Category, precision: u8, scale: u8) -> Option<BigDecimal> {
    let v = if from == Category::Date {
        v.checked_mul(SECONDS_PER_DAY)?
    } else {
        v
    };
    enforce_decimal(&BigDecimal::from(v), precision, scale)
}

/// Converts through the shortest round-trip text of the float, so that
/// `0.1f32` becomes exactly `0.1`.
#[must_use]
pub fn double_to_decimal(v: f64, from: Category, precision: u8, scale: u8) -> Option<BigDecimal> {
    if !v.is_finite() {
        return None;
    }
    let exact = BigDecimal::from_str(&double_to_text(v, from)).ok()?;
    enforce_decimal(&exact, precision, scale)
}

#[must_use]
pub fn text_to_decimal(text: &str, precision: u8, scale: u8) -> Option<BigDecimal> {
    let exact = BigDecimal::from_str(text.trim()).ok()?;
    enforce_decimal(&exact, precision, scale)
}

#[must_use]
pub fn timestamp_to_decimal(ts: NaiveDateTime, precision: u8, scale: u8) -> Option<BigDecimal> {
    let utc = ts.and_utc();
    let nanos = i128::from(utc.timestamp()) * i128::from(NANOS_PER_SECOND)
        + i128::from(utc.timestamp_subsec_nanos());
    enforce_decimal(&BigDecimal::new(BigInt::from(nanos), 9), precision, scale)
}

// =============================================================================
// Date and timestamp targets
// =============================================================================

/// Converts to a date, as days since the Unix epoch.
#[must_use]
pub fn to_date(src: Native<'_>, from: Category) -> Option<i64> {
    match src {
        Native::Long(v) => long_to_date(v, from),
        Native::Bytes(b) => text_to_date(std::str::from_utf8(b).ok()?),
        Native::Timestamp(ts) => Some(timestamp_to_date(ts)),
        _ => to_timestamp(src, from).map(timestamp_to_date),
    }
}

/// Converts to a timestamp. Numbers are seconds since the Unix epoch.
#[must_use]
pub fn to_timestamp(src: Native<'_>, from: Category) -> Option<NaiveDateTime> {
    match src {
        Native::Long(v) => long_to_timestamp(v, from),
        Native::Double(v) => double_to_timestamp(v),
        Native::Bytes(b) => text_to_timestamp(std::str::from_utf8(b).ok()?),
        Native::Decimal(d) => decimal_to_timestamp(d),
        Native::Timestamp(ts) => Some(ts),
        Native::IntervalDayTime(_) => None,
    }
}

#[must_use]
pub fn days_to_date(days: i64) -> Option<NaiveDate> {
    let from_ce = i32::try_from(days)
        .ok()?
        .checked_add(UNIX_EPOCH_DAYS_FROM_CE)?;
    NaiveDate::from_num_days_from_ce_opt(from_ce)
}

#[must_use]
pub fn date_to_days(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
}

#[must_use]
pub fn seconds_to_timestamp(seconds: i64, nanos: u32) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(seconds, nanos).map(|dt| dt.naive_utc())
}

#[must_use]
pub fn long_to_timestamp(v: i64, from: Category) -> Option<NaiveDateTime> {
    match from {
        Category::Date => days_to_date(v)?.and_hms_opt(0, 0, 0),
        _ => seconds_to_timestamp(v, 0),
    }
}

#[must_use]
pub fn double_to_timestamp(v: f64) -> Option<NaiveDateTime> {
    if !v.is_finite() {
        return None;
    }
    let floor = v.floor();
    if floor < i64::MIN as f64 || floor >= i64::MAX as f64 {
        return None;
    }
    let mut seconds = floor as i64;
    let mut nanos = ((v - floor) * 1e9).round() as i64;
    if nanos >= NANOS_PER_SECOND {
        seconds = seconds.checked_add(1)?;
        nanos -= NANOS_PER_SECOND;
    }
    seconds_to_timestamp(seconds, nanos as u32)
}

#[must_use]
pub fn decimal_to_timestamp(d: &BigDecimal) -> Option<NaiveDateTime> {
    let digits = integer_digits(d);
    if digits > 20 {
        return None;
    }
    // Below a tenth of a nanosecond either sign rounds to the epoch.
    if digits < -10 {
        return seconds_to_timestamp(0, 0);
    }
    let floor = d.with_scale_round(0, RoundingMode::Floor);
    let mut seconds = floor.to_i64()?;
    let fraction = (d - &floor) * BigDecimal::from(NANOS_PER_SECOND);
    let mut nanos = fraction.with_scale_round(0, RoundingMode::HalfUp).to_i64()?;
    if nanos >= NANOS_PER_SECOND {
        seconds = seconds.checked_add(1)?;
        nanos -= NANOS_PER_SECOND;
    }
    seconds_to_timestamp(seconds, nanos as u32)
}

/// Parses `YYYY-MM-DD[ HH:MM[:SS[.fffffffff]]]` (a `T` separator is accepted).
#[must_use]
pub fn text_to_timestamp(text: &str) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

#[must_use]
pub fn long_to_date(v: i64, from: Category) -> Option<i64> {
    match from {
        Category::Date => Some(v),
        _ => long_to_timestamp(v, from).map(timestamp_to_date),
    }
}

/// Parses a date, also accepting a full timestamp and keeping its date part.
#[must_use]
pub fn text_to_date(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        Ok(date) => Some(date_to_days(date)),
        Err(_) => text_to_timestamp(trimmed).map(timestamp_to_date),
    }
}

#[must_use]
pub fn timestamp_to_date(ts: NaiveDateTime) -> i64 {
    date_to_days(ts.date())
}

// =============================================================================
// Text and binary targets
// =============================================================================

/// Renders a value as text, before any char/varchar length enforcement.
#[must_use]
pub fn to_text(src: Native<'_>, from: Category) -> Option<String> {
    match src {
        Native::Long(v) => long_to_text(v, from),
        Native::Double(v) => Some(double_to_text(v, from)),
        Native::Bytes(b) => std::str::from_utf8(b).ok().map(str::to_string),
        Native::Decimal(d) => decimal_to_text(d),
        Native::Timestamp(ts) => Some(timestamp_to_text(ts)),
        Native::IntervalDayTime(iv) => Some(iv.to_string()),
    }
}

/// Converts to a binary target: text-family sources keep their bytes.
#[must_use]
pub fn to_bytes(src: Native<'_>, from: Category) -> Option<Vec<u8>> {
    match src {
        Native::Bytes(b) => Some(b.to_vec()),
        _ => to_text(src, from).map(String::into_bytes),
    }
}

#[must_use]
pub fn long_to_text(v: i64, from: Category) -> Option<String> {
    match from {
        Category::Boolean => Some(if v != 0 { "TRUE" } else { "FALSE" }.to_string()),
        Category::Date => date_to_text(v),
        _ => Some(v.to_string()),
    }
}

/// Shortest round-trip rendering; floats render at `f32` precision.
#[must_use]
pub fn double_to_text(v: f64, from: Category) -> String {
    if from == Category::Float {
        format!("{:?}", v as f32)
    } else {
        format!("{v:?}")
    }
}

/// Plain notation keeping the full scale, so zero renders as `0.00` at
/// scale 2. Scales too large to spell out give `None`.
#[must_use]
pub fn decimal_to_text(d: &BigDecimal) -> Option<String> {
    let (_, scale) = d.as_bigint_and_exponent();
    if scale.unsigned_abs() > MAX_PLAIN_SCALE {
        return None;
    }
    Some(d.to_plain_string())
}

#[must_use]
pub fn date_to_text(days: i64) -> Option<String> {
    days_to_date(days).map(|date| date.format("%Y-%m-%d").to_string())
}

/// Renders `YYYY-MM-DD HH:MM:SS` plus a fraction with trailing zeros trimmed.
#[must_use]
pub fn timestamp_to_text(ts: NaiveDateTime) -> String {
    let base = ts.format("%Y-%m-%d %H:%M:%S").to_string();
    let nanos = ts.nanosecond();
    if nanos == 0 {
        base
    } else {
        let fraction = format!("{nanos:09}");
        format!("{base}.{}", fraction.trim_end_matches('0'))
    }
}

/// Applies `char(n)`/`varchar(n)` length semantics to text.
///
/// `char` values are truncated and then stripped of trailing spaces.
#[must_use]
pub fn enforce_text(text: &str, to: &TypeDescriptor) -> String {
    match (to.category(), to.max_length()) {
        (Category::Char, Some(length)) => truncate_chars(text, length)
            .trim_end_matches(' ')
            .to_string(),
        (Category::Varchar, Some(length)) => truncate_chars(text, length).to_string(),
        _ => text.to_string(),
    }
}

fn truncate_chars(text: &str, max_chars: u32) -> &str {
    match text.char_indices().nth(max_chars as usize) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
