//! Boxed per-row values.

use std::fmt;

use bigdecimal::BigDecimal;
use chrono::{NaiveDateTime, TimeDelta};

use crate::cast::scalar;
use crate::types::category::Category;

/// Runtime value container for a single row slot.
///
/// Each variant carries exactly the physical representation of one category.
/// `Null` carries no payload and absorbs every conversion.
#[derive(Debug, Clone)]
pub enum Value {
    /// Boolean value.
    Boolean(bool),
    /// `tinyint` value.
    Byte(i8),
    /// `smallint` value.
    Short(i16),
    /// `int` value.
    Int(i32),
    /// `bigint` value.
    Long(i64),
    /// `float` value.
    Float(f32),
    /// `double` value.
    Double(f64),
    /// `string` value.
    String(String),
    /// `char(n)` value, stored without trailing padding.
    Char(String),
    /// `varchar(n)` value.
    Varchar(String),
    /// `binary` value.
    Binary(Vec<u8>),
    /// `decimal(p,s)` value.
    Decimal(BigDecimal),
    /// Date value (days since Unix epoch).
    Date(i32),
    /// Timestamp value with nanosecond precision.
    Timestamp(NaiveDateTime),
    /// Year-month interval (total months).
    IntervalYearMonth(i32),
    /// Day-time interval.
    IntervalDayTime(TimeDelta),
    /// Null value.
    Null,
}

/// Borrowed view of a value in its physical column representation.
#[derive(Debug, Clone, Copy)]
pub enum Native<'a> {
    /// Booleans (0/1), integers, dates (days) and year-month intervals.
    Long(i64),
    /// Floats and doubles.
    Double(f64),
    /// String family (UTF-8) and binary.
    Bytes(&'a [u8]),
    /// Decimals.
    Decimal(&'a BigDecimal),
    /// Timestamps.
    Timestamp(NaiveDateTime),
    /// Day-time intervals.
    IntervalDayTime(TimeDelta),
}

impl Value {
    /// Returns true if this value is null.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the category of this value, or None for Null.
    #[must_use]
    pub fn category(&self) -> Option<Category> {
        match self {
            Value::Boolean(_) => Some(Category::Boolean),
            Value::Byte(_) => Some(Category::Byte),
            Value::Short(_) => Some(Category::Short),
            Value::Int(_) => Some(Category::Int),
            Value::Long(_) => Some(Category::Long),
            Value::Float(_) => Some(Category::Float),
            Value::Double(_) => Some(Category::Double),
            Value::String(_) => Some(Category::String),
            Value::Char(_) => Some(Category::Char),
            Value::Varchar(_) => Some(Category::Varchar),
            Value::Binary(_) => Some(Category::Binary),
            Value::Decimal(_) => Some(Category::Decimal),
            Value::Date(_) => Some(Category::Date),
            Value::Timestamp(_) => Some(Category::Timestamp),
            Value::IntervalYearMonth(_) => Some(Category::IntervalYearMonth),
            Value::IntervalDayTime(_) => Some(Category::IntervalDayTime),
            Value::Null => None,
        }
    }

    /// Returns the physical view of this value, or None for Null.
    #[must_use]
    pub fn native(&self) -> Option<Native<'_>> {
        match self {
            Value::Boolean(b) => Some(Native::Long(i64::from(*b))),
            Value::Byte(v) => Some(Native::Long(i64::from(*v))),
            Value::Short(v) => Some(Native::Long(i64::from(*v))),
            Value::Int(v) | Value::Date(v) | Value::IntervalYearMonth(v) => {
                Some(Native::Long(i64::from(*v)))
            }
            Value::Long(v) => Some(Native::Long(*v)),
            Value::Float(v) => Some(Native::Double(f64::from(*v))),
            Value::Double(v) => Some(Native::Double(*v)),
            Value::String(s) | Value::Char(s) | Value::Varchar(s) => {
                Some(Native::Bytes(s.as_bytes()))
            }
            Value::Binary(b) => Some(Native::Bytes(b)),
            Value::Decimal(d) => Some(Native::Decimal(d)),
            Value::Timestamp(ts) => Some(Native::Timestamp(*ts)),
            Value::IntervalDayTime(iv) => Some(Native::IntervalDayTime(*iv)),
            Value::Null => None,
        }
    }

    /// Boxes a long-layout slot as a value of the given category.
    ///
    /// # Panics
    ///
    /// Panics if the category does not use the long layout.
    #[must_use]
    pub fn from_long(category: Category, v: i64) -> Value {
        match category {
            Category::Boolean => Value::Boolean(v != 0),
            Category::Byte => Value::Byte(v as i8),
            Category::Short => Value::Short(v as i16),
            Category::Int => Value::Int(v as i32),
            Category::Long => Value::Long(v),
            Category::Date => Value::Date(v as i32),
            Category::IntervalYearMonth => Value::IntervalYearMonth(v as i32),
            Category::Void => Value::Null,
            other => panic!("category {other} does not use the long layout"),
        }
    }

    /// Boxes a double-layout slot as a value of the given category.
    ///
    /// # Panics
    ///
    /// Panics if the category is neither float nor double.
    #[must_use]
    pub fn from_double(category: Category, v: f64) -> Value {
        match category {
            Category::Float => Value::Float(v as f32),
            Category::Double => Value::Double(v),
            other => panic!("category {other} does not use the double layout"),
        }
    }

    /// Boxes a bytes-layout slot as a value of the given category, copying it.
    ///
    /// # Panics
    ///
    /// Panics if the category does not use the bytes layout.
    #[must_use]
    pub fn from_bytes(category: Category, bytes: &[u8]) -> Value {
        match category {
            Category::Binary => Value::Binary(bytes.to_vec()),
            Category::String => Value::String(String::from_utf8_lossy(bytes).into_owned()),
            Category::Char => Value::Char(String::from_utf8_lossy(bytes).into_owned()),
            Category::Varchar => Value::Varchar(String::from_utf8_lossy(bytes).into_owned()),
            other => panic!("category {other} does not use the bytes layout"),
        }
    }
}

// Floats compare by bit pattern so that row and vector results can be
// matched exactly, NaN included.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::Int(a), Value::Int(b))
            | (Value::Date(a), Value::Date(b))
            | (Value::IntervalYearMonth(a), Value::IntervalYearMonth(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b))
            | (Value::Char(a), Value::Char(b))
            | (Value::Varchar(a), Value::Varchar(b)) => a == b,
            (Value::Binary(a), Value::Binary(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::IntervalDayTime(a), Value::IntervalDayTime(b)) => a == b,
            (Value::Null, Value::Null) => true,
            _ => false,
        }
    }
}

/// Renders the value the way a cast to `string` would.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::IntervalYearMonth(months) => {
                let sign = if *months < 0 { "-" } else { "" };
                let abs = months.unsigned_abs();
                write!(f, "{sign}{}-{}", abs / 12, abs % 12)
            }
            Value::IntervalDayTime(iv) => write!(f, "{iv}"),
            Value::Null => f.write_str("NULL"),
            _ => match self
                .native()
                .zip(self.category())
                .and_then(|(native, category)| scalar::to_text(native, category))
            {
                Some(text) => f.write_str(&text),
                None => write!(f, "{self:?}"),
            },
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<BigDecimal> for Value {
    fn from(v: BigDecimal) -> Self {
        Value::Decimal(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_null_has_no_category() {
        assert!(Value::Null.is_null());
        assert_eq!(Value::Null.category(), None);
        assert!(Value::Null.native().is_none());
    }

    #[test]
    fn test_float_equality_is_bitwise() {
        assert_eq!(Value::Double(f64::NAN), Value::Double(f64::NAN));
        assert_ne!(Value::Double(0.0), Value::Double(-0.0));
        assert_ne!(Value::Int(1), Value::Long(1));
    }

    #[test]
    fn test_decimal_equality_ignores_trailing_zeros() {
        let a = Value::Decimal(BigDecimal::from_str("12.350").unwrap());
        let b = Value::Decimal(BigDecimal::from_str("12.35").unwrap());
        assert_eq!(a, b);
    }

    #[test]
    fn test_from_long_round_trips_category() {
        for category in [
            Category::Boolean,
            Category::Byte,
            Category::Short,
            Category::Int,
            Category::Long,
            Category::Date,
        ] {
            let value = Value::from_long(category, 1);
            assert_eq!(value.category(), Some(category));
        }
    }

    #[test]
    fn test_display_matches_cast_to_string() {
        assert_eq!(Value::Boolean(true).to_string(), "TRUE");
        assert_eq!(Value::Int(-42).to_string(), "-42");
        assert_eq!(Value::Date(0).to_string(), "1970-01-01");
        assert_eq!(Value::IntervalYearMonth(-14).to_string(), "-1-2");
        assert_eq!(Value::Null.to_string(), "NULL");
    }
}
