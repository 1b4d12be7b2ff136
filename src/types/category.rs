//! Primitive type categories and their physical column layouts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Primitive SQL type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// Type of the untyped NULL literal.
    Void,
    /// Boolean.
    Boolean,
    /// 8-bit signed integer (`tinyint`).
    Byte,
    /// 16-bit signed integer (`smallint`).
    Short,
    /// 32-bit signed integer (`int`).
    Int,
    /// 64-bit signed integer (`bigint`).
    Long,
    /// 32-bit floating point.
    Float,
    /// 64-bit floating point.
    Double,
    /// Unbounded UTF-8 string.
    String,
    /// Date (days since Unix epoch).
    Date,
    /// Timestamp with nanosecond precision.
    Timestamp,
    /// Raw byte sequence.
    Binary,
    /// Fixed-point decimal with precision and scale.
    Decimal,
    /// Length-bounded string.
    Varchar,
    /// Fixed-length, space-padded string.
    Char,
    /// Interval in months.
    IntervalYearMonth,
    /// Interval in seconds and nanoseconds.
    IntervalDayTime,
    /// Category of a value whose type could not be determined.
    Unknown,
}

impl Category {
    /// Every category, in declaration order.
    pub const ALL: [Category; 18] = [
        Category::Void,
        Category::Boolean,
        Category::Byte,
        Category::Short,
        Category::Int,
        Category::Long,
        Category::Float,
        Category::Double,
        Category::String,
        Category::Date,
        Category::Timestamp,
        Category::Binary,
        Category::Decimal,
        Category::Varchar,
        Category::Char,
        Category::IntervalYearMonth,
        Category::IntervalDayTime,
        Category::Unknown,
    ];

    /// Returns the canonical SQL name of the category (without parameters).
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Category::Void => "void",
            Category::Boolean => "boolean",
            Category::Byte => "tinyint",
            Category::Short => "smallint",
            Category::Int => "int",
            Category::Long => "bigint",
            Category::Float => "float",
            Category::Double => "double",
            Category::String => "string",
            Category::Date => "date",
            Category::Timestamp => "timestamp",
            Category::Binary => "binary",
            Category::Decimal => "decimal",
            Category::Varchar => "varchar",
            Category::Char => "char",
            Category::IntervalYearMonth => "interval_year_month",
            Category::IntervalDayTime => "interval_day_time",
            Category::Unknown => "unknown",
        }
    }

    /// Returns whether the category carries type parameters.
    #[must_use]
    pub fn is_parameterized(&self) -> bool {
        matches!(self, Category::Char | Category::Varchar | Category::Decimal)
    }

    /// Returns whether the category is one of the integer widths.
    #[must_use]
    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            Category::Byte | Category::Short | Category::Int | Category::Long
        )
    }

    /// Returns whether the category is `string`, `char` or `varchar`.
    #[must_use]
    pub fn is_string_family(&self) -> bool {
        matches!(self, Category::String | Category::Char | Category::Varchar)
    }

    /// Returns the physical column layout used for values of this category.
    #[must_use]
    pub fn physical_kind(&self) -> PhysicalKind {
        match self {
            Category::Boolean
            | Category::Byte
            | Category::Short
            | Category::Int
            | Category::Long
            | Category::Date
            | Category::IntervalYearMonth
            | Category::Void
            | Category::Unknown => PhysicalKind::Long,
            Category::Float | Category::Double => PhysicalKind::Double,
            Category::String | Category::Char | Category::Varchar | Category::Binary => {
                PhysicalKind::Bytes
            }
            Category::Decimal => PhysicalKind::Decimal,
            Category::Timestamp => PhysicalKind::Timestamp,
            Category::IntervalDayTime => PhysicalKind::IntervalDayTime,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Physical representation of a column buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalKind {
    /// `i64` slots: booleans, integers, dates and year-month intervals.
    Long,
    /// `f64` slots: float and double.
    Double,
    /// Byte-sequence slots: string family and binary.
    Bytes,
    /// Unbounded decimal slots.
    Decimal,
    /// Timestamp slots.
    Timestamp,
    /// Day-time interval slots.
    IntervalDayTime,
}
