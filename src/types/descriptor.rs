//! Type descriptors: a category plus its parameters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VexError};
use crate::types::category::{Category, PhysicalKind};

/// Maximum length of a `char(n)` type.
pub const MAX_CHAR_LENGTH: u32 = 255;
/// Maximum length of a `varchar(n)` type.
pub const MAX_VARCHAR_LENGTH: u32 = 65_535;
/// Maximum decimal precision.
pub const MAX_DECIMAL_PRECISION: u8 = 38;
/// Precision used for a bare `decimal`.
pub const DEFAULT_DECIMAL_PRECISION: u8 = 10;
/// Scale used for a bare `decimal` or `decimal(p)`.
pub const DEFAULT_DECIMAL_SCALE: u8 = 0;

/// Parameters attached to a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeParams {
    /// The category takes no parameters.
    None,
    /// Maximum length in characters (`char`, `varchar`).
    Length(u32),
    /// Precision and scale (`decimal`).
    Decimal { precision: u8, scale: u8 },
}

/// A fully parameterized SQL type.
///
/// Two descriptors are equal iff category and parameters match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeDescriptor {
    category: Category,
    params: TypeParams,
}

impl TypeDescriptor {
    /// Creates a descriptor for a category without parameters.
    ///
    /// # Errors
    ///
    /// Returns `TypeParse` if the category requires parameters.
    pub fn primitive(category: Category) -> Result<Self> {
        match category {
            Category::Decimal => Self::decimal(DEFAULT_DECIMAL_PRECISION, DEFAULT_DECIMAL_SCALE),
            Category::Char | Category::Varchar => Err(VexError::type_parse(
                category.name(),
                format!("{category} requires a length"),
            )),
            _ => Ok(TypeDescriptor {
                category,
                params: TypeParams::None,
            }),
        }
    }

    /// Creates a `decimal(precision, scale)` descriptor.
    ///
    /// # Errors
    ///
    /// Returns `TypeParse` if precision is not in `1..=38` or scale exceeds precision.
    pub fn decimal(precision: u8, scale: u8) -> Result<Self> {
        let name = format!("decimal({precision},{scale})");
        if precision == 0 || precision > MAX_DECIMAL_PRECISION {
            return Err(VexError::type_parse(
                &name,
                format!("precision must be between 1 and {MAX_DECIMAL_PRECISION}"),
            ));
        }
        if scale > precision {
            return Err(VexError::type_parse(
                &name,
                "scale must not exceed precision",
            ));
        }
        Ok(TypeDescriptor {
            category: Category::Decimal,
            params: TypeParams::Decimal { precision, scale },
        })
    }

    /// Creates a `char(length)` descriptor.
    ///
    /// # Errors
    ///
    /// Returns `TypeParse` if length is not in `1..=255`.
    pub fn char(length: u32) -> Result<Self> {
        Self::with_length(Category::Char, length, MAX_CHAR_LENGTH)
    }

    /// Creates a `varchar(length)` descriptor.
    ///
    /// # Errors
    ///
    /// Returns `TypeParse` if length is not in `1..=65535`.
    pub fn varchar(length: u32) -> Result<Self> {
        Self::with_length(Category::Varchar, length, MAX_VARCHAR_LENGTH)
    }

    fn with_length(category: Category, length: u32, max: u32) -> Result<Self> {
        if length == 0 || length > max {
            return Err(VexError::type_parse(
                &format!("{category}({length})"),
                format!("length must be between 1 and {max}"),
            ));
        }
        Ok(TypeDescriptor {
            category,
            params: TypeParams::Length(length),
        })
    }

    /// Returns the category.
    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    /// Returns the parameters.
    #[must_use]
    pub fn params(&self) -> TypeParams {
        self.params
    }

    /// Returns the maximum length for `char`/`varchar`.
    #[must_use]
    pub fn max_length(&self) -> Option<u32> {
        match self.params {
            TypeParams::Length(length) => Some(length),
            _ => None,
        }
    }

    /// Returns `(precision, scale)` for decimals.
    #[must_use]
    pub fn precision_scale(&self) -> Option<(u8, u8)> {
        match self.params {
            TypeParams::Decimal { precision, scale } => Some((precision, scale)),
            _ => None,
        }
    }

    /// Returns the physical column layout for this type.
    #[must_use]
    pub fn physical_kind(&self) -> PhysicalKind {
        self.category.physical_kind()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.params {
            TypeParams::None => write!(f, "{}", self.category),
            TypeParams::Length(length) => write!(f, "{}({length})", self.category),
            TypeParams::Decimal { precision, scale } => {
                write!(f, "{}({precision},{scale})", self.category)
            }
        }
    }
}

impl FromStr for TypeDescriptor {
    type Err = VexError;

    fn from_str(s: &str) -> Result<Self> {
        crate::types::parse_type(s)
    }
}

macro_rules! primitive_constructors {
    ($($fn_name:ident => $category:ident),* $(,)?) => {
        impl TypeDescriptor {
            $(
                #[doc = concat!("Descriptor for `", stringify!($fn_name), "`.")]
                #[must_use]
                pub const fn $fn_name() -> Self {
                    TypeDescriptor {
                        category: Category::$category,
                        params: TypeParams::None,
                    }
                }
            )*
        }
    };
}

primitive_constructors! {
    boolean => Boolean,
    tinyint => Byte,
    smallint => Short,
    int => Int,
    bigint => Long,
    float => Float,
    double => Double,
    string => String,
    binary => Binary,
    date => Date,
    timestamp => Timestamp,
    interval_year_month => IntervalYearMonth,
    interval_day_time => IntervalDayTime,
    void => Void,
}
