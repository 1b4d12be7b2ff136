//! Type catalog: categories, parameterized descriptors, values and type-name parsing.

mod category;
mod descriptor;
mod parser;
mod value;

pub use category::{Category, PhysicalKind};
pub use descriptor::{
    TypeDescriptor, TypeParams, DEFAULT_DECIMAL_PRECISION, DEFAULT_DECIMAL_SCALE,
    MAX_CHAR_LENGTH, MAX_DECIMAL_PRECISION, MAX_VARCHAR_LENGTH,
};
pub use parser::parse_type;
pub use value::{Native, Value};
