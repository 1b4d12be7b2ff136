//! Pest parser for SQL type names.

use pest::Parser;
use pest_derive::Parser;

use crate::error::{Result, VexError};
use crate::types::category::Category;
use crate::types::descriptor::{TypeDescriptor, DEFAULT_DECIMAL_PRECISION, DEFAULT_DECIMAL_SCALE};

#[derive(Parser)]
#[grammar = "types/type_name.pest"]
struct TypeNameParser;

/// Parses a type name such as `int`, `varchar(15)` or `decimal(20,8)`.
///
/// Keywords are case-insensitive and whitespace between tokens is ignored.
///
/// # Errors
///
/// Returns `TypeParse` for unknown type names, malformed syntax or
/// parameters outside their legal range.
pub fn parse_type(name: &str) -> Result<TypeDescriptor> {
    let pairs = TypeNameParser::parse(Rule::type_name, name).map_err(|e| {
        let col = match e.line_col {
            pest::error::LineColLocation::Pos((_, c))
            | pest::error::LineColLocation::Span((_, c), _) => c,
        };
        VexError::type_parse(name, format!("unexpected input at column {col}"))
    })?;

    for pair in pairs {
        if pair.as_rule() != Rule::type_name {
            continue;
        }
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::decimal_type => return build_decimal(name, inner),
                Rule::char_type => return TypeDescriptor::char(parse_length(name, inner)?),
                Rule::varchar_type => {
                    return TypeDescriptor::varchar(parse_length(name, inner)?)
                }
                Rule::simple_type => return build_simple(name, inner.as_str()),
                _ => {}
            }
        }
    }
    Err(VexError::type_parse(name, "no type found"))
}

fn build_simple(name: &str, keyword: &str) -> Result<TypeDescriptor> {
    let category = match keyword.to_ascii_lowercase().as_str() {
        "boolean" => Category::Boolean,
        "tinyint" => Category::Byte,
        "smallint" => Category::Short,
        "int" | "integer" => Category::Int,
        "bigint" => Category::Long,
        "float" => Category::Float,
        "double" | "double precision" => Category::Double,
        "string" => Category::String,
        "binary" => Category::Binary,
        "date" => Category::Date,
        "timestamp" => Category::Timestamp,
        "interval_year_month" => Category::IntervalYearMonth,
        "interval_day_time" => Category::IntervalDayTime,
        "void" => Category::Void,
        other => {
            return Err(VexError::type_parse(
                name,
                format!("unknown type '{other}'"),
            ))
        }
    };
    TypeDescriptor::primitive(category)
}

fn build_decimal(name: &str, pair: pest::iterators::Pair<Rule>) -> Result<TypeDescriptor> {
    let mut precision = DEFAULT_DECIMAL_PRECISION;
    let mut scale = DEFAULT_DECIMAL_SCALE;

    for inner in pair.into_inner() {
        if inner.as_rule() != Rule::decimal_params {
            continue;
        }
        let mut numbers = inner.into_inner().filter(|p| p.as_rule() == Rule::number);
        if let Some(p) = numbers.next() {
            precision = parse_number(name, p.as_str())?;
        }
        if let Some(s) = numbers.next() {
            scale = parse_number(name, s.as_str())?;
        }
    }

    TypeDescriptor::decimal(precision, scale).map_err(|e| match e {
        VexError::TypeParse { message, .. } => VexError::type_parse(name, message),
        other => other,
    })
}

fn parse_length(name: &str, pair: pest::iterators::Pair<Rule>) -> Result<u32> {
    pair.into_inner()
        .find(|p| p.as_rule() == Rule::number)
        .ok_or_else(|| VexError::type_parse(name, "missing length"))
        .and_then(|p| parse_number(name, p.as_str()))
}

fn parse_number<T: std::str::FromStr>(name: &str, digits: &str) -> Result<T> {
    digits
        .parse()
        .map_err(|_| VexError::type_parse(name, format!("parameter '{digits}' out of range")))
}
