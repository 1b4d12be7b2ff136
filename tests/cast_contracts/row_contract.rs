//! Contract tests for the row evaluator.
//!
//! These tests verify the reference semantics:
//! - Null inputs produce null without conversion
//! - Content failures produce null for that value only
//! - Illegal pairs fail when the evaluator is built

use std::str::FromStr;

use bigdecimal::BigDecimal;

use vexcast::cast::is_legal_category_pair;
use vexcast::{
    evaluate_row, Category, Expression, OperatorRegistry, RowEvaluator, TypeDescriptor, Value,
    VexError,
};

fn decimal(text: &str) -> Value {
    Value::Decimal(BigDecimal::from_str(text).unwrap())
}

fn cast_one(source: TypeDescriptor, target: TypeDescriptor, value: Value) -> Value {
    let expr = Expression::column(0, source).cast_to(target);
    evaluate_row(&expr, &[value]).unwrap()
}

/// A representative descriptor for each category.
fn sample_type(category: Category) -> TypeDescriptor {
    match category {
        Category::Char => TypeDescriptor::char(8).unwrap(),
        Category::Varchar => TypeDescriptor::varchar(8).unwrap(),
        other => TypeDescriptor::primitive(other).unwrap(),
    }
}

#[test]
fn test_decimal_rescale_rounds_half_up() {
    let result = cast_one(
        TypeDescriptor::decimal(20, 8).unwrap(),
        TypeDescriptor::decimal(10, 2).unwrap(),
        decimal("12.3456"),
    );
    assert_eq!(result, decimal("12.35"));
}

#[test]
fn test_decimal_overflow_is_null() {
    let result = cast_one(
        TypeDescriptor::decimal(20, 8).unwrap(),
        TypeDescriptor::decimal(4, 2).unwrap(),
        decimal("123.456"),
    );
    assert_eq!(result, Value::Null);
}

#[test]
fn test_unparseable_string_is_null_parseable_is_value() {
    let (string, int) = (TypeDescriptor::string(), TypeDescriptor::int());
    assert_eq!(cast_one(string, int, Value::from("abc")), Value::Null);
    assert_eq!(cast_one(string, int, Value::from("123")), Value::Int(123));
}

#[test]
fn test_failure_is_per_value() {
    let expr = Expression::column(0, TypeDescriptor::string()).cast_to(TypeDescriptor::smallint());
    let evaluator = RowEvaluator::new(&expr, &OperatorRegistry::builtin()).unwrap();
    let results: Vec<Value> = ["1", "x", "70000", "-2"]
        .iter()
        .map(|s| evaluator.evaluate(&[Value::from(*s)]).unwrap())
        .collect();
    assert_eq!(
        results,
        vec![Value::Short(1), Value::Null, Value::Null, Value::Short(-2)]
    );
}

#[test]
fn test_null_propagates_for_every_legal_pair() {
    for source in Category::ALL {
        for target in Category::ALL {
            if !is_legal_category_pair(source, target) {
                continue;
            }
            assert_eq!(
                cast_one(sample_type(source), sample_type(target), Value::Null),
                Value::Null,
                "{source} -> {target}"
            );
        }
    }
}

#[test]
fn test_illegal_pairs_fail_at_construction() {
    let registry = OperatorRegistry::builtin();
    for (source, target) in [
        (TypeDescriptor::binary(), TypeDescriptor::decimal(10, 2).unwrap()),
        (TypeDescriptor::binary(), TypeDescriptor::timestamp()),
        (TypeDescriptor::date(), TypeDescriptor::decimal(10, 2).unwrap()),
        (TypeDescriptor::int(), TypeDescriptor::interval_day_time()),
        (TypeDescriptor::void(), TypeDescriptor::string()),
        (TypeDescriptor::int(), TypeDescriptor::int()),
    ] {
        let expr = Expression::column(0, source).cast_to(target);
        let err = RowEvaluator::new(&expr, &registry).unwrap_err();
        assert!(err.is_unsupported_cast(), "{source} -> {target}: {err}");
    }
}

#[test]
fn test_empty_registry_reports_unregistered_target() {
    let expr = Expression::column(0, TypeDescriptor::int()).cast_to(TypeDescriptor::string());
    let err = RowEvaluator::new(&expr, &OperatorRegistry::empty()).unwrap_err();
    assert_eq!(
        err,
        VexError::UnsupportedCast {
            from: "*".to_string(),
            to: "string".to_string()
        }
    );
}

#[test]
fn test_same_category_text_reapplies_length() {
    let result = cast_one(
        TypeDescriptor::varchar(10).unwrap(),
        TypeDescriptor::char(4).unwrap(),
        Value::Varchar("ab  cdefg".to_string()),
    );
    assert_eq!(result, Value::Char("ab".to_string()));

    let result = cast_one(
        TypeDescriptor::char(10).unwrap(),
        TypeDescriptor::char(3).unwrap(),
        Value::Char("abcdef".to_string()),
    );
    assert_eq!(result, Value::Char("abc".to_string()));
}

#[test]
fn test_temporal_round_trips() {
    let ts = cast_one(
        TypeDescriptor::string(),
        TypeDescriptor::timestamp(),
        Value::from("2024-02-29 13:14:15.25"),
    );
    let back = cast_one(TypeDescriptor::timestamp(), TypeDescriptor::string(), ts.clone());
    assert_eq!(back, Value::String("2024-02-29 13:14:15.25".to_string()));

    let date = cast_one(TypeDescriptor::timestamp(), TypeDescriptor::date(), ts);
    assert_eq!(date.to_string(), "2024-02-29");
    assert_eq!(
        cast_one(TypeDescriptor::date(), TypeDescriptor::boolean(), date),
        Value::Null
    );
}

#[test]
fn test_numeric_edges() {
    assert_eq!(
        cast_one(TypeDescriptor::int(), TypeDescriptor::tinyint(), Value::Int(200)),
        Value::Byte(-56)
    );
    assert_eq!(
        cast_one(TypeDescriptor::double(), TypeDescriptor::int(), Value::Double(f64::NAN)),
        Value::Null
    );
    assert_eq!(
        cast_one(TypeDescriptor::double(), TypeDescriptor::bigint(), Value::Double(-3.99)),
        Value::Long(-3)
    );
    assert_eq!(
        cast_one(TypeDescriptor::bigint(), TypeDescriptor::timestamp(), Value::Long(86_400))
            .to_string(),
        "1970-01-02 00:00:00"
    );
}

#[test]
fn test_value_category_decides_legality() {
    let expr =
        Expression::column(0, TypeDescriptor::string()).cast_to(TypeDescriptor::timestamp());
    let evaluator = RowEvaluator::new(&expr, &OperatorRegistry::builtin()).unwrap();
    assert_eq!(
        evaluator.evaluate(&[Value::Binary(b"2020-01-01".to_vec())]).unwrap(),
        Value::Null
    );
    assert_eq!(
        evaluator.evaluate(&[Value::from("2020-01-01")]).unwrap().to_string(),
        "2020-01-01 00:00:00"
    );
}

#[test]
fn test_extreme_exponent_strings_become_null() {
    let string = TypeDescriptor::string();
    for text in ["1e9223372036854775807", "-1e9223372036854775807"] {
        for target in [
            TypeDescriptor::decimal(10, 2).unwrap(),
            TypeDescriptor::int(),
            TypeDescriptor::timestamp(),
        ] {
            assert_eq!(
                cast_one(string, target, Value::from(text)),
                Value::Null,
                "{text} -> {target}"
            );
        }
    }
    assert_eq!(
        cast_one(
            string,
            TypeDescriptor::decimal(10, 2).unwrap(),
            Value::from("1e-9223372036854775807")
        ),
        decimal("0.00")
    );
}

#[test]
fn test_decimal_renders_plain_text() {
    let source = TypeDescriptor::decimal(38, 18).unwrap();
    let string = TypeDescriptor::string();
    for (input, expected) in [
        ("0.000000100000000000", "0.000000100000000000"),
        ("0.000000000000000000", "0.000000000000000000"),
        ("1.500000000000000000", "1.500000000000000000"),
    ] {
        assert_eq!(
            cast_one(source, string, decimal(input)),
            Value::String(expected.to_string())
        );
    }
    assert_eq!(
        cast_one(source, TypeDescriptor::varchar(4).unwrap(), decimal("0.000000100000000000")),
        Value::Varchar("0.00".to_string())
    );
}

#[test]
fn test_column_outside_row() {
    let expr = Expression::column(1, TypeDescriptor::int()).cast_to(TypeDescriptor::string());
    assert!(matches!(
        evaluate_row(&expr, &[Value::Int(1)]),
        Err(VexError::InvalidExpression(_))
    ));
}
