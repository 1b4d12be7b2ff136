//! Contract tests for vectorized evaluation.
//!
//! These tests verify the batch evaluation contracts:
//! - Kernel and adaptor steps agree with the row evaluator
//! - Only active rows are read and written
//! - Reset is idempotent and extraction yields independent copies

use std::str::FromStr;

use bigdecimal::BigDecimal;

use vexcast::cast::is_legal_category_pair;
use vexcast::executor::vectorized::StepStrategy;
use vexcast::{
    compile, evaluate_row, extract, Batch, BatchShape, BatchSource, Category, CompiledExpression,
    ExecutorConfig, Expression, RowBatchSource, Selection, TypeDescriptor, Value,
};

fn decimal(text: &str) -> Value {
    Value::Decimal(BigDecimal::from_str(text).unwrap())
}

fn sample_type(category: Category) -> TypeDescriptor {
    match category {
        Category::Char => TypeDescriptor::char(8).unwrap(),
        Category::Varchar => TypeDescriptor::varchar(8).unwrap(),
        other => TypeDescriptor::primitive(other).unwrap(),
    }
}

fn run(compiled: &CompiledExpression, rows: Vec<Vec<Value>>, batch_size: usize) -> Vec<Value> {
    let mut source = RowBatchSource::new(rows, batch_size).unwrap();
    let mut batch = compiled.new_batch(batch_size);
    let mut results = Vec::new();
    while source.fill_next(&mut batch) {
        compiled.evaluate(&mut batch);
        results.extend(extract(&batch, compiled.output_column()));
    }
    results
}

/// Evaluates `expr` over single-column rows in row, adaptor and kernel mode.
fn all_modes(expr: &Expression, schema: TypeDescriptor, values: &[Value]) -> [Vec<Value>; 3] {
    let rows: Vec<Vec<Value>> = values.iter().map(|v| vec![v.clone()]).collect();
    let row_mode = rows.iter().map(|r| evaluate_row(expr, r).unwrap()).collect();
    let adaptor_config = ExecutorConfig::default().with_force_adaptor(true);
    let adaptor = compile(expr, &[schema], &adaptor_config).unwrap();
    let kernel = compile(expr, &[schema], &ExecutorConfig::default()).unwrap();
    [
        row_mode,
        run(&adaptor, rows.clone(), 3),
        run(&kernel, rows, 3),
    ]
}

// =============================================================================
// Equivalence
// =============================================================================

#[test]
fn test_decimal_rescale_in_every_mode() {
    let source = TypeDescriptor::decimal(20, 8).unwrap();
    let expr = Expression::column(0, source).cast_to(TypeDescriptor::decimal(10, 2).unwrap());
    let values = [decimal("12.3456"), Value::Null, decimal("-0.005"), decimal("123456789.1")];
    let expected = vec![decimal("12.35"), Value::Null, decimal("-0.01"), Value::Null];
    for results in all_modes(&expr, source, &values) {
        assert_eq!(results, expected);
    }
}

#[test]
fn test_string_to_int_in_every_mode() {
    let source = TypeDescriptor::string();
    let expr = Expression::column(0, source).cast_to(TypeDescriptor::int());
    let values = [Value::from("abc"), Value::from("123"), Value::Null, Value::from(" 7 ")];
    let expected = vec![Value::Null, Value::Int(123), Value::Null, Value::Int(7)];
    for results in all_modes(&expr, source, &values) {
        assert_eq!(results, expected);
    }
}

#[test]
fn test_extreme_exponents_in_every_mode() {
    let string = TypeDescriptor::string();
    let expr = Expression::column(0, string).cast_to(TypeDescriptor::decimal(10, 2).unwrap());
    let values = [
        Value::from("1e9223372036854775807"),
        Value::from("-1e-9223372036854775807"),
        Value::from("1e99999999999999999999"),
    ];
    let expected = vec![Value::Null, decimal("0.00"), Value::Null];
    for results in all_modes(&expr, string, &values) {
        assert_eq!(results, expected);
    }

    let wide = TypeDescriptor::decimal(38, 0).unwrap();
    let huge = [decimal("1e9223372036854775807"), decimal("-1e9223372036854775807")];
    for target in [TypeDescriptor::int(), TypeDescriptor::timestamp()] {
        let expr = Expression::column(0, wide).cast_to(target);
        for results in all_modes(&expr, wide, &huge) {
            assert_eq!(results, vec![Value::Null, Value::Null], "decimal -> {target}");
        }
    }
}

#[test]
fn test_small_decimal_to_string_in_every_mode() {
    let source = TypeDescriptor::decimal(38, 18).unwrap();
    let expr = Expression::column(0, source).cast_to(TypeDescriptor::string());
    let values = [
        decimal("0.000000100000000000"),
        decimal("0.000000000000000000"),
        decimal("-1.500000000000000000"),
    ];
    let expected: Vec<Value> = [
        "0.000000100000000000",
        "0.000000000000000000",
        "-1.500000000000000000",
    ]
    .iter()
    .map(|text| Value::String((*text).to_string()))
    .collect();
    for results in all_modes(&expr, source, &values) {
        assert_eq!(results, expected);
    }
}

#[test]
fn test_null_propagates_for_every_legal_pair_in_vector_modes() {
    for source in Category::ALL {
        for target in Category::ALL {
            if !is_legal_category_pair(source, target) {
                continue;
            }
            let (source_type, target_type) = (sample_type(source), sample_type(target));
            let expr = Expression::column(0, source_type).cast_to(target_type);
            let [row, adaptor, kernel] = all_modes(&expr, source_type, &[Value::Null, Value::Null]);
            let nulls = vec![Value::Null, Value::Null];
            assert_eq!(row, nulls, "{source} -> {target} (row)");
            assert_eq!(adaptor, nulls, "{source} -> {target} (adaptor)");
            assert_eq!(kernel, nulls, "{source} -> {target} (kernel)");
        }
    }
}

// =============================================================================
// Selection and layout
// =============================================================================

#[test]
fn test_inactive_rows_are_untouched() {
    let schema = [TypeDescriptor::bigint()];
    let expr = Expression::column(0, TypeDescriptor::bigint()).cast_to(TypeDescriptor::string());
    for force_adaptor in [false, true] {
        let config = ExecutorConfig::default().with_force_adaptor(force_adaptor);
        let compiled = compile(&expr, &schema, &config).unwrap();
        let output = compiled.output_column();
        let mut batch = compiled.new_batch(6);
        for row in 0..6 {
            batch.column_mut(0).set_value(row, &Value::Long(row as i64));
            batch
                .column_mut(output)
                .set_value(row, &Value::String("sentinel".to_string()));
        }
        batch.column_mut(output).set_null(5);
        batch.set_sparse(6, vec![0, 2, 4]);

        compiled.evaluate(&mut batch);

        let column = batch.column(output);
        assert_eq!(column.get_value(0), Value::String("0".to_string()));
        assert_eq!(column.get_value(2), Value::String("2".to_string()));
        assert_eq!(column.get_value(4), Value::String("4".to_string()));
        assert_eq!(column.get_value(1), Value::String("sentinel".to_string()));
        assert_eq!(column.get_value(3), Value::String("sentinel".to_string()));
        assert!(column.is_null(5));
    }
}

#[test]
fn test_inputs_are_not_written() {
    let schema = [TypeDescriptor::string()];
    let expr = Expression::column(0, TypeDescriptor::string())
        .cast_to(TypeDescriptor::int())
        .cast_to(TypeDescriptor::double());
    let compiled = compile(&expr, &schema, &ExecutorConfig::default()).unwrap();
    let mut batch = compiled.new_batch(2);
    batch.column_mut(0).set_value(0, &Value::from("5"));
    batch.column_mut(0).set_value(1, &Value::from("x"));
    batch.set_dense(2);

    compiled.evaluate(&mut batch);

    assert_eq!(extract(&batch, 0), vec![Value::from("5"), Value::from("x")]);
    assert_eq!(extract(&batch, 1), vec![Value::Int(5), Value::Null]);
    assert_eq!(extract(&batch, 2), vec![Value::Double(5.0), Value::Null]);
}

#[test]
fn test_reset_is_idempotent() {
    let types = [TypeDescriptor::int(), TypeDescriptor::timestamp()];
    let mut batch = Batch::new(&types, 8);
    batch.column_mut(0).set_null(3);
    batch.column_mut(1).set_null(7);
    batch.set_sparse(8, vec![3, 7]);

    batch.reset();
    let first = (batch.size(), batch.selection().clone(), batch.column(0).is_null(3));
    batch.reset();
    let second = (batch.size(), batch.selection().clone(), batch.column(0).is_null(3));

    assert_eq!(first, second);
    assert_eq!(first, (0, Selection::Dense, false));
    assert!(!batch.column(1).is_null(7));
}

#[test]
fn test_reused_batch_does_not_leak_nulls() {
    let schema = [TypeDescriptor::string()];
    let expr = Expression::column(0, TypeDescriptor::string()).cast_to(TypeDescriptor::int());
    let compiled = compile(&expr, &schema, &ExecutorConfig::default()).unwrap();
    let rows = vec![
        vec![Value::from("bad")],
        vec![Value::Null],
        vec![Value::from("1")],
        vec![Value::from("2")],
    ];
    assert_eq!(
        run(&compiled, rows, 2),
        vec![Value::Null, Value::Null, Value::Int(1), Value::Int(2)]
    );
}

#[test]
fn test_extracted_values_are_independent() {
    let schema = [TypeDescriptor::varchar(5).unwrap()];
    let expr = Expression::column(0, schema[0]).cast_to(TypeDescriptor::string());
    let compiled = compile(&expr, &schema, &ExecutorConfig::default()).unwrap();
    let mut source = RowBatchSource::with_shapes(
        vec![vec![Value::Varchar("one".into())], vec![Value::Varchar("two".into())]],
        vec![BatchShape::Dense(1), BatchShape::Dense(1)],
    )
    .unwrap();
    let mut batch = compiled.new_batch(1);

    assert!(source.fill_next(&mut batch));
    compiled.evaluate(&mut batch);
    let first = extract(&batch, compiled.output_column());

    assert!(source.fill_next(&mut batch));
    compiled.evaluate(&mut batch);

    assert_eq!(first, vec![Value::String("one".to_string())]);
    assert_eq!(
        extract(&batch, compiled.output_column()),
        vec![Value::String("two".to_string())]
    );
}

// =============================================================================
// Compilation
// =============================================================================

#[test]
fn test_strategy_choice_is_deterministic() {
    let schema = [TypeDescriptor::binary()];
    let expr = Expression::column(0, TypeDescriptor::binary())
        .cast_to(TypeDescriptor::string())
        .cast_to(TypeDescriptor::date());
    let config = ExecutorConfig::default();
    let first = compile(&expr, &schema, &config).unwrap();
    let second = compile(&expr, &schema, &config).unwrap();
    assert_eq!(first.strategies(), second.strategies());
    assert_eq!(
        first.strategies(),
        vec![
            StepStrategy::Adaptor("to_string"),
            StepStrategy::Kernel("CastStringToDate")
        ]
    );
    assert!(first.to_string().contains("Adaptor<to_string>(col 0: binary) -> col 1: string"));
}

#[test]
fn test_constant_casts_compile_to_fill_steps() {
    let expr = Expression::constant("2.5", TypeDescriptor::string())
        .cast_to(TypeDescriptor::decimal(4, 1).unwrap());
    let compiled = compile(&expr, &[], &ExecutorConfig::default()).unwrap();
    assert_eq!(
        compiled.strategies(),
        vec![StepStrategy::Constant, StepStrategy::Kernel("CastStringToDecimal")]
    );
    let mut batch = compiled.new_batch(4);
    batch.set_dense(2);
    compiled.evaluate(&mut batch);
    assert_eq!(
        extract(&batch, compiled.output_column()),
        vec![decimal("2.5"), decimal("2.5")]
    );
}

#[test]
fn test_every_scratch_column_is_fresh() {
    let schema = [TypeDescriptor::int()];
    let expr = Expression::column(0, TypeDescriptor::int())
        .cast_to(TypeDescriptor::bigint())
        .cast_to(TypeDescriptor::int())
        .cast_to(TypeDescriptor::bigint());
    let compiled = compile(&expr, &schema, &ExecutorConfig::default()).unwrap();
    assert_eq!(
        compiled.scratch_types(),
        &[TypeDescriptor::bigint(), TypeDescriptor::int(), TypeDescriptor::bigint()]
    );
    assert_eq!(compiled.output_column(), 3);
}
