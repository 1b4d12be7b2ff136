//! Copying batch results out as owned values.

use crate::types::Value;

use super::batch::Batch;

/// Copies each active value of `column` into `out[start..]`, in order.
///
/// Values are deep copies: they stay valid after the batch is reset or
/// refilled. Returns the offset one past the last value written.
///
/// # Panics
///
/// Panics if `out` is too short to hold every active row.
pub fn extract_rows(batch: &Batch, column: usize, out: &mut [Value], start: usize) -> usize {
    let source = batch.column(column);
    let mut offset = start;
    for row in batch.active_rows() {
        out[offset] = source.get_value(row);
        offset += 1;
    }
    offset
}

/// Collects the active values of `column` into a new vector.
#[must_use]
pub fn extract(batch: &Batch, column: usize) -> Vec<Value> {
    let source = batch.column(column);
    batch.active_rows().map(|row| source.get_value(row)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeDescriptor;

    #[test]
    fn test_extract_follows_selection() {
        let mut batch = Batch::new(&[TypeDescriptor::bigint()], 4);
        for row in 0..4 {
            batch.column_mut(0).set_value(row, &Value::Long(row as i64 * 10));
        }
        batch.set_sparse(4, vec![0, 2, 3]);

        assert_eq!(
            extract(&batch, 0),
            vec![Value::Long(0), Value::Long(20), Value::Long(30)]
        );

        let mut out = vec![Value::Null; 5];
        let next = extract_rows(&batch, 0, &mut out, 1);
        assert_eq!(next, 4);
        assert_eq!(out[1], Value::Long(0));
        assert_eq!(out[3], Value::Long(30));
        assert_eq!(out[4], Value::Null);
    }

    #[test]
    fn test_extracted_values_survive_reset() {
        let mut batch = Batch::new(&[TypeDescriptor::string()], 2);
        batch.column_mut(0).set_value(0, &Value::from("kept"));
        batch.set_dense(1);
        let values = extract(&batch, 0);
        batch.reset();
        batch.column_mut(0).set_value(0, &Value::from("overwritten"));
        assert_eq!(values, vec![Value::String("kept".to_string())]);
    }
}
