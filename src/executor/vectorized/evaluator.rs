//! Batch evaluation of compiled expressions.

use tracing::trace;

use crate::cast::cast_value;

use super::batch::Batch;
use super::compiler::{CompiledExpression, Step};

impl CompiledExpression {
    /// Evaluates every step over the active rows of `batch`.
    ///
    /// Afterwards the output column holds the result for each active row;
    /// inactive slots are left untouched.
    ///
    /// # Panics
    ///
    /// Panics if the batch layout does not match the compiled layout.
    pub fn evaluate(&self, batch: &mut Batch) {
        self.check_layout(batch);
        trace!(
            rows = batch.active_count(),
            steps = self.steps.len(),
            "evaluating batch"
        );
        for step in &self.steps {
            execute(step, batch);
        }
    }

    fn check_layout(&self, batch: &Batch) {
        assert!(
            batch.num_columns() >= self.column_count(),
            "batch has {} columns, expression needs {}",
            batch.num_columns(),
            self.column_count()
        );
        for column in 0..self.column_count() {
            let expected = self.column_type(column);
            let actual = batch.column(column).data_type();
            assert!(
                expected == actual,
                "batch column {column} is {actual}, expression expects {expected}"
            );
        }
    }
}

fn execute(step: &Step, batch: &mut Batch) {
    match step {
        Step::Constant { value, output } => {
            let (rows, column) = batch.output_view(*output);
            for row in rows {
                column.set_value(row, value);
            }
        }
        Step::Kernel {
            kernel,
            input,
            output,
            cast,
        } => {
            let (rows, source, target) = batch.step_view(*input, *output);
            kernel.apply(source, target, rows, cast);
        }
        Step::Adaptor {
            operator,
            input,
            output,
            cast,
        } => {
            let (rows, source, target) = batch.step_view(*input, *output);
            for row in rows {
                let value = source.get_value(row);
                target.set_value(row, &cast_value(operator.as_ref(), &value, &cast.target));
            }
        }
    }
    trace!(output = step.output(), "step complete");
}
