//! Compilation of expression trees into vector steps.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::cast::{ConversionOperator, OperatorRegistry};
use crate::error::{Result, VexError};
use crate::executor::ExecutorConfig;
use crate::expression::{validate_constant, Expression};
use crate::types::{TypeDescriptor, Value};

use super::batch::Batch;
use super::kernels::{self, CastContext, Kernel};

/// One step of a compiled expression. Steps read earlier columns and write
/// exactly one output column.
#[derive(Debug, Clone)]
pub(crate) enum Step {
    /// Fills the active rows of `output` with a constant.
    Constant { value: Value, output: usize },
    /// Native cast over typed buffers.
    Kernel {
        kernel: Kernel,
        input: usize,
        output: usize,
        cast: CastContext,
    },
    /// Row-mode cast applied slot by slot: box, convert, unbox.
    Adaptor {
        operator: Arc<dyn ConversionOperator>,
        input: usize,
        output: usize,
        cast: CastContext,
    },
}

/// How a step computes its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStrategy {
    /// Constant fill.
    Constant,
    /// Native kernel, by name.
    Kernel(&'static str),
    /// Row-mode operator, by name.
    Adaptor(&'static str),
}

impl Step {
    pub(crate) fn output(&self) -> usize {
        match self {
            Step::Constant { output, .. }
            | Step::Kernel { output, .. }
            | Step::Adaptor { output, .. } => *output,
        }
    }

    fn strategy(&self) -> StepStrategy {
        match self {
            Step::Constant { .. } => StepStrategy::Constant,
            Step::Kernel { kernel, .. } => StepStrategy::Kernel(kernel.name()),
            Step::Adaptor { operator, .. } => StepStrategy::Adaptor(operator.name()),
        }
    }
}

/// An expression compiled against an input schema.
///
/// The expression owns no buffers: it refers to batch columns by index.
/// Input columns occupy `0..input_schema.len()`, scratch columns follow in
/// allocation order.
#[derive(Debug, Clone)]
pub struct CompiledExpression {
    pub(crate) input_schema: Vec<TypeDescriptor>,
    pub(crate) scratch_types: Vec<TypeDescriptor>,
    pub(crate) steps: Vec<Step>,
    pub(crate) output_column: usize,
    pub(crate) output_type: TypeDescriptor,
    pub(crate) batch_size: usize,
}

impl CompiledExpression {
    /// Returns the input schema the expression was compiled against.
    #[must_use]
    pub fn input_schema(&self) -> &[TypeDescriptor] {
        &self.input_schema
    }

    /// Returns the types of the scratch columns, in column order.
    #[must_use]
    pub fn scratch_types(&self) -> &[TypeDescriptor] {
        &self.scratch_types
    }

    /// Returns the index of the column holding the result.
    #[must_use]
    pub fn output_column(&self) -> usize {
        self.output_column
    }

    /// Returns the result type.
    #[must_use]
    pub fn output_type(&self) -> TypeDescriptor {
        self.output_type
    }

    /// Returns the total number of columns a batch needs.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.input_schema.len() + self.scratch_types.len()
    }

    /// Returns the strategy of every step, in execution order.
    #[must_use]
    pub fn strategies(&self) -> Vec<StepStrategy> {
        self.steps.iter().map(Step::strategy).collect()
    }

    /// Returns true if any step runs through an adaptor.
    #[must_use]
    pub fn uses_adaptor(&self) -> bool {
        self.steps
            .iter()
            .any(|step| matches!(step, Step::Adaptor { .. }))
    }

    /// Returns the batch capacity configured at compile time.
    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Creates a batch of the configured [`batch_size`](Self::batch_size).
    #[must_use]
    pub fn allocate_batch(&self) -> Batch {
        self.new_batch(self.batch_size)
    }

    /// Creates a batch laid out for this expression: input columns, then
    /// scratch columns.
    #[must_use]
    pub fn new_batch(&self, capacity: usize) -> Batch {
        let types: Vec<TypeDescriptor> = self
            .input_schema
            .iter()
            .chain(&self.scratch_types)
            .copied()
            .collect();
        Batch::new(&types, capacity)
    }
}

impl fmt::Display for CompiledExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            match step {
                Step::Constant { value, output } => writeln!(
                    f,
                    "Constant({value}) -> col {output}: {}",
                    self.column_type(*output)
                )?,
                Step::Kernel {
                    kernel,
                    input,
                    output,
                    cast,
                } => writeln!(
                    f,
                    "{}(col {input}: {}) -> col {output}: {}",
                    kernel.name(),
                    cast.source,
                    cast.target
                )?,
                Step::Adaptor {
                    operator,
                    input,
                    output,
                    cast,
                } => writeln!(
                    f,
                    "Adaptor<{}>(col {input}: {}) -> col {output}: {}",
                    operator.name(),
                    cast.source,
                    cast.target
                )?,
            }
        }
        write!(f, "output: col {}: {}", self.output_column, self.output_type)
    }
}

impl CompiledExpression {
    pub(crate) fn column_type(&self, column: usize) -> TypeDescriptor {
        match column.checked_sub(self.input_schema.len()) {
            Some(scratch) => self.scratch_types[scratch],
            None => self.input_schema[column],
        }
    }
}

/// Builds [`CompiledExpression`]s from expression trees.
#[derive(Debug, Clone, Copy)]
pub struct VectorCompiler<'a> {
    registry: &'a OperatorRegistry,
    config: &'a ExecutorConfig,
}

struct CompileState<'s> {
    input_schema: &'s [TypeDescriptor],
    scratch_types: Vec<TypeDescriptor>,
    steps: Vec<Step>,
}

impl CompileState<'_> {
    fn allocate(&mut self, data_type: TypeDescriptor) -> usize {
        self.scratch_types.push(data_type);
        self.input_schema.len() + self.scratch_types.len() - 1
    }
}

impl<'a> VectorCompiler<'a> {
    /// Creates a compiler over a registry and configuration.
    #[must_use]
    pub fn new(registry: &'a OperatorRegistry, config: &'a ExecutorConfig) -> Self {
        VectorCompiler { registry, config }
    }

    /// Compiles `expr` against `input_schema`.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedCast` if any cast in the tree is illegal or
    /// unregistered, and `InvalidExpression` if a column reference does not
    /// match the schema or a constant does not match its type.
    /// Returns `InvalidBatchShape` if the configured batch size is zero.
    pub fn compile(
        &self,
        expr: &Expression,
        input_schema: &[TypeDescriptor],
    ) -> Result<CompiledExpression> {
        if self.config.batch_size == 0 {
            return Err(VexError::InvalidBatchShape(
                "batch size must be positive".to_string(),
            ));
        }
        let mut state = CompileState {
            input_schema,
            scratch_types: Vec::new(),
            steps: Vec::new(),
        };
        let output_column = self.compile_node(expr, &mut state)?;

        debug!(
            expression = %expr,
            steps = state.steps.len(),
            scratch_columns = state.scratch_types.len(),
            "compiled vector expression"
        );

        Ok(CompiledExpression {
            input_schema: input_schema.to_vec(),
            scratch_types: state.scratch_types,
            steps: state.steps,
            output_column,
            output_type: expr.data_type(),
            batch_size: self.config.batch_size,
        })
    }

    fn compile_node(&self, expr: &Expression, state: &mut CompileState<'_>) -> Result<usize> {
        match expr {
            Expression::Column { index, data_type } => {
                let schema_type = state.input_schema.get(*index).ok_or_else(|| {
                    VexError::InvalidExpression(format!(
                        "column {index} out of bounds for schema of {} columns",
                        state.input_schema.len()
                    ))
                })?;
                if schema_type != data_type {
                    return Err(VexError::InvalidExpression(format!(
                        "column {index} is {schema_type}, expression expects {data_type}"
                    )));
                }
                Ok(*index)
            }
            Expression::Constant { value, data_type } => {
                validate_constant(value, data_type)?;
                let output = state.allocate(*data_type);
                state.steps.push(Step::Constant {
                    value: value.clone(),
                    output,
                });
                Ok(output)
            }
            Expression::Cast { child, target } => {
                let input = self.compile_node(child, state)?;
                let source = child.data_type();
                let operator = self.registry.resolve_for(&source, target)?;
                let output = state.allocate(*target);
                let cast = CastContext {
                    source,
                    target: *target,
                };

                let kernel = if self.config.force_adaptor {
                    None
                } else {
                    kernels::lookup(source.category(), target.category())
                };
                let step = match kernel {
                    Some(kernel) => {
                        debug!(
                            from = %source,
                            to = %target,
                            kernel = kernel.name(),
                            "cast step uses kernel"
                        );
                        Step::Kernel {
                            kernel,
                            input,
                            output,
                            cast,
                        }
                    }
                    None => {
                        debug!(
                            from = %source,
                            to = %target,
                            operator = operator.name(),
                            forced = self.config.force_adaptor,
                            "cast step uses adaptor"
                        );
                        Step::Adaptor {
                            operator,
                            input,
                            output,
                            cast,
                        }
                    }
                };
                state.steps.push(step);
                Ok(output)
            }
        }
    }
}
