use crate::{
    aggregator::{AggregateFunction, AggregateKind, Aggregator},
    compile::CompileError,
    expression::Expression,
    schema::DataType,
};

/// Per-aggregate metadata and factory.
/// One instance is registered per function name; it is stateless and shared.
pub trait AggregateImpl: Send + Sync {
    /// Canonical lowercase function name ("count", "sum", ...).
    fn name(&self) -> &'static str;

    fn kind(&self) -> AggregateKind;

    /// Result type for the compiled arguments. `args` is empty for `COUNT(*)`.
    fn infer_type(&self, args: &[Expression]) -> Result<DataType, CompileError>;

    fn allow_distinct(&self) -> bool {
        false
    }

    /// Fresh merge state for one aggregated row.
    fn create_aggregator(&self, function: &AggregateFunction) -> Box<dyn Aggregator>;
}

/// Shared argument check: exactly one argument, returning its type.
pub(crate) fn single_argument(kind: AggregateKind, args: &[Expression]) -> Result<Option<DataType>, CompileError> {
    match args {
        [arg] => Ok(arg.data_type()),
        _ => Err(CompileError::FunctionArgMismatch {
            name: kind.name().to_string(),
            expected: format!("{}(expr)", kind.name()),
            got: args.iter().filter_map(Expression::data_type).collect(),
        }),
    }
}

pub(crate) fn invalid_partial(kind: AggregateKind, partial: &serde_json::Value) -> CompileError {
    CompileError::InvalidPartialAggregate { function: kind.name().to_string(), message: format!("unexpected {}", partial) }
}
