use std::fmt::Display;

use crate::schema::DataType;

/// Broad classes of compilation failures. All of them are terminal for the
/// statement being compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown or ambiguous family, column or function.
    SchemaResolution,
    /// Wildcard or plain expression used where the statement aggregates.
    AggregationShape,
    /// Incompatible types in coercion or function arguments.
    Type,
    /// Failure encoding the push-down descriptor or merging partial results.
    Internal,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompileError {
    ColumnFamilyNotFound { family: String },
    ColumnNotFound { name: String, candidates: Vec<String> },
    AmbiguousColumn { name: String, families: Vec<String> },
    FunctionNotFound(String),
    FunctionArgMismatch { name: String, expected: String, got: Vec<DataType> },
    AggregateInAggregate(String),
    AggregateInGroupBy(String),
    NonAggregateInAggregate { expression: String },
    TypeMismatch { expected: DataType, actual: DataType, context: String },
    Serialization(String),
    InvalidPartialAggregate { function: String, message: String },
}

impl CompileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompileError::ColumnFamilyNotFound { .. }
            | CompileError::ColumnNotFound { .. }
            | CompileError::AmbiguousColumn { .. }
            | CompileError::FunctionNotFound(_) => ErrorKind::SchemaResolution,
            CompileError::AggregateInAggregate(_)
            | CompileError::AggregateInGroupBy(_)
            | CompileError::NonAggregateInAggregate { .. } => ErrorKind::AggregationShape,
            CompileError::FunctionArgMismatch { .. }
            | CompileError::TypeMismatch { .. } => ErrorKind::Type,
            CompileError::Serialization(_)
            | CompileError::InvalidPartialAggregate { .. } => ErrorKind::Internal,
        }
    }

    /// SQLSTATE reported to clients.
    pub fn code(&self) -> &'static str {
        match self {
            CompileError::ColumnFamilyNotFound { .. } => "42I01",
            CompileError::ColumnNotFound { .. } => "42703",
            CompileError::AmbiguousColumn { .. } => "42702",
            CompileError::FunctionNotFound(_) => "42883",
            CompileError::AggregateInAggregate(_)
            | CompileError::AggregateInGroupBy(_)
            | CompileError::NonAggregateInAggregate { .. } => "42803",
            CompileError::FunctionArgMismatch { .. }
            | CompileError::TypeMismatch { .. } => "42804",
            CompileError::Serialization(_)
            | CompileError::InvalidPartialAggregate { .. } => "XX000",
        }
    }

    pub fn non_aggregate(expression: impl Display) -> Self {
        CompileError::NonAggregateInAggregate { expression: expression.to_string() }
    }
}

impl Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ERROR {} ({}): ", self.code(), self.kind_label())?;
        match self {
            CompileError::ColumnFamilyNotFound { family } => {
                write!(f, "column family not found: {}", family)
            }
            CompileError::ColumnNotFound { name, candidates } => {
                if candidates.is_empty() {
                    write!(f, "column not found: {}", name)
                } else {
                    write!(f, "column not found: {} (candidates: {})", name, candidates.join(", "))
                }
            }
            CompileError::AmbiguousColumn { name, families } => {
                write!(f, "column reference {} is ambiguous across families: {}", name, families.join(", "))
            }
            CompileError::FunctionNotFound(name) => write!(f, "function not found: {}", name),
            CompileError::FunctionArgMismatch { name, expected, got } => {
                let got = got.iter().map(|t| t.sql_name()).collect::<Vec<_>>().join(", ");
                write!(f, "{} expects {}, got [{}]", name, expected, got)
            }
            CompileError::AggregateInAggregate(expression) => {
                write!(f, "aggregate function may not contain another aggregate: {}", expression)
            }
            CompileError::AggregateInGroupBy(expression) => {
                write!(f, "aggregate function may not be used in GROUP BY: {}", expression)
            }
            CompileError::NonAggregateInAggregate { expression } => {
                write!(f, "only aggregate expressions or GROUP BY keys may be selected in an aggregate query: {}", expression)
            }
            CompileError::TypeMismatch { expected, actual, context } => {
                write!(f, "type mismatch: {} and {} for {}", expected, actual, context)
            }
            CompileError::Serialization(message) => write!(f, "{}", message),
            CompileError::InvalidPartialAggregate { function, message } => {
                write!(f, "invalid partial value for {}: {}", function, message)
            }
        }
    }
}

impl CompileError {
    fn kind_label(&self) -> &'static str {
        match self.kind() {
            ErrorKind::SchemaResolution => "schema",
            ErrorKind::AggregationShape => "aggregation",
            ErrorKind::Type => "type",
            ErrorKind::Internal => "internal",
        }
    }
}

impl std::error::Error for CompileError {}

impl From<serde_json::Error> for CompileError {
    fn from(value: serde_json::Error) -> Self {
        CompileError::Serialization(value.to_string())
    }
}
