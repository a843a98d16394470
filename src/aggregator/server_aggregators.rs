use serde::{Deserialize, Serialize};

use crate::{aggregator::AggregateFunction, compile::CompileError};

/// Scan attribute carrying the server-side aggregation descriptor.
pub const AGGREGATORS: &str = "_Aggs";

/// What region servers need to pre-aggregate rows: the functions in
/// aggregated-row order and the first slot that may hold NULL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerAggregators {
    pub min_nullable_index: usize,
    pub functions: Vec<AggregateFunction>,
}

#[derive(Serialize)]
struct Descriptor<'a> {
    min_nullable_index: usize,
    functions: &'a [AggregateFunction],
}

impl ServerAggregators {
    pub fn new(functions: Vec<AggregateFunction>, min_nullable_index: usize) -> Self {
        Self { min_nullable_index, functions }
    }

    pub fn serialize(functions: &[AggregateFunction], min_nullable_index: usize) -> Result<Vec<u8>, CompileError> {
        Ok(serde_json::to_vec(&Descriptor { min_nullable_index, functions })?)
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self, CompileError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
