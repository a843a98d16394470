use serde_json::Value;
use std::fmt;

use crate::{
    aggregator::{AggregateFunction, AggregateRegistry, Aggregator, ServerAggregators},
    compile::CompileError,
};

/// Merges the partial rows returned by region servers into final values,
/// one aggregator per function slot.
pub struct ClientAggregators {
    functions: Vec<AggregateFunction>,
    min_nullable_index: usize,
    aggregators: Vec<Box<dyn Aggregator>>,
}

impl ClientAggregators {
    pub fn new(
        registry: &AggregateRegistry,
        functions: Vec<AggregateFunction>,
        min_nullable_index: usize,
    ) -> Result<Self, CompileError> {
        let aggregators = functions
            .iter()
            .map(|f| {
                registry
                    .get_kind(f.kind)
                    .map(|imp| imp.create_aggregator(f))
                    .ok_or_else(|| CompileError::FunctionNotFound(f.kind.name().to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { functions, min_nullable_index, aggregators })
    }

    pub fn from_server(registry: &AggregateRegistry, server: ServerAggregators) -> Result<Self, CompileError> {
        Self::new(registry, server.functions, server.min_nullable_index)
    }

    pub fn functions(&self) -> &[AggregateFunction] {
        &self.functions
    }

    pub fn min_nullable_index(&self) -> usize {
        self.min_nullable_index
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn is_nullable_at(&self, slot: usize) -> bool {
        slot >= self.min_nullable_index
    }

    /// Folds one partial row (one value per slot) into the running state.
    pub fn aggregate(&mut self, partials: &[Value]) -> Result<(), CompileError> {
        if partials.len() != self.aggregators.len() {
            return Err(CompileError::InvalidPartialAggregate {
                function: "row".into(),
                message: format!("expected {} slots, got {}", self.aggregators.len(), partials.len()),
            });
        }
        for (aggregator, partial) in self.aggregators.iter_mut().zip(partials) {
            aggregator.aggregate(partial)?;
        }
        Ok(())
    }

    pub fn finalize(&self) -> Vec<Value> {
        self.aggregators.iter().map(|a| a.evaluate()).collect()
    }

    pub fn reset(&mut self) {
        for aggregator in &mut self.aggregators {
            aggregator.reset();
        }
    }
}

impl fmt::Debug for ClientAggregators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientAggregators")
            .field("functions", &self.functions)
            .field("min_nullable_index", &self.min_nullable_index)
            .finish()
    }
}
