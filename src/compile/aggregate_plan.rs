use indexmap::IndexSet;
use tracing::debug;

use crate::{
    aggregator::{AggregateFunction, AggregateRegistry, ClientAggregators, ServerAggregators},
    compile::{CompileError, ExpressionManager, GroupBy},
};

/// Ordered aggregate functions of a statement and the first slot of the
/// aggregated row that may be NULL.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatePlan {
    pub functions: Vec<AggregateFunction>,
    pub min_nullable_index: usize,
}

impl AggregatePlan {
    /// Payload for the scan's `_Aggs` attribute.
    pub fn server_descriptor(&self) -> Result<Vec<u8>, CompileError> {
        ServerAggregators::serialize(&self.functions, self.min_nullable_index)
    }

    pub fn client_aggregators(&self, registry: &AggregateRegistry) -> Result<ClientAggregators, CompileError> {
        ClientAggregators::new(registry, self.functions.clone(), self.min_nullable_index)
    }
}

pub struct AggregatePlanCompiler;

impl AggregatePlanCompiler {
    /// Collects the distinct aggregates of every compiled expression. Returns
    /// None when the statement neither aggregates nor groups.
    pub fn compile(expressions: &ExpressionManager, group_by: &GroupBy) -> Option<AggregatePlan> {
        let mut distinct: IndexSet<&AggregateFunction> = IndexSet::new();
        for expression in expressions.expressions() {
            expression.for_each_aggregate(&mut |f| {
                distinct.insert(f);
            });
        }
        if distinct.is_empty() && group_by.is_empty() {
            return None;
        }

        let mut functions: Vec<AggregateFunction> = distinct.into_iter().cloned().collect();
        functions.sort_by(AggregateFunction::schema_order);
        let min_nullable_index = Self::min_nullable_index(&functions, !group_by.is_empty());

        debug!(
            functions = functions.len(),
            min_nullable_index,
            grouped = !group_by.is_empty(),
            "built aggregate plan"
        );
        Some(AggregatePlan { functions, min_nullable_index })
    }

    /// Index of the first function whose slot may be NULL, or the number of
    /// functions when none may.
    pub fn min_nullable_index(functions: &[AggregateFunction], grouped: bool) -> usize {
        functions
            .iter()
            .position(|f| f.is_nullable_in(grouped))
            .unwrap_or(functions.len())
    }
}
