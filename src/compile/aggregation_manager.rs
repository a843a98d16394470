use crate::aggregator::ClientAggregators;

/// Holds the client-side aggregators the executor merges server partials with.
#[derive(Debug, Default)]
pub struct AggregationManager {
    aggregators: Option<ClientAggregators>,
}

impl AggregationManager {
    pub fn set_aggregators(&mut self, aggregators: ClientAggregators) {
        self.aggregators = Some(aggregators);
    }

    pub fn aggregators(&self) -> Option<&ClientAggregators> {
        self.aggregators.as_ref()
    }

    pub fn aggregators_mut(&mut self) -> Option<&mut ClientAggregators> {
        self.aggregators.as_mut()
    }

    pub fn clear(&mut self) {
        self.aggregators = None;
    }
}
