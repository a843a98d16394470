use crate::{
    aggregator::AggregateRegistry,
    compile::{AggregationManager, BindManager, CompilerConfig, ExpressionManager},
    scan::Scan,
    schema::Table,
};

/// Per-statement compilation state. Build one per statement; nothing in it
/// is shared with other compilations except the read-only table and
/// registry.
///
/// `expression_manager` carries every expression compiled so far (GROUP BY
/// keys included) and the aggregate plan is built from all of them, so a
/// context reused for an unrelated statement still sees its aggregates.
#[derive(Debug)]
pub struct StatementContext<'a> {
    pub table: &'a Table,
    pub registry: &'a AggregateRegistry,
    pub config: CompilerConfig,
    pub scan: Scan,
    pub bind_manager: BindManager,
    pub expression_manager: ExpressionManager,
    pub aggregation_manager: AggregationManager,
}

impl<'a> StatementContext<'a> {
    pub fn new(table: &'a Table) -> Self {
        Self {
            table,
            registry: AggregateRegistry::shared(),
            config: CompilerConfig::default(),
            scan: Scan::new(),
            bind_manager: BindManager::new(),
            expression_manager: ExpressionManager::new(),
            aggregation_manager: AggregationManager::default(),
        }
    }

    pub fn with_config(mut self, config: CompilerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_registry(mut self, registry: &'a AggregateRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_scan(mut self, scan: Scan) -> Self {
        self.scan = scan;
        self
    }
}
