use once_cell::sync::Lazy;
use std::{collections::HashMap, fmt, sync::Arc};

use crate::{
    aggregator::{AggregateImpl, AggregateKind, AvgImpl, CountImpl, MaxImpl, MinImpl, SumImpl},
    compile::CompileError,
    expression::Expression,
    schema::DataType,
};

static SHARED: Lazy<AggregateRegistry> = Lazy::new(AggregateRegistry::default_aggregate_registry);

/// Case-insensitive registry of aggregates.
#[derive(Default)]
pub struct AggregateRegistry {
    by_name: HashMap<String, Arc<dyn AggregateImpl>>,
}

impl AggregateRegistry {
    pub fn new() -> Self { Self { by_name: HashMap::new() } }

    /// Process-wide registry holding the built-in aggregates.
    pub fn shared() -> &'static AggregateRegistry {
        &SHARED
    }

    pub fn register<I: AggregateImpl + 'static>(&mut self, impl_: I) {
        self.by_name.insert(impl_.name().to_string(), Arc::new(impl_));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn AggregateImpl>> {
        self.by_name.get(&name.to_ascii_lowercase()).cloned()
    }

    pub fn get_kind(&self, kind: AggregateKind) -> Option<Arc<dyn AggregateImpl>> {
        self.get(kind.name())
    }

    pub fn list(&self) -> Vec<String> {
        let mut v: Vec<_> = self.by_name.keys().cloned().collect();
        v.sort();
        v
    }

    pub fn infer_type(&self, name: &str, args: &[Expression]) -> Result<DataType, CompileError> {
        let imp = self.get(name).ok_or_else(|| CompileError::FunctionNotFound(name.to_string()))?;
        imp.infer_type(args)
    }

    pub fn default_aggregate_registry() -> Self {
        let mut registry = Self::new();
        registry.register(CountImpl);
        registry.register(SumImpl);
        registry.register(AvgImpl);
        registry.register(MinImpl);
        registry.register(MaxImpl);
        registry
    }
}

impl fmt::Debug for AggregateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AggregateRegistry").field("functions", &self.list()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        aggregator::AggregateFunction,
        expression::{ColumnExpression, Expression},
    };
    use serde_json::{json, Number, Value};

    fn num_f(f: f64) -> Value { Value::Number(Number::from_f64(f).unwrap()) }

    fn col(data_type: DataType) -> Expression {
        Expression::Column(ColumnExpression { family: Some("A".into()), name: "C".into(), position: 1, data_type, nullable: true })
    }

    fn aggregator(kind: AggregateKind, distinct: bool, arg: DataType) -> Box<dyn crate::aggregator::Aggregator> {
        let r = AggregateRegistry::shared();
        let imp = r.get_kind(kind).unwrap();
        let data_type = imp.infer_type(&[col(arg)]).unwrap();
        imp.create_aggregator(&AggregateFunction::new(kind, distinct, vec![col(arg)], data_type))
    }

    #[test]
    fn registry_contains_all_and_lookup_is_case_insensitive() {
        let r = AggregateRegistry::default_aggregate_registry();
        assert_eq!(r.list(), vec!["avg", "count", "max", "min", "sum"]);
        assert!(r.get("COUNT").is_some());
        assert!(r.get("sUm").is_some());
        assert!(r.get("upper").is_none());
    }

    #[test]
    fn registry_infer_type_matches_rules() {
        let r = AggregateRegistry::shared();
        assert_eq!(r.infer_type("count", &[]).unwrap(), DataType::BigInt);
        assert_eq!(r.infer_type("sum", &[col(DataType::Integer)]).unwrap(), DataType::BigInt);
        assert_eq!(r.infer_type("sum", &[col(DataType::Float)]).unwrap(), DataType::Double);
        assert_eq!(r.infer_type("avg", &[col(DataType::Integer)]).unwrap(), DataType::Decimal);
        assert_eq!(r.infer_type("min", &[col(DataType::Varchar)]).unwrap(), DataType::Varchar);
        assert!(matches!(r.infer_type("sum", &[col(DataType::Varchar)]), Err(CompileError::FunctionArgMismatch { .. })));
        assert!(matches!(r.infer_type("max", &[]), Err(CompileError::FunctionArgMismatch { .. })));
        assert_eq!(r.infer_type("median", &[]), Err(CompileError::FunctionNotFound("median".into())));
    }

    #[test]
    fn count_merges_partial_counts_and_resets() {
        let mut agg = aggregator(AggregateKind::Count, false, DataType::Integer);
        agg.aggregate(&json!(3)).unwrap();
        agg.aggregate(&Value::Null).unwrap();
        agg.aggregate(&json!(4)).unwrap();
        assert_eq!(agg.evaluate(), json!(7));
        agg.reset();
        assert_eq!(agg.evaluate(), json!(0));
        assert!(agg.aggregate(&json!("x")).is_err());
    }

    #[test]
    fn distinct_count_unions_server_sets() {
        let mut agg = aggregator(AggregateKind::Count, true, DataType::Varchar);
        agg.aggregate(&json!(["a", "b"])).unwrap();
        agg.aggregate(&json!(["b", "c", null])).unwrap();
        assert_eq!(agg.evaluate(), json!(3));
    }

    #[test]
    fn sum_and_avg_merge_partials() {
        let mut sum = aggregator(AggregateKind::Sum, false, DataType::Integer);
        assert_eq!(sum.evaluate(), Value::Null);
        sum.aggregate(&json!(2)).unwrap();
        sum.aggregate(&Value::Null).unwrap();
        sum.aggregate(&json!(3)).unwrap();
        assert_eq!(sum.evaluate(), json!(5));

        let mut avg = aggregator(AggregateKind::Avg, false, DataType::Integer);
        avg.aggregate(&json!([5, 2])).unwrap();
        avg.aggregate(&json!([1, 2])).unwrap();
        assert_eq!(avg.evaluate(), num_f(1.5));
        assert!(avg.aggregate(&json!(3)).is_err());
    }

    #[test]
    fn min_max_keep_extremes() {
        let mut min = aggregator(AggregateKind::Min, false, DataType::Varchar);
        let mut max = aggregator(AggregateKind::Max, false, DataType::Varchar);
        for s in ["pear", "apple", "plum"] {
            min.aggregate(&json!(s)).unwrap();
            max.aggregate(&json!(s)).unwrap();
        }
        assert_eq!(min.evaluate(), json!("apple"));
        assert_eq!(max.evaluate(), json!("plum"));
        assert!(min.aggregate(&json!(1)).is_err());
    }
}
