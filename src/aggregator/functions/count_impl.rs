use serde_json::Value;
use std::collections::HashSet;

use crate::{
    aggregator::{invalid_partial, AggregateFunction, AggregateImpl, AggregateKind, Aggregator},
    compile::CompileError,
    expression::Expression,
    schema::DataType,
};

pub struct CountImpl;

impl AggregateImpl for CountImpl {
    fn name(&self) -> &'static str { "count" }

    fn kind(&self) -> AggregateKind { AggregateKind::Count }

    fn infer_type(&self, args: &[Expression]) -> Result<DataType, CompileError> {
        if args.len() <= 1 {
            Ok(DataType::BigInt)
        } else {
            Err(CompileError::FunctionArgMismatch {
                name: "COUNT".into(),
                expected: "COUNT(*|expr)".into(),
                got: args.iter().filter_map(Expression::data_type).collect(),
            })
        }
    }

    fn allow_distinct(&self) -> bool { true }

    fn create_aggregator(&self, function: &AggregateFunction) -> Box<dyn Aggregator> {
        if function.distinct {
            Box::new(DistinctCountAggregator::default())
        } else {
            Box::new(CountAggregator { count: 0 })
        }
    }
}

/// Partials are per-server row counts.
struct CountAggregator {
    count: i64,
}

impl Aggregator for CountAggregator {
    fn aggregate(&mut self, partial: &Value) -> Result<(), CompileError> {
        match partial {
            Value::Null => {}
            Value::Number(n) => {
                let n = n.as_i64().ok_or_else(|| invalid_partial(AggregateKind::Count, partial))?;
                self.count += n;
            }
            _ => return Err(invalid_partial(AggregateKind::Count, partial)),
        }
        Ok(())
    }

    fn evaluate(&self) -> Value {
        Value::from(self.count)
    }

    fn reset(&mut self) {
        self.count = 0;
    }
}

/// Partials are arrays of the distinct values a server saw; the client
/// unions them before counting.
#[derive(Default)]
struct DistinctCountAggregator {
    seen: HashSet<String>,
}

impl Aggregator for DistinctCountAggregator {
    fn aggregate(&mut self, partial: &Value) -> Result<(), CompileError> {
        match partial {
            Value::Null => {}
            Value::Array(values) => {
                for v in values.iter().filter(|v| !v.is_null()) {
                    self.seen.insert(v.to_string());
                }
            }
            _ => return Err(invalid_partial(AggregateKind::Count, partial)),
        }
        Ok(())
    }

    fn evaluate(&self) -> Value {
        Value::from(self.seen.len() as i64)
    }

    fn reset(&mut self) {
        self.seen.clear();
    }
}
