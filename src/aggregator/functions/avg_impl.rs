use serde_json::Value;

use crate::{
    aggregator::{invalid_partial, single_argument, AggregateFunction, AggregateImpl, AggregateKind, Aggregator},
    compile::CompileError,
    expression::Expression,
    schema::DataType,
};

pub struct AvgImpl;

impl AggregateImpl for AvgImpl {
    fn name(&self) -> &'static str { "avg" }

    fn kind(&self) -> AggregateKind { AggregateKind::Avg }

    fn infer_type(&self, args: &[Expression]) -> Result<DataType, CompileError> {
        match single_argument(AggregateKind::Avg, args)? {
            Some(t) if t.is_numeric() => Ok(DataType::Decimal),
            None => Ok(DataType::Decimal),
            Some(other) => Err(CompileError::FunctionArgMismatch { name: "AVG".into(), expected: "numeric".into(), got: vec![other] }),
        }
    }

    fn create_aggregator(&self, _function: &AggregateFunction) -> Box<dyn Aggregator> {
        Box::new(AvgAggregator { sum: 0.0, count: 0 })
    }
}

/// Partials are `[sum, count]` pairs.
struct AvgAggregator {
    sum: f64,
    count: i64,
}

impl Aggregator for AvgAggregator {
    fn aggregate(&mut self, partial: &Value) -> Result<(), CompileError> {
        match partial {
            Value::Null => {}
            Value::Array(pair) => {
                let [sum, count] = pair.as_slice() else {
                    return Err(invalid_partial(AggregateKind::Avg, partial));
                };
                let (Some(sum), Some(count)) = (sum.as_f64(), count.as_i64()) else {
                    return Err(invalid_partial(AggregateKind::Avg, partial));
                };
                self.sum += sum;
                self.count += count;
            }
            _ => return Err(invalid_partial(AggregateKind::Avg, partial)),
        }
        Ok(())
    }

    fn evaluate(&self) -> Value {
        if self.count == 0 {
            Value::Null
        } else {
            let avg = self.sum / (self.count as f64);
            serde_json::Number::from_f64(avg).map(Value::Number).unwrap_or(Value::Null)
        }
    }

    fn reset(&mut self) {
        self.sum = 0.0;
        self.count = 0;
    }
}
