use serde_json::Value;

use crate::{
    aggregator::{invalid_partial, single_argument, AggregateFunction, AggregateImpl, AggregateKind, Aggregator},
    compile::CompileError,
    expression::Expression,
    schema::DataType,
};

pub struct SumImpl;

impl AggregateImpl for SumImpl {
    fn name(&self) -> &'static str { "sum" }

    fn kind(&self) -> AggregateKind { AggregateKind::Sum }

    fn infer_type(&self, args: &[Expression]) -> Result<DataType, CompileError> {
        match single_argument(AggregateKind::Sum, args)? {
            Some(t) if t.is_integral() => Ok(DataType::BigInt),
            Some(DataType::Float | DataType::Double) => Ok(DataType::Double),
            Some(DataType::Decimal) | None => Ok(DataType::Decimal),
            Some(other) => Err(CompileError::FunctionArgMismatch { name: "SUM".into(), expected: "numeric".into(), got: vec![other] }),
        }
    }

    fn create_aggregator(&self, _function: &AggregateFunction) -> Box<dyn Aggregator> {
        Box::new(SumAggregator::Empty)
    }
}

enum SumAggregator {
    Empty,
    Int(i128),
    Float(f64),
}

impl Aggregator for SumAggregator {
    fn aggregate(&mut self, partial: &Value) -> Result<(), CompileError> {
        let n = match partial {
            Value::Null => return Ok(()),
            Value::Number(n) => n,
            _ => return Err(invalid_partial(AggregateKind::Sum, partial)),
        };

        match (&mut *self, n.as_i64(), n.as_f64()) {
            (SumAggregator::Empty, Some(i), _) => *self = SumAggregator::Int(i as i128),
            (SumAggregator::Empty, None, Some(f)) => *self = SumAggregator::Float(f),
            (SumAggregator::Int(acc), Some(i), _) => *acc += i as i128,
            // a fractional partial promotes the running sum
            (SumAggregator::Int(acc), None, Some(f)) => *self = SumAggregator::Float(*acc as f64 + f),
            (SumAggregator::Float(acc), _, Some(f)) => *acc += f,
            _ => return Err(invalid_partial(AggregateKind::Sum, partial)),
        }
        Ok(())
    }

    fn evaluate(&self) -> Value {
        match self {
            SumAggregator::Empty => Value::Null,
            SumAggregator::Int(i) => match i64::try_from(*i) {
                Ok(i) => Value::from(i),
                Err(_) => serde_json::Number::from_f64(*i as f64).map(Value::Number).unwrap_or(Value::Null),
            },
            SumAggregator::Float(f) => serde_json::Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        }
    }

    fn reset(&mut self) {
        *self = SumAggregator::Empty;
    }
}
