use serde_json::Value;
use std::cmp::Ordering;

use crate::{
    aggregator::{invalid_partial, single_argument, AggregateFunction, AggregateImpl, AggregateKind, Aggregator},
    compile::CompileError,
    expression::Expression,
    schema::DataType,
};

pub struct MinImpl;
pub struct MaxImpl;

fn typed_argument(kind: AggregateKind, args: &[Expression]) -> Result<DataType, CompileError> {
    single_argument(kind, args)?.ok_or_else(|| CompileError::FunctionArgMismatch {
        name: kind.name().to_string(),
        expected: "an argument of known type".into(),
        got: vec![],
    })
}

impl AggregateImpl for MinImpl {
    fn name(&self) -> &'static str { "min" }
    fn kind(&self) -> AggregateKind { AggregateKind::Min }
    fn infer_type(&self, args: &[Expression]) -> Result<DataType, CompileError> {
        typed_argument(AggregateKind::Min, args)
    }
    fn create_aggregator(&self, _function: &AggregateFunction) -> Box<dyn Aggregator> {
        Box::new(ExtremaAggregator { kind: AggregateKind::Min, current: None })
    }
}

impl AggregateImpl for MaxImpl {
    fn name(&self) -> &'static str { "max" }
    fn kind(&self) -> AggregateKind { AggregateKind::Max }
    fn infer_type(&self, args: &[Expression]) -> Result<DataType, CompileError> {
        typed_argument(AggregateKind::Max, args)
    }
    fn create_aggregator(&self, _function: &AggregateFunction) -> Box<dyn Aggregator> {
        Box::new(ExtremaAggregator { kind: AggregateKind::Max, current: None })
    }
}

struct ExtremaAggregator {
    kind: AggregateKind,
    current: Option<Value>,
}

impl ExtremaAggregator {
    fn compare(&self, a: &Value, b: &Value) -> Result<Ordering, CompileError> {
        let mixed = || invalid_partial(self.kind, b);
        match (a, b) {
            (Value::Bool(x), Value::Bool(y)) => Ok(x.cmp(y)),
            (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
                (Some(ix), Some(iy)) => Ok(ix.cmp(&iy)),
                _ => {
                    let (Some(fx), Some(fy)) = (x.as_f64(), y.as_f64()) else { return Err(mixed()) };
                    fx.partial_cmp(&fy).ok_or_else(mixed)
                }
            },
            (Value::String(x), Value::String(y)) => Ok(x.cmp(y)),
            _ => Err(mixed()),
        }
    }
}

impl Aggregator for ExtremaAggregator {
    fn aggregate(&mut self, partial: &Value) -> Result<(), CompileError> {
        if partial.is_null() {
            return Ok(());
        }
        let replace = match &self.current {
            None => true,
            Some(cur) => {
                let ord = self.compare(cur, partial)?;
                match self.kind {
                    AggregateKind::Min => ord.is_gt(),
                    _ => ord.is_lt(),
                }
            }
        };
        if replace {
            self.current = Some(partial.clone());
        }
        Ok(())
    }

    fn evaluate(&self) -> Value {
        self.current.clone().unwrap_or(Value::Null)
    }

    fn reset(&mut self) {
        self.current = None;
    }
}
