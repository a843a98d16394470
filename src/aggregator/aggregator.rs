use serde_json::Value;

use crate::compile::CompileError;

/// Client-side merge state for one aggregate slot.
///
/// Region servers pre-aggregate their rows and send one partial value per
/// function; the client folds every partial with `aggregate` and reads the
/// final value with `evaluate`. `reset` clears the state between groups.
pub trait Aggregator: Send {
    fn aggregate(&mut self, partial: &Value) -> Result<(), CompileError>;

    fn evaluate(&self) -> Value;

    fn reset(&mut self);
}
