pub mod expression;
pub use expression::*;

pub mod type_inference;
pub use type_inference::*;
