pub mod literal;
pub use literal::*;

pub mod parse_node;
pub use parse_node::*;

pub mod select_statement;
pub use select_statement::*;
