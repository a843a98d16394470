pub mod compile_error;
pub use compile_error::*;

pub mod compiler_config;
pub use compiler_config::*;

pub mod bind_manager;
pub use bind_manager::*;

pub mod expression_manager;
pub use expression_manager::*;

pub mod aggregation_manager;
pub use aggregation_manager::*;

pub mod statement_context;
pub use statement_context::*;

pub mod expression_compiler;
pub use expression_compiler::*;

pub mod group_by;
pub use group_by::*;

pub mod select_clause_visitor;
pub use select_clause_visitor::*;

pub mod aggregate_plan;
pub use aggregate_plan::*;

pub mod scan_projection;
pub use scan_projection::*;

pub mod row_projector;
pub use row_projector::*;

pub mod projection_compiler;
pub use projection_compiler::*;
