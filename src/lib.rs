pub mod schema;
pub use schema::{DataType, ColumnDef, ColumnFamily, Table, TableBuilder, TableType};

pub mod parser;
pub use parser::{AliasedNode, Literal, ParseNode, SelectStatement};

pub mod expression;
pub use expression::Expression;

pub mod aggregator;
pub use aggregator::{AggregateFunction, AggregateRegistry, ClientAggregators, ServerAggregators};

pub mod scan;
pub use scan::{ReadSet, Scan};

pub mod compile;
pub use compile::{CompileError, CompilerConfig, GroupBy, ProjectionCompiler, RowProjector, StatementContext};
