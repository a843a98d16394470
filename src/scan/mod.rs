pub mod read_set;
pub use read_set::*;

pub mod scan;
pub use scan::*;
