pub mod data_type;
pub use data_type::*;

pub mod column_def;
pub use column_def::*;

pub mod column_family;
pub use column_family::*;

pub mod table;
pub use table::*;

/// Unquoted identifiers are matched upper-cased; quoted ones verbatim.
pub fn normalize_identifier(name: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        name.to_string()
    } else {
        name.to_ascii_uppercase()
    }
}
