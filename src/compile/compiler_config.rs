/// Fixed per-record overhead of one stored cell: two length ints, the
/// timestamp long and two array headers.
pub const KEY_VALUE_SIZE: usize = 2 * 4 + 8 + 2 * 24;

/// Placeholder size for values whose length is not known up front.
pub const ESTIMATED_VARIABLE_LENGTH_SIZE: usize = 10;

/// Size estimation knobs used by the projection compiler.
///
/// - `key_value_overhead` is added once per projected cell.
/// - `estimated_variable_length` stands in for variable length values.
/// - `row_key_separator_length` follows every variable length row-key part
///   except the last one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    pub key_value_overhead: usize,
    pub estimated_variable_length: usize,
    pub row_key_separator_length: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            key_value_overhead: KEY_VALUE_SIZE,
            estimated_variable_length: ESTIMATED_VARIABLE_LENGTH_SIZE,
            row_key_separator_length: 1,
        }
    }
}

impl CompilerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from(key_value_overhead: usize, estimated_variable_length: usize) -> Self {
        Self {
            key_value_overhead,
            estimated_variable_length,
            ..Self::default()
        }
    }

    /// Estimate values only: no per-cell overhead is counted.
    pub fn values_only() -> Self {
        Self {
            key_value_overhead: 0,
            ..Self::default()
        }
    }
}
