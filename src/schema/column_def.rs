use std::fmt;

use crate::schema::DataType;

/// Declared column of a table.
///
/// Columns without a family belong to the row key; they are read from the
/// key itself and never need to be fetched from a column family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub family: Option<String>,
    /// Position in the table's column list
    pub position: usize,
    pub data_type: DataType,
    pub nullable: bool,
    /// Declared length for CHAR(n) / BINARY(n)
    pub max_length: Option<usize>,
}

impl ColumnDef {
    pub fn is_pk(&self) -> bool {
        self.family.is_none()
    }

    /// Stored size of one value, when it is known up front.
    pub fn byte_size(&self) -> Option<usize> {
        match self.data_type {
            DataType::Char | DataType::Binary => self.max_length,
            other => other.byte_size(),
        }
    }

    pub fn qualified_name(&self) -> String {
        match &self.family {
            Some(family) => format!("{}.{}", family, self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for ColumnDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified_name())
    }
}
