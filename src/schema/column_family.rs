use indexmap::IndexMap;

use crate::{compile::CompileError, schema::ColumnDef};

/// A named group of columns, the unit the storage engine reads selectively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnFamily {
    pub name: String,
    /// Map of column name -> column, in declaration order
    pub columns: IndexMap<String, ColumnDef>,
}

impl ColumnFamily {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), columns: IndexMap::new() }
    }

    pub fn get(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.get(name)
    }

    pub fn column(&self, name: &str) -> Result<&ColumnDef, CompileError> {
        self.get(name).ok_or_else(|| CompileError::ColumnNotFound {
            name: format!("{}.{}", self.name, name),
            candidates: self.columns.keys().cloned().collect(),
        })
    }
}
