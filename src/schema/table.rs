use indexmap::IndexMap;

use crate::{
    compile::{CompileError, CompilerConfig},
    schema::{ColumnDef, ColumnFamily, DataType},
};

/// Name of the synthetic leading row-key column of salted tables.
pub const SALT_COLUMN_NAME: &str = "_SALT";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TableType {
    /// Regular table; every row carries an empty marker cell.
    #[default]
    Table,
    /// Read-only view over existing storage; rows carry no marker cell.
    View,
    /// Catalog table.
    System,
}

/// Immutable table descriptor the compiler resolves names against.
///
/// Row-key columns come first in `columns`. A salted table (`bucket_num`
/// set) has its salt byte column at position 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    pub table_type: TableType,
    pub bucket_num: Option<u32>,
    pub columns: Vec<ColumnDef>,
    pub families: IndexMap<String, ColumnFamily>,
}

impl Table {
    pub fn is_view(&self) -> bool {
        self.table_type == TableType::View
    }

    pub fn column_family(&self, name: &str) -> Result<&ColumnFamily, CompileError> {
        self.families
            .get(name)
            .ok_or_else(|| CompileError::ColumnFamilyNotFound { family: name.to_string() })
    }

    /// Resolve a column, optionally qualified by its family.
    pub fn column(&self, family: Option<&str>, name: &str) -> Result<&ColumnDef, CompileError> {
        if let Some(family) = family {
            return self.column_family(family)?.column(name);
        }

        let matches: Vec<&ColumnDef> = self.columns.iter().filter(|c| c.name == name).collect();
        match matches.as_slice() {
            [] => Err(CompileError::ColumnNotFound {
                name: name.to_string(),
                candidates: self.columns.iter().map(ColumnDef::qualified_name).collect(),
            }),
            [column] => Ok(column),
            many => Err(CompileError::AmbiguousColumn {
                name: name.to_string(),
                families: many.iter().filter_map(|c| c.family.clone()).collect(),
            }),
        }
    }

    pub fn pk_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| c.is_pk())
    }

    /// First column that is exposed to queries (skips the salt byte).
    pub fn first_projectable_position(&self) -> usize {
        if self.bucket_num.is_some() { 1 } else { 0 }
    }

    /// Estimated serialized row-key length. Variable length key parts are
    /// counted with the configured placeholder plus their separator byte.
    pub fn estimated_row_key_length(&self, config: &CompilerConfig) -> usize {
        let mut pk = self.pk_columns().peekable();
        let mut length = 0;
        while let Some(column) = pk.next() {
            match column.byte_size() {
                Some(size) => length += size,
                None => {
                    length += config.estimated_variable_length;
                    if pk.peek().is_some() {
                        length += config.row_key_separator_length;
                    }
                }
            }
        }
        length
    }
}

/// Convenience builder for table descriptors.
#[derive(Debug, Clone)]
pub struct TableBuilder {
    table: Table,
}

impl TableBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            table: Table {
                name: name.into(),
                table_type: TableType::Table,
                bucket_num: None,
                columns: Vec::new(),
                families: IndexMap::new(),
            },
        }
    }

    pub fn table_type(mut self, table_type: TableType) -> Self {
        self.table.table_type = table_type;
        self
    }

    pub fn view(self) -> Self {
        self.table_type(TableType::View)
    }

    /// Salt the table into `buckets` buckets. Must be called before any
    /// column is added so the salt byte lands at position 0.
    pub fn salted(mut self, buckets: u32) -> Self {
        self.table.bucket_num = Some(buckets);
        self.push(None, SALT_COLUMN_NAME, DataType::Binary, false, Some(1))
    }

    pub fn pk(self, name: &str, data_type: DataType) -> Self {
        self.push(None, name, data_type, false, None)
    }

    pub fn column(self, family: &str, name: &str, data_type: DataType, nullable: bool) -> Self {
        self.push(Some(family), name, data_type, nullable, None)
    }

    pub fn column_with_length(self, family: &str, name: &str, data_type: DataType, nullable: bool, length: usize) -> Self {
        self.push(Some(family), name, data_type, nullable, Some(length))
    }

    /// Declare a family up front, even if it ends up without columns.
    pub fn family(mut self, family: &str) -> Self {
        self.table.families.entry(family.to_string()).or_insert_with(|| ColumnFamily::new(family));
        self
    }

    fn push(mut self, family: Option<&str>, name: &str, data_type: DataType, nullable: bool, max_length: Option<usize>) -> Self {
        let column = ColumnDef {
            name: name.to_string(),
            family: family.map(str::to_string),
            position: self.table.columns.len(),
            data_type,
            nullable,
            max_length,
        };
        if let Some(family) = family {
            self.table
                .families
                .entry(family.to_string())
                .or_insert_with(|| ColumnFamily::new(family))
                .columns
                .insert(name.to_string(), column.clone());
        }
        self.table.columns.push(column);
        self
    }

    pub fn build(self) -> Table {
        self.table
    }
}
