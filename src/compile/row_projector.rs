use crate::{
    compile::{CompileError, CompilerConfig},
    expression::Expression,
    scan::{FamilySelection, ReadSet},
    schema::Table,
};

/// One named output column of the statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Projector {
    pub name: String,
    pub table_name: String,
    pub expression: Expression,
    /// Lookups by name must match exactly.
    pub case_sensitive: bool,
}

impl Projector {
    pub fn new(name: impl Into<String>, table_name: impl Into<String>, expression: Expression, case_sensitive: bool) -> Self {
        Self { name: name.into(), table_name: table_name.into(), expression, case_sensitive }
    }
}

/// Result of compiling a select list.
#[derive(Debug, Clone, PartialEq)]
pub struct RowProjector {
    projectors: Vec<Projector>,
    estimated_byte_size: usize,
    project_empty_marker: bool,
}

impl RowProjector {
    pub fn new(projectors: Vec<Projector>, estimated_byte_size: usize, project_empty_marker: bool) -> Self {
        Self { projectors, estimated_byte_size, project_empty_marker }
    }

    pub fn projectors(&self) -> &[Projector] {
        &self.projectors
    }

    pub fn projector(&self, index: usize) -> Option<&Projector> {
        self.projectors.get(index)
    }

    pub fn len(&self) -> usize {
        self.projectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projectors.is_empty()
    }

    pub fn estimated_byte_size(&self) -> usize {
        self.estimated_byte_size
    }

    pub fn must_project_empty_marker(&self) -> bool {
        self.project_empty_marker
    }

    /// Position of the first projector answering to `name`. Names of
    /// case-insensitive projectors match in any case.
    pub fn column_index(&self, name: &str) -> Result<usize, CompileError> {
        self.projectors
            .iter()
            .position(|p| if p.case_sensitive { p.name == name } else { p.name.eq_ignore_ascii_case(name) })
            .ok_or_else(|| CompileError::ColumnNotFound {
                name: name.to_string(),
                candidates: self.projectors.iter().map(|p| p.name.clone()).collect(),
            })
    }

    /// Bytes one result row is expected to occupy: every cell the read-set
    /// fetches costs the per-cell overhead, the row key and its value.
    pub fn estimate_byte_size(table: &Table, read_set: &ReadSet, config: &CompilerConfig) -> Result<usize, CompileError> {
        let cell_overhead = config.key_value_overhead + table.estimated_row_key_length(config);
        let mut size = 0;
        for (family_name, selection) in read_set.families() {
            let family = table.column_family(family_name)?;
            match selection {
                // an empty family still returns its marker cell
                FamilySelection::All if family.columns.is_empty() => {
                    size += cell_overhead + config.estimated_variable_length;
                }
                FamilySelection::All => {
                    for column in family.columns.values() {
                        size += cell_overhead + column.byte_size().unwrap_or(config.estimated_variable_length);
                    }
                }
                FamilySelection::Columns(qualifiers) => {
                    for qualifier in qualifiers {
                        let column = family.column(qualifier)?;
                        size += cell_overhead + column.byte_size().unwrap_or(config.estimated_variable_length);
                    }
                }
            }
        }
        Ok(size)
    }
}
