use indexmap::{IndexMap, IndexSet};

use crate::schema::Table;

/// What a scan reads from one column family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FamilySelection {
    /// Every qualifier of the family.
    All,
    Columns(IndexSet<String>),
}

impl FamilySelection {
    /// Combines two registrations for the same family. A whole-family read
    /// absorbs any per-column read, regardless of which came first.
    pub fn merge(self, other: FamilySelection) -> FamilySelection {
        match (self, other) {
            (FamilySelection::All, _) | (_, FamilySelection::All) => FamilySelection::All,
            (FamilySelection::Columns(mut left), FamilySelection::Columns(right)) => {
                left.extend(right);
                FamilySelection::Columns(left)
            }
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, FamilySelection::All)
    }
}

/// Accumulates read registrations while a statement is compiled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadSetBuilder {
    families: IndexMap<String, FamilySelection>,
}

impl ReadSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&mut self, family: &str, selection: FamilySelection) {
        match self.families.get_mut(family) {
            Some(existing) => {
                let current = std::mem::replace(existing, FamilySelection::All);
                *existing = current.merge(selection);
            }
            None => {
                self.families.insert(family.to_string(), selection);
            }
        }
    }

    pub fn add_column(&mut self, family: &str, qualifier: &str) {
        let mut columns = IndexSet::new();
        columns.insert(qualifier.to_string());
        self.register(family, FamilySelection::Columns(columns));
    }

    pub fn add_family(&mut self, family: &str) {
        self.register(family, FamilySelection::All);
    }

    /// Replaces the read-set with a whole-family read of every family the
    /// table declares.
    pub fn project_all_families(&mut self, table: &Table) {
        self.families = table.families.keys().map(|name| (name.clone(), FamilySelection::All)).collect();
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    pub fn build(self) -> ReadSet {
        ReadSet { families: self.families }
    }
}

impl From<&ReadSet> for ReadSetBuilder {
    fn from(read_set: &ReadSet) -> Self {
        Self { families: read_set.families.clone() }
    }
}

/// Finalized family/column selection handed to the storage scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadSet {
    families: IndexMap<String, FamilySelection>,
}

impl ReadSet {
    pub fn families(&self) -> impl Iterator<Item = (&str, &FamilySelection)> {
        self.families.iter().map(|(name, selection)| (name.as_str(), selection))
    }

    pub fn selection(&self, family: &str) -> Option<&FamilySelection> {
        self.families.get(family)
    }

    pub fn reads_whole_family(&self, family: &str) -> bool {
        self.selection(family).is_some_and(FamilySelection::is_all)
    }

    pub fn reads_column(&self, family: &str, qualifier: &str) -> bool {
        match self.selection(family) {
            Some(FamilySelection::All) => true,
            Some(FamilySelection::Columns(columns)) => columns.contains(qualifier),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}
