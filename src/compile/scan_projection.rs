use tracing::debug;

use crate::{
    scan::{ReadSet, ReadSetBuilder},
    schema::Table,
};

/// Finalizes which column families the scan reads.
pub struct ScanProjectionPlanner;

impl ScanProjectionPlanner {
    /// Rows of ordinary tables carry an empty marker cell; when no wildcard
    /// forces every family, at least one family must be read so that every
    /// row comes back.
    pub fn must_project_empty_marker(table: &Table, wildcard: bool) -> bool {
        !table.is_view() && !wildcard
    }

    /// Views and `*` read every family. Otherwise the families named by
    /// `family.*` items become whole-family reads on top of the per-column
    /// reads already registered.
    pub fn plan(table: &Table, mut read_set: ReadSetBuilder, wildcard: bool, projected_families: &[String]) -> ReadSet {
        if Self::must_project_empty_marker(table, wildcard) {
            for family in projected_families {
                read_set.add_family(family);
            }
        } else {
            read_set.project_all_families(table);
        }
        let read_set = read_set.build();
        debug!(
            table = %table.name,
            families = read_set.len(),
            wildcard,
            "finalized scan read-set"
        );
        read_set
    }
}
