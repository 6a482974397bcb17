//! Full-row duplicate removal

use rustc_hash::FxHashSet;

use crate::model::{CellValue, Table};

/// Remove rows identical across every column, keeping the first occurrence.
///
/// Survivors keep their relative order. Missing cells compare equal to each
/// other. Returns the number of rows removed.
pub fn drop_duplicate_rows(table: &mut Table) -> usize {
    let keep: Vec<bool> = {
        let mut seen: FxHashSet<&[CellValue]> = FxHashSet::default();
        table
            .rows
            .iter()
            .map(|row| {
                let first = seen.insert(row.cells.as_slice());
                if !first {
                    tracing::trace!(source_line = row.source_line, "duplicate row");
                }
                first
            })
            .collect()
    };

    let before = table.row_count();
    let mut flags = keep.into_iter();
    table.rows.retain(|_| flags.next().unwrap_or(true));
    before - table.row_count()
}
