//! Column-level passes: name normalization and sparse-column pruning

use indexmap::IndexSet;
use serde::Serialize;

use crate::model::Table;

/// A column whose name changed during normalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnRename {
    pub from: String,
    pub to: String,
    /// True when a numeric suffix was appended to avoid a name collision
    pub disambiguated: bool,
}

/// Trim, lower-case, and replace spaces with underscores.
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Normalize every column name in place.
///
/// Names that collide after normalization keep the first column's name; later
/// columns get the first free `_1`, `_2`, ... suffix.
pub fn normalize_column_names(table: &mut Table) -> Vec<ColumnRename> {
    let mut used: IndexSet<String> = IndexSet::with_capacity(table.column_count());
    let mut renames = Vec::new();

    for column in &mut table.columns {
        let base = normalize_column_name(&column.name);
        let mut name = base.clone();
        let mut suffix = 0;
        while used.contains(&name) {
            suffix += 1;
            name = format!("{}_{}", base, suffix);
        }

        if suffix > 0 {
            tracing::warn!(
                column = %column.name,
                normalized = %base,
                renamed_to = %name,
                "column name collides after normalization"
            );
        }

        if name != column.name {
            renames.push(ColumnRename {
                from: std::mem::replace(&mut column.name, name.clone()),
                to: name.clone(),
                disambiguated: suffix > 0,
            });
        }
        used.insert(name);
    }

    renames
}

/// Minimum non-missing count a column needs to survive pruning.
///
/// Equals `floor(0.05 * row_count)`; zero for tables under 20 rows.
pub fn sparsity_threshold(row_count: usize) -> usize {
    row_count / 20
}

/// Drop columns with fewer than `sparsity_threshold` non-missing cells.
///
/// Returns the threshold and the names of the dropped columns. Nothing is
/// dropped when the threshold is zero.
pub fn prune_sparse_columns(table: &mut Table) -> (usize, Vec<String>) {
    let thresh = sparsity_threshold(table.row_count());
    if thresh == 0 {
        return (thresh, Vec::new());
    }

    let keep: Vec<bool> = (0..table.column_count())
        .map(|idx| table.non_null_count(idx) >= thresh)
        .collect();

    let pruned: Vec<String> = table
        .columns
        .iter()
        .zip(&keep)
        .filter(|(_, kept)| !**kept)
        .map(|(col, _)| col.name.clone())
        .collect();

    if !pruned.is_empty() {
        for name in &pruned {
            tracing::debug!(column = %name, thresh, "pruning sparse column");
        }
        table.retain_columns(&keep);
    }

    (thresh, pruned)
}
