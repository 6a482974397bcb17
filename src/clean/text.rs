//! Blank-to-missing normalization and whitespace trimming

use std::borrow::Cow;

use crate::model::{CellValue, Table};

/// Replace every whitespace-only string cell with `Null`, in any column.
///
/// Returns the number of cells replaced.
pub fn blank_to_null(table: &mut Table) -> usize {
    let mut replaced = 0;
    for row in &mut table.rows {
        for cell in &mut row.cells {
            if cell.is_blank() {
                *cell = CellValue::Null;
                replaced += 1;
            }
        }
    }
    replaced
}

/// Strip leading and trailing whitespace from every string cell of every
/// text column.
pub fn trim_text_columns(table: &mut Table) {
    let text_columns: Vec<usize> = table
        .columns
        .iter()
        .filter(|c| c.column_type.is_text())
        .map(|c| c.index)
        .collect();

    for row in &mut table.rows {
        for &idx in &text_columns {
            if let Some(cell) = row.cells.get_mut(idx) {
                trim_cell(cell);
            }
        }
    }
}

fn trim_cell(cell: &mut CellValue) {
    if let CellValue::String(s) = cell {
        let trimmed = s.trim();
        if trimmed.len() != s.len() {
            *s = Cow::Owned(trimmed.to_string());
        }
    }
}
