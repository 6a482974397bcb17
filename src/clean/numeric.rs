//! Numeric coercion of text columns

use rayon::prelude::*;

use crate::model::{CellValue, ColumnType, Table};

use super::{fraction_exceeds, NUMERIC_PROMOTION_RATIO};

/// Parse a string as an integer or floating-point number.
///
/// Integers that fit in `i64` stay integers. `nan` and anything unparseable
/// yield `None`.
pub fn parse_number(s: &str) -> Option<CellValue> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(CellValue::Int(i));
    }

    match trimmed.parse::<f64>() {
        Ok(f) if !f.is_nan() => Some(CellValue::Float(f)),
        _ => None,
    }
}

/// Coerce one cell of a text column. Failures become `Null`.
fn coerce_cell(cell: &CellValue) -> CellValue {
    match cell {
        CellValue::String(s) => parse_number(s).unwrap_or(CellValue::Null),
        CellValue::Int(_) | CellValue::Float(_) => cell.clone(),
        _ => CellValue::Null,
    }
}

/// Parse every cell of a column, returning the column only if more than half
/// of all rows hold a number.
fn numeric_candidate(table: &Table, col_idx: usize) -> Option<Vec<CellValue>> {
    let parsed: Vec<CellValue> = table.column_cells(col_idx).map(coerce_cell).collect();
    let hits = parsed.iter().filter(|c| !c.is_null()).count();
    let promote = fraction_exceeds(hits, table.row_count(), NUMERIC_PROMOTION_RATIO);

    tracing::debug!(
        column = %table.columns[col_idx].name,
        parsed = hits,
        rows = table.row_count(),
        promote,
        "numeric coercion"
    );

    promote.then_some(parsed)
}

/// Promote text columns that are mostly numeric.
///
/// Returns the names of the promoted columns in column order.
pub fn coerce_numeric_columns(table: &mut Table) -> Vec<String> {
    let promotions: Vec<(usize, Vec<CellValue>)> = {
        let snapshot = &*table;
        (0..snapshot.column_count())
            .into_par_iter()
            .filter(|&idx| snapshot.columns[idx].column_type.is_text())
            .filter_map(|idx| numeric_candidate(snapshot, idx).map(|cells| (idx, cells)))
            .collect()
    };

    promotions
        .into_iter()
        .map(|(idx, cells)| {
            table.replace_column(idx, cells, ColumnType::Numeric);
            table.columns[idx].name.clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("42"), Some(CellValue::Int(42)));
        assert_eq!(parse_number("-7"), Some(CellValue::Int(-7)));
        assert_eq!(parse_number("3.5"), Some(CellValue::Float(3.5)));
        assert_eq!(parse_number("1e3"), Some(CellValue::Float(1000.0)));
        assert_eq!(parse_number(".5"), Some(CellValue::Float(0.5)));
        assert_eq!(parse_number("inf"), Some(CellValue::Float(f64::INFINITY)));
        assert_eq!(parse_number("nan"), None);
        assert_eq!(parse_number("12abc"), None);
        assert_eq!(parse_number("1,000"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn test_huge_integer_falls_back_to_float() {
        assert_eq!(
            parse_number("99999999999999999999"),
            Some(CellValue::Float(1e20))
        );
    }

    fn column_of(values: &[&str]) -> Table {
        let rows: Vec<Vec<&str>> = values.iter().map(|v| vec![*v]).collect();
        Table::from_strings(&["v"], &rows)
    }

    #[test]
    fn test_exactly_half_stays_text() {
        let mut table = column_of(&["1", "2", "a", "b"]);
        assert!(coerce_numeric_columns(&mut table).is_empty());
        assert_eq!(table.columns[0].column_type, ColumnType::Text);
        assert_eq!(table.rows[2].cells[0], CellValue::from("a"));
    }

    #[test]
    fn test_majority_promotes() {
        let values: Vec<String> = (0..100)
            .map(|i| if i < 51 { i.to_string() } else { format!("x{}", i) })
            .collect();
        let refs: Vec<&str> = values.iter().map(String::as_str).collect();
        let mut table = column_of(&refs);

        assert_eq!(coerce_numeric_columns(&mut table), vec!["v".to_string()]);
        assert_eq!(table.columns[0].column_type, ColumnType::Numeric);
        assert_eq!(table.rows[50].cells[0], CellValue::Int(50));
        assert!(table.rows[51].cells[0].is_null());
    }

    #[test]
    fn test_missing_cells_count_against_promotion() {
        let mut table = column_of(&["1", "2", "", ""]);
        for row in table.rows.iter_mut().skip(2) {
            row.cells[0] = CellValue::Null;
        }
        assert!(coerce_numeric_columns(&mut table).is_empty());
    }

    #[test]
    fn test_non_text_columns_are_skipped() {
        let mut table = column_of(&["2021-01-01", "2021-01-02"]);
        table.columns[0].column_type = ColumnType::Datetime;
        assert!(coerce_numeric_columns(&mut table).is_empty());
    }
}
