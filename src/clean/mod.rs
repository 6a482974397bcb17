//! Cleaning pipeline: name normalization, deduplication, type inference, and
//! sparse-column pruning
//!
//! Stages run in a fixed order and each one sees the effects of the previous
//! ones:
//!
//! 1. normalize column names, drop full-row duplicates
//! 2. blank strings to missing, trim text columns
//! 3. promote mostly-numeric text columns
//! 4. promote date columns, by name or by sampling (columns promoted in
//!    stage 3 are left alone)
//! 5. drop sparse columns
//!
//! No cell-level failure is an error; unparseable values become `Null`.

pub mod columns;
pub mod datetime;
pub mod numeric;
pub mod rows;
pub mod text;

use serde::Serialize;

use crate::model::Table;

pub use columns::{normalize_column_name, ColumnRename};
pub use datetime::{parse_datetime, DatePromotion, DateTrigger};
pub use numeric::parse_number;

/// Fraction of all rows that must parse as numbers for a text column to be
/// promoted (strictly greater than)
pub const NUMERIC_PROMOTION_RATIO: f64 = 0.5;

/// Number of leading non-missing values sampled for date detection
pub const DATE_SAMPLE_SIZE: usize = 50;

/// Fraction of the date sample that must parse (strictly greater than)
pub const DATE_SAMPLE_RATIO: f64 = 0.6;

/// `hits / total > ratio`, false when `total` is zero
pub(crate) fn fraction_exceeds(hits: usize, total: usize, ratio: f64) -> bool {
    total > 0 && (hits as f64 / total as f64) > ratio
}

/// What the pipeline did to the table
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct CleanReport {
    pub input_rows: usize,
    pub input_columns: usize,
    pub renamed_columns: Vec<ColumnRename>,
    pub duplicate_rows_removed: usize,
    pub blank_cells_nulled: usize,
    pub numeric_columns: Vec<String>,
    pub datetime_columns: Vec<DatePromotion>,
    pub sparsity_threshold: usize,
    pub pruned_columns: Vec<String>,
}

/// Cleaned table plus the report describing how it was produced
#[derive(Debug, Clone)]
pub struct CleanOutcome {
    pub table: Table,
    pub report: CleanReport,
}

/// Run every cleaning stage over the table.
pub fn clean_table(mut table: Table) -> CleanOutcome {
    let _span = tracing::info_span!("clean").entered();

    let mut report = CleanReport {
        input_rows: table.row_count(),
        input_columns: table.column_count(),
        ..Default::default()
    };

    report.renamed_columns = columns::normalize_column_names(&mut table);
    report.duplicate_rows_removed = rows::drop_duplicate_rows(&mut table);
    tracing::info!(
        renamed = report.renamed_columns.len(),
        duplicates = report.duplicate_rows_removed,
        "normalized names and removed duplicate rows"
    );

    report.blank_cells_nulled = text::blank_to_null(&mut table);
    text::trim_text_columns(&mut table);
    tracing::info!(blank_cells = report.blank_cells_nulled, "normalized blanks");

    report.numeric_columns = numeric::coerce_numeric_columns(&mut table);
    tracing::info!(columns = ?report.numeric_columns, "numeric promotion");

    report.datetime_columns =
        datetime::coerce_datetime_columns(&mut table, &report.numeric_columns);
    tracing::info!(
        columns = report.datetime_columns.len(),
        "datetime promotion"
    );

    let (thresh, pruned) = columns::prune_sparse_columns(&mut table);
    report.sparsity_threshold = thresh;
    report.pruned_columns = pruned;
    tracing::info!(
        thresh,
        pruned = ?report.pruned_columns,
        rows = table.row_count(),
        columns = table.column_count(),
        "pruned sparse columns"
    );

    CleanOutcome { table, report }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellValue, ColumnType};
    use chrono::NaiveDate;

    fn example_rows() -> Vec<Vec<&'static str>> {
        vec![
            vec!["Alice", "2021-01-05", "100"],
            vec!["Alice", "2021-01-05", "100"],
            vec!["Bob", "", "  "],
        ]
    }

    /// The example as a delimited-text reader hands it over: "amount" holds
    /// only numbers and blanks, so it arrives numeric with Bob's value missing.
    fn example_table() -> Table {
        let mut table = Table::from_strings(&["Name ", "Fecha Ingreso", "Amount"], &example_rows());
        table.replace_column(
            2,
            vec![CellValue::Int(100), CellValue::Int(100), CellValue::Null],
            ColumnType::Numeric,
        );
        table
    }

    fn column_types(table: &Table) -> Vec<ColumnType> {
        table.columns.iter().map(|c| c.column_type).collect()
    }

    #[test]
    fn test_end_to_end_example() {
        let CleanOutcome { table, report } = clean_table(example_table());

        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["name", "fecha_ingreso", "amount"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(
            column_types(&table),
            vec![ColumnType::Text, ColumnType::Datetime, ColumnType::Numeric]
        );

        let expected_date = NaiveDate::from_ymd_opt(2021, 1, 5)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(table.rows[0].cells[1], CellValue::DateTime(expected_date));
        assert!(table.rows[1].cells[1].is_null());
        assert_eq!(table.rows[0].cells[2], CellValue::Int(100));
        assert!(table.rows[1].cells[2].is_null());
        assert_eq!(table.rows[1].cells[0], CellValue::from("Bob"));

        assert_eq!(report.duplicate_rows_removed, 1);
        assert_eq!(report.blank_cells_nulled, 1);
        assert_eq!(report.datetime_columns[0].trigger, DateTrigger::Name);
        assert!(report.pruned_columns.is_empty());
        assert_eq!(report.sparsity_threshold, 0);
    }

    #[test]
    fn test_all_text_amount_at_half_stays_text() {
        let table = Table::from_strings(&["Name ", "Fecha Ingreso", "Amount"], &example_rows());
        let CleanOutcome { table, report } = clean_table(table);

        // "100" and a blank over two rows is exactly 50%
        assert_eq!(table.columns[2].column_type, ColumnType::Text);
        assert_eq!(table.rows[0].cells[2], CellValue::from("100"));
        assert!(table.rows[1].cells[2].is_null());
        assert!(report.numeric_columns.is_empty());
        assert_eq!(report.blank_cells_nulled, 2);
    }

    #[test]
    fn test_idempotent() {
        let once = clean_table(example_table()).table;
        let twice = clean_table(once.clone());

        assert_eq!(twice.table, once);
        assert_eq!(twice.report.duplicate_rows_removed, 0);
        assert!(twice.report.renamed_columns.is_empty());
    }

    #[test]
    fn test_numeric_wins_over_sample_dates() {
        // Compact dates are numbers first; stage 3 claims the column.
        let rows: Vec<Vec<&str>> = vec![vec!["20210101"], vec!["20210102"], vec!["20210103"]];
        let table = Table::from_strings(&["stamp"], &rows);

        let outcome = clean_table(table);
        assert_eq!(outcome.table.columns[0].column_type, ColumnType::Numeric);
        assert!(outcome.report.datetime_columns.is_empty());
    }

    #[test]
    fn test_row_and_column_counts_never_grow() {
        let mut rows: Vec<Vec<String>> = (0..40)
            .map(|i| vec![format!("id{}", i % 30), String::new(), format!("{}", i % 30)])
            .collect();
        rows[0][1] = "only value".to_string();
        let table = Table::from_strings(
            &["ID".to_string(), "Notes".to_string(), "Score".to_string()],
            &rows,
        );

        let outcome = clean_table(table);
        // rows 30..40 duplicate rows 0..10 except row 0, which has a note
        assert_eq!(outcome.table.row_count(), 31);
        // 31 rows -> thresh 1, the notes column has exactly one value
        assert_eq!(outcome.report.sparsity_threshold, 1);
        assert_eq!(outcome.table.column_count(), 3);
        assert!(outcome.table.row_count() <= 40);
    }

    #[test]
    fn test_fraction_exceeds_is_strict() {
        assert!(!fraction_exceeds(2, 4, 0.5));
        assert!(fraction_exceeds(3, 4, 0.5));
        assert!(!fraction_exceeds(30, 50, 0.6));
        assert!(fraction_exceeds(31, 50, 0.6));
        assert!(!fraction_exceeds(0, 0, 0.5));
    }
}
