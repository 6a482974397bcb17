//! Delimited text parser (CSV and TSV)

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};

use crate::clean::parse_number;
use crate::config::Config;
use crate::model::{CellValue, Column, ColumnType, Table};

use super::Parser;

/// Field values read as missing
const NA_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Parser for comma- and tab-delimited files
pub struct CsvParser;

impl Parser for CsvParser {
    fn parse(&self, path: &Path, _config: &Config) -> Result<Table> {
        let file =
            File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
        let delimiter = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
            _ => b',',
        };
        read_delimited(BufReader::new(file), delimiter)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "csv" | "tsv")
    }
}

/// Read delimited text with a header row into a table.
///
/// Empty fields and NA tokens become `Null`. A column whose every remaining
/// non-blank field is a number is typed numeric; every other column is text.
/// Whitespace-only fields are kept as strings in either case.
pub fn read_delimited<R: Read>(reader: R, delimiter: u8) -> Result<Table> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .context("Failed to read CSV headers")?
        .clone();
    let width = headers.len();

    let mut raw_rows: Vec<Vec<Option<String>>> = Vec::new();
    for (line_num, result) in csv_reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read CSV row {}", line_num + 2))?; // +2 for 1-indexing and header
        let mut fields: Vec<Option<String>> = record.iter().take(width).map(read_field).collect();
        fields.resize(width, None);
        raw_rows.push(fields);
    }

    let column_types: Vec<ColumnType> = (0..width)
        .map(|idx| infer_column_type(raw_rows.iter().filter_map(|row| row[idx].as_deref())))
        .collect();

    let columns: Vec<Column> = headers
        .iter()
        .zip(&column_types)
        .enumerate()
        .map(|(i, (name, &column_type))| Column::with_type(name, i, column_type))
        .collect();

    let mut table = Table::new(columns);
    for (line_num, fields) in raw_rows.into_iter().enumerate() {
        let cells = fields
            .into_iter()
            .zip(&column_types)
            .map(|(field, &column_type)| to_cell(field, column_type))
            .collect();
        table.add_row(cells, line_num + 2);
    }

    Ok(table)
}

fn read_field(s: &str) -> Option<String> {
    if s.is_empty() || NA_TOKENS.contains(&s) {
        None
    } else {
        Some(s.to_string())
    }
}

/// Numeric when there is at least one non-blank value and all of them are numbers
fn infer_column_type<'a>(values: impl Iterator<Item = &'a str>) -> ColumnType {
    let mut values = values.filter(|v| !v.trim().is_empty());
    let mut any = false;
    let all_numeric = values.all(|v| {
        any = true;
        parse_number(v).is_some()
    });
    if any && all_numeric {
        ColumnType::Numeric
    } else {
        ColumnType::Text
    }
}

fn to_cell(field: Option<String>, column_type: ColumnType) -> CellValue {
    match (field, column_type) {
        (None, _) => CellValue::Null,
        (Some(s), ColumnType::Numeric) => match parse_number(&s) {
            Some(number) => number,
            None => CellValue::String(Cow::Owned(s)),
        },
        (Some(s), _) => CellValue::String(Cow::Owned(s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(text: &str) -> Table {
        read_delimited(text.as_bytes(), b',').unwrap()
    }

    #[test]
    fn test_reads_header_and_rows() {
        let table = read("Name ,Amount\nAlice,100\nBob,\n");
        assert_eq!(table.columns[0].name, "Name ");
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[0].source_line, 2);
    }

    #[test]
    fn test_empty_and_na_fields_are_missing() {
        let table = read("a,b\n,NA\nx,null\n");
        assert!(table.rows[0].cells[0].is_null());
        assert!(table.rows[0].cells[1].is_null());
        assert!(table.rows[1].cells[1].is_null());
        assert_eq!(table.rows[1].cells[0], CellValue::from("x"));
    }

    #[test]
    fn test_all_numeric_column_is_numeric() {
        let table = read("n,mixed\n1,1\n2.5,a\n,2\n");
        assert_eq!(table.columns[0].column_type, ColumnType::Numeric);
        assert_eq!(table.rows[1].cells[0], CellValue::Float(2.5));
        assert!(table.rows[2].cells[0].is_null());

        assert_eq!(table.columns[1].column_type, ColumnType::Text);
        assert_eq!(table.rows[0].cells[1], CellValue::from("1"));
    }

    #[test]
    fn test_text_is_kept_verbatim() {
        let table = read("t\n  padded \n");
        assert_eq!(table.rows[0].cells[0], CellValue::from("  padded "));
    }

    #[test]
    fn test_short_rows_are_padded() {
        let table = read("a,b,c\n1\n");
        assert_eq!(table.rows[0].cells.len(), 3);
        assert!(table.rows[0].cells[2].is_null());
    }

    #[test]
    fn test_tab_delimiter() {
        let table = read_delimited("a\tb\nx\ty\n".as_bytes(), b'\t').unwrap();
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.rows[0].cells[1], CellValue::from("y"));
    }

    #[test]
    fn test_whitespace_fields_stay_strings() {
        let table = read("k,v,n\na,  ,1\na,,  \n");
        assert_eq!(table.rows[0].cells[1], CellValue::from("  "));
        assert!(table.rows[1].cells[1].is_null());

        assert_eq!(table.columns[2].column_type, ColumnType::Numeric);
        assert_eq!(table.rows[0].cells[2], CellValue::Int(1));
        assert_eq!(table.rows[1].cells[2], CellValue::from("  "));
    }

    #[test]
    fn test_blank_and_empty_rows_are_not_duplicates() {
        let table = read("k,v\na,  \na,\n");
        let outcome = crate::clean::clean_table(table);

        assert_eq!(outcome.report.duplicate_rows_removed, 0);
        assert_eq!(outcome.table.row_count(), 2);
        assert_eq!(outcome.report.blank_cells_nulled, 1);
    }

    #[test]
    fn test_numeric_date_named_column_becomes_datetime() {
        let table = read("fecha_nacimiento,x\n20210105,a\n19991231,b\n");
        assert_eq!(table.columns[0].column_type, ColumnType::Numeric);

        let outcome = crate::clean::clean_table(table);
        let expected = |y, m, d| {
            CellValue::DateTime(
                chrono::NaiveDate::from_ymd_opt(y, m, d)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
            )
        };
        assert_eq!(outcome.table.columns[0].column_type, ColumnType::Datetime);
        assert_eq!(outcome.table.rows[0].cells[0], expected(2021, 1, 5));
        assert_eq!(outcome.table.rows[1].cells[0], expected(1999, 12, 31));
    }

    #[test]
    fn test_all_missing_column_is_text() {
        let table = read("a,b\n1,\n2,\n");
        assert_eq!(table.columns[1].column_type, ColumnType::Text);
    }
}
