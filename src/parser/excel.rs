//! Excel file parser (xlsx, xls)

use std::borrow::Cow;
use std::path::Path;

use anyhow::{bail, Context, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::config::Config;
use crate::model::{CellValue, Column, ColumnType, Table};

use super::Parser;

/// Parser for Excel files
pub struct ExcelParser;

impl Parser for ExcelParser {
    fn parse(&self, path: &Path, config: &Config) -> Result<Table> {
        let mut workbook = open_workbook_auto(path)
            .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;

        // Get sheet name
        let sheet_name = match config.sheet_name {
            Some(ref name) => name.clone(),
            None => workbook
                .sheet_names()
                .first()
                .cloned()
                .context("No sheets found in workbook")?,
        };

        let range: Range<Data> = workbook
            .worksheet_range(&sheet_name)
            .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

        parse_range(&range)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "xlsx" | "xls")
    }
}

/// Broad kind of a non-empty spreadsheet cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Number,
    Timestamp,
    Boolean,
    Other,
}

fn parse_range(range: &Range<Data>) -> Result<Table> {
    let (row_count, col_count) = range.get_size();
    if row_count == 0 {
        bail!("Empty sheet");
    }

    // First row is header
    let header_row = range.rows().next().context("No header row found")?;
    let names: Vec<String> = (0..col_count)
        .map(|i| {
            let name = header_row.get(i).map(cell_to_string).unwrap_or_default();
            if name.is_empty() {
                format!("Column{}", i + 1)
            } else {
                name
            }
        })
        .collect();

    let data_rows: Vec<&[Data]> = range.rows().skip(1).collect();
    let column_types: Vec<ColumnType> = (0..col_count)
        .map(|idx| infer_column_type(data_rows.iter().filter_map(|row| row.get(idx))))
        .collect();

    let columns = names
        .into_iter()
        .zip(&column_types)
        .enumerate()
        .map(|(i, (name, &column_type))| Column::with_type(name, i, column_type))
        .collect();
    let mut table = Table::new(columns);

    for (line_num, row) in data_rows.iter().enumerate() {
        let cells = column_types
            .iter()
            .enumerate()
            .map(|(idx, &column_type)| {
                row.get(idx)
                    .map(|cell| convert_cell(cell, column_type))
                    .unwrap_or(CellValue::Null)
            })
            .collect();
        table.add_row(cells, line_num + 2); // +2 for 1-indexing and header
    }

    Ok(table)
}

fn cell_kind(cell: &Data) -> Option<CellKind> {
    match cell {
        Data::Empty => None,
        Data::Int(_) | Data::Float(_) => Some(CellKind::Number),
        Data::DateTime(dt) if !dt.is_duration() => Some(CellKind::Timestamp),
        Data::DateTimeIso(s) if iso_to_datetime(s).is_some() => Some(CellKind::Timestamp),
        Data::Bool(_) => Some(CellKind::Boolean),
        _ => Some(CellKind::Other),
    }
}

/// A column takes a native type only when every non-empty cell shares it
fn infer_column_type<'a>(cells: impl Iterator<Item = &'a Data>) -> ColumnType {
    let mut kinds = cells.filter_map(cell_kind);
    let Some(first) = kinds.next() else {
        return ColumnType::Text;
    };
    if !kinds.all(|k| k == first) {
        return ColumnType::Text;
    }
    match first {
        CellKind::Number => ColumnType::Numeric,
        CellKind::Timestamp => ColumnType::Datetime,
        CellKind::Boolean => ColumnType::Boolean,
        CellKind::Other => ColumnType::Text,
    }
}

/// Convert a serial day number (1900 date system) to a timestamp
fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}

fn iso_to_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => serial_to_datetime(dt.as_f64())
            .map(|d| d.to_string())
            .unwrap_or_else(|| dt.as_f64().to_string()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("#{:?}", e),
    }
}

fn convert_cell(cell: &Data, column_type: ColumnType) -> CellValue {
    if matches!(cell, Data::Empty) {
        return CellValue::Null;
    }

    match (column_type, cell) {
        (ColumnType::Numeric, Data::Int(i)) => CellValue::Int(*i),
        (ColumnType::Numeric, Data::Float(f)) => {
            // Whole floats are integers in spreadsheet storage
            if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                CellValue::Int(*f as i64)
            } else {
                CellValue::from(*f)
            }
        }
        (ColumnType::Datetime, Data::DateTime(dt)) => serial_to_datetime(dt.as_f64()).into(),
        (ColumnType::Datetime, Data::DateTimeIso(s)) => iso_to_datetime(s).into(),
        (ColumnType::Boolean, Data::Bool(b)) => CellValue::Bool(*b),
        _ => CellValue::String(Cow::Owned(cell_to_string(cell))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_to_datetime() {
        let expected = NaiveDate::from_ymd_opt(2021, 1, 5)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(serial_to_datetime(44201.5), Some(expected));
    }

    #[test]
    fn test_infer_column_type() {
        let numbers = [Data::Int(1), Data::Empty, Data::Float(2.5)];
        assert_eq!(infer_column_type(numbers.iter()), ColumnType::Numeric);

        let mixed = [Data::Int(1), Data::String("x".to_string())];
        assert_eq!(infer_column_type(mixed.iter()), ColumnType::Text);

        let flags = [Data::Bool(true), Data::Bool(false)];
        assert_eq!(infer_column_type(flags.iter()), ColumnType::Boolean);

        let empty = [Data::Empty];
        assert_eq!(infer_column_type(empty.iter()), ColumnType::Text);
    }

    #[test]
    fn test_mixed_column_is_stringified() {
        assert_eq!(
            convert_cell(&Data::Float(100.0), ColumnType::Text),
            CellValue::from("100")
        );
        assert_eq!(convert_cell(&Data::Float(2.0), ColumnType::Numeric), CellValue::Int(2));
        assert!(convert_cell(&Data::Empty, ColumnType::Text).is_null());
    }

    #[test]
    fn test_parse_range_with_blank_header() {
        let mut range: Range<Data> = Range::new((0, 0), (2, 1));
        range.set_value((0, 0), Data::String("Name".to_string()));
        range.set_value((1, 0), Data::String("Alice".to_string()));
        range.set_value((1, 1), Data::Int(3));
        range.set_value((2, 0), Data::String("Bob".to_string()));
        range.set_value((2, 1), Data::Float(4.5));

        let table = parse_range(&range).unwrap();
        assert_eq!(table.columns[1].name, "Column2");
        assert_eq!(table.columns[1].column_type, ColumnType::Numeric);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[1].cells[1], CellValue::Float(4.5));
    }
}
