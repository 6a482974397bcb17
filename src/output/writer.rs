//! CSV writer for the cleaned table

use std::borrow::Cow;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Timelike};

use crate::model::{CellValue, ColumnType, Table};

/// Datetime columns whose every value sits at midnight are written as dates.
pub(crate) fn date_only_columns(table: &Table) -> Vec<bool> {
    table
        .columns
        .iter()
        .map(|col| {
            col.column_type == ColumnType::Datetime
                && table.column_cells(col.index).all(|cell| match cell {
                    CellValue::DateTime(dt) => dt.num_seconds_from_midnight() == 0 && dt.nanosecond() == 0,
                    _ => true,
                })
        })
        .collect()
}

fn format_datetime(dt: &NaiveDateTime, date_only: bool) -> String {
    if date_only {
        dt.format("%Y-%m-%d").to_string()
    } else if dt.nanosecond() != 0 {
        dt.format("%Y-%m-%d %H:%M:%S%.f").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Text form of a cell; `Null` is empty.
pub(crate) fn format_cell(cell: &CellValue, date_only: bool) -> Cow<'_, str> {
    match cell {
        CellValue::Null => Cow::Borrowed(""),
        CellValue::DateTime(dt) => Cow::Owned(format_datetime(dt, date_only)),
        CellValue::Date(d) => Cow::Owned(d.format("%Y-%m-%d").to_string()),
        other => other.display(),
    }
}

/// Write the table as comma-delimited text with a header row
pub fn write_table<W: Write>(table: &Table, writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new().from_writer(writer);
    csv_writer
        .write_record(table.columns.iter().map(|c| c.name.as_str()))
        .context("Failed to write CSV header")?;

    let date_only = date_only_columns(table);
    for row in &table.rows {
        let record = row
            .cells
            .iter()
            .zip(&date_only)
            .map(|(cell, &date)| format_cell(cell, date));
        csv_writer
            .write_record(record.map(|field| field.into_owned()))
            .with_context(|| format!("Failed to write CSV row from line {}", row.source_line))?;
    }

    csv_writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}

/// Write the table to `path`, replacing any existing file
pub fn write_csv(table: &Table, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    write_table(table, file)
}
