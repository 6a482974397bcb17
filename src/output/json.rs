//! JSON summary format

use anyhow::Result;
use serde::Serialize;
use termcolor::WriteColor;

use crate::clean::CleanReport;
use crate::model::{CellValue, ColumnType};

use super::writer::{date_only_columns, format_cell};
use super::{OutputFormatter, Summary};

/// JSON output formatter
pub struct JsonOutput {
    pretty: bool,
}

impl JsonOutput {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct JsonColumn<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    column_type: ColumnType,
    non_null: usize,
}

#[derive(Serialize)]
struct JsonPreview<'a> {
    columns: Vec<&'a str>,
    rows: Vec<Vec<serde_json::Value>>,
}

#[derive(Serialize)]
struct JsonSummary<'a> {
    source: String,
    rows: usize,
    columns: Vec<JsonColumn<'a>>,
    report: &'a CleanReport,
    preview: JsonPreview<'a>,
}

fn cell_value_to_json(value: &CellValue, date_only: bool) -> serde_json::Value {
    match value {
        CellValue::Null => serde_json::Value::Null,
        CellValue::Bool(b) => serde_json::Value::Bool(*b),
        CellValue::Int(i) => serde_json::json!(*i),
        // Infinity has no JSON number form
        CellValue::Float(f) if !f.is_finite() => serde_json::Value::String(f.to_string()),
        CellValue::Float(f) => serde_json::json!(*f),
        other => serde_json::Value::String(format_cell(other, date_only).into_owned()),
    }
}

impl OutputFormatter for JsonOutput {
    fn render(&self, summary: &Summary<'_>, writer: &mut dyn WriteColor) -> Result<()> {
        let table = summary.table;
        let date_only = date_only_columns(table);

        let output = JsonSummary {
            source: summary.source.display().to_string(),
            rows: table.row_count(),
            columns: table
                .columns
                .iter()
                .map(|col| JsonColumn {
                    name: &col.name,
                    column_type: col.column_type,
                    non_null: table.non_null_count(col.index),
                })
                .collect(),
            report: summary.report,
            preview: JsonPreview {
                columns: table.columns.iter().map(|c| c.name.as_str()).collect(),
                rows: table
                    .rows
                    .iter()
                    .take(summary.preview_rows)
                    .map(|row| {
                        row.cells
                            .iter()
                            .zip(&date_only)
                            .map(|(cell, &date)| cell_value_to_json(cell, date))
                            .collect()
                    })
                    .collect(),
            },
        };

        if self.pretty {
            serde_json::to_writer_pretty(&mut *writer, &output)?;
        } else {
            serde_json::to_writer(&mut *writer, &output)?;
        }
        writeln!(writer)?;
        Ok(())
    }
}
