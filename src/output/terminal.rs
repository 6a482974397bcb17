//! Colored terminal summary

use anyhow::Result;
use tabled::builder::Builder;
use tabled::settings::Style;
use termcolor::{Color, ColorSpec, WriteColor};

use crate::clean::CleanReport;
use crate::model::Table;

use super::writer::{date_only_columns, format_cell};
use super::{OutputFormatter, Summary};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Terminal output with colored headings
pub struct TerminalOutput {
    heading: ColorSpec,
}

impl TerminalOutput {
    pub fn new() -> Self {
        let mut heading = ColorSpec::new();
        heading.set_fg(Some(Color::Cyan)).set_bold(true);
        Self { heading }
    }

    fn write_heading(&self, writer: &mut dyn WriteColor, text: &str) -> Result<()> {
        writer.set_color(&self.heading)?;
        write!(writer, "{}", text)?;
        writer.reset()?;
        writeln!(writer)?;
        Ok(())
    }

    fn write_header(&self, writer: &mut dyn WriteColor, summary: &Summary<'_>) -> Result<()> {
        writeln!(writer, "{}", RULE)?;
        writeln!(writer, " datascrub: {}", summary.source.display())?;
        writeln!(writer, "{}", RULE)?;
        writeln!(writer)?;
        writeln!(
            writer,
            "Rows: {}, Columns: {} (read {} rows, {} columns)",
            summary.table.row_count(),
            summary.table.column_count(),
            summary.report.input_rows,
            summary.report.input_columns
        )?;
        writeln!(writer)?;
        Ok(())
    }

    fn write_columns(&self, writer: &mut dyn WriteColor, table: &Table) -> Result<()> {
        self.write_heading(writer, "Columns:")?;
        let width = table.columns.iter().map(|c| c.name.len()).max().unwrap_or(0);
        for col in &table.columns {
            writeln!(
                writer,
                "  {:width$}  {:<8}  {} non-null",
                col.name,
                col.column_type.to_string(),
                table.non_null_count(col.index),
                width = width
            )?;
        }
        writeln!(writer)?;
        Ok(())
    }

    fn write_report(&self, writer: &mut dyn WriteColor, report: &CleanReport) -> Result<()> {
        self.write_heading(writer, "Cleaning:")?;
        for rename in &report.renamed_columns {
            let note = if rename.disambiguated { " (name collision)" } else { "" };
            writeln!(writer, "  renamed {:?} → {:?}{}", rename.from, rename.to, note)?;
        }
        writeln!(writer, "  duplicate rows removed: {}", report.duplicate_rows_removed)?;
        writeln!(writer, "  blank cells set to missing: {}", report.blank_cells_nulled)?;
        if !report.numeric_columns.is_empty() {
            writeln!(writer, "  numeric: {}", report.numeric_columns.join(", "))?;
        }
        for promotion in &report.datetime_columns {
            writeln!(
                writer,
                "  datetime: {} (by {}, {} unparsed)",
                promotion.column, promotion.trigger, promotion.unparsed
            )?;
        }
        if !report.pruned_columns.is_empty() {
            writeln!(
                writer,
                "  pruned (fewer than {} values): {}",
                report.sparsity_threshold,
                report.pruned_columns.join(", ")
            )?;
        }
        writeln!(writer)?;
        Ok(())
    }

    fn write_preview(&self, writer: &mut dyn WriteColor, table: &Table, rows: usize) -> Result<()> {
        self.write_heading(writer, &format!("First {} rows:", rows))?;
        if table.column_count() == 0 {
            writeln!(writer, "  (no columns)")?;
            return Ok(());
        }
        writeln!(writer, "{}", build_preview(table, rows))?;
        Ok(())
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TerminalOutput {
    fn render(&self, summary: &Summary<'_>, writer: &mut dyn WriteColor) -> Result<()> {
        self.write_header(writer, summary)?;
        self.write_columns(writer, summary.table)?;
        self.write_report(writer, summary.report)?;
        self.write_preview(writer, summary.table, summary.preview_rows)?;
        Ok(())
    }
}

/// Boxed table of the first `rows` rows, missing values shown as `<NA>`
fn build_preview(table: &Table, rows: usize) -> String {
    let mut builder = Builder::default();
    builder.push_record(table.columns.iter().map(|c| c.name.clone()));

    let date_only = date_only_columns(table);
    for row in table.rows.iter().take(rows) {
        builder.push_record(row.cells.iter().zip(&date_only).map(|(cell, &date)| {
            if cell.is_null() {
                cell.display().into_owned()
            } else {
                format_cell(cell, date).into_owned()
            }
        }));
    }

    let mut preview = builder.build();
    preview.with(Style::modern());
    preview.to_string()
}
