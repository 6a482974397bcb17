//! Output: run summaries and the cleaned CSV

mod json;
mod terminal;
mod writer;

use std::path::Path;

use anyhow::Result;
use termcolor::{ColorChoice, StandardStream, WriteColor};

use crate::clean::CleanReport;
use crate::config::OutputFormat;
use crate::model::Table;

pub use json::JsonOutput;
pub use terminal::TerminalOutput;
pub use writer::{write_csv, write_table};

/// Everything a summary shows about one cleaning run
#[derive(Debug, Clone, Copy)]
pub struct Summary<'a> {
    /// Dataset the table was read from
    pub source: &'a Path,
    /// Cleaned table
    pub table: &'a Table,
    /// What the pipeline changed
    pub report: &'a CleanReport,
    /// Number of leading rows to preview
    pub preview_rows: usize,
}

/// Trait for summary formatters
pub trait OutputFormatter {
    /// Render a summary to a writer
    fn render(&self, summary: &Summary<'_>, writer: &mut dyn WriteColor) -> Result<()>;
}

/// Factory for creating output formatters
pub struct OutputFactory;

impl OutputFactory {
    /// Create an output formatter based on format type
    pub fn create(format: OutputFormat) -> Box<dyn OutputFormatter> {
        match format {
            OutputFormat::Terminal => Box::new(TerminalOutput::new()),
            OutputFormat::Json => Box::new(JsonOutput::new()),
        }
    }
}

/// Render a summary to stdout
pub fn render_to_stdout(summary: &Summary<'_>, format: OutputFormat) -> Result<()> {
    let formatter = OutputFactory::create(format);
    let choice = match format {
        OutputFormat::Terminal => ColorChoice::Auto,
        OutputFormat::Json => ColorChoice::Never,
    };
    let mut stdout = StandardStream::stdout(choice);
    formatter.render(summary, &mut stdout)
}
