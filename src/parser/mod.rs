//! Parser layer: dataset discovery and readers for each tabular format

mod csv;
mod excel;
mod parquet;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::Config;
use crate::error::DatasetError;
use crate::model::Table;

pub use self::csv::CsvParser;
pub use self::excel::ExcelParser;
pub use self::parquet::ParquetParser;

/// Extensions tried by [`locate_dataset`], in order of preference
pub const DATASET_EXTENSIONS: &[&str] = &["csv", "tsv", "parquet", "xlsx", "xls"];

/// Trait for parsing tabular data files
pub trait Parser: Send + Sync {
    /// Parse a file and return a Table
    fn parse(&self, path: &Path, config: &Config) -> Result<Table>;

    /// Check if this parser can handle the given file extension
    fn supports_extension(&self, ext: &str) -> bool;
}

/// Factory for creating parsers based on file extension
pub struct ParserFactory {
    parsers: Vec<Box<dyn Parser>>,
}

impl Default for ParserFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserFactory {
    /// Create a new parser factory with all supported parsers
    pub fn new() -> Self {
        Self {
            parsers: vec![
                Box::new(CsvParser),
                Box::new(ParquetParser),
                Box::new(ExcelParser),
            ],
        }
    }

    /// Get a parser for the given file path
    pub fn get_parser(&self, path: &Path) -> Result<&dyn Parser, DatasetError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        self.parsers
            .iter()
            .find(|p| p.supports_extension(&ext))
            .map(|p| p.as_ref())
            .ok_or_else(|| {
                DatasetError::UnsupportedFormat(if ext.is_empty() {
                    "unknown".to_string()
                } else {
                    format!(".{}", ext)
                })
            })
    }

    /// Parse a file using the appropriate parser
    pub fn parse(&self, path: &Path, config: &Config) -> Result<Table> {
        let parser = self.get_parser(path)?;
        let table = parser.parse(path, config)?;
        tracing::info!(
            path = %path.display(),
            rows = table.row_count(),
            columns = table.column_count(),
            "read dataset"
        );
        Ok(table)
    }
}

/// Find the dataset to clean inside `dir`.
///
/// Extensions are tried in [`DATASET_EXTENSIONS`] order; the first extension
/// with any match wins and the lexicographically first file is returned.
pub fn locate_dataset(dir: &Path) -> Result<PathBuf> {
    if !dir.is_dir() {
        return Err(DatasetError::MissingDataDir(dir.to_path_buf()).into());
    }

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to list directory: {}", dir.display()))?
    {
        let path = entry
            .with_context(|| format!("Failed to list directory: {}", dir.display()))?
            .path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    for ext in DATASET_EXTENSIONS {
        let found = files
            .iter()
            .find(|p| p.extension().and_then(|e| e.to_str()) == Some(*ext));
        if let Some(path) = found {
            tracing::debug!(path = %path.display(), "located dataset");
            return Ok(path.clone());
        }
    }

    Err(DatasetError::NoDataset {
        dir: dir.to_path_buf(),
        searched: DATASET_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
    }
    .into())
}
