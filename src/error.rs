//! Errors raised while locating and reading a dataset

use std::path::PathBuf;

use thiserror::Error;

/// Failure to resolve the input dataset
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("data directory not found: {}", .0.display())]
    MissingDataDir(PathBuf),

    #[error("no dataset found in {} (looked for: {})", .dir.display(), .searched.join(", "))]
    NoDataset { dir: PathBuf, searched: Vec<String> },

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),
}
