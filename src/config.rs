//! Configuration handling for datascrub
//!
//! Only the I/O around the pipeline is configurable; the cleaning heuristics
//! use fixed thresholds.

use std::path::PathBuf;

/// File name of the cleaned dataset written inside the data directory
pub const CLEANED_FILE_NAME: &str = "cleaned_dataset.csv";

/// Default number of rows shown in the summary preview
pub const DEFAULT_PREVIEW_ROWS: usize = 20;

/// Output format for the summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "terminal" => Ok(OutputFormat::Terminal),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Configuration for a cleaning run
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory searched for the input dataset
    pub data_dir: PathBuf,
    /// Where the cleaned CSV goes; defaults to `<data_dir>/cleaned_dataset.csv`
    pub output_path: Option<PathBuf>,
    /// For Excel files: which sheet to read (first sheet when unset)
    pub sheet_name: Option<String>,
    /// Rows shown in the summary preview
    pub preview_rows: usize,
    /// Summary format
    pub output_format: OutputFormat,
    /// Write the cleaned dataset back to disk
    pub write_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            output_path: None,
            sheet_name: None,
            preview_rows: DEFAULT_PREVIEW_ROWS,
            output_format: OutputFormat::default(),
            write_output: true,
        }
    }
}

impl Config {
    /// Create a new Config for a data directory
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            ..Default::default()
        }
    }

    /// Set an explicit output path
    pub fn with_output_path(mut self, path: PathBuf) -> Self {
        self.output_path = Some(path);
        self
    }

    /// Set Excel sheet name
    pub fn with_sheet_name(mut self, name: String) -> Self {
        self.sheet_name = Some(name);
        self
    }

    /// Set number of preview rows
    pub fn with_preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = rows;
        self
    }

    /// Set summary output format
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Enable or disable writing the cleaned dataset
    pub fn with_write_output(mut self, write: bool) -> Self {
        self.write_output = write;
        self
    }

    /// Resolved path of the cleaned CSV
    pub fn cleaned_path(&self) -> PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join(CLEANED_FILE_NAME))
    }
}
