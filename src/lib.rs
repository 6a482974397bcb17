//! datascrub - Deterministic cleaning for tabular data
//!
//! Reads one dataset (CSV, TSV, Parquet, Excel), normalizes column names,
//! removes duplicate rows, infers numeric and datetime columns from their
//! values, and drops near-empty columns.

pub mod clean;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod output;
pub mod parser;

pub use clean::{clean_table, CleanOutcome, CleanReport};
pub use config::Config;
pub use error::DatasetError;
pub use model::Table;
