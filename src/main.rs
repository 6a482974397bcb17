//! datascrub - Deterministic cleaning for tabular data

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use datascrub::clean::clean_table;
use datascrub::config::{Config, OutputFormat, DEFAULT_PREVIEW_ROWS};
use datascrub::logging::{init_logging, level_from_flags};
use datascrub::output::{render_to_stdout, write_csv, Summary};
use datascrub::parser::{locate_dataset, ParserFactory};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Terminal,
    Json,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Terminal => OutputFormat::Terminal,
            CliOutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// Clean the dataset found in a data directory (CSV, TSV, Parquet, Excel)
#[derive(Parser, Debug)]
#[command(name = "datascrub")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory searched for the dataset
    #[arg(default_value = "data")]
    data_dir: PathBuf,

    /// Where to write the cleaned CSV (default: <DATA_DIR>/cleaned_dataset.csv)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// For Excel files: which sheet to read
    #[arg(long)]
    sheet: Option<String>,

    /// Number of rows to preview
    #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
    preview_rows: usize,

    /// Summary format
    #[arg(short, long, value_enum, default_value = "terminal")]
    format: CliOutputFormat,

    /// Do not write the cleaned dataset
    #[arg(long)]
    no_write: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(level_from_flags(cli.verbose, cli.quiet))?;

    let mut config = Config::new(cli.data_dir)
        .with_preview_rows(cli.preview_rows)
        .with_output_format(cli.format.into())
        .with_write_output(!cli.no_write);
    if let Some(output) = cli.output {
        config = config.with_output_path(output);
    }
    if let Some(sheet) = cli.sheet {
        config = config.with_sheet_name(sheet);
    }

    let source = locate_dataset(&config.data_dir)?;
    let table = ParserFactory::new()
        .parse(&source, &config)
        .with_context(|| format!("Failed to read dataset: {}", source.display()))?;

    let outcome = clean_table(table);

    render_to_stdout(
        &Summary {
            source: &source,
            table: &outcome.table,
            report: &outcome.report,
            preview_rows: config.preview_rows,
        },
        config.output_format,
    )?;

    if config.write_output {
        let path = config.cleaned_path();
        // A failed write leaves the summary above as the only result
        match write_csv(&outcome.table, &path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "cleaned dataset written");
                if config.output_format == OutputFormat::Terminal {
                    println!("Cleaned dataset saved to {}", path.display());
                }
            }
            Err(e) => {
                tracing::error!(path = %path.display(), "failed to write cleaned dataset: {:#}", e);
                eprintln!("Warning: could not save cleaned dataset: {:#}", e);
            }
        }
    }

    Ok(())
}
