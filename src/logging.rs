//! Logging setup using `tracing` and `tracing-subscriber`
//!
//! Diagnostics go to stderr so stdout stays reserved for the summary. The
//! filter comes from the command line only:
//!
//! - `-q`: warnings and errors
//! - default: info (one line per cleaning stage)
//! - `-v`: debug (per-column decisions)
//! - `-vv`: trace (individual duplicate rows)

use anyhow::{anyhow, Result};
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Map CLI verbosity flags to a level
pub fn level_from_flags(verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::WARN;
    }
    match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(level: Level) -> Result<()> {
    let filter = EnvFilter::new(format!("datascrub={}", level));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))
}
