//! Command-line and environment configuration.

use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 5000;

/// Seeds a demo staff database, runs the fixed query sequence and serves HTTP.
#[derive(Debug, Clone, Parser)]
#[command(name = "staffdb", version, about)]
pub struct Args {
    /// SQLite file to use instead of a fresh in-memory database.
    /// Its contents are dropped on start either way.
    #[arg(long, env = "STAFFDB_DB")]
    pub db: Option<PathBuf>,

    /// HTTP listener port.
    #[arg(long, env = "STAFFDB_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// trace|debug|info|warn|error. Defaults by build mode.
    #[arg(long, env = "STAFFDB_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files. Logs go to stderr when unset.
    #[arg(long, env = "STAFFDB_LOG_DIR")]
    pub log_dir: Option<String>,

    /// Print step reports as JSON lines.
    #[arg(long)]
    pub json: bool,

    /// Exit after the query sequence instead of starting the listener.
    #[arg(long)]
    pub no_serve: bool,
}
