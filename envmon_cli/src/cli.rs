//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "envmon", version, about = "Environmental monitor / controller")]
pub struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE", default_value = "etc/envmon.toml")]
    pub config: PathBuf,

    /// Print reports and logs as JSON lines
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Log level (error|warn|info|debug|trace); overrides logging.level
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the monitoring loop until Ctrl-C
    Run {
        /// Stop after this many loop ticks
        #[arg(long, value_name = "N")]
        max_ticks: Option<u64>,
        /// Override timing.startup_delay_ms
        #[arg(long, value_name = "MS")]
        startup_delay_ms: Option<u64>,
    },
    /// Exercise every output once and read each sensor
    SelfCheck,
}
