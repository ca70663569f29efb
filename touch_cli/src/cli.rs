//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();
/// Effective run limits of the current live run (for JSON error details).
pub static LAST_LIMITS: OnceLock<CliLimits> = OnceLock::new();

#[derive(Copy, Clone, Debug)]
pub struct CliLimits {
    pub poll_hz: u32,
    pub stall_ms: u64,
}

#[derive(Parser, Debug)]
#[command(name = "touch_cli", version, about = "Touch gesture decoder CLI")]
pub struct Cli {
    /// Path to config TOML; built-in defaults apply when omitted
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print gestures and errors as JSON lines
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); overrides RUST_LOG and logging.level
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Also report release edges as `<prefix>/touch/<channel> released`
    #[arg(long, action = ArgAction::SetTrue)]
    pub edges: bool,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode recorded trace CSVs (`time_ms,mask`), each from a fresh decoder
    Replay {
        /// Trace files to decode, in order
        #[arg(value_name = "TRACE", required = true, num_args = 1..)]
        traces: Vec<PathBuf>,
        /// Append a final sample after the longest idle window so pending presses resolve
        #[arg(long, action = ArgAction::SetTrue)]
        settle: bool,
    },
    /// Poll the sensor and report gestures until Ctrl-C
    Run {
        /// Stop after this many ms of sampling
        #[arg(long, value_name = "MS")]
        max_run_ms: Option<u64>,
        /// Override sensor.poll_hz from the config
        #[arg(long, value_name = "HZ")]
        poll_hz: Option<u32>,
    },
    /// Quick health check (sensor presence / sim ok)
    SelfCheck,
    /// Health check for operational monitoring
    Health,
}
