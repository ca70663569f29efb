#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! `touch_cli`: decode touch gestures from a recorded trace or a live sensor.

mod cli;
mod error_fmt;
mod report;
mod sensor;
mod session;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::WrapErr;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

/// Console filter directive: `--log-level`, then RUST_LOG, then
/// `logging.level`, then `info`.
fn log_directive<'a>(
    flag: Option<&'a str>,
    env: Option<&'a str>,
    config: Option<&'a str>,
) -> &'a str {
    flag.or(env).or(config).unwrap_or("info")
}

fn init_tracing(
    json: bool,
    level: Option<&str>,
    logging: &touch_config::Logging,
) -> eyre::Result<()> {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = log_directive(level, env.as_deref(), logging.level.as_deref());
    let filter = EnvFilter::try_new(directive).wrap_err("invalid log level")?;

    // Console logs go to stderr so stdout carries only gesture reports.
    let console = fmt::layer().with_writer(std::io::stderr).with_target(false);
    let console = if json {
        console.json().boxed()
    } else {
        console.boxed()
    };

    let file_layer = match &logging.file {
        Some(file) => {
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| eyre::eyre!("logging.file has no file name: {file}"))?;
            let appender = match logging.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(fmt::layer().json().with_ansi(false).with_writer(writer).boxed())
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .with(filter)
        .try_init()
        .wrap_err("install tracing subscriber")
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    let mut cfg = session::load_config(cli.config.as_deref())?;
    cfg.report.edges |= cli.edges;
    init_tracing(cli.json, cli.log_level.as_deref(), &cfg.logging)?;
    tracing::debug!(config = ?cli.config, channels = cfg.decoder.channels, "config loaded");

    let stdout = std::io::stdout();
    match cli.cmd {
        Commands::Replay { traces, settle } => {
            session::replay_traces(&cfg, &traces, settle, stdout.lock(), cli.json)
        }
        Commands::Run {
            max_run_ms,
            poll_hz,
        } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            let flag = shutdown.clone();
            ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
                .wrap_err("install Ctrl-C handler")?;
            let sensor = sensor::make_sensor(&cfg)?;
            session::run_live(
                &cfg,
                sensor,
                max_run_ms,
                poll_hz,
                shutdown,
                stdout.lock(),
                cli.json,
            )
        }
        Commands::SelfCheck => {
            let sensor = sensor::make_sensor(&cfg)?;
            session::self_check(&cfg, sensor, stdout.lock(), cli.json)
        }
        Commands::Health => {
            let sensor = sensor::make_sensor(&cfg)?;
            session::health(&cfg, sensor, stdout.lock(), cli.json)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    let _ = color_eyre::install();

    if let Err(e) = real_main(cli) {
        tracing::error!(error = %format!("{e:#}"), "command failed");
        if JSON_MODE.get().copied().unwrap_or(false) {
            println!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}

#[cfg(test)]
mod tests {
    use super::log_directive;

    #[test]
    fn explicit_flag_beats_env_and_config() {
        assert_eq!(log_directive(Some("info"), Some("trace"), Some("debug")), "info");
        assert_eq!(log_directive(None, Some("trace"), Some("debug")), "trace");
        assert_eq!(log_directive(None, None, Some("debug")), "debug");
        assert_eq!(log_directive(None, None, None), "info");
    }
}
