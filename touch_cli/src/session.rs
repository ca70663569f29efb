//! Command bodies: config mapping, decoder assembly, replay and live runs.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use eyre::WrapErr;
use serde_json::json;
use touch_core::error::Result as CoreResult;
use touch_core::runner::{self, ReplaySummary, RunParams};
use touch_core::{DecoderError, GestureDecoder, Sample, TimingConfig};
use touch_traits::MonotonicClock;

use crate::cli::{CliLimits, LAST_LIMITS};
use crate::report::Reporter;
use crate::sensor::BoxedSensor;

/// Load and validate the config; defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> eyre::Result<touch_config::Config> {
    let cfg = match path {
        None => touch_config::Config::default(),
        Some(p) => {
            let text = std::fs::read_to_string(p)
                .wrap_err_with(|| format!("read config {}", p.display()))?;
            touch_config::load_toml(&text).map_err(|e| DecoderError::Config(e.to_string()))?
        }
    };
    cfg.validate()
        .map_err(|e| DecoderError::Config(format!("{e:#}")))?;
    Ok(cfg)
}

pub fn build_decoder(cfg: &touch_config::Config) -> CoreResult<GestureDecoder> {
    GestureDecoder::builder()
        .with_width(cfg.decoder.channels)
        .with_timing(TimingConfig::from(&cfg.timing))
        .build()
}

fn report_write_error(e: &std::io::Error) -> eyre::Report {
    eyre::Report::new(DecoderError::Io(e.to_string())).wrap_err("write gesture report")
}

/// Replay each trace from a freshly reset decoder, reporting to one output.
pub fn replay_traces(
    cfg: &touch_config::Config,
    traces: &[PathBuf],
    settle: bool,
    out: impl Write,
    json_mode: bool,
) -> eyre::Result<()> {
    let mut decoder = build_decoder(cfg)?;
    let mut reporter =
        Reporter::new(out, &cfg.report.topic_prefix, json_mode).with_edges(cfg.report.edges);
    let mut total = ReplaySummary::default();
    let mut pending = false;

    for trace in traces {
        let rows = touch_config::load_trace_csv(trace)?;
        decoder.reset();
        let mut io_err = None;

        tracing::info!(trace = %trace.display(), rows = rows.len(), settle, "replay start");
        let summary = runner::replay(
            rows.into_iter().map(Sample::from),
            &mut decoder,
            settle,
            |step| {
                if io_err.is_none()
                    && let Err(e) = reporter.step(step)
                {
                    io_err = Some(e);
                }
            },
        );
        if let Some(e) = io_err {
            return Err(report_write_error(&e));
        }

        if !decoder.is_quiescent() {
            pending = true;
            tracing::info!(
                trace = %trace.display(),
                "trace ended with gestures still pending; use --settle to resolve them"
            );
        }
        total.samples += summary.samples;
        total.gestures += summary.gestures;
        total.last_time_ms = summary.last_time_ms;
        total.settled |= summary.settled;
    }
    tracing::debug!(lines = reporter.lines(), "replay report written");

    reporter.summary(
        &format!(
            "replay complete: {} samples, {} gestures",
            total.samples, total.gestures
        ),
        json!({
            "command": "replay",
            "traces": traces.len(),
            "samples": total.samples,
            "gestures": total.gestures,
            "last_time_ms": total.last_time_ms,
            "settled": total.settled,
            "pending": pending,
        }),
    )?;
    Ok(())
}

pub fn run_live(
    cfg: &touch_config::Config,
    sensor: BoxedSensor,
    max_run_ms: Option<u64>,
    poll_hz: Option<u32>,
    shutdown: Arc<AtomicBool>,
    out: impl Write,
    json_mode: bool,
) -> eyre::Result<()> {
    let mut params = RunParams::from(&cfg.sensor);
    params.max_run_ms = max_run_ms;
    if let Some(hz) = poll_hz {
        if hz == 0 {
            return Err(DecoderError::Config("poll_hz must be > 0".into()).into());
        }
        params.poll_hz = hz;
    }
    let _ = LAST_LIMITS.set(CliLimits {
        poll_hz: params.poll_hz,
        stall_ms: params.stall_ms,
    });

    let mut decoder = build_decoder(cfg)?;
    let mut reporter =
        Reporter::new(out, &cfg.report.topic_prefix, json_mode).with_edges(cfg.report.edges);
    let mut io_err = None;

    let summary = runner::run(
        sensor,
        &mut decoder,
        params,
        MonotonicClock::new(),
        &shutdown,
        |step| {
            if io_err.is_none()
                && let Err(e) = reporter.step(step)
            {
                tracing::warn!(error = %e, "report output closed; stopping");
                shutdown.store(true, std::sync::atomic::Ordering::Relaxed);
                io_err = Some(e);
            }
        },
    )?;
    if let Some(e) = io_err {
        return Err(report_write_error(&e));
    }

    reporter.summary(
        &format!(
            "run stopped ({}): {} samples, {} gestures, {} read errors",
            summary.stop.name(),
            summary.samples,
            summary.gestures,
            summary.read_errors
        ),
        json!({
            "command": "run",
            "stop": summary.stop.name(),
            "samples": summary.samples,
            "gestures": summary.gestures,
            "read_errors": summary.read_errors,
            "elapsed_ms": summary.elapsed_ms,
        }),
    )?;
    Ok(())
}

/// Read the sensor once; an error here means it is absent or miswired.
pub fn probe(sensor: &mut BoxedSensor) -> eyre::Result<u32> {
    sensor
        .read_touched()
        .map_err(|e| eyre::Report::new(touch_core::map_sensor_error(&*e)))
        .wrap_err("touch sensor probe")
}

pub fn self_check(
    cfg: &touch_config::Config,
    mut sensor: BoxedSensor,
    mut out: impl Write,
    json_mode: bool,
) -> eyre::Result<()> {
    let mask = probe(&mut sensor)?;
    tracing::debug!(mask, "self-check read");
    if json_mode {
        let obj = json!({ "self_check": "ok", "sensor_width": sensor.width(), "mask": mask });
        writeln!(out, "{obj}")?;
    } else {
        writeln!(
            out,
            "self-check ok: sensor width {}, decoder channels {}",
            sensor.width(),
            cfg.decoder.channels
        )?;
    }
    Ok(())
}

/// Config, decoder and sensor status for monitoring.
pub fn health(
    cfg: &touch_config::Config,
    mut sensor: BoxedSensor,
    mut out: impl Write,
    json_mode: bool,
) -> eyre::Result<()> {
    let decoder = build_decoder(cfg)?;
    let timing = decoder.timing();
    let mut warnings = Vec::new();
    if !touch_core::util::resolves_hold(cfg.sensor.poll_hz, timing.min_release_ms) {
        warnings.push("poll period exceeds min_release_ms");
    }
    if timing.has_unclassified_band() {
        warnings.push("holds between short_press_ms and long_press_ms are not classified");
    }
    if sensor.width() < decoder.width() {
        warnings.push("decoder has more channels than the sensor");
    }
    let mask = probe(&mut sensor)?;
    let status = if warnings.is_empty() { "ok" } else { "degraded" };

    if json_mode {
        let obj = json!({
            "status": status,
            "channels": decoder.width(),
            "sensor_width": sensor.width(),
            "poll_hz": cfg.sensor.poll_hz,
            "mask": mask,
            "warnings": warnings,
        });
        writeln!(out, "{obj}")?;
    } else {
        writeln!(
            out,
            "health: {status} (channels {}, sensor width {}, poll {} Hz)",
            decoder.width(),
            sensor.width(),
            cfg.sensor.poll_hz
        )?;
        for w in &warnings {
            writeln!(out, "warning: {w}")?;
        }
    }
    Ok(())
}
