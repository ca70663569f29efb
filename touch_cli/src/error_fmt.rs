//! Human-readable error descriptions and structured JSON error formatting.

use crate::cli::LAST_LIMITS;
use touch_core::error::{BuildError, DecoderError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingWidth => {
                "What happened: The decoder was built without a channel count.\nLikely causes: The builder was not given with_width(...).\nHow to fix: Set [decoder] channels in the config.".to_string()
            }
            BuildError::InvalidWidth(w) => format!(
                "What happened: Channel count {w} is out of range.\nLikely causes: [decoder] channels is 0 or above 32.\nHow to fix: Use a value between 1 and 32 (12 for one MPR121)."
            ),
        };
    }

    if let Some(de) = err.downcast_ref::<DecoderError>() {
        return match de {
            DecoderError::Timeout => "What happened: Touch controller read timed out.\nLikely causes: MPR121 not powered, wrong I2C bus or address, or a loose SDA/SCL wire.\nHow to fix: Check wiring and [sensor] i2c_bus/i2c_address, or raise sensor.stall_ms in the config.".to_string(),
            DecoderError::Sensor(msg) | DecoderError::SensorFault(msg) => format!(
                "What happened: Touch sensor failed ({msg}).\nLikely causes: I2C bus error, missing permissions on /dev/i2c-*, or controller not found.\nHow to fix: Verify the controller responds (i2cdetect) and that the user is in the i2c group."
            ),
            DecoderError::Config(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
            DecoderError::Io(msg) => format!(
                "What happened: Could not write the gesture report ({msg}).\nLikely causes: stdout was closed early, e.g. piped into a command that exited.\nHow to fix: Keep the reading end open or redirect output to a file."
            ),
        };
    }

    // String-based heuristics for errors coming from file loading
    let msg = err.to_string();
    let lower = format!("{err:#}").to_ascii_lowercase();

    if lower.contains("trace csv must have headers") {
        return "Invalid headers in trace CSV. Expected 'time_ms,mask'.".to_string();
    }

    if lower.contains("trace timestamps must be non-decreasing") {
        return "What happened: Trace timestamps go backwards.\nLikely causes: Rows were reordered or several captures were concatenated.\nHow to fix: Sort the trace by time_ms.".to_string();
    }

    if lower.contains("open trace csv") || lower.contains("read config") {
        return format!(
            "What happened: Could not read an input file ({msg}).\nLikely causes: Wrong path or missing read permission.\nHow to fix: Check the path and try again."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable reason names for JSON output.
pub fn reason_name(err: &eyre::Report) -> &'static str {
    if err.downcast_ref::<BuildError>().is_some() {
        return "Config";
    }
    match err.downcast_ref::<DecoderError>() {
        Some(DecoderError::Timeout) => "Timeout",
        Some(DecoderError::Sensor(_) | DecoderError::SensorFault(_)) => "Sensor",
        Some(DecoderError::Config(_)) => "Config",
        Some(DecoderError::Io(_)) => "Io",
        None => "Error",
    }
}

/// Exit codes: 3 timeout, 4 sensor failure, 5 configuration; anything else 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match reason_name(err) {
        "Timeout" => 3,
        "Sensor" => 4,
        "Config" => 5,
        _ => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let reason = reason_name(err);
    let msg = humanize(err);
    let details = match reason {
        "Timeout" | "Sensor" => LAST_LIMITS
            .get()
            .map(|l| json!({ "stall_ms": l.stall_ms, "poll_hz": l.poll_hz })),
        _ => None,
    };
    let obj = if let Some(d) = details {
        json!({ "reason": reason, "details": d, "message": msg })
    } else {
        json!({ "reason": reason, "message": msg })
    };
    obj.to_string()
}
