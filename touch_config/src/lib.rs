#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and touch-trace parsing for the gesture decoder.
//!
//! - `Config` and its sections are deserialized from TOML; every section is
//!   optional and falls back to the defaults of a 12-electrode MPR121 board.
//! - Trace CSV loader enforces headers and non-decreasing timestamps.
use serde::Deserialize;
use serde::de::Deserializer;

pub use touch_traits::MAX_CHANNELS;

const DAY_MS: u64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct DecoderCfg {
    /// Number of channels decoded (bit `i` of a mask is channel `i`).
    pub channels: u8,
}

impl Default for DecoderCfg {
    fn default() -> Self {
        Self { channels: 12 }
    }
}

/// Gesture timing thresholds in milliseconds.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct Timing {
    /// Holds shorter than this are bounces.
    pub min_release_ms: u64,
    /// Holds shorter than this (and not bounces) are short presses.
    pub short_press_ms: u64,
    /// Holds at least this long are long presses.
    pub long_press_ms: u64,
    /// Window after a short press in which a second touch combines with it.
    pub max_idle_short_ms: u64,
    /// Window after a long press in which a second touch combines with it.
    pub max_idle_long_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            min_release_ms: 30,
            short_press_ms: 300,
            long_press_ms: 300,
            max_idle_short_ms: 500,
            max_idle_long_ms: 1000,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct SensorCfg {
    /// Linux I2C bus number (`/dev/i2c-N`).
    pub i2c_bus: u8,
    /// 7-bit controller address; accepts an integer or a "0x5A" string.
    #[serde(deserialize_with = "de_address")]
    pub i2c_address: u16,
    /// Polling rate.
    pub poll_hz: u32,
    /// Abort a run when no read has succeeded for this long (0 disables).
    pub stall_ms: u64,
    /// Electrode touch threshold register value.
    pub touch_threshold: u8,
    /// Electrode release threshold register value.
    pub release_threshold: u8,
}

impl Default for SensorCfg {
    fn default() -> Self {
        Self {
            i2c_bus: 1,
            i2c_address: 0x5A,
            poll_hz: 100,
            stall_ms: 1000,
            touch_threshold: 12,
            release_threshold: 6,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ReportCfg {
    /// Topic prefix; gestures are published to `<prefix>/touch/<channel>`.
    pub topic_prefix: String,
    /// Also report every release edge as `<prefix>/touch/<channel> released`.
    pub edges: bool,
}

impl Default for ReportCfg {
    fn default() -> Self {
        Self {
            topic_prefix: "wled".to_string(),
            edges: false,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub decoder: DecoderCfg,
    pub timing: Timing,
    pub sensor: SensorCfg,
    pub report: ReportCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AddressToml {
    Int(u16),
    Text(String),
}

fn de_address<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    match AddressToml::deserialize(deserializer)? {
        AddressToml::Int(v) => Ok(v),
        AddressToml::Text(s) => {
            let v = parse_mask(&s).map_err(serde::de::Error::custom)?;
            u16::try_from(v).map_err(|_| serde::de::Error::custom("i2c_address out of range"))
        }
    }
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Decoder
        if self.decoder.channels == 0 || self.decoder.channels > MAX_CHANNELS {
            eyre::bail!("decoder.channels must be in 1..={MAX_CHANNELS}");
        }

        // Timing: any ordering of thresholds is legal, only magnitudes are bounded.
        let t = &self.timing;
        for (name, v) in [
            ("timing.min_release_ms", t.min_release_ms),
            ("timing.short_press_ms", t.short_press_ms),
            ("timing.long_press_ms", t.long_press_ms),
            ("timing.max_idle_short_ms", t.max_idle_short_ms),
            ("timing.max_idle_long_ms", t.max_idle_long_ms),
        ] {
            if v > DAY_MS {
                eyre::bail!("{name} is unreasonably large (>24h)");
            }
        }

        // Sensor
        if self.sensor.poll_hz == 0 {
            eyre::bail!("sensor.poll_hz must be > 0");
        }
        if self.sensor.poll_hz > 1000 {
            eyre::bail!("sensor.poll_hz must be <= 1000");
        }
        if !(0x08..=0x77).contains(&self.sensor.i2c_address) {
            eyre::bail!("sensor.i2c_address must be a 7-bit address in 0x08..=0x77");
        }
        if self.sensor.stall_ms > DAY_MS {
            eyre::bail!("sensor.stall_ms is unreasonably large (>24h)");
        }
        if self.sensor.release_threshold > self.sensor.touch_threshold {
            eyre::bail!("sensor.release_threshold must be <= sensor.touch_threshold");
        }

        // Report
        if self.report.topic_prefix.is_empty() {
            eyre::bail!("report.topic_prefix must not be empty");
        }
        if self.report.topic_prefix.ends_with('/') {
            eyre::bail!("report.topic_prefix must not end with '/'");
        }

        // Logging
        if let Some(r) = self.logging.rotation.as_deref()
            && !matches!(r, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {r:?}");
        }

        Ok(())
    }
}

/// Parse a channel mask written as decimal, `0x` hex or `0b` binary.
///
/// Underscores are accepted as digit separators.
pub fn parse_mask(s: &str) -> eyre::Result<u32> {
    let t = s.trim();
    let digits: String = t.chars().filter(|c| *c != '_').collect();
    let parsed = if let Some(h) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        u32::from_str_radix(h, 16)
    } else if let Some(b) = digits
        .strip_prefix("0b")
        .or_else(|| digits.strip_prefix("0B"))
    {
        u32::from_str_radix(b, 2)
    } else {
        digits.parse::<u32>()
    };
    parsed.map_err(|e| eyre::eyre!("invalid mask {t:?}: {e}"))
}

/// Trace CSV schema.
///
/// Expected headers:
/// time_ms,mask
///
/// Example:
/// time_ms,mask
/// 0,0x001
/// 100,0
#[derive(Debug, Deserialize, Clone)]
struct TraceRecord {
    time_ms: u64,
    mask: String,
}

/// One recorded sample: the touched-channel mask at `time_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceRow {
    pub time_ms: u64,
    pub mask: u32,
}

/// Parse a trace from any reader; see [`load_trace_csv`].
pub fn parse_trace_csv<R: std::io::Read>(reader: R) -> eyre::Result<Vec<TraceRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers: {}", e))?
        .clone();
    let expected = ["time_ms", "mask"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "trace CSV must have headers 'time_ms,mask', got: {}",
            actual.join(",")
        );
    }

    let mut rows: Vec<TraceRow> = Vec::new();
    for (idx, rec) in rdr.deserialize::<TraceRecord>().enumerate() {
        let line = idx + 2;
        let rec = rec.map_err(|e| eyre::eyre!("invalid CSV row {line}: {e}"))?;
        let mask = parse_mask(&rec.mask).map_err(|e| eyre::eyre!("invalid CSV row {line}: {e}"))?;
        if let Some(prev) = rows.last()
            && rec.time_ms < prev.time_ms
        {
            eyre::bail!(
                "trace timestamps must be non-decreasing: row {line} has {} after {}",
                rec.time_ms,
                prev.time_ms
            );
        }
        rows.push(TraceRow {
            time_ms: rec.time_ms,
            mask,
        });
    }
    Ok(rows)
}

pub fn load_trace_csv(path: &std::path::Path) -> eyre::Result<Vec<TraceRow>> {
    let file = std::fs::File::open(path).map_err(|e| eyre::eyre!("open trace CSV {:?}: {}", path, e))?;
    parse_trace_csv(file).map_err(|e| e.wrap_err(format!("trace CSV {}", path.display())))
}
