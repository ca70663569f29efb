//! Scripted touch controller for running without hardware.

use std::time::Instant;

use touch_traits::TouchSensor;
use touch_traits::clock::{Clock, MonotonicClock};

use crate::error::{HwError, Result};

/// Replays a timed script of touch masks against a clock.
///
/// A script is a list of `(time_ms, mask)` steps; a read at elapsed time `t`
/// returns the mask of the last step at or before `t`, or 0 before the first.
pub struct SimulatedSensor<C: Clock = MonotonicClock> {
    width: u8,
    script: Vec<(u64, u32)>,
    clock: C,
    epoch: Instant,
    fail_timeout: bool,
    reads: u64,
}

impl SimulatedSensor<MonotonicClock> {
    /// Sensor with no script: nothing is ever touched.
    pub fn idle(width: u8) -> Self {
        let clock = MonotonicClock::new();
        Self {
            width,
            script: Vec::new(),
            epoch: clock.now(),
            clock,
            fail_timeout: false,
            reads: 0,
        }
    }

    pub fn new(width: u8, script: Vec<(u64, u32)>) -> Result<Self> {
        Self::with_clock(width, script, MonotonicClock::new())
    }
}

impl<C: Clock> SimulatedSensor<C> {
    /// Steps must be in non-decreasing time order.
    pub fn with_clock(width: u8, script: Vec<(u64, u32)>, clock: C) -> Result<Self> {
        if let Some(w) = script.windows(2).find(|w| w[1].0 < w[0].0) {
            return Err(HwError::Script(format!(
                "step at {} ms follows step at {} ms",
                w[1].0, w[0].0
            )));
        }
        let epoch = clock.now();
        Ok(Self {
            width,
            script,
            clock,
            epoch,
            fail_timeout: false,
            reads: 0,
        })
    }

    /// Make every read fail with [`HwError::Timeout`].
    pub fn failing_with_timeout(mut self) -> Self {
        self.fail_timeout = true;
        self
    }

    pub fn reads(&self) -> u64 {
        self.reads
    }

    fn mask_at(&self, elapsed_ms: u64) -> u32 {
        let idx = self.script.partition_point(|(t, _)| *t <= elapsed_ms);
        let mask = match idx {
            0 => 0,
            i => self.script[i - 1].1,
        };
        if self.width >= 32 {
            mask
        } else {
            mask & ((1u32 << self.width) - 1)
        }
    }
}

impl<C: Clock> TouchSensor for SimulatedSensor<C> {
    fn width(&self) -> u8 {
        self.width
    }

    fn read_touched(&mut self) -> std::result::Result<u32, Box<dyn std::error::Error + Send + Sync>> {
        self.reads = self.reads.saturating_add(1);
        if self.fail_timeout {
            return Err(Box::new(HwError::Timeout));
        }
        let elapsed = self.clock.ms_since(self.epoch);
        let mask = self.mask_at(elapsed);
        tracing::trace!(elapsed_ms = elapsed, mask, "simulated touch read");
        Ok(mask)
    }
}

/// Parse a script such as `"0:0x1, 100:0, 200:0b11"`.
///
/// Each step is `time_ms:mask`; masks may be decimal, `0x` hex or `0b`
/// binary. Whitespace around steps is ignored and an empty string is an
/// empty script.
pub fn parse_script(s: &str) -> Result<Vec<(u64, u32)>> {
    s.split(',')
        .map(str::trim)
        .filter(|step| !step.is_empty())
        .map(|step| {
            let (t, m) = step
                .split_once(':')
                .ok_or_else(|| HwError::Script(format!("expected time_ms:mask, got {step:?}")))?;
            let time = t
                .trim()
                .parse::<u64>()
                .map_err(|e| HwError::Script(format!("bad time in {step:?}: {e}")))?;
            let mask = parse_radix(m.trim())
                .map_err(|e| HwError::Script(format!("bad mask in {step:?}: {e}")))?;
            Ok((time, mask))
        })
        .collect()
}

/// Decimal, `0x` hex or `0b` binary; underscores separate digits.
fn parse_radix(m: &str) -> std::result::Result<u32, std::num::ParseIntError> {
    let m: String = m.chars().filter(|c| *c != '_').collect();
    let m = m.as_str();
    if let Some(h) = m.strip_prefix("0x").or_else(|| m.strip_prefix("0X")) {
        u32::from_str_radix(h, 16)
    } else if let Some(b) = m.strip_prefix("0b").or_else(|| m.strip_prefix("0B")) {
        u32::from_str_radix(b, 2)
    } else {
        m.parse::<u32>()
    }
}
