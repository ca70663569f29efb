//! `From` implementations bridging `touch_config` types to `touch_core` types.

use crate::runner::RunParams;
use crate::sampler::Sample;
use crate::timing::TimingConfig;

impl From<&touch_config::Timing> for TimingConfig {
    fn from(c: &touch_config::Timing) -> Self {
        Self {
            min_release_ms: c.min_release_ms,
            short_press_ms: c.short_press_ms,
            long_press_ms: c.long_press_ms,
            max_idle_short_ms: c.max_idle_short_ms,
            max_idle_long_ms: c.max_idle_long_ms,
        }
    }
}

/// Run limit is left unset; callers apply it from the command line.
impl From<&touch_config::SensorCfg> for RunParams {
    fn from(c: &touch_config::SensorCfg) -> Self {
        Self {
            poll_hz: c.poll_hz,
            stall_ms: c.stall_ms,
            max_run_ms: None,
        }
    }
}

impl From<touch_config::TraceRow> for Sample {
    fn from(r: touch_config::TraceRow) -> Self {
        Self {
            time_ms: r.time_ms,
            mask: r.mask,
        }
    }
}
