//! Time thresholds that parameterize every guard of the channel state machine.

/// Five millisecond thresholds shared by all channels of a decoder.
///
/// The ordering `min_release_ms < short_press_ms <= long_press_ms` is assumed
/// and never checked. When `short_press_ms < long_press_ms`, a hold whose
/// duration falls in `[short_press_ms, long_press_ms)` is not classified at
/// all; see [`TimingConfig::has_unclassified_band`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingConfig {
    /// Holds shorter than this are contact bounce and produce nothing.
    pub min_release_ms: u64,
    /// Holds in `[min_release_ms, short_press_ms)` count as short.
    pub short_press_ms: u64,
    /// Holds of at least this long count as long.
    pub long_press_ms: u64,
    /// Grace window after a short press during which a second touch
    /// upgrades it to a double/compound gesture.
    pub max_idle_short_ms: u64,
    /// Grace window after a long press, same role as `max_idle_short_ms`.
    pub max_idle_long_ms: u64,
}

impl TimingConfig {
    pub const DEFAULT: Self = Self {
        min_release_ms: 30,
        short_press_ms: 300,
        long_press_ms: 300,
        max_idle_short_ms: 500,
        max_idle_long_ms: 1000,
    };

    /// True when some hold durations match neither the short nor the long guard.
    #[inline]
    pub fn has_unclassified_band(&self) -> bool {
        self.short_press_ms < self.long_press_ms
    }

    /// Quiet time after which every pending idle window has expired.
    #[inline]
    pub fn settle_ms(&self) -> u64 {
        self.max_idle_short_ms
            .max(self.max_idle_long_ms)
            .saturating_add(1)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
