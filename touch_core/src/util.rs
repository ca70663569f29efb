//! Polling period helpers.

/// Number of microseconds in one second.
pub const MICROS_PER_SEC: u64 = 1_000_000;
/// Number of milliseconds in one second.
pub const MILLIS_PER_SEC: u64 = 1_000;

/// Polling period in microseconds for a rate in Hz.
/// - Clamps `hz` to at least 1 to avoid division by zero.
/// - Ensures result is at least 1 microsecond.
#[inline]
pub fn period_us(hz: u32) -> u64 {
    (MICROS_PER_SEC / u64::from(hz.max(1))).max(1)
}

/// Polling period in milliseconds for a rate in Hz (at least 1 ms).
#[inline]
pub fn period_ms(hz: u32) -> u64 {
    (MILLIS_PER_SEC / u64::from(hz.max(1))).max(1)
}

/// Whether polling at `hz` can observe a hold of `min_release_ms`.
///
/// A touch/release pair shorter than one polling period may fall entirely
/// between two samples and never be seen.
#[inline]
pub fn resolves_hold(hz: u32, min_release_ms: u64) -> bool {
    period_ms(hz) <= min_release_ms.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn periods_clamp_and_round_down() {
        assert_eq!(period_us(0), MICROS_PER_SEC);
        assert_eq!(period_us(100), 10_000);
        assert_eq!(period_us(u32::MAX), 1);
        assert_eq!(period_ms(0), 1000);
        assert_eq!(period_ms(100), 10);
        assert_eq!(period_ms(5000), 1);
    }

    #[test]
    fn hold_resolution_against_poll_rate() {
        assert!(resolves_hold(100, 30));
        assert!(!resolves_hold(20, 30));
        assert!(resolves_hold(1000, 0));
    }
}
