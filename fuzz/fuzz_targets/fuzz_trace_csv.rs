#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(rows) = touch_config::parse_trace_csv(data) {
        assert!(rows.windows(2).all(|w| w[0].time_ms <= w[1].time_ms));
    }
});
