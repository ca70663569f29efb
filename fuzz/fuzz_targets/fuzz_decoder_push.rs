#![no_main]
use libfuzzer_sys::arbitrary::{self, Arbitrary};
use libfuzzer_sys::fuzz_target;
use touch_core::{GestureDecoder, NoopObserver, TimingConfig};

#[derive(Debug, Arbitrary)]
struct Input {
    width: u8,
    timing: [u16; 5],
    steps: Vec<(u16, u32)>,
}

fuzz_target!(|input: Input| {
    let [min_release_ms, short_press_ms, long_press_ms, max_idle_short_ms, max_idle_long_ms] =
        input.timing.map(u64::from);
    let timing = TimingConfig {
        min_release_ms,
        short_press_ms,
        long_press_ms,
        max_idle_short_ms,
        max_idle_long_ms,
    };
    let Ok(mut decoder) = GestureDecoder::with_observer(input.width, timing, NoopObserver) else {
        return;
    };
    // Gestures only ever land on channels the decoder has.
    let width = u32::from(decoder.width());
    let limit = if width >= 32 { u32::MAX } else { (1u32 << width) - 1 };
    let mut time = 0u64;
    for (dt, mask) in input.steps {
        time = time.saturating_add(u64::from(dt));
        let out = decoder.push(mask, time);
        assert_eq!(out.any().bits() & !limit, 0);
    }
});
