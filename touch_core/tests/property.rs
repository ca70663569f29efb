use proptest::prelude::*;
use touch_core::{GestureDecoder, GestureKind, NoopObserver, TimingConfig};

prop_compose! {
    // A sample stream: (mask, delta_ms) pairs with bounded gaps.
    fn stream_strategy()(
        steps in prop::collection::vec((any::<u32>(), 0u64..700), 1..300),
    ) -> Vec<(u32, u64)> {
        steps
    }
}

prop_compose! {
    fn timing_strategy()(
        min_release_ms in 0u64..100,
        short_press_ms in 0u64..600,
        long_press_ms in 0u64..600,
        max_idle_short_ms in 0u64..1500,
        max_idle_long_ms in 0u64..1500,
    ) -> TimingConfig {
        TimingConfig { min_release_ms, short_press_ms, long_press_ms, max_idle_short_ms, max_idle_long_ms }
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn at_most_one_gesture_per_channel_per_push(
        width in 1u8..=32,
        timing in timing_strategy(),
        stream in stream_strategy(),
    ) {
        let mut d = GestureDecoder::with_observer(width, timing, NoopObserver).unwrap();
        let mut now = 0u64;
        for (mask, dt) in stream {
            now += dt;
            let out = d.push(mask, now);
            let mut per_channel = vec![0u8; usize::from(width)];
            for e in out.events() {
                prop_assert!(e.channel < width);
                per_channel[usize::from(e.channel)] += 1;
            }
            prop_assert!(per_channel.iter().all(|n| *n <= 1));

            // Durations are reported only for plain short presses.
            for ch in 0..width {
                let dur = out.short_press_time()[usize::from(ch)];
                if !out.short_press().test(ch) {
                    prop_assert_eq!(dur, 0);
                }
            }
        }
    }

    #[test]
    fn gestures_follow_the_edge_that_produced_them(
        timing in timing_strategy(),
        stream in stream_strategy(),
    ) {
        let mut d = GestureDecoder::with_observer(12, timing, NoopObserver).unwrap();
        let mut now = 0u64;
        for (mask, dt) in stream {
            now += dt;
            let out = d.push(mask, now).clone();
            let released = d.released();
            let quiet = !(d.touched() | released);
            // Single presses commit on quiet samples, compound ones on release.
            for kind in [GestureKind::ShortPress, GestureKind::LongPress] {
                prop_assert_eq!(out.mask(kind) & !quiet, touch_core::ChannelMask::EMPTY);
            }
            for kind in [
                GestureKind::DoubleShortPress,
                GestureKind::DoubleLongPress,
                GestureKind::ShortLongPress,
                GestureKind::LongShortPress,
            ] {
                prop_assert_eq!(out.mask(kind) & !released, touch_core::ChannelMask::EMPTY);
            }
            prop_assert_eq!(out.any() & d.touched(), touch_core::ChannelMask::EMPTY);
        }
    }

    #[test]
    fn untouched_decoder_never_emits(
        width in 1u8..=32,
        timing in timing_strategy(),
        times in prop::collection::vec(0u64..100_000, 1..200),
    ) {
        let mut d = GestureDecoder::with_observer(width, timing, NoopObserver).unwrap();
        let mut sorted = times;
        sorted.sort_unstable();
        for t in sorted {
            prop_assert!(d.push(0, t).is_empty());
            prop_assert!(d.is_quiescent());
        }
    }

    #[test]
    fn masked_out_bits_never_matter(
        width in 1u8..32,
        stream in stream_strategy(),
    ) {
        let timing = TimingConfig::default();
        let mut a = GestureDecoder::with_observer(width, timing, NoopObserver).unwrap();
        let mut b = GestureDecoder::with_observer(width, timing, NoopObserver).unwrap();
        let keep = (1u32 << width) - 1;
        let mut now = 0u64;
        for (mask, dt) in stream {
            now += dt;
            prop_assert_eq!(a.push(mask, now), b.push(mask & keep, now));
        }
    }
}
