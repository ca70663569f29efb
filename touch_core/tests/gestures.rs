//! End-to-end gesture sequences through `GestureDecoder::push`.

use rstest::rstest;
use touch_core::{
    ChannelMask, ChannelState, Gesture, GestureDecoder, GestureKind, NoopObserver, TimingConfig,
};

fn decoder(width: u8) -> GestureDecoder<NoopObserver> {
    GestureDecoder::with_observer(width, TimingConfig::default(), NoopObserver).unwrap()
}

/// Push `(mask, time)` pairs and collect every emitted `(time, channel, gesture)`.
fn run(d: &mut GestureDecoder<NoopObserver>, steps: &[(u32, u64)]) -> Vec<(u64, u8, Gesture)> {
    let mut seen = Vec::new();
    for &(mask, time) in steps {
        let out = d.push(mask, time);
        seen.extend(out.events().map(|e| (time, e.channel, e.gesture)));
    }
    seen
}

/// Quiet pushes every 10 ms over `[from, to]` with `mask` held.
fn hold(mask: u32, from: u64, to: u64) -> Vec<(u32, u64)> {
    (from..=to).step_by(10).map(|t| (mask, t)).collect()
}

#[test]
fn short_press_commits_after_idle_window() {
    let mut d = decoder(1);
    assert!(d.push(1, 0).is_empty());
    assert!(d.push(0, 100).is_empty());
    assert!(matches!(d.state(0), Some(ChannelState::IdleShort { .. })));

    // 600 - 100 == max_idle_short_ms: not yet
    assert!(d.push(0, 600).is_empty());
    let out = d.push(0, 601);
    assert!(out.short_press().test(0));
    assert_eq!(out.short_press_duration(0), Some(100));
    assert_eq!(out.short_press_time()[0], 100);
    assert!(d.is_quiescent());
}

#[rstest]
#[case::double_short(&[(1, 0), (0, 100), (1, 200), (0, 260)], Gesture::DoubleShortPress, 260)]
#[case::short_long(&[(1, 0), (0, 100), (1, 200), (0, 550)], Gesture::ShortLongPress, 550)]
#[case::long_short(&[(1, 0), (0, 400), (1, 900), (0, 1000)], Gesture::LongShortPress, 1000)]
#[case::double_long(&[(1, 0), (0, 400), (1, 900), (0, 1300)], Gesture::DoubleLongPress, 1300)]
fn compound_gestures_fire_on_second_release(
    #[case] steps: &[(u32, u64)],
    #[case] expected: Gesture,
    #[case] at: u64,
) {
    let mut d = decoder(1);
    let seen = run(&mut d, steps);
    assert_eq!(seen, vec![(at, 0, expected)]);
    assert!(d.is_quiescent());

    // Nothing trails the compound gesture.
    let later = run(&mut d, &hold(0, at + 10, at + 3000));
    assert!(later.is_empty());
}

#[test]
fn bounce_is_ignored() {
    let mut d = decoder(1);
    let mut steps = vec![(1, 0), (0, 10)];
    steps.extend(hold(0, 20, 3000));
    assert!(run(&mut d, &steps).is_empty());
    assert!(d.is_quiescent());
}

#[test]
fn long_press_commits_after_long_idle_window() {
    let mut d = decoder(1);
    d.push(1, 0);
    d.push(0, 350);
    assert!(matches!(d.state(0), Some(ChannelState::IdleLong { .. })));
    assert!(d.push(0, 1350).is_empty());
    let out = d.push(0, 1351);
    assert!(out.long_press().test(0));
    assert_eq!(out.short_press_time()[0], 0);
}

#[test]
fn bounce_on_second_hold_drops_the_first_press() {
    let mut d = decoder(1);
    let mut steps = vec![(1, 0), (0, 100), (1, 200), (0, 210)];
    steps.extend(hold(0, 220, 3000));
    assert!(run(&mut d, &steps).is_empty());
}

#[test]
fn all_channels_decode_independently() {
    let mut d = decoder(12);
    d.push(0x0FFF, 0);
    d.push(0, 120);
    let mut fired = None;
    for t in (130..=700).step_by(10) {
        let out = d.push(0, t);
        if !out.is_empty() {
            assert!(fired.is_none(), "flags set on more than one push");
            fired = Some((t, out.clone()));
        }
    }
    let (t, out) = fired.expect("short presses committed");
    assert_eq!(t, 630);
    assert_eq!(out.short_press(), ChannelMask::full(12));
    assert!(out.short_press_time().iter().all(|d| *d == 120));
    assert_eq!(out.events().count(), 12);
}

#[test]
fn unchanged_mask_sets_flag_on_exactly_one_push() {
    let mut d = decoder(1);
    d.push(1, 0);
    d.push(0, 100);
    let flagged: Vec<u64> = hold(0, 110, 2000)
        .into_iter()
        .filter(|&(m, t)| !d.push(m, t).is_empty())
        .map(|(_, t)| t)
        .collect();
    assert_eq!(flagged, vec![610]);
}

#[test]
fn interleaved_channels_report_their_own_gestures() {
    let mut d = decoder(4);
    let steps = [
        (0b0001, 0),   // ch0 down
        (0b0011, 50),  // ch1 down
        (0b0010, 150), // ch0 up: short (150)
        (0b0000, 500), // ch1 up: long (450)
    ];
    let mut seen = run(&mut d, &steps);
    seen.extend(run(&mut d, &hold(0, 510, 2000)));
    assert_eq!(
        seen,
        vec![
            (660, 0, Gesture::ShortPress(150)),
            (1510, 1, Gesture::LongPress),
        ]
    );
}

#[test]
fn simultaneous_touch_and_release_on_different_channels() {
    let mut d = decoder(2);
    d.push(0b01, 0);
    d.push(0b10, 100); // ch0 released, ch1 touched in one sample
    assert_eq!(d.touched().bits(), 0b10);
    assert_eq!(d.released().bits(), 0b01);
    assert!(matches!(d.state(0), Some(ChannelState::IdleShort { .. })));
    assert!(matches!(d.state(1), Some(ChannelState::Touched { entry_time: 100 })));
}

#[test]
fn hold_between_short_and_long_stays_touched() {
    let timing = TimingConfig {
        long_press_ms: 400,
        ..TimingConfig::default()
    };
    let mut d = GestureDecoder::with_observer(1, timing, NoopObserver).unwrap();
    d.push(1, 0);
    d.push(0, 350);
    assert_eq!(d.state(0), Some(ChannelState::Touched { entry_time: 0 }));
    assert!(run(&mut d, &hold(0, 360, 5000)).is_empty());

    // The next release is measured from the original touch.
    d.push(1, 6000);
    assert_eq!(d.state(0), Some(ChannelState::Touched { entry_time: 0 }));
    d.push(0, 6010);
    assert!(matches!(d.state(0), Some(ChannelState::IdleLong { entry_time: 6010, .. })));
}

#[test]
fn touch_after_expired_window_without_tick_still_combines() {
    let mut d = decoder(1);
    d.push(1, 0);
    d.push(0, 100);
    // No quiet sample between release and the next touch: the channel sees
    // Touch before any Tick could expire the window.
    d.push(1, 900);
    assert!(matches!(d.state(0), Some(ChannelState::TouchedShort { .. })));
    let out = d.push(0, 950);
    assert!(out.double_short_press().test(0));
}

#[test]
fn bits_above_width_are_ignored() {
    let mut d = decoder(4);
    let mut steps = vec![(0xFFFF_FFF1, 0), (0xFFFF_FFF0, 100)];
    steps.extend(hold(0xFFFF_FFF0, 110, 700));
    let seen = run(&mut d, &steps);
    assert_eq!(seen, vec![(610, 0, Gesture::ShortPress(100))]);
    assert_eq!(d.current_mask().bits(), 0);
}

#[test]
fn output_is_cleared_on_next_push() {
    let mut d = decoder(1);
    d.push(1, 0);
    d.push(0, 100);
    assert!(d.push(0, 601).short_press().test(0));
    assert!(d.short_press().test(0));
    let out = d.push(0, 611);
    assert!(out.is_empty());
    assert_eq!(out.short_press_time(), &[0]);
    for kind in GestureKind::ALL {
        assert!(d.output().mask(kind).is_empty());
    }
}

#[test]
fn builder_decoder_matches_direct_construction() {
    let mut a = GestureDecoder::builder()
        .with_width(3)
        .with_observer(NoopObserver)
        .build()
        .unwrap();
    let mut b = decoder(3);
    let steps = [(0b101, 0), (0b001, 120), (0, 450)];
    for (m, t) in steps.into_iter().chain(hold(0, 460, 2000)) {
        assert_eq!(a.push(m, t), b.push(m, t));
    }
}
