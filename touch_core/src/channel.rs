//! Per-channel gesture state machine.
//!
//! Each channel runs the same small machine. A single press is not reported
//! when the finger lifts: the channel parks in `IdleShort`/`IdleLong` and
//! only commits once the matching idle window passes without a second touch.
//! A second touch inside the window turns the pair into a double or compound
//! gesture, reported on its release.
//!
//! ```text
//!            touch               release(short)           tick(> idle short)
//!   Idle ──────────▶ Touched ──────────────────▶ IdleShort ──────────────────▶ Idle  [ShortPress]
//!    ▲                  │   release(long)                │ touch
//!    │                  └───────────────▶ IdleLong       ▼
//!    │                                      │     TouchedShort ── release ──▶ Idle [DoubleShort | ShortLong]
//!    │                                      │ touch
//!    │                                      ▼
//!    └──────────────────────────────── TouchedLong ── release ──▶ Idle [LongShort | DoubleLong]
//! ```
//!
//! `advance` is total: any (state, event) pair without a matching row keeps
//! the state unchanged and emits nothing.

use crate::timing::TimingConfig;

/// Input delivered to one channel on one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The channel went from released to touched on this sample.
    Touch { time: u64 },
    /// The channel went from touched to released on this sample.
    Release { time: u64 },
    /// Nothing changed on this channel; lets idle windows time out.
    Tick { time: u64 },
}

impl Event {
    #[inline]
    pub fn time(&self) -> u64 {
        match *self {
            Event::Touch { time } | Event::Release { time } | Event::Tick { time } => time,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Event::Touch { .. } => "touch",
            Event::Release { .. } => "release",
            Event::Tick { .. } => "tick",
        }
    }
}

/// One classified gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// A single short hold; carries the measured hold duration in ms.
    ShortPress(u64),
    LongPress,
    DoubleShortPress,
    DoubleLongPress,
    /// Short hold followed by a long hold.
    ShortLongPress,
    /// Long hold followed by a short hold.
    LongShortPress,
}

/// Gesture without its payload; indexes the output flag sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureKind {
    ShortPress,
    LongPress,
    DoubleShortPress,
    DoubleLongPress,
    ShortLongPress,
    LongShortPress,
}

impl GestureKind {
    pub const ALL: [GestureKind; 6] = [
        GestureKind::ShortPress,
        GestureKind::LongPress,
        GestureKind::DoubleShortPress,
        GestureKind::DoubleLongPress,
        GestureKind::ShortLongPress,
        GestureKind::LongShortPress,
    ];

    /// Stable lowercase name used in logs and reports.
    pub fn name(self) -> &'static str {
        match self {
            GestureKind::ShortPress => "short",
            GestureKind::LongPress => "long",
            GestureKind::DoubleShortPress => "double_short",
            GestureKind::DoubleLongPress => "double_long",
            GestureKind::ShortLongPress => "short_long",
            GestureKind::LongShortPress => "long_short",
        }
    }
}

impl Gesture {
    pub fn kind(&self) -> GestureKind {
        match self {
            Gesture::ShortPress(_) => GestureKind::ShortPress,
            Gesture::LongPress => GestureKind::LongPress,
            Gesture::DoubleShortPress => GestureKind::DoubleShortPress,
            Gesture::DoubleLongPress => GestureKind::DoubleLongPress,
            Gesture::ShortLongPress => GestureKind::ShortLongPress,
            Gesture::LongShortPress => GestureKind::LongShortPress,
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Hold duration for a plain short press.
    pub fn duration_ms(&self) -> Option<u64> {
        match *self {
            Gesture::ShortPress(d) => Some(d),
            _ => None,
        }
    }
}

/// Current state of one channel, with the data its outgoing guards need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelState {
    #[default]
    Idle,
    Touched {
        entry_time: u64,
    },
    IdleShort {
        entry_time: u64,
        channel: u8,
        press_duration: u64,
    },
    IdleLong {
        entry_time: u64,
        channel: u8,
    },
    TouchedShort {
        entry_time: u64,
    },
    TouchedLong {
        entry_time: u64,
    },
}

impl ChannelState {
    pub fn name(&self) -> &'static str {
        match self {
            ChannelState::Idle => "idle",
            ChannelState::Touched { .. } => "touched",
            ChannelState::IdleShort { .. } => "idle_short",
            ChannelState::IdleLong { .. } => "idle_long",
            ChannelState::TouchedShort { .. } => "touched_short",
            ChannelState::TouchedLong { .. } => "touched_long",
        }
    }

    /// Timestamp at which the current state was entered (`None` for `Idle`).
    pub fn entry_time(&self) -> Option<u64> {
        match *self {
            ChannelState::Idle => None,
            ChannelState::Touched { entry_time }
            | ChannelState::IdleShort { entry_time, .. }
            | ChannelState::IdleLong { entry_time, .. }
            | ChannelState::TouchedShort { entry_time }
            | ChannelState::TouchedLong { entry_time } => Some(entry_time),
        }
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        matches!(self, ChannelState::Idle)
    }

    /// Pure transition: the state after `event` on `channel`, plus the
    /// gesture emitted by that transition, if any.
    pub fn advance(
        self,
        event: Event,
        channel: u8,
        timing: &TimingConfig,
    ) -> (ChannelState, Option<Gesture>) {
        use ChannelState::*;

        match (self, event) {
            (Idle, Event::Touch { time }) => (Touched { entry_time: time }, None),

            (Touched { entry_time }, Event::Release { time }) => {
                match classify_hold(time.saturating_sub(entry_time), timing) {
                    Hold::Bounce => (Idle, None),
                    Hold::Short(press_duration) => (
                        IdleShort {
                            entry_time: time,
                            channel,
                            press_duration,
                        },
                        None,
                    ),
                    Hold::Long => (
                        IdleLong {
                            entry_time: time,
                            channel,
                        },
                        None,
                    ),
                    Hold::Unclassified => (self, None),
                }
            }

            (
                IdleShort {
                    entry_time,
                    press_duration,
                    ..
                },
                Event::Tick { time },
            ) if time.saturating_sub(entry_time) > timing.max_idle_short_ms => {
                (Idle, Some(Gesture::ShortPress(press_duration)))
            }
            (IdleLong { entry_time, .. }, Event::Tick { time })
                if time.saturating_sub(entry_time) > timing.max_idle_long_ms =>
            {
                (Idle, Some(Gesture::LongPress))
            }

            (IdleShort { .. }, Event::Touch { time }) => (TouchedShort { entry_time: time }, None),
            (IdleLong { .. }, Event::Touch { time }) => (TouchedLong { entry_time: time }, None),

            (TouchedShort { entry_time }, Event::Release { time }) => {
                match classify_hold(time.saturating_sub(entry_time), timing) {
                    Hold::Bounce => (Idle, None),
                    Hold::Short(_) => (Idle, Some(Gesture::DoubleShortPress)),
                    Hold::Long => (Idle, Some(Gesture::ShortLongPress)),
                    Hold::Unclassified => (self, None),
                }
            }
            (TouchedLong { entry_time }, Event::Release { time }) => {
                match classify_hold(time.saturating_sub(entry_time), timing) {
                    Hold::Bounce => (Idle, None),
                    Hold::Short(_) => (Idle, Some(Gesture::LongShortPress)),
                    Hold::Long => (Idle, Some(Gesture::DoubleLongPress)),
                    Hold::Unclassified => (self, None),
                }
            }

            (state, _) => (state, None),
        }
    }
}

/// Bucket a hold duration; guards are tried in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hold {
    Bounce,
    Short(u64),
    Long,
    /// `[short_press_ms, long_press_ms)`: no guard matches.
    Unclassified,
}

#[inline]
fn classify_hold(elapsed: u64, t: &TimingConfig) -> Hold {
    if elapsed < t.min_release_ms {
        Hold::Bounce
    } else if elapsed < t.short_press_ms {
        Hold::Short(elapsed)
    } else if elapsed >= t.long_press_ms {
        Hold::Long
    } else {
        Hold::Unclassified
    }
}

/// One channel's machine: its id and its current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelStateMachine {
    channel: u8,
    state: ChannelState,
}

impl ChannelStateMachine {
    pub fn new(channel: u8) -> Self {
        Self {
            channel,
            state: ChannelState::Idle,
        }
    }

    #[inline]
    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// Apply `event`, store the new state, and return the emitted gesture.
    pub fn advance(&mut self, event: Event, timing: &TimingConfig) -> Option<Gesture> {
        let (next, emitted) = self.state.advance(event, self.channel, timing);
        self.state = next;
        emitted
    }

    pub fn reset(&mut self) {
        self.state = ChannelState::Idle;
    }
}
