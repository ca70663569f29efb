//! Per-sample decoder output.

use crate::channel::{Gesture, GestureKind};
use crate::mask::ChannelMask;

/// One gesture attributed to one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureEvent {
    pub channel: u8,
    pub gesture: Gesture,
}

/// Gestures produced by the most recent `push`.
///
/// Six flag sets (bit `i` set means channel `i` produced that gesture on this
/// sample) and the hold duration of every plain short press. The value is
/// reset at the start of each `push`, so callers must consume it before the
/// next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderOutput {
    short_press: ChannelMask,
    long_press: ChannelMask,
    double_short_press: ChannelMask,
    double_long_press: ChannelMask,
    short_long_press: ChannelMask,
    long_short_press: ChannelMask,
    short_press_time: Vec<u64>,
}

impl DecoderOutput {
    pub fn new(width: u8) -> Self {
        Self {
            short_press: ChannelMask::EMPTY,
            long_press: ChannelMask::EMPTY,
            double_short_press: ChannelMask::EMPTY,
            double_long_press: ChannelMask::EMPTY,
            short_long_press: ChannelMask::EMPTY,
            long_short_press: ChannelMask::EMPTY,
            short_press_time: vec![0; usize::from(width)],
        }
    }

    /// Zero every flag and duration, keeping the allocation.
    pub(crate) fn clear(&mut self) {
        for kind in GestureKind::ALL {
            *self.mask_mut(kind) = ChannelMask::EMPTY;
        }
        self.short_press_time.fill(0);
    }

    pub(crate) fn record(&mut self, channel: u8, gesture: Gesture) {
        if let Gesture::ShortPress(d) = gesture
            && let Some(slot) = self.short_press_time.get_mut(usize::from(channel))
        {
            *slot = d;
        }
        self.mask_mut(gesture.kind()).set(channel);
    }

    fn mask_mut(&mut self, kind: GestureKind) -> &mut ChannelMask {
        match kind {
            GestureKind::ShortPress => &mut self.short_press,
            GestureKind::LongPress => &mut self.long_press,
            GestureKind::DoubleShortPress => &mut self.double_short_press,
            GestureKind::DoubleLongPress => &mut self.double_long_press,
            GestureKind::ShortLongPress => &mut self.short_long_press,
            GestureKind::LongShortPress => &mut self.long_short_press,
        }
    }

    /// Flag set for one gesture kind.
    pub fn mask(&self, kind: GestureKind) -> ChannelMask {
        match kind {
            GestureKind::ShortPress => self.short_press,
            GestureKind::LongPress => self.long_press,
            GestureKind::DoubleShortPress => self.double_short_press,
            GestureKind::DoubleLongPress => self.double_long_press,
            GestureKind::ShortLongPress => self.short_long_press,
            GestureKind::LongShortPress => self.long_short_press,
        }
    }

    pub fn short_press(&self) -> ChannelMask {
        self.short_press
    }
    pub fn long_press(&self) -> ChannelMask {
        self.long_press
    }
    pub fn double_short_press(&self) -> ChannelMask {
        self.double_short_press
    }
    pub fn double_long_press(&self) -> ChannelMask {
        self.double_long_press
    }
    pub fn short_long_press(&self) -> ChannelMask {
        self.short_long_press
    }
    pub fn long_short_press(&self) -> ChannelMask {
        self.long_short_press
    }

    /// Hold durations indexed by channel; 0 where no short press fired.
    pub fn short_press_time(&self) -> &[u64] {
        &self.short_press_time
    }

    /// Hold duration of `channel`'s short press on this sample, if it had one.
    pub fn short_press_duration(&self, channel: u8) -> Option<u64> {
        if self.short_press.test(channel) {
            self.short_press_time.get(usize::from(channel)).copied()
        } else {
            None
        }
    }

    /// Union of all six flag sets.
    pub fn any(&self) -> ChannelMask {
        GestureKind::ALL
            .iter()
            .fold(ChannelMask::EMPTY, |acc, k| acc | self.mask(*k))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.any().is_empty()
    }

    /// Every gesture of this sample, ascending by channel.
    pub fn events(&self) -> impl Iterator<Item = GestureEvent> + '_ {
        self.any().iter().flat_map(move |channel| {
            GestureKind::ALL
                .into_iter()
                .filter(move |k| self.mask(*k).test(channel))
                .map(move |kind| GestureEvent {
                    channel,
                    gesture: self.gesture_of(kind, channel),
                })
        })
    }

    fn gesture_of(&self, kind: GestureKind, channel: u8) -> Gesture {
        match kind {
            GestureKind::ShortPress => {
                Gesture::ShortPress(self.short_press_duration(channel).unwrap_or(0))
            }
            GestureKind::LongPress => Gesture::LongPress,
            GestureKind::DoubleShortPress => Gesture::DoubleShortPress,
            GestureKind::DoubleLongPress => Gesture::DoubleLongPress,
            GestureKind::ShortLongPress => Gesture::ShortLongPress,
            GestureKind::LongShortPress => Gesture::LongShortPress,
        }
    }
}
