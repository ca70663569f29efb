//! Trace hooks invoked by the decoder at state entry and gesture emission.
//!
//! The decoder owns one observer and calls it only when a channel actually
//! changes state or emits a gesture; quiet ticks are never reported.

use crate::channel::{ChannelState, Event, Gesture};

pub trait DecoderObserver {
    /// `channel` moved from `from` to `to` while handling `event`.
    fn on_transition(
        &mut self,
        _channel: u8,
        _from: &ChannelState,
        _to: &ChannelState,
        _event: &Event,
    ) {
    }

    /// `channel` emitted `gesture` on the sample stamped `time`.
    fn on_gesture(&mut self, _channel: u8, _gesture: &Gesture, _time: u64) {}
}

impl<O: DecoderObserver + ?Sized> DecoderObserver for &mut O {
    fn on_transition(&mut self, channel: u8, from: &ChannelState, to: &ChannelState, event: &Event) {
        (**self).on_transition(channel, from, to, event);
    }

    fn on_gesture(&mut self, channel: u8, gesture: &Gesture, time: u64) {
        (**self).on_gesture(channel, gesture, time);
    }
}

impl<O: DecoderObserver + ?Sized> DecoderObserver for Box<O> {
    fn on_transition(&mut self, channel: u8, from: &ChannelState, to: &ChannelState, event: &Event) {
        (**self).on_transition(channel, from, to, event);
    }

    fn on_gesture(&mut self, channel: u8, gesture: &Gesture, time: u64) {
        (**self).on_gesture(channel, gesture, time);
    }
}

/// Ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl DecoderObserver for NoopObserver {}

/// Forwards transitions (`trace`) and gestures (`debug`) to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl DecoderObserver for TracingObserver {
    fn on_transition(&mut self, channel: u8, from: &ChannelState, to: &ChannelState, event: &Event) {
        tracing::trace!(
            channel,
            from = from.name(),
            to = to.name(),
            event = event.name(),
            time_ms = event.time(),
            elapsed_ms = from.entry_time().map(|t| event.time().saturating_sub(t)),
            "channel transition"
        );
    }

    fn on_gesture(&mut self, channel: u8, gesture: &Gesture, time: u64) {
        tracing::debug!(
            channel,
            gesture = gesture.name(),
            duration_ms = gesture.duration_ms(),
            time_ms = time,
            "gesture"
        );
    }
}

/// One observed trace point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceRecord {
    Transition {
        channel: u8,
        from: ChannelState,
        to: ChannelState,
        event: Event,
    },
    Gesture {
        channel: u8,
        gesture: Gesture,
        time: u64,
    },
}

/// Keeps every trace point in memory, in call order.
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    pub records: Vec<TraceRecord>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gestures only, as `(channel, gesture, time)`.
    pub fn gestures(&self) -> Vec<(u8, Gesture, u64)> {
        self.records
            .iter()
            .filter_map(|r| match *r {
                TraceRecord::Gesture {
                    channel,
                    gesture,
                    time,
                } => Some((channel, gesture, time)),
                TraceRecord::Transition { .. } => None,
            })
            .collect()
    }

    /// Sequence of state names entered by `channel`.
    pub fn states_of(&self, channel: u8) -> Vec<&'static str> {
        self.records
            .iter()
            .filter_map(|r| match r {
                TraceRecord::Transition { channel: c, to, .. } if *c == channel => Some(to.name()),
                _ => None,
            })
            .collect()
    }
}

impl DecoderObserver for RecordingObserver {
    fn on_transition(&mut self, channel: u8, from: &ChannelState, to: &ChannelState, event: &Event) {
        self.records.push(TraceRecord::Transition {
            channel,
            from: *from,
            to: *to,
            event: *event,
        });
    }

    fn on_gesture(&mut self, channel: u8, gesture: &Gesture, time: u64) {
        self.records.push(TraceRecord::Gesture {
            channel,
            gesture: *gesture,
            time,
        });
    }
}
