//! Multi-channel gesture decoder.
//!
//! Each `push` diffs the new touch mask against the previous one, dispatches
//! `Touch`, then `Release`, then `Tick` events to the channel machines in
//! ascending channel order, and collects emitted gestures into a fresh
//! [`DecoderOutput`].

use crate::channel::{ChannelState, ChannelStateMachine, Event};
use crate::error::BuildError;
use crate::mask::{ChannelMask, MAX_CHANNELS};
use crate::observer::{DecoderObserver, TracingObserver};
use crate::output::DecoderOutput;
use crate::timing::TimingConfig;

pub struct GestureDecoder<O: DecoderObserver = TracingObserver> {
    width: u8,
    timing: TimingConfig,
    machines: Vec<ChannelStateMachine>,
    current: ChannelMask,
    touched: ChannelMask,
    released: ChannelMask,
    output: DecoderOutput,
    observer: O,
}

impl<O: DecoderObserver> core::fmt::Debug for GestureDecoder<O> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GestureDecoder")
            .field("width", &self.width)
            .field("timing", &self.timing)
            .field("current", &self.current)
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}

impl GestureDecoder<TracingObserver> {
    /// Decoder for `width` channels that reports trace points through `tracing`.
    pub fn new(width: u8, timing: TimingConfig) -> Result<Self, BuildError> {
        Self::with_observer(width, timing, TracingObserver)
    }
}

impl<O: DecoderObserver> GestureDecoder<O> {
    pub fn with_observer(width: u8, timing: TimingConfig, observer: O) -> Result<Self, BuildError> {
        if width == 0 || width > MAX_CHANNELS {
            return Err(BuildError::InvalidWidth(width));
        }
        Ok(Self {
            width,
            timing,
            machines: (0..width).map(ChannelStateMachine::new).collect(),
            current: ChannelMask::EMPTY,
            touched: ChannelMask::EMPTY,
            released: ChannelMask::EMPTY,
            output: DecoderOutput::new(width),
            observer,
        })
    }

    /// Feed one sample: the set of currently touched channels at `time` (ms).
    ///
    /// Bits at or above the decoder width are ignored. The returned output
    /// stays valid until the next call.
    pub fn push(&mut self, mask: u32, time: u64) -> &DecoderOutput {
        let mask = ChannelMask::from_bits(mask).truncate(self.width);
        let touched = !self.current & mask;
        let released = self.current & !mask;
        self.touched = touched;
        self.released = released;
        self.output.clear();
        self.current = mask;

        for ch in touched {
            self.dispatch(ch, Event::Touch { time });
        }
        for ch in released {
            self.dispatch(ch, Event::Release { time });
        }
        let quiet = !(touched | released) & ChannelMask::full(self.width);
        for ch in quiet {
            self.dispatch(ch, Event::Tick { time });
        }

        &self.output
    }

    fn dispatch(&mut self, channel: u8, event: Event) {
        let Some(machine) = self.machines.get_mut(usize::from(channel)) else {
            return;
        };
        let from = machine.state();
        let emitted = machine.advance(event, &self.timing);
        let to = machine.state();

        if from != to {
            self.observer.on_transition(channel, &from, &to, &event);
        }
        if let Some(gesture) = emitted {
            self.observer.on_gesture(channel, &gesture, event.time());
            self.output.record(channel, gesture);
        }
    }

    /// Return every channel to `Idle` and forget the previous mask.
    ///
    /// Pending single presses are dropped without being reported.
    pub fn reset(&mut self) {
        for m in &mut self.machines {
            m.reset();
        }
        self.current = ChannelMask::EMPTY;
        self.touched = ChannelMask::EMPTY;
        self.released = ChannelMask::EMPTY;
        self.output.clear();
    }

    #[inline]
    pub fn width(&self) -> u8 {
        self.width
    }

    #[inline]
    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// Output of the most recent `push`.
    #[inline]
    pub fn output(&self) -> &DecoderOutput {
        &self.output
    }

    /// Mask passed to the most recent `push`, truncated to the decoder width.
    #[inline]
    pub fn current_mask(&self) -> ChannelMask {
        self.current
    }

    /// Channels that went down on the most recent `push`.
    #[inline]
    pub fn touched(&self) -> ChannelMask {
        self.touched
    }

    /// Channels that went up on the most recent `push`.
    #[inline]
    pub fn released(&self) -> ChannelMask {
        self.released
    }

    pub fn short_press(&self) -> ChannelMask {
        self.output.short_press()
    }
    pub fn long_press(&self) -> ChannelMask {
        self.output.long_press()
    }
    pub fn double_short_press(&self) -> ChannelMask {
        self.output.double_short_press()
    }
    pub fn double_long_press(&self) -> ChannelMask {
        self.output.double_long_press()
    }
    pub fn short_long_press(&self) -> ChannelMask {
        self.output.short_long_press()
    }
    pub fn long_short_press(&self) -> ChannelMask {
        self.output.long_short_press()
    }
    pub fn short_press_time(&self) -> &[u64] {
        self.output.short_press_time()
    }

    /// State of `channel`, or `None` if it is outside the decoder width.
    pub fn state(&self, channel: u8) -> Option<ChannelState> {
        self.machines.get(usize::from(channel)).map(|m| m.state())
    }

    /// True when no channel has a gesture in progress.
    pub fn is_quiescent(&self) -> bool {
        self.machines.iter().all(|m| m.state().is_idle())
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

}
