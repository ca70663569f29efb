#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Multi-channel touch gesture decoding (hardware-agnostic).
//!
//! Feed [`GestureDecoder::push`] one bitmask of currently-touched channels per
//! sample, stamped with a millisecond time, and read back which channels
//! completed a gesture on that sample. All sensor access goes through
//! `touch_traits::TouchSensor`.
//!
//! ## Architecture
//!
//! - **Channel machine**: per-channel state and transition function (`channel`)
//! - **Decoder**: mask diffing, event dispatch, output aggregation (`decoder`)
//! - **Output**: six gesture flag sets plus short-press durations (`output`)
//! - **Observer**: injected trace hooks instead of a global debug switch (`observer`)
//! - **Sampling**: background sensor polling and the live/replay runners
//!   (`sampler`, `runner`)
//!
//! ## Gestures
//!
//! | Gesture       | Sequence                                         |
//! |---------------|--------------------------------------------------|
//! | short         | short hold, then no touch for `max_idle_short_ms` |
//! | long          | long hold, then no touch for `max_idle_long_ms`   |
//! | double_short  | short hold, short hold                           |
//! | short_long    | short hold, long hold                            |
//! | long_short    | long hold, short hold                            |
//! | double_long   | long hold, long hold                             |

pub mod builder;
pub mod channel;
pub mod conversions;
pub mod decoder;
pub mod error;
pub mod mask;
pub mod mocks;
pub mod observer;
pub mod output;
pub mod runner;
pub mod sampler;
pub mod sensor_error;
pub mod timing;
pub mod util;

pub use builder::DecoderBuilder;
pub use channel::{ChannelState, ChannelStateMachine, Event, Gesture, GestureKind};
pub use decoder::GestureDecoder;
pub use error::{BuildError, DecoderError, Result};
pub use mask::{ChannelMask, MAX_CHANNELS};
pub use observer::{DecoderObserver, NoopObserver, RecordingObserver, TraceRecord, TracingObserver};
pub use output::{DecoderOutput, GestureEvent};
pub use runner::{ReplaySummary, RunParams, RunSummary, Step, StopReason};
pub use sampler::{Sample, Sampler};
pub use sensor_error::map_sensor_error;
pub use timing::TimingConfig;
