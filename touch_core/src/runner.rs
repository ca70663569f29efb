//! Drive a decoder from a live sensor or from a recorded trace.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use touch_traits::TouchSensor;
use touch_traits::clock::Clock;

use crate::decoder::GestureDecoder;
use crate::error::{DecoderError, Result as CoreResult};
use crate::mask::ChannelMask;
use crate::observer::DecoderObserver;
use crate::output::DecoderOutput;
use crate::sampler::{SAMPLE_QUEUE_DEPTH, Sample, Sampler};

/// Knobs for a live run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunParams {
    pub poll_hz: u32,
    /// Fail when no read has succeeded for this long (0 disables).
    pub stall_ms: u64,
    /// Stop cleanly after this long.
    pub max_run_ms: Option<u64>,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            poll_hz: 100,
            stall_ms: 1000,
            max_run_ms: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Shutdown,
    MaxRuntime,
}

impl StopReason {
    pub fn name(self) -> &'static str {
        match self {
            StopReason::Shutdown => "shutdown",
            StopReason::MaxRuntime => "max_runtime",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub samples: u64,
    pub gestures: u64,
    pub read_errors: u64,
    pub elapsed_ms: u64,
    pub stop: StopReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplaySummary {
    pub samples: u64,
    pub gestures: u64,
    /// Timestamp of the last sample pushed, including the settle sample.
    pub last_time_ms: u64,
    pub settled: bool,
}

/// What one pushed sample produced.
#[derive(Debug, Clone, Copy)]
pub struct Step<'a> {
    pub sample: Sample,
    /// Channels whose touch ended at this sample.
    pub released: ChannelMask,
    pub output: &'a DecoderOutput,
}

/// Push one sample and hand it to `on_step` when it released a channel or
/// emitted a gesture.
///
/// Returns the number of gestures emitted.
#[inline]
fn feed<O, F>(decoder: &mut GestureDecoder<O>, sample: Sample, on_step: &mut F) -> u64
where
    O: DecoderObserver,
    F: FnMut(&Step<'_>),
{
    decoder.push(sample.mask, sample.time_ms);
    let step = Step {
        sample,
        released: decoder.released(),
        output: decoder.output(),
    };
    if step.output.is_empty() && step.released.is_empty() {
        return 0;
    }
    on_step(&step);
    step.output.events().count() as u64
}

/// Poll `sensor` through a [`Sampler`] until `shutdown` is raised, the
/// optional run limit elapses, or the sensor stalls.
///
/// Samples stamped after `max_run_ms` are never decoded; samples already
/// queued when a clean stop is detected still are. A stall fails with the
/// most recent sensor error, or [`DecoderError::Timeout`] when reads never
/// failed outright.
pub fn run<S, C, O, F>(
    sensor: S,
    decoder: &mut GestureDecoder<O>,
    params: RunParams,
    clock: C,
    shutdown: &AtomicBool,
    mut on_step: F,
) -> CoreResult<RunSummary>
where
    S: TouchSensor + Send + 'static,
    C: Clock + Clone + Send + Sync + 'static,
    O: DecoderObserver,
    F: FnMut(&Step<'_>),
{
    if !crate::util::resolves_hold(params.poll_hz, decoder.timing().min_release_ms) {
        tracing::warn!(
            poll_hz = params.poll_hz,
            min_release_ms = decoder.timing().min_release_ms,
            "polling period exceeds the bounce threshold; quick taps may be missed"
        );
    }
    let sensor_width = sensor.width();
    if sensor_width < decoder.width() {
        tracing::warn!(
            sensor_width,
            decoder_width = decoder.width(),
            "decoder is wider than the sensor; upper channels never fire"
        );
    }

    let wait = Duration::from_millis(crate::util::period_ms(params.poll_hz));
    let sampler = Sampler::spawn(sensor, params.poll_hz, clock.clone());
    let epoch = sampler.epoch();

    tracing::info!(
        poll_hz = params.poll_hz,
        stall_ms = params.stall_ms,
        max_run_ms = params.max_run_ms,
        channels = decoder.width(),
        "touch run start"
    );

    let within_limit = |s: &Sample| params.max_run_ms.is_none_or(|max| s.time_ms <= max);
    let mut samples: u64 = 0;
    let mut gestures: u64 = 0;
    let stop = 'run: loop {
        if shutdown.load(Ordering::Relaxed) {
            break StopReason::Shutdown;
        }

        let batch = sampler
            .recv_timeout(wait)
            .into_iter()
            .chain(sampler.drain().take(SAMPLE_QUEUE_DEPTH));
        for s in batch {
            if !within_limit(&s) {
                break 'run StopReason::MaxRuntime;
            }
            samples += 1;
            gestures += feed(decoder, s, &mut on_step);
        }

        let now = clock.ms_since(epoch);
        if let Some(max) = params.max_run_ms
            && now >= max
        {
            break StopReason::MaxRuntime;
        }

        if params.stall_ms > 0 && sampler.stalled_for(now) > params.stall_ms {
            let err = sampler.last_error().unwrap_or(DecoderError::Timeout);
            tracing::error!(
                error = %err,
                stalled_ms = sampler.stalled_for(now),
                read_errors = sampler.read_errors(),
                "touch sensor stalled"
            );
            return Err(crate::error::Report::new(err));
        }
    };

    // Decode what was already queued, up to the run limit.
    for s in sampler
        .drain()
        .take(SAMPLE_QUEUE_DEPTH)
        .take_while(|s| within_limit(s))
    {
        samples += 1;
        gestures += feed(decoder, s, &mut on_step);
    }

    let summary = RunSummary {
        samples,
        gestures,
        read_errors: sampler.read_errors(),
        elapsed_ms: clock.ms_since(epoch),
        stop,
    };
    tracing::info!(
        samples = summary.samples,
        gestures = summary.gestures,
        read_errors = summary.read_errors,
        elapsed_ms = summary.elapsed_ms,
        stop = stop.name(),
        "touch run stopped"
    );
    Ok(summary)
}

/// Push recorded samples through `decoder` in order.
///
/// With `settle`, one extra sample carrying the last mask is pushed at
/// `last_time + timing.settle_ms()` so that pending single presses resolve.
/// An empty trace pushes nothing, even with `settle`.
pub fn replay<I, O, F>(
    samples: I,
    decoder: &mut GestureDecoder<O>,
    settle: bool,
    mut on_step: F,
) -> ReplaySummary
where
    I: IntoIterator<Item = Sample>,
    O: DecoderObserver,
    F: FnMut(&Step<'_>),
{
    let mut summary = ReplaySummary::default();
    let mut last: Option<Sample> = None;
    for s in samples {
        if let Some(prev) = last
            && s.time_ms < prev.time_ms
        {
            tracing::warn!(
                time_ms = s.time_ms,
                prev_ms = prev.time_ms,
                "replay sample goes back in time"
            );
        }
        summary.samples += 1;
        summary.gestures += feed(decoder, s, &mut on_step);
        summary.last_time_ms = s.time_ms;
        last = Some(s);
    }

    if settle && let Some(prev) = last {
        let s = Sample {
            time_ms: prev.time_ms.saturating_add(decoder.timing().settle_ms()),
            mask: prev.mask,
        };
        summary.samples += 1;
        summary.gestures += feed(decoder, s, &mut on_step);
        summary.last_time_ms = s.time_ms;
        summary.settled = true;
    }

    tracing::debug!(
        samples = summary.samples,
        gestures = summary.gestures,
        settled = summary.settled,
        "replay finished"
    );
    summary
}
