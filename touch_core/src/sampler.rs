//! Background sensor polling.
//!
//! Spawns a thread that owns the `TouchSensor`, stamps each reading with
//! milliseconds since the sampler's epoch, and forwards it through a bounded
//! channel. Every sample is kept and delivered in order: the decoder has to
//! see each transition, so there is no "latest value only" mode.
//!
//! Each `Sampler` owns exactly one thread, shut down and joined on drop.
use crossbeam_channel as xch;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use touch_traits::TouchSensor;
use touch_traits::clock::Clock;

use crate::error::DecoderError;
use crate::sensor_error::map_sensor_error;

/// Samples buffered between the polling thread and the consumer.
pub const SAMPLE_QUEUE_DEPTH: usize = 256;

/// One reading of the touch controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub time_ms: u64,
    pub mask: u32,
}

pub struct Sampler {
    rx: xch::Receiver<Sample>,
    last_ok: Arc<AtomicU64>,
    read_errors: Arc<AtomicU64>,
    last_error: Arc<Mutex<Option<DecoderError>>>,
    epoch: Instant,
    shutdown: Arc<AtomicBool>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl Sampler {
    /// Poll `sensor` at `hz`, timing with `clock`.
    pub fn spawn<S: TouchSensor + Send + 'static, C: Clock + Send + Sync + 'static>(
        mut sensor: S,
        hz: u32,
        clock: C,
    ) -> Self {
        let (tx, rx) = xch::bounded(SAMPLE_QUEUE_DEPTH);
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_t = shutdown.clone();
        let last_ok = Arc::new(AtomicU64::new(0));
        let last_ok_t = last_ok.clone();
        let read_errors = Arc::new(AtomicU64::new(0));
        let read_errors_t = read_errors.clone();
        let last_error = Arc::new(Mutex::new(None));
        let last_error_t = last_error.clone();
        let period = Duration::from_micros(crate::util::period_us(hz));
        let epoch = clock.now();

        let join_handle = std::thread::spawn(move || {
            'poll: loop {
                if shutdown_t.load(Ordering::Relaxed) {
                    tracing::debug!("sampler thread received shutdown signal");
                    break;
                }

                match sensor.read_touched() {
                    Ok(mask) => {
                        let now = clock.ms_since(epoch);
                        let mut pending = Sample { time_ms: now, mask };
                        // Block while the queue is full, but stay responsive to shutdown.
                        loop {
                            match tx.send_timeout(pending, period) {
                                Ok(()) => break,
                                Err(xch::SendTimeoutError::Timeout(s)) => {
                                    if shutdown_t.load(Ordering::Relaxed) {
                                        break 'poll;
                                    }
                                    pending = s;
                                }
                                Err(xch::SendTimeoutError::Disconnected(_)) => {
                                    tracing::debug!("sampler consumer disconnected, exiting thread");
                                    break 'poll;
                                }
                            }
                        }
                        last_ok_t.store(now, Ordering::Relaxed);
                    }
                    Err(e) => {
                        let mapped = map_sensor_error(&*e);
                        let n = read_errors_t.fetch_add(1, Ordering::Relaxed) + 1;
                        tracing::warn!(error = %mapped, read_errors = n, "touch sensor read failed");
                        if let Ok(mut slot) = last_error_t.lock() {
                            *slot = Some(mapped);
                        }
                    }
                }

                if shutdown_t.load(Ordering::Relaxed) {
                    break;
                }
                clock.sleep(period);
            }
            tracing::trace!("sampler thread exiting cleanly");
        });

        Self {
            rx,
            last_ok,
            read_errors,
            last_error,
            epoch,
            shutdown,
            join_handle: Some(join_handle),
        }
    }

    /// Instant that sample timestamps are measured from.
    pub fn epoch(&self) -> Instant {
        self.epoch
    }

    /// Wait up to `timeout` for the next sample.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Sample> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// All samples queued so far, oldest first, without blocking.
    pub fn drain(&self) -> impl Iterator<Item = Sample> + '_ {
        self.rx.try_iter()
    }

    /// Milliseconds since the last successful read, as seen at `now_ms`.
    pub fn stalled_for(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_ok.load(Ordering::Relaxed))
    }

    /// Number of failed sensor reads.
    pub fn read_errors(&self) -> u64 {
        self.read_errors.load(Ordering::Relaxed)
    }

    /// Most recent read failure, if any.
    pub fn last_error(&self) -> Option<DecoderError> {
        self.last_error.lock().ok().and_then(|g| g.clone())
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);

        // The thread exits between reads, or after its current read/send
        // attempt returns (bounded by one polling period while the queue is full).
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => tracing::trace!("sampler thread joined"),
                Err(e) => tracing::warn!(?e, "sampler thread panicked during shutdown"),
            }
        }
    }
}
