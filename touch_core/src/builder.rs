//! Type-state builder for `GestureDecoder`.
//!
//! `build()` is only available once a width has been set; `try_build()` is
//! always available and reports a missing width as `BuildError::MissingWidth`.

use std::marker::PhantomData;

use crate::decoder::GestureDecoder;
use crate::error::{BuildError, Result};
use crate::observer::{DecoderObserver, TracingObserver};
use crate::timing::TimingConfig;

#[derive(Debug, Default, Clone, Copy)]
pub struct Missing;
#[derive(Debug, Default, Clone, Copy)]
pub struct Set;

pub struct DecoderBuilder<W, O: DecoderObserver = TracingObserver> {
    width: Option<u8>,
    timing: TimingConfig,
    observer: O,
    _w: PhantomData<W>,
}

impl Default for DecoderBuilder<Missing, TracingObserver> {
    fn default() -> Self {
        Self {
            width: None,
            timing: TimingConfig::default(),
            observer: TracingObserver,
            _w: PhantomData,
        }
    }
}

impl GestureDecoder<TracingObserver> {
    /// Start building a decoder.
    pub fn builder() -> DecoderBuilder<Missing, TracingObserver> {
        DecoderBuilder::default()
    }
}

impl<W, O: DecoderObserver> DecoderBuilder<W, O> {
    pub fn with_width(self, width: u8) -> DecoderBuilder<Set, O> {
        DecoderBuilder {
            width: Some(width),
            timing: self.timing,
            observer: self.observer,
            _w: PhantomData,
        }
    }

    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    /// Replace the trace observer.
    pub fn with_observer<P: DecoderObserver>(self, observer: P) -> DecoderBuilder<W, P> {
        DecoderBuilder {
            width: self.width,
            timing: self.timing,
            observer,
            _w: PhantomData,
        }
    }

    pub fn try_build(self) -> Result<GestureDecoder<O>> {
        let width = self
            .width
            .ok_or_else(|| eyre::Report::new(BuildError::MissingWidth))?;
        let decoder = GestureDecoder::with_observer(width, self.timing, self.observer)?;
        if decoder.timing().has_unclassified_band() {
            tracing::debug!(
                short_press_ms = decoder.timing().short_press_ms,
                long_press_ms = decoder.timing().long_press_ms,
                "holds between short and long thresholds will not be classified"
            );
        }
        Ok(decoder)
    }
}

impl<O: DecoderObserver> DecoderBuilder<Set, O> {
    pub fn build(self) -> Result<GestureDecoder<O>> {
        self.try_build()
    }
}
