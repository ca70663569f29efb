pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Channels addressable in one reading (bits of a `u32` mask).
pub const MAX_CHANNELS: u8 = 32;

/// A capacitive touch controller that reports which of its channels are
/// currently touched.
pub trait TouchSensor {
    /// Number of channels the sensor reports (bit `i` of a reading is channel `i`).
    fn width(&self) -> u8;

    /// Read the current touch status bitmask.
    fn read_touched(&mut self) -> Result<u32, Box<dyn std::error::Error + Send + Sync>>;
}

impl<T: TouchSensor + ?Sized> TouchSensor for Box<T> {
    fn width(&self) -> u8 {
        (**self).width()
    }

    fn read_touched(&mut self) -> Result<u32, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read_touched()
    }
}
