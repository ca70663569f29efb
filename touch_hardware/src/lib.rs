//! Touch controller drivers.
//!
//! - `SimulatedSensor` replays a timed script and needs no hardware.
//! - `Mpr121` (feature `hardware`) drives an MPR121 over Linux I2C.
pub mod error;
#[cfg(feature = "hardware")]
pub mod mpr121;
pub mod sim;
pub mod util;

#[cfg(feature = "hardware")]
pub use mpr121::{Mpr121, Mpr121Config};
pub use sim::{SimulatedSensor, parse_script};
