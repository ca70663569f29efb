use std::time::Duration;

use rppal::i2c::I2c;
use tracing::{debug, trace, warn};

use crate::error::{HwError, Result};
use crate::util::wait_until_with_timeout;

/// Electrodes on one controller.
pub const ELECTRODES: u8 = 12;
/// Address with ADDR tied to GND (0x5B: 3.3V, 0x5C: SDA, 0x5D: SCL).
pub const DEFAULT_ADDRESS: u16 = 0x5A;

mod reg {
    pub const TOUCH_STATUS: u8 = 0x00;
    /// First of the eleven baseline filter registers (MHDR..FDLT).
    pub const MHDR: u8 = 0x2B;
    pub const TOUCH_THRESHOLD_0: u8 = 0x41;
    pub const RELEASE_THRESHOLD_0: u8 = 0x42;
    pub const DEBOUNCE: u8 = 0x5B;
    pub const CONFIG1: u8 = 0x5C;
    pub const CONFIG2: u8 = 0x5D;
    pub const ECR: u8 = 0x5E;
    pub const SOFT_RESET: u8 = 0x80;
}

/// MHDR, NHDR, NCLR, FDLR, MHDF, NHDF, NCLF, FDLF, NHDT, NCLT, FDLT.
const FILTER_DEFAULTS: [u8; 11] = [0x01, 0x01, 0x0E, 0x00, 0x01, 0x05, 0x01, 0x00, 0x00, 0x00, 0x00];
const SOFT_RESET_MAGIC: u8 = 0x63;
/// CONFIG2 value after a soft reset.
const CONFIG2_RESET: u8 = 0x24;
/// Baseline tracking on, all twelve electrodes enabled.
const ECR_RUN: u8 = 0x8F;
const TOUCH_MASK: u16 = 0x0FFF;
const READ_RETRIES: u32 = 3;

#[derive(Debug, Clone, Copy)]
pub struct Mpr121Config {
    pub bus: u8,
    pub address: u16,
    pub touch_threshold: u8,
    pub release_threshold: u8,
    pub reset_timeout: Duration,
}

impl Default for Mpr121Config {
    fn default() -> Self {
        Self {
            bus: 1,
            address: DEFAULT_ADDRESS,
            touch_threshold: 12,
            release_threshold: 6,
            reset_timeout: Duration::from_millis(50),
        }
    }
}

fn map_i2c(e: rppal::i2c::Error) -> HwError {
    match e {
        rppal::i2c::Error::Io(io) if io.kind() == std::io::ErrorKind::TimedOut => HwError::Timeout,
        rppal::i2c::Error::Io(io) => HwError::Io(io),
        other => HwError::I2c(other.to_string()),
    }
}

pub struct Mpr121 {
    i2c: I2c,
    address: u16,
}

impl Mpr121 {
    /// Open the bus, reset the controller and start touch detection.
    pub fn open(cfg: &Mpr121Config) -> Result<Self> {
        let mut i2c = I2c::with_bus(cfg.bus).map_err(map_i2c)?;
        i2c.set_slave_address(cfg.address).map_err(map_i2c)?;
        let mut dev = Self {
            i2c,
            address: cfg.address,
        };
        dev.init(cfg)?;
        debug!(bus = cfg.bus, address = cfg.address, "mpr121 ready");
        Ok(dev)
    }

    fn write(&mut self, register: u8, value: u8) -> Result<()> {
        self.i2c
            .smbus_write_byte(register, value)
            .map_err(map_i2c)
    }

    fn read(&mut self, register: u8) -> Result<u8> {
        self.i2c.smbus_read_byte(register).map_err(map_i2c)
    }

    fn init(&mut self, cfg: &Mpr121Config) -> Result<()> {
        let address = self.address;
        let not_found = |e: HwError| match e {
            HwError::Timeout | HwError::Io(_) => HwError::NotFound { address },
            other => other,
        };

        self.write(reg::SOFT_RESET, SOFT_RESET_MAGIC)
            .map_err(not_found)?;
        // Electrodes must be stopped while configuring.
        self.write(reg::ECR, 0x00)?;
        wait_until_with_timeout(
            || Ok(self.read(reg::CONFIG2)? == CONFIG2_RESET),
            cfg.reset_timeout,
            Duration::from_millis(1),
        )
        .map_err(not_found)?;

        for i in 0..ELECTRODES {
            self.write(reg::TOUCH_THRESHOLD_0 + 2 * i, cfg.touch_threshold)?;
            self.write(reg::RELEASE_THRESHOLD_0 + 2 * i, cfg.release_threshold)?;
        }
        for (offset, value) in (0u8..).zip(FILTER_DEFAULTS) {
            self.write(reg::MHDR + offset, value)?;
        }
        self.write(reg::DEBOUNCE, 0x00)?;
        // 16 uA charge current, 0.5 us charge time, 1 ms sample interval.
        self.write(reg::CONFIG1, 0x10)?;
        self.write(reg::CONFIG2, 0x20)?;
        self.write(reg::ECR, ECR_RUN)?;
        Ok(())
    }

    /// Touch status of the twelve electrodes, bit `i` for electrode `i`.
    pub fn touched(&mut self) -> Result<u16> {
        let raw = self
            .i2c
            .smbus_read_word(reg::TOUCH_STATUS)
            .map_err(map_i2c)?;
        trace!(raw, "mpr121 touch status");
        Ok(raw & TOUCH_MASK)
    }
}

impl touch_traits::TouchSensor for Mpr121 {
    fn width(&self) -> u8 {
        ELECTRODES
    }

    fn read_touched(&mut self) -> std::result::Result<u32, Box<dyn std::error::Error + Send + Sync>> {
        let mut attempts = 0;
        loop {
            match self.touched() {
                Ok(mask) => return Ok(u32::from(mask)),
                Err(HwError::Timeout | HwError::Io(_)) if attempts < READ_RETRIES => {
                    attempts += 1;
                    warn!(retries = attempts, "touch status read failed, retrying");
                }
                Err(e) => {
                    tracing::error!("touch status read error: {}", e);
                    return Err(Box::new(e));
                }
            }
        }
    }
}
