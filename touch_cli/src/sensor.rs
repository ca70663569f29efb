//! Sensor selection: MPR121 with the `hardware` feature, scripted sim otherwise.

use eyre::WrapErr;
use touch_hardware::SimulatedSensor;
use touch_traits::TouchSensor;

/// Script for the simulated sensor, e.g. `0:0x1,100:0` (test hook).
pub const SIM_SCRIPT_ENV: &str = "TOUCH_TEST_SIM_SCRIPT";
/// When set, every simulated read times out (test hook).
pub const SIM_TIMEOUT_ENV: &str = "TOUCH_TEST_SIM_TIMEOUT";

pub type BoxedSensor = Box<dyn TouchSensor + Send>;

fn simulated(width: u8) -> eyre::Result<BoxedSensor> {
    if std::env::var_os(SIM_TIMEOUT_ENV).is_some() {
        tracing::debug!("simulated sensor forced to time out");
        return Ok(Box::new(SimulatedSensor::idle(width).failing_with_timeout()));
    }
    match std::env::var(SIM_SCRIPT_ENV) {
        Ok(script) => {
            let steps = touch_hardware::parse_script(&script)
                .wrap_err_with(|| format!("parse {SIM_SCRIPT_ENV}"))?;
            tracing::debug!(steps = steps.len(), "simulated sensor with script");
            Ok(Box::new(SimulatedSensor::new(width, steps)?))
        }
        Err(_) => Ok(Box::new(SimulatedSensor::idle(width))),
    }
}

#[cfg(feature = "hardware")]
pub fn make_sensor(cfg: &touch_config::Config) -> eyre::Result<BoxedSensor> {
    // Test hooks win so CI can exercise hardware builds without a controller.
    if std::env::var_os(SIM_TIMEOUT_ENV).is_some() || std::env::var_os(SIM_SCRIPT_ENV).is_some() {
        return simulated(cfg.decoder.channels);
    }
    let hw = touch_hardware::Mpr121Config {
        bus: cfg.sensor.i2c_bus,
        address: cfg.sensor.i2c_address,
        touch_threshold: cfg.sensor.touch_threshold,
        release_threshold: cfg.sensor.release_threshold,
        ..touch_hardware::Mpr121Config::default()
    };
    let dev = touch_hardware::Mpr121::open(&hw).wrap_err_with(|| {
        format!(
            "open MPR121 on i2c bus {} at {:#04x}",
            hw.bus, hw.address
        )
    })?;
    tracing::info!(bus = hw.bus, address = hw.address, "using MPR121");
    Ok(Box::new(dev))
}

#[cfg(not(feature = "hardware"))]
pub fn make_sensor(cfg: &touch_config::Config) -> eyre::Result<BoxedSensor> {
    simulated(cfg.decoder.channels)
}
