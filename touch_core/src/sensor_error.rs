//! Maps `Box<dyn Error>` from the sensor trait boundary to typed `DecoderError`.
//!
//! `touch_traits::TouchSensor` returns boxed errors so any driver can plug in;
//! this module recovers a typed error, with an optional feature-gated path for
//! `touch_hardware::HwError` downcasting.

use crate::error::DecoderError;

/// Map a trait-boundary sensor error to a typed `DecoderError`.
///
/// Known hardware error types are downcast first, then string heuristics apply.
pub fn map_sensor_error(e: &(dyn std::error::Error + 'static)) -> DecoderError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<touch_hardware::error::HwError>() {
            return match hw {
                touch_hardware::error::HwError::Timeout => DecoderError::Timeout,
                other => DecoderError::SensorFault(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        DecoderError::Timeout
    } else {
        DecoderError::Sensor(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_text_maps_to_timeout() {
        let e: Box<dyn std::error::Error + Send + Sync> = "i2c read Timeout".into();
        assert_eq!(map_sensor_error(&*e), DecoderError::Timeout);
    }

    #[test]
    fn other_text_maps_to_sensor() {
        let e: Box<dyn std::error::Error + Send + Sync> = "bus glitch".into();
        assert_eq!(
            map_sensor_error(&*e),
            DecoderError::Sensor("bus glitch".into())
        );
    }

    #[cfg(feature = "hardware-errors")]
    #[test]
    fn typed_hardware_errors_are_downcast() {
        use touch_hardware::error::HwError;
        let e: Box<dyn std::error::Error + Send + Sync> = Box::new(HwError::Timeout);
        assert_eq!(map_sensor_error(&*e), DecoderError::Timeout);
        let e: Box<dyn std::error::Error + Send + Sync> =
            Box::new(HwError::NotFound { address: 0x5A });
        assert!(matches!(map_sensor_error(&*e), DecoderError::SensorFault(_)));
    }
}
