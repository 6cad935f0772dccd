//! Maps `Box<dyn Error>` from capability boundaries to typed faults.
//!
//! The traits in `envmon_traits` use `Box<dyn Error + Send + Sync>`; this
//! module turns those into `SensorFault` (inputs) or `MonitorError`
//! (outputs), with an optional feature-gated path for
//! `envmon_hardware::HwError` downcasting.

use envmon_traits::{DigitalOutput, PwmOutput};

use crate::error::{MonitorError, SensorFault};

/// Map an input-side error to a `SensorFault`.
pub fn map_sensor_fault(e: &(dyn std::error::Error + 'static)) -> SensorFault {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<envmon_hardware::HwError>() {
            return match hw {
                envmon_hardware::HwError::Timeout => SensorFault::Timeout,
                other => SensorFault::Hardware(other.to_string()),
            };
        }
    }

    // Fallback: string-based detection
    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        SensorFault::Timeout
    } else {
        SensorFault::Transient(s)
    }
}

/// Map an output-side (pin / PWM) error to a `MonitorError`.
pub fn map_output_error(e: &(dyn std::error::Error + 'static)) -> MonitorError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<envmon_hardware::HwError>() {
            return MonitorError::HardwareFault(hw.to_string());
        }
    }
    MonitorError::Hardware(e.to_string())
}

/// Drive a digital output; a failed write is logged and reported as `false`.
pub(crate) fn write_level(pin: &mut dyn DigitalOutput, name: &'static str, high: bool) -> bool {
    match pin.set_level(high) {
        Ok(()) => true,
        Err(e) => {
            let err = map_output_error(&*e);
            tracing::warn!(pin = name, high, error = %err, "output write failed");
            false
        }
    }
}

/// Set a PWM duty; a failed write is logged and reported as `false`.
pub(crate) fn write_duty(pwm: &mut dyn PwmOutput, name: &'static str, duty: u16) -> bool {
    match pwm.set_duty(duty) {
        Ok(()) => true,
        Err(e) => {
            let err = map_output_error(&*e);
            tracing::warn!(pin = name, duty, error = %err, "pwm write failed");
            false
        }
    }
}
