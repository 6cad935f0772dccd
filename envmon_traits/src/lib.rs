//! Capability traits shared by the monitor core and its hardware backends.
//!
//! Every trait returns `Box<dyn Error + Send + Sync>` at the boundary so
//! backends can surface their own error types; the core maps them to typed
//! faults.

pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Boxed error type used at every capability boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Single analog channel returning raw ADC counts.
pub trait AnalogInput {
    fn read_raw(&mut self) -> Result<u16, BoxError>;
}

/// Digital temperature probe that already reports degrees Celsius.
pub trait TemperatureProbe {
    fn read_celsius(&mut self) -> Result<f32, BoxError>;
}

/// Digital input line (button, switch).
pub trait DigitalInput {
    fn is_high(&mut self) -> Result<bool, BoxError>;
}

/// Digital output line with read-back of the currently driven level.
pub trait DigitalOutput {
    fn set_level(&mut self, high: bool) -> Result<(), BoxError>;
    /// Level currently driven on the pin.
    fn is_set_high(&self) -> bool;
}

/// PWM output (buzzer). A duty of 0 silences the output.
pub trait PwmOutput {
    fn set_duty(&mut self, duty: u16) -> Result<(), BoxError>;
    fn duty(&self) -> u16;
}

impl<T: AnalogInput + ?Sized> AnalogInput for Box<T> {
    fn read_raw(&mut self) -> Result<u16, BoxError> {
        (**self).read_raw()
    }
}

impl<T: TemperatureProbe + ?Sized> TemperatureProbe for Box<T> {
    fn read_celsius(&mut self) -> Result<f32, BoxError> {
        (**self).read_celsius()
    }
}

impl<T: DigitalInput + ?Sized> DigitalInput for Box<T> {
    fn is_high(&mut self) -> Result<bool, BoxError> {
        (**self).is_high()
    }
}

impl<T: DigitalOutput + ?Sized> DigitalOutput for Box<T> {
    fn set_level(&mut self, high: bool) -> Result<(), BoxError> {
        (**self).set_level(high)
    }
    fn is_set_high(&self) -> bool {
        (**self).is_set_high()
    }
}

impl<T: PwmOutput + ?Sized> PwmOutput for Box<T> {
    fn set_duty(&mut self, duty: u16) -> Result<(), BoxError> {
        (**self).set_duty(duty)
    }
    fn duty(&self) -> u16 {
        (**self).duty()
    }
}
