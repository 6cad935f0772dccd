//! Raspberry Pi GPIO backend (`rppal`).

use crate::error::{HwError, Result};
use envmon_traits::{BoxError, DigitalInput, DigitalOutput, PwmOutput};
use rppal::gpio::{Gpio, InputPin, OutputPin};

/// Full-scale duty of the `PwmOutput` trait (10-bit).
const DUTY_FULL_SCALE: f64 = 1023.0;

fn gpio_err(e: rppal::gpio::Error) -> HwError {
    HwError::Gpio(e.to_string())
}

pub fn open() -> Result<Gpio> {
    Gpio::new().map_err(gpio_err)
}

/// Push-pull output, driven low on creation.
pub struct GpioOutput {
    pin: OutputPin,
}

impl GpioOutput {
    pub fn new(gpio: &Gpio, bcm: u8) -> Result<Self> {
        let mut pin = gpio.get(bcm).map_err(gpio_err)?.into_output();
        pin.set_low();
        Ok(Self { pin })
    }
}

impl DigitalOutput for GpioOutput {
    fn set_level(&mut self, high: bool) -> std::result::Result<(), BoxError> {
        if high {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
        Ok(())
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}

/// Button input. `pull_up` selects the internal pull-up (active-low button)
/// instead of the pull-down.
pub struct GpioInput {
    pin: InputPin,
}

impl GpioInput {
    pub fn new(gpio: &Gpio, bcm: u8, pull_up: bool) -> Result<Self> {
        let pin = gpio.get(bcm).map_err(gpio_err)?;
        let pin = if pull_up {
            pin.into_input_pullup()
        } else {
            pin.into_input_pulldown()
        };
        Ok(Self { pin })
    }
}

impl DigitalInput for GpioInput {
    fn is_high(&mut self) -> std::result::Result<bool, BoxError> {
        Ok(self.pin.is_high())
    }
}

/// Buzzer on a software-PWM output.
pub struct SoftPwm {
    pin: OutputPin,
    frequency_hz: f64,
    duty: u16,
}

impl SoftPwm {
    pub fn new(gpio: &Gpio, bcm: u8, frequency_hz: u32) -> Result<Self> {
        let mut pin = gpio.get(bcm).map_err(gpio_err)?.into_output();
        pin.set_low();
        Ok(Self {
            pin,
            frequency_hz: f64::from(frequency_hz),
            duty: 0,
        })
    }
}

impl PwmOutput for SoftPwm {
    fn set_duty(&mut self, duty: u16) -> std::result::Result<(), BoxError> {
        if duty == 0 {
            self.pin.clear_pwm().map_err(gpio_err)?;
            self.pin.set_low();
        } else {
            let cycle = (f64::from(duty) / DUTY_FULL_SCALE).clamp(0.0, 1.0);
            self.pin
                .set_pwm_frequency(self.frequency_hz, cycle)
                .map_err(gpio_err)?;
        }
        self.duty = duty;
        Ok(())
    }

    fn duty(&self) -> u16 {
        self.duty
    }
}
