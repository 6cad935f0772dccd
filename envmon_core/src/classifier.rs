//! Status classification and the indicator outputs it drives.

use std::fmt;
use std::time::Duration;

use envmon_traits::{Clock, DigitalOutput, PwmOutput};

use crate::config::BuzzerCfg;
use crate::hw_error::{write_duty, write_level};

/// Degrees above the setpoint beyond which a reading is critical.
pub const CRITICAL_MARGIN_C: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Normal,
    Warning,
    Critical,
}

impl Status {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outputs implied by one classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorState {
    /// Relay demand in automatic mode (`value > setpoint`).
    pub relay: bool,
    pub led_level: Status,
    pub buzzer_pulsing: bool,
}

impl Default for ActuatorState {
    fn default() -> Self {
        Self {
            relay: false,
            led_level: Status::Normal,
            buzzer_pulsing: false,
        }
    }
}

/// Classify `value` against `setpoint`. Total: a NaN value is `Normal`.
pub fn classify(value: f32, setpoint: i32) -> (Status, ActuatorState) {
    let diff = value - setpoint as f32;
    let status = if diff > CRITICAL_MARGIN_C {
        Status::Critical
    } else if diff > 0.0 {
        Status::Warning
    } else {
        Status::Normal
    };
    let state = ActuatorState {
        relay: diff > 0.0,
        led_level: status,
        buzzer_pulsing: status == Status::Critical,
    };
    (status, state)
}

/// Green/amber/red LED ladder plus the buzzer.
pub struct Indicators {
    green: Box<dyn DigitalOutput>,
    amber: Box<dyn DigitalOutput>,
    red: Box<dyn DigitalOutput>,
    buzzer: Box<dyn PwmOutput>,
    buzzer_cfg: BuzzerCfg,
}

impl Indicators {
    pub fn new(
        green: Box<dyn DigitalOutput>,
        amber: Box<dyn DigitalOutput>,
        red: Box<dyn DigitalOutput>,
        buzzer: Box<dyn PwmOutput>,
        buzzer_cfg: BuzzerCfg,
    ) -> Self {
        Self {
            green,
            amber,
            red,
            buzzer,
            buzzer_cfg,
        }
    }

    /// Clear every indicator, then light the one for `state.led_level`.
    /// A critical state also sounds one blocking buzzer chirp.
    pub fn apply<C: Clock + ?Sized>(&mut self, state: &ActuatorState, clock: &C) {
        self.all_off();
        let led = match state.led_level {
            Status::Normal => (&mut self.green, "led_green"),
            Status::Warning => (&mut self.amber, "led_amber"),
            Status::Critical => (&mut self.red, "led_red"),
        };
        write_level(led.0.as_mut(), led.1, true);

        if state.buzzer_pulsing {
            self.chirp(clock);
        }
    }

    /// Sound the buzzer for the configured pulse, then silence it.
    pub fn chirp<C: Clock + ?Sized>(&mut self, clock: &C) {
        write_duty(self.buzzer.as_mut(), "buzzer", self.buzzer_cfg.duty);
        clock.sleep(Duration::from_millis(self.buzzer_cfg.pulse_ms));
        write_duty(self.buzzer.as_mut(), "buzzer", 0);
    }

    pub fn all_off(&mut self) {
        write_level(self.green.as_mut(), "led_green", false);
        write_level(self.amber.as_mut(), "led_amber", false);
        write_level(self.red.as_mut(), "led_red", false);
        write_duty(self.buzzer.as_mut(), "buzzer", 0);
    }

    /// Level shown by the LEDs, if exactly one is lit.
    pub fn lit(&self) -> Option<Status> {
        match (
            self.green.is_set_high(),
            self.amber.is_set_high(),
            self.red.is_set_high(),
        ) {
            (true, false, false) => Some(Status::Normal),
            (false, true, false) => Some(Status::Warning),
            (false, false, true) => Some(Status::Critical),
            _ => None,
        }
    }

    pub fn buzzer_duty(&self) -> u16 {
        self.buzzer.duty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use envmon_hardware::{SimulatedPin, SimulatedPwm};
    use envmon_traits::clock::test_clock::TestClock;
    use rstest::rstest;

    #[rstest]
    #[case(30.0, 25, Status::Warning, true)]
    #[case(32.0, 25, Status::Critical, true)]
    #[case(20.0, 25, Status::Normal, false)]
    #[case(25.0, 25, Status::Normal, false)]
    #[case(25.1, 25, Status::Warning, true)]
    #[case(f32::NAN, 25, Status::Normal, false)]
    fn thresholds(
        #[case] value: f32,
        #[case] setpoint: i32,
        #[case] status: Status,
        #[case] relay: bool,
    ) {
        let (s, a) = classify(value, setpoint);
        assert_eq!(s, status);
        assert_eq!(a.led_level, status);
        assert_eq!(a.relay, relay);
        assert_eq!(a.buzzer_pulsing, status == Status::Critical);
    }

    fn indicators() -> (Indicators, [envmon_hardware::sim::PinHandle; 3], envmon_hardware::sim::PwmHandle) {
        let g = SimulatedPin::new("g");
        let a = SimulatedPin::new("a");
        let r = SimulatedPin::new("r");
        let b = SimulatedPwm::new();
        let handles = [g.handle(), a.handle(), r.handle()];
        let pwm = b.handle();
        let ind = Indicators::new(
            Box::new(g),
            Box::new(a),
            Box::new(r),
            Box::new(b),
            BuzzerCfg::default(),
        );
        (ind, handles, pwm)
    }

    #[test]
    fn critical_chirps_once_and_silences() {
        let clock = TestClock::new();
        let (mut ind, [g, a, r], pwm) = indicators();
        let (_, state) = classify(32.0, 25);
        ind.apply(&state, &clock);
        assert!(!g.is_high() && !a.is_high() && r.is_high());
        assert_eq!(pwm.pulses(), 1);
        assert_eq!(pwm.duty(), 0);
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(100)]);
    }

    #[test]
    fn stale_led_is_cleared() {
        let clock = TestClock::new();
        let (mut ind, [g, _, r], _) = indicators();
        ind.apply(&classify(40.0, 20).1, &clock);
        ind.apply(&classify(10.0, 20).1, &clock);
        assert!(g.is_high());
        assert!(!r.is_high());
        assert_eq!(ind.lit(), Some(Status::Normal));
        ind.all_off();
        assert_eq!(ind.lit(), None);
    }
}
