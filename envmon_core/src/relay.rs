//! Bang-bang relay (fan) control gated by operating mode.

use envmon_traits::DigitalOutput;

use crate::hw_error::write_level;
use crate::mode_switch::OperatingMode;

/// Relay plus the optional "ventilation active" lamp that mirrors it.
///
/// Writes are edge-triggered: the relay's current level is read back before
/// every decision and the pins are only touched when it changes.
pub struct RelayController {
    relay: Box<dyn DigitalOutput>,
    vent: Option<Box<dyn DigitalOutput>>,
}

impl RelayController {
    pub fn new(relay: Box<dyn DigitalOutput>, vent: Option<Box<dyn DigitalOutput>>) -> Self {
        Self { relay, vent }
    }

    /// Automatic: on iff `value > setpoint`. Manual: forced off.
    /// Returns the relay level after the update.
    pub fn update(&mut self, value: f32, setpoint: i32, mode: OperatingMode) -> bool {
        let want = match mode {
            OperatingMode::Manual => false,
            OperatingMode::Automatic => value > setpoint as f32,
        };
        if self.relay.is_set_high() != want {
            self.drive(want);
            tracing::info!(
                relay = if want { "on" } else { "off" },
                value,
                setpoint,
                mode = mode.as_str(),
                "relay transition"
            );
        }
        self.is_on()
    }

    /// Switch off if on. Returns true when a transition happened.
    pub fn force_off(&mut self) -> bool {
        if !self.relay.is_set_high() {
            return false;
        }
        self.drive(false);
        tracing::info!(relay = "off", "relay forced off");
        true
    }

    /// Unconditionally drive relay and lamp low.
    pub fn de_energize(&mut self) {
        self.drive(false);
    }

    pub fn is_on(&self) -> bool {
        self.relay.is_set_high()
    }

    fn drive(&mut self, on: bool) {
        write_level(self.relay.as_mut(), "relay", on);
        if let Some(vent) = self.vent.as_mut() {
            write_level(vent.as_mut(), "vent", on);
        }
    }
}
