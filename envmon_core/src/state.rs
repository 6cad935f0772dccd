//! Loop-owned controller state.

use crate::classifier::{ActuatorState, Status};
use crate::mode_switch::{DebounceWindow, OperatingMode};
use crate::util::interval_elapsed;

/// Slow-cadence timer. Fires at most once per interval and never catches up
/// on missed intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopClock {
    last_report_ms: u64,
    interval_ms: u64,
}

impl LoopClock {
    pub const fn new(start_ms: u64, interval_ms: u64) -> Self {
        Self {
            last_report_ms: start_ms,
            interval_ms,
        }
    }

    pub const fn last_report_ms(&self) -> u64 {
        self.last_report_ms
    }

    pub const fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// True (and the timer re-armed at `now_ms`) once a full interval has
    /// elapsed since the last firing.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if !interval_elapsed(now_ms, self.last_report_ms, self.interval_ms) {
            return false;
        }
        self.last_report_ms = now_ms;
        true
    }

    pub fn restart(&mut self, now_ms: u64) {
        self.last_report_ms = now_ms;
    }
}

#[derive(Debug, Clone)]
pub struct ControllerState {
    pub mode: OperatingMode,
    pub status: Status,
    /// Indicator demand of the last report; `relay` is the relay level
    /// after the last fast branch.
    pub actuators: ActuatorState,
    pub debounce: DebounceWindow,
    pub loop_clock: LoopClock,
    /// Completed reporting cycles.
    pub readings: u64,
    pub ticks: u64,
    /// Last successfully read light level.
    pub last_light: u16,
    /// Last successfully read setpoint.
    pub last_setpoint: i32,
}

impl ControllerState {
    pub fn new(
        mode: OperatingMode,
        debounce: DebounceWindow,
        loop_clock: LoopClock,
        initial_setpoint: i32,
    ) -> Self {
        Self {
            mode,
            status: Status::Normal,
            actuators: ActuatorState::default(),
            debounce,
            loop_clock,
            readings: 0,
            ticks: 0,
            last_light: 0,
            last_setpoint: initial_setpoint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_fire_is_one_interval_after_start() {
        let mut lc = LoopClock::new(0, 3000);
        assert!(!lc.poll(0));
        assert!(!lc.poll(2999));
        assert!(lc.poll(3000));
        assert!(!lc.poll(3001));
    }

    #[test]
    fn late_poll_does_not_catch_up() {
        let mut lc = LoopClock::new(0, 3000);
        assert!(lc.poll(10_000));
        assert!(!lc.poll(12_000));
        assert!(lc.poll(13_000));
    }

    #[test]
    fn time_going_backwards_never_fires() {
        let mut lc = LoopClock::new(5000, 3000);
        assert!(!lc.poll(100));
        assert_eq!(lc.last_report_ms(), 5000);
    }
}
