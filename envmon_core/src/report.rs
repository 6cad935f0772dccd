//! Snapshots emitted on the slow cadence and the sinks that consume them.

use crate::classifier::Status;
use crate::mode_switch::OperatingMode;

/// Everything a reporter needs to describe one reporting cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// 1-based count of completed reporting cycles.
    pub reading_number: u64,
    pub temp_c: f32,
    pub temp_f: f32,
    /// Raw light count in `[0, max_raw]`.
    pub light: u16,
    pub setpoint: i32,
    pub status: Status,
    pub relay_on: bool,
    pub mode: OperatingMode,
    /// Milliseconds since the loop started.
    pub uptime_ms: u64,
}

/// Consumer of snapshots. Side effects only; the loop ignores the outcome.
pub trait Reporter {
    fn report(&mut self, snapshot: &Snapshot);
}

impl<R: Reporter + ?Sized> Reporter for Box<R> {
    fn report(&mut self, snapshot: &Snapshot) {
        (**self).report(snapshot);
    }
}

/// Emits each snapshot as a structured `info` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&mut self, s: &Snapshot) {
        tracing::info!(
            reading = s.reading_number,
            temp_c = s.temp_c,
            temp_f = s.temp_f,
            light = s.light,
            setpoint = s.setpoint,
            status = %s.status,
            relay_on = s.relay_on,
            mode = %s.mode,
            uptime_ms = s.uptime_ms,
            "report"
        );
    }
}

/// Adapts a closure into a `Reporter`.
pub struct FnReporter<F>(pub F);

impl<F: FnMut(&Snapshot)> Reporter for FnReporter<F> {
    fn report(&mut self, snapshot: &Snapshot) {
        (self.0)(snapshot);
    }
}
