//! Drives a `Monitor` until the shutdown flag is raised.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::monitor::Monitor;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Sensor warm-up wait before the first tick.
    pub startup_delay_ms: u64,
    /// Stop after this many ticks (`None` runs until interrupted).
    pub max_ticks: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Completed reporting cycles.
    pub readings: u64,
    pub ticks: u64,
    /// True when the loop ended because `shutdown` was raised.
    pub interrupted: bool,
}

/// Run the loop. The flag is only observed between ticks; once it is seen
/// (or `max_ticks` is reached) the shutdown sequence runs and the final
/// tally is returned.
pub fn run(mut monitor: Monitor, shutdown: &AtomicBool, opts: RunOptions) -> RunSummary {
    wait_startup(&monitor, shutdown, opts.startup_delay_ms);

    monitor.begin();
    let mut ticks: u64 = 0;
    let interrupted = loop {
        if shutdown.load(Ordering::Relaxed) {
            break true;
        }
        if opts.max_ticks.is_some_and(|max| ticks >= max) {
            break false;
        }
        monitor.tick();
        ticks += 1;
    };
    if interrupted {
        tracing::info!(ticks, "interrupt received, shutting down");
    }

    let readings = monitor.shutdown();
    RunSummary {
        readings,
        ticks,
        interrupted,
    }
}

/// Sleep the start-up delay in tick-sized slices so an early interrupt is
/// still honoured promptly.
fn wait_startup(monitor: &Monitor, shutdown: &AtomicBool, delay_ms: u64) {
    if delay_ms == 0 {
        return;
    }
    tracing::info!(delay_ms, "waiting for sensors to settle");
    let slice = monitor.config().timing.tick_ms.max(1);
    let mut waited = 0;
    while waited < delay_ms && !shutdown.load(Ordering::Relaxed) {
        let step = slice.min(delay_ms - waited);
        monitor.clock().sleep(Duration::from_millis(step));
        waited += step;
    }
}
