use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::time::{Duration, Instant};

use envmon_core::config::{MonitorCfg, SensorCfg, TimingCfg};
use envmon_core::{FnReporter, Monitor, classify};
use envmon_hardware::{SimulatedAnalog, SimulatedButton, SimulatedPin, SimulatedPwm};
use envmon_traits::Clock;

/// Real time, but every sleep returns immediately.
struct NoWaitClock;

impl Clock for NoWaitClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
    fn sleep(&self, _d: Duration) {}
}

fn monitor(report_interval_ms: u64) -> Monitor {
    let cfg = MonitorCfg {
        sensor: SensorCfg {
            samples: 10,
            ..SensorCfg::default()
        },
        timing: TimingCfg {
            report_interval_ms,
            ..TimingCfg::default()
        },
        ..MonitorCfg::default()
    };
    let mut m = Monitor::builder()
        .with_temperature_adc(SimulatedAnalog::fixed(2600, 4095).with_noise(12))
        .with_light(SimulatedAnalog::fixed(1800, 4095).with_noise(12))
        .with_setpoint(SimulatedAnalog::fixed(600, 4095))
        .with_button(SimulatedButton::manual(true))
        .with_indicators(
            SimulatedPin::new("g"),
            SimulatedPin::new("a"),
            SimulatedPin::new("r"),
            SimulatedPwm::new(),
        )
        .with_relay(SimulatedPin::new("relay"))
        .with_reporter(FnReporter(|s: &envmon_core::Snapshot| {
            black_box(s.reading_number);
        }))
        .with_clock(NoWaitClock)
        .with_config(cfg)
        .try_build()
        .expect("bench monitor");
    m.begin();
    m
}

pub fn bench_tick(c: &mut Criterion) {
    let mut g = c.benchmark_group("control_tick");
    // BENCH_SAMPLE_SIZE=10 cargo bench -p envmon_core --bench control_tick
    if let Ok(ss) = std::env::var("BENCH_SAMPLE_SIZE")
        && let Ok(n) = ss.parse::<usize>()
    {
        g.sample_size(n.max(10));
    }

    let mut fast_only = monitor(u64::MAX);
    g.bench_function("fast_branch", |b| b.iter(|| fast_only.tick()));

    // 1 ms interval: roughly every tick that crosses a millisecond reports
    let mut reporting = monitor(1);
    g.bench_function("mixed", |b| b.iter(|| reporting.tick()));

    g.bench_function("classify", |b| {
        b.iter(|| classify(black_box(31.7), black_box(25)))
    });
    g.finish();
}

criterion_group!(control, bench_tick);
criterion_main!(control);
