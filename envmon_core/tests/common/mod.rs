//! Simulated wiring shared by the integration tests.
#![allow(dead_code)]

use envmon_core::config::{MonitorCfg, SensorCfg, TimingCfg};
use envmon_core::mocks::RecordingReporter;
use envmon_core::{ButtonPolarity, Monitor};
use envmon_hardware::sim::{AnalogHandle, ButtonHandle, PinHandle, ProbeHandle, PwmHandle};
use envmon_hardware::{SimulatedAnalog, SimulatedButton, SimulatedPin, SimulatedProbe, SimulatedPwm};
use envmon_traits::clock::test_clock::TestClock;

pub const MAX_RAW: u16 = 4095;

pub struct Rig {
    pub clock: TestClock,
    pub probe: ProbeHandle,
    pub setpoint: AnalogHandle,
    pub light: AnalogHandle,
    pub button: ButtonHandle,
    pub relay: PinHandle,
    pub vent: PinHandle,
    pub green: PinHandle,
    pub amber: PinHandle,
    pub red: PinHandle,
    pub buzzer: PwmHandle,
    pub reports: RecordingReporter,
}

impl Rig {
    pub fn set_temp(&self, c: f32) {
        self.probe.set(c);
    }

    pub fn set_setpoint(&self, sp: i32) {
        self.setpoint.set(raw_for_setpoint(sp));
    }

    pub fn lit(&self) -> [bool; 3] {
        [self.green.is_high(), self.amber.is_high(), self.red.is_high()]
    }
}

/// Dial position that maps to `sp` with the default 20..=60 range.
pub fn raw_for_setpoint(sp: i32) -> u16 {
    let frac = ((sp - 20) as f32 + 0.5) / 40.0;
    (frac * f32::from(MAX_RAW)) as u16
}

/// One raw sample per read and no per-sample delay, so each tick advances the
/// clock by exactly `tick_ms` unless the buzzer chirps.
pub fn cfg(tick_ms: u64) -> MonitorCfg {
    MonitorCfg {
        sensor: SensorCfg {
            samples: 1,
            sample_delay_ms: 0,
            ..SensorCfg::default()
        },
        timing: TimingCfg {
            tick_ms,
            ..TimingCfg::default()
        },
        ..MonitorCfg::default()
    }
}

pub fn rig(cfg: MonitorCfg, temp_c: f32, setpoint: i32) -> (Monitor, Rig) {
    let clock = TestClock::new();
    let probe = SimulatedProbe::fixed(temp_c);
    let setpoint_adc = SimulatedAnalog::fixed(raw_for_setpoint(setpoint), MAX_RAW);
    let light_adc = SimulatedAnalog::fixed(2048, MAX_RAW);
    let button = SimulatedButton::manual(cfg.button.polarity == ButtonPolarity::ActiveLow);
    let relay = SimulatedPin::new("relay");
    let vent = SimulatedPin::new("vent");
    let green = SimulatedPin::new("green");
    let amber = SimulatedPin::new("amber");
    let red = SimulatedPin::new("red");
    let buzzer = SimulatedPwm::new();
    let reports = RecordingReporter::new();

    let rig = Rig {
        clock: clock.clone(),
        probe: probe.handle().unwrap(),
        setpoint: setpoint_adc.handle().unwrap(),
        light: light_adc.handle().unwrap(),
        button: button.handle().unwrap(),
        relay: relay.handle(),
        vent: vent.handle(),
        green: green.handle(),
        amber: amber.handle(),
        red: red.handle(),
        buzzer: buzzer.handle(),
        reports: reports.clone(),
    };

    let mut monitor = Monitor::builder()
        .with_temperature_probe(probe)
        .with_light(light_adc)
        .with_setpoint(setpoint_adc)
        .with_button(button)
        .with_indicators(green, amber, red, buzzer)
        .with_relay(relay)
        .with_vent(vent)
        .with_reporter(reports)
        .with_clock(clock)
        .with_config(cfg)
        .try_build()
        .expect("monitor build");
    monitor.begin();
    (monitor, rig)
}

/// Tick until the next report has been emitted; returns the ticks taken.
pub fn tick_until_report(monitor: &mut Monitor, rig: &Rig) -> u64 {
    let before = rig.reports.len();
    let mut n = 0;
    while rig.reports.len() == before {
        monitor.tick();
        n += 1;
        assert!(n < 10_000, "no report emitted");
    }
    n
}
