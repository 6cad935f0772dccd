mod common;

use common::{cfg, rig, tick_until_report};
use envmon_core::mocks::{RecordingReporter, ScriptedAnalog};
use envmon_core::{Monitor, OperatingMode, Status};
use envmon_hardware::{SimulatedButton, SimulatedPin, SimulatedPwm};
use envmon_traits::clock::test_clock::TestClock;
use rstest::rstest;
use std::time::Duration;

#[rstest]
#[case::warning_at_five_over(30.0, 25, Status::Warning, true, [false, true, false])]
#[case::critical_above_five(32.0, 25, Status::Critical, true, [false, false, true])]
#[case::normal_below(20.0, 25, Status::Normal, false, [true, false, false])]
fn first_report_classifies_and_drives_outputs(
    #[case] temp: f32,
    #[case] setpoint: i32,
    #[case] status: Status,
    #[case] relay_on: bool,
    #[case] leds: [bool; 3],
) {
    let (mut m, rig) = rig(cfg(100), temp, setpoint);
    tick_until_report(&mut m, &rig);

    let snap = rig.reports.snapshots().pop().unwrap();
    assert_eq!(snap.reading_number, 1);
    assert_eq!(snap.status, status);
    assert_eq!(snap.setpoint, setpoint);
    assert_eq!(snap.relay_on, relay_on);
    assert_eq!(snap.mode, OperatingMode::Automatic);
    assert_eq!(rig.lit(), leds);
    assert_eq!(rig.relay.is_high(), relay_on);
    assert_eq!(rig.vent.is_high(), relay_on);
    let expected_pulses = u32::from(status == Status::Critical);
    assert_eq!(rig.buzzer.pulses(), expected_pulses);
    assert_eq!(rig.buzzer.duty(), 0);
}

#[test]
fn snapshot_carries_fahrenheit_light_and_uptime() {
    let (mut m, rig) = rig(cfg(100), 25.0, 30);
    tick_until_report(&mut m, &rig);
    let snap = rig.reports.snapshots().pop().unwrap();
    assert!((snap.temp_f - 77.0).abs() < 1e-3);
    assert_eq!(snap.light, 2048);
    assert_eq!(snap.uptime_ms, 3000);
}

#[test]
fn critical_chirps_once_per_report() {
    let (mut m, rig) = rig(cfg(100), 32.0, 25);
    tick_until_report(&mut m, &rig);
    tick_until_report(&mut m, &rig);
    assert_eq!(rig.buzzer.pulses(), 2);
    assert_eq!(rig.reports.len(), 2);
}

#[test]
fn manual_toggle_drops_relay_immediately_and_holds_it_off() {
    let (mut m, rig) = rig(cfg(50), 40.0, 20);
    m.tick();
    assert!(rig.relay.is_high());

    rig.button.press();
    m.tick();
    assert_eq!(m.mode(), OperatingMode::Manual);
    assert!(!rig.relay.is_high());
    assert!(!rig.vent.is_high());

    rig.button.release();
    for _ in 0..200 {
        m.tick();
        assert!(!rig.relay.is_high());
    }
    assert!(rig.reports.snapshots().iter().all(|s| !s.relay_on));
    assert!(
        rig.reports
            .snapshots()
            .iter()
            .all(|s| s.mode == OperatingMode::Manual)
    );
}

#[test]
fn second_press_returns_to_automatic() {
    let (mut m, rig) = rig(cfg(50), 40.0, 20);
    rig.button.press();
    m.tick();
    rig.button.release();
    for _ in 0..10 {
        m.tick();
    }
    rig.button.press();
    m.tick();
    assert_eq!(m.mode(), OperatingMode::Automatic);
    m.tick();
    assert!(rig.relay.is_high());
}

#[test]
fn alternating_extremes_read_as_mid_span() {
    let clock = TestClock::new();
    let reports = RecordingReporter::new();
    let mut m = Monitor::builder()
        .with_temperature_adc(ScriptedAnalog::cycle([0, 4095]))
        .with_light(ScriptedAnalog::cycle([100]))
        .with_setpoint(ScriptedAnalog::cycle([0]))
        .with_button(SimulatedButton::manual(true))
        .with_indicators(
            SimulatedPin::new("g"),
            SimulatedPin::new("a"),
            SimulatedPin::new("r"),
            SimulatedPwm::new(),
        )
        .with_relay(SimulatedPin::new("relay"))
        .with_reporter(reports.clone())
        .with_clock(clock.clone())
        .try_build()
        .unwrap();
    m.begin();
    while reports.is_empty() {
        m.tick();
    }
    let snap = reports.snapshots().pop().unwrap();
    assert!((snap.temp_c - 25.0).abs() < 0.01, "temp {}", snap.temp_c);
    assert_eq!(snap.status, Status::Warning);
    // default config: 10 samples with a 1 ms delay each
    assert!(clock.sleeps().contains(&Duration::from_millis(1)));
}

#[test]
fn blocking_debounce_sleeps_the_quiet_window() {
    let mut c = cfg(50);
    c.button.debounce = envmon_core::DebounceStrategy::Blocking;
    let (mut m, rig) = rig(c, 20.0, 30);
    rig.clock.clear_sleeps();
    rig.button.press();
    m.tick();
    assert_eq!(m.mode(), OperatingMode::Manual);
    assert!(rig.clock.sleeps().contains(&Duration::from_millis(300)));
    assert_eq!(rig.clock.elapsed(), Duration::from_millis(350));
}

#[test]
fn gated_debounce_keeps_ticking_through_the_quiet_window() {
    let mut c = cfg(50);
    c.button.initial_mode = OperatingMode::Manual;
    let (mut m, rig) = rig(c, 40.0, 25);
    m.tick();
    assert!(!rig.relay.is_high());

    rig.button.press();
    m.tick();
    assert_eq!(m.mode(), OperatingMode::Automatic);
    rig.clock.clear_sleeps();

    // inside the 300 ms window: the relay is evaluated, edges are ignored
    rig.button.release();
    m.tick();
    assert!(rig.relay.is_high());
    rig.button.press();
    m.tick();
    assert_eq!(m.mode(), OperatingMode::Automatic);
    assert!(rig.relay.is_high());

    assert!(!rig.clock.sleeps().contains(&Duration::from_millis(300)));
    assert_eq!(rig.clock.elapsed(), Duration::from_millis(200));
}

#[test]
fn controller_state_tracks_the_driven_relay() {
    let (mut m, rig) = rig(cfg(50), 40.0, 25);
    m.tick();
    assert!(m.state().actuators.relay);
    assert_eq!(m.state().actuators.relay, rig.relay.is_high());

    rig.button.press();
    m.tick();
    assert_eq!(m.mode(), OperatingMode::Manual);
    m.tick();
    assert!(!rig.relay.is_high());
    assert!(!m.state().actuators.relay);
}

#[test]
fn active_high_button_starting_in_manual() {
    let mut c = cfg(50);
    c.button.polarity = envmon_core::ButtonPolarity::ActiveHigh;
    c.button.initial_mode = OperatingMode::Manual;
    let (mut m, rig) = rig(c, 40.0, 20);
    m.tick();
    assert!(!rig.relay.is_high());
    rig.button.press();
    m.tick();
    assert_eq!(m.mode(), OperatingMode::Automatic);
    m.tick();
    assert!(rig.relay.is_high());
}
