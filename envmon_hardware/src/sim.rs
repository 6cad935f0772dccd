//! Simulated sensors and actuators.
//!
//! Every simulated device hands out a cloneable handle sharing its state, so
//! a test (or the CLI self-check) can drive inputs and inspect outputs while
//! the monitor owns the device itself.

use crate::error::HwError;
use envmon_traits::{
    AnalogInput, BoxError, Clock, DigitalInput, DigitalOutput, PwmOutput, TemperatureProbe,
};
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

/// Shared, thread-safe clock used by time-driven simulations.
pub type SharedClock = Arc<dyn Clock + Send + Sync>;

/// Triangle wave: `min -> max -> min` once per `period_ms`.
#[derive(Clone)]
struct Sweep {
    min: f32,
    max: f32,
    period_ms: u64,
    clock: SharedClock,
    epoch: Instant,
}

impl Sweep {
    fn new(min: f32, max: f32, period_ms: u64, clock: SharedClock) -> Self {
        let epoch = clock.now();
        Self {
            min,
            max,
            period_ms,
            clock,
            epoch,
        }
    }

    fn value(&self) -> f32 {
        if self.period_ms == 0 || self.max <= self.min {
            return self.min;
        }
        let t = (self.clock.ms_since(self.epoch) % self.period_ms) as f32;
        let half = self.period_ms as f32 / 2.0;
        let frac = if t <= half {
            t / half
        } else {
            (self.period_ms as f32 - t) / half
        };
        self.min + (self.max - self.min) * frac
    }
}

/// Raw count that a linear `raw / max_raw * span + offset` mapping turns
/// back into `value`. Clamped to `0..=max_raw`.
pub fn raw_for_value(value: f32, span: f32, offset: f32, max_raw: u16) -> u16 {
    if !(span.is_finite() && span > 0.0) {
        return 0;
    }
    let raw = ((value - offset) / span * f32::from(max_raw)).round();
    raw.clamp(0.0, f32::from(max_raw)) as u16
}

enum AnalogSource {
    Fixed(Rc<Cell<u16>>),
    Sweep(Sweep),
}

/// Simulated ADC channel.
pub struct SimulatedAnalog {
    source: AnalogSource,
    max_raw: u16,
    noise: u16,
    rng_state: u32,
}

/// Handle for driving a fixed simulated analog channel.
#[derive(Clone)]
pub struct AnalogHandle(Rc<Cell<u16>>);

impl AnalogHandle {
    pub fn set(&self, raw: u16) {
        self.0.set(raw);
    }
    pub fn get(&self) -> u16 {
        self.0.get()
    }
}

impl SimulatedAnalog {
    /// Channel returning `raw` until changed through its handle.
    pub fn fixed(raw: u16, max_raw: u16) -> Self {
        Self {
            source: AnalogSource::Fixed(Rc::new(Cell::new(raw))),
            max_raw,
            noise: 0,
            rng_state: 0x9E37_79B9,
        }
    }

    /// Channel sweeping between two raw counts.
    pub fn sweep(min_raw: u16, max_raw_value: u16, period_ms: u64, max_raw: u16, clock: SharedClock) -> Self {
        Self {
            source: AnalogSource::Sweep(Sweep::new(
                f32::from(min_raw),
                f32::from(max_raw_value),
                period_ms,
                clock,
            )),
            max_raw,
            noise: 0,
            rng_state: 0x9E37_79B9,
        }
    }

    /// Add uniform jitter of up to `amplitude` counts to every sample.
    pub fn with_noise(mut self, amplitude: u16) -> Self {
        self.noise = amplitude;
        self
    }

    /// Handle for fixed channels; `None` for sweeps.
    pub fn handle(&self) -> Option<AnalogHandle> {
        match &self.source {
            AnalogSource::Fixed(cell) => Some(AnalogHandle(cell.clone())),
            AnalogSource::Sweep(_) => None,
        }
    }

    fn jitter(&mut self) -> i32 {
        if self.noise == 0 {
            return 0;
        }
        // xorshift32
        let mut x = self.rng_state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.rng_state = x;
        let span = i32::from(self.noise) * 2 + 1;
        (x % span as u32) as i32 - i32::from(self.noise)
    }
}

impl AnalogInput for SimulatedAnalog {
    fn read_raw(&mut self) -> Result<u16, BoxError> {
        let base = match &self.source {
            AnalogSource::Fixed(cell) => i32::from(cell.get()),
            AnalogSource::Sweep(s) => s.value().round() as i32,
        };
        let raw = (base + self.jitter()).clamp(0, i32::from(self.max_raw));
        Ok(raw as u16)
    }
}

/// Simulated digital output with read-back and a write counter.
pub struct SimulatedPin {
    name: String,
    level: Rc<Cell<bool>>,
    writes: Rc<Cell<u32>>,
}

/// Inspection handle for a `SimulatedPin`.
#[derive(Clone)]
pub struct PinHandle {
    level: Rc<Cell<bool>>,
    writes: Rc<Cell<u32>>,
}

impl PinHandle {
    pub fn is_high(&self) -> bool {
        self.level.get()
    }
    /// Number of `set_level` calls the pin has received.
    pub fn writes(&self) -> u32 {
        self.writes.get()
    }
}

impl SimulatedPin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: Rc::new(Cell::new(false)),
            writes: Rc::new(Cell::new(0)),
        }
    }

    pub fn handle(&self) -> PinHandle {
        PinHandle {
            level: self.level.clone(),
            writes: self.writes.clone(),
        }
    }
}

impl DigitalOutput for SimulatedPin {
    fn set_level(&mut self, high: bool) -> Result<(), BoxError> {
        self.writes.set(self.writes.get().saturating_add(1));
        if self.level.get() != high {
            tracing::trace!(pin = %self.name, high, "sim pin change");
        }
        self.level.set(high);
        Ok(())
    }

    fn is_set_high(&self) -> bool {
        self.level.get()
    }
}

/// Simulated PWM output counting how many times it was switched on.
pub struct SimulatedPwm {
    duty: Rc<Cell<u16>>,
    pulses: Rc<Cell<u32>>,
}

#[derive(Clone)]
pub struct PwmHandle {
    duty: Rc<Cell<u16>>,
    pulses: Rc<Cell<u32>>,
}

impl PwmHandle {
    pub fn duty(&self) -> u16 {
        self.duty.get()
    }
    /// Number of silent -> sounding transitions.
    pub fn pulses(&self) -> u32 {
        self.pulses.get()
    }
}

impl SimulatedPwm {
    pub fn new() -> Self {
        Self {
            duty: Rc::new(Cell::new(0)),
            pulses: Rc::new(Cell::new(0)),
        }
    }

    pub fn handle(&self) -> PwmHandle {
        PwmHandle {
            duty: self.duty.clone(),
            pulses: self.pulses.clone(),
        }
    }
}

impl Default for SimulatedPwm {
    fn default() -> Self {
        Self::new()
    }
}

impl PwmOutput for SimulatedPwm {
    fn set_duty(&mut self, duty: u16) -> Result<(), BoxError> {
        if self.duty.get() == 0 && duty > 0 {
            self.pulses.set(self.pulses.get().saturating_add(1));
        }
        self.duty.set(duty);
        Ok(())
    }

    fn duty(&self) -> u16 {
        self.duty.get()
    }
}

enum ButtonSource {
    Manual(Rc<Cell<bool>>),
    Schedule {
        every_ms: u64,
        hold_ms: u64,
        clock: SharedClock,
        epoch: Instant,
    },
}

/// Simulated push button. The reported line level honours the polarity:
/// an active-low button reads low while pressed.
pub struct SimulatedButton {
    active_low: bool,
    source: ButtonSource,
}

/// Handle for pressing a manually driven `SimulatedButton`.
#[derive(Clone)]
pub struct ButtonHandle(Rc<Cell<bool>>);

impl ButtonHandle {
    pub fn press(&self) {
        self.0.set(true);
    }
    pub fn release(&self) {
        self.0.set(false);
    }
}

impl SimulatedButton {
    /// Released button, pressed only through its handle.
    pub fn manual(active_low: bool) -> Self {
        Self {
            active_low,
            source: ButtonSource::Manual(Rc::new(Cell::new(false))),
        }
    }

    /// Button pressed for `hold_ms` at the start of every `every_ms` period,
    /// starting one period after creation.
    pub fn scheduled(active_low: bool, every_ms: u64, hold_ms: u64, clock: SharedClock) -> Self {
        let epoch = clock.now();
        Self {
            active_low,
            source: ButtonSource::Schedule {
                every_ms,
                hold_ms,
                clock,
                epoch,
            },
        }
    }

    pub fn handle(&self) -> Option<ButtonHandle> {
        match &self.source {
            ButtonSource::Manual(cell) => Some(ButtonHandle(cell.clone())),
            ButtonSource::Schedule { .. } => None,
        }
    }

    fn pressed(&self) -> bool {
        match &self.source {
            ButtonSource::Manual(cell) => cell.get(),
            ButtonSource::Schedule {
                every_ms,
                hold_ms,
                clock,
                epoch,
            } => {
                if *every_ms == 0 {
                    return false;
                }
                let t = clock.ms_since(*epoch);
                t >= *every_ms && t % every_ms < *hold_ms
            }
        }
    }
}

impl DigitalInput for SimulatedButton {
    fn is_high(&mut self) -> Result<bool, BoxError> {
        Ok(self.pressed() != self.active_low)
    }
}

enum ProbeSource {
    Fixed(Rc<Cell<f32>>),
    Sweep(Sweep),
}

/// Simulated digital temperature probe with optional periodic faults.
pub struct SimulatedProbe {
    source: ProbeSource,
    fault_every: u32,
    reads: u32,
}

#[derive(Clone)]
pub struct ProbeHandle(Rc<Cell<f32>>);

impl ProbeHandle {
    pub fn set(&self, celsius: f32) {
        self.0.set(celsius);
    }
}

impl SimulatedProbe {
    pub fn fixed(celsius: f32) -> Self {
        Self {
            source: ProbeSource::Fixed(Rc::new(Cell::new(celsius))),
            fault_every: 0,
            reads: 0,
        }
    }

    pub fn sweep(min_c: f32, max_c: f32, period_ms: u64, clock: SharedClock) -> Self {
        Self {
            source: ProbeSource::Sweep(Sweep::new(min_c, max_c, period_ms, clock)),
            fault_every: 0,
            reads: 0,
        }
    }

    /// Every `n`th read times out (0 disables).
    pub fn with_fault_every(mut self, n: u32) -> Self {
        self.fault_every = n;
        self
    }

    pub fn handle(&self) -> Option<ProbeHandle> {
        match &self.source {
            ProbeSource::Fixed(cell) => Some(ProbeHandle(cell.clone())),
            ProbeSource::Sweep(_) => None,
        }
    }
}

impl TemperatureProbe for SimulatedProbe {
    fn read_celsius(&mut self) -> Result<f32, BoxError> {
        self.reads = self.reads.wrapping_add(1);
        if self.fault_every > 0 && self.reads % self.fault_every == 0 {
            return Err(Box::new(HwError::Timeout));
        }
        Ok(match &self.source {
            ProbeSource::Fixed(cell) => cell.get(),
            ProbeSource::Sweep(s) => s.value(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use envmon_traits::clock::test_clock::TestClock;
    use std::time::Duration;

    #[test]
    fn fixed_analog_follows_handle_and_clamps_noise() {
        let mut adc = SimulatedAnalog::fixed(4095, 4095).with_noise(8);
        let handle = adc.handle().expect("fixed channel has a handle");
        for _ in 0..50 {
            let raw = adc.read_raw().unwrap();
            assert!((4087..=4095).contains(&raw), "raw {raw}");
        }
        handle.set(0);
        for _ in 0..50 {
            assert!(adc.read_raw().unwrap() <= 8);
        }
    }

    #[test]
    fn sweep_reaches_max_at_half_period() {
        let clock = TestClock::new();
        let mut adc = SimulatedAnalog::sweep(0, 4000, 1000, 4095, Arc::new(clock.clone()));
        assert_eq!(adc.read_raw().unwrap(), 0);
        clock.advance(Duration::from_millis(500));
        assert_eq!(adc.read_raw().unwrap(), 4000);
        clock.advance(Duration::from_millis(250));
        assert_eq!(adc.read_raw().unwrap(), 2000);
    }

    #[test]
    fn raw_for_value_inverts_linear_map() {
        assert_eq!(raw_for_value(25.0, 50.0, 0.0, 4095), 2048);
        assert_eq!(raw_for_value(-10.0, 50.0, 0.0, 4095), 0);
        assert_eq!(raw_for_value(80.0, 50.0, 0.0, 4095), 4095);
    }

    #[test]
    fn pin_counts_writes_and_reads_back() {
        let mut pin = SimulatedPin::new("relay");
        let h = pin.handle();
        pin.set_level(true).unwrap();
        pin.set_level(true).unwrap();
        assert!(pin.is_set_high());
        assert!(h.is_high());
        assert_eq!(h.writes(), 2);
    }

    #[test]
    fn pwm_counts_pulses() {
        let mut pwm = SimulatedPwm::new();
        let h = pwm.handle();
        pwm.set_duty(0).unwrap();
        pwm.set_duty(512).unwrap();
        pwm.set_duty(512).unwrap();
        pwm.set_duty(0).unwrap();
        assert_eq!(h.pulses(), 1);
        assert_eq!(h.duty(), 0);
    }

    #[test]
    fn button_level_honours_polarity() {
        let mut low = SimulatedButton::manual(true);
        let mut high = SimulatedButton::manual(false);
        assert!(low.is_high().unwrap());
        assert!(!high.is_high().unwrap());
        low.handle().unwrap().press();
        high.handle().unwrap().press();
        assert!(!low.is_high().unwrap());
        assert!(high.is_high().unwrap());
    }

    #[test]
    fn scheduled_button_presses_periodically() {
        let clock = TestClock::new();
        let mut b = SimulatedButton::scheduled(false, 1000, 100, Arc::new(clock.clone()));
        assert!(!b.is_high().unwrap());
        clock.advance(Duration::from_millis(1000));
        assert!(b.is_high().unwrap());
        clock.advance(Duration::from_millis(100));
        assert!(!b.is_high().unwrap());
        clock.advance(Duration::from_millis(950));
        assert!(b.is_high().unwrap());
    }

    #[test]
    fn probe_faults_every_nth_read() {
        let mut p = SimulatedProbe::fixed(21.5).with_fault_every(3);
        assert_eq!(p.read_celsius().unwrap(), 21.5);
        assert_eq!(p.read_celsius().unwrap(), 21.5);
        let err = p.read_celsius().expect_err("third read faults");
        assert!(err.to_string().contains("timeout"));
        assert_eq!(p.read_celsius().unwrap(), 21.5);
    }
}
