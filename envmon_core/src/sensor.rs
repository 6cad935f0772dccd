//! Sensor reading: averaged raw samples, linear scaling and clamping.
//!
//! Every read returns `Result<_, SensorFault>`; substituting a fallback value
//! is the caller's job (see `Monitor`).

use std::time::Duration;

use envmon_traits::{AnalogInput, Clock, TemperatureProbe};

use crate::error::SensorFault;
use crate::hw_error::map_sensor_fault;

/// `value = raw / max_raw * span + offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearMap {
    pub max_raw: u16,
    pub span: f32,
    pub offset: f32,
}

impl LinearMap {
    pub const fn new(max_raw: u16, span: f32, offset: f32) -> Self {
        Self {
            max_raw,
            span,
            offset,
        }
    }

    #[inline]
    pub fn apply(&self, raw: u16) -> f32 {
        let max = f32::from(self.max_raw.max(1));
        f32::from(raw) / max * self.span + self.offset
    }
}

/// Dial position -> integer setpoint in `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetpointMap {
    pub min: i32,
    pub max: i32,
}

impl Default for SetpointMap {
    fn default() -> Self {
        Self { min: 20, max: 60 }
    }
}

impl SetpointMap {
    /// `trunc(min + raw / max_raw * (max - min))`, clamped to `[min, max]`.
    pub fn apply(&self, raw: u16, max_raw: u16) -> i32 {
        let frac = f32::from(raw) / f32::from(max_raw.max(1));
        let span = (i64::from(self.max) - i64::from(self.min)) as f32;
        let sp = (self.min as f32 + frac * span).trunc() as i32;
        self.clamp(sp)
    }

    #[inline]
    pub fn clamp(&self, sp: i32) -> i32 {
        sp.clamp(self.min, self.max)
    }
}

/// One temperature sample. `raw` is absent for a digital probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub raw: Option<u16>,
    pub value: f32,
}

/// Take `samples` raw samples, sleeping `delay` after each one, and return
/// the integer-truncated mean. Any failed sample fails the whole average.
pub fn read_averaged<A, C>(
    input: &mut A,
    samples: u16,
    delay: Duration,
    clock: &C,
) -> Result<u16, SensorFault>
where
    A: AnalogInput + ?Sized,
    C: Clock + ?Sized,
{
    let n = samples.max(1);
    let mut sum: u32 = 0;
    for _ in 0..n {
        let raw = input.read_raw().map_err(|e| map_sensor_fault(&*e))?;
        sum += u32::from(raw);
        clock.sleep(delay);
    }
    // mean of u16 values always fits back into u16
    Ok(u16::try_from(sum / u32::from(n)).unwrap_or(u16::MAX))
}

/// Where the temperature comes from.
pub enum TemperatureSource {
    /// Averaged ADC channel scaled by `map`.
    Analog {
        input: Box<dyn AnalogInput>,
        map: LinearMap,
    },
    /// Digital probe reporting °C directly.
    Probe(Box<dyn TemperatureProbe>),
}

impl std::fmt::Debug for TemperatureSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Analog { map, .. } => f.debug_struct("Analog").field("map", map).finish(),
            Self::Probe(_) => f.write_str("Probe"),
        }
    }
}

/// The three inputs the monitor samples, plus the sampling parameters.
pub struct Sensors {
    temperature: TemperatureSource,
    light: Box<dyn AnalogInput>,
    setpoint: Box<dyn AnalogInput>,
    samples: u16,
    sample_delay: Duration,
    max_raw: u16,
    setpoint_map: SetpointMap,
}

impl Sensors {
    pub fn new(
        temperature: TemperatureSource,
        light: Box<dyn AnalogInput>,
        setpoint: Box<dyn AnalogInput>,
        samples: u16,
        sample_delay: Duration,
        max_raw: u16,
        setpoint_map: SetpointMap,
    ) -> Self {
        Self {
            temperature,
            light,
            setpoint,
            samples,
            sample_delay,
            max_raw,
            setpoint_map,
        }
    }

    pub fn temperature<C: Clock + ?Sized>(&mut self, clock: &C) -> Result<Reading, SensorFault> {
        match &mut self.temperature {
            TemperatureSource::Analog { input, map } => {
                let raw = read_averaged(input.as_mut(), self.samples, self.sample_delay, clock)?
                    .min(self.max_raw);
                Ok(Reading {
                    raw: Some(raw),
                    value: map.apply(raw),
                })
            }
            TemperatureSource::Probe(probe) => {
                let c = probe.read_celsius().map_err(|e| map_sensor_fault(&*e))?;
                if !c.is_finite() {
                    return Err(SensorFault::Transient(format!("probe returned {c}")));
                }
                Ok(Reading {
                    raw: None,
                    value: c,
                })
            }
        }
    }

    /// Averaged light level, clamped to `[0, max_raw]`.
    pub fn light<C: Clock + ?Sized>(&mut self, clock: &C) -> Result<u16, SensorFault> {
        let raw = read_averaged(self.light.as_mut(), self.samples, self.sample_delay, clock)?;
        Ok(raw.min(self.max_raw))
    }

    pub fn setpoint<C: Clock + ?Sized>(&mut self, clock: &C) -> Result<i32, SensorFault> {
        let raw = read_averaged(self.setpoint.as_mut(), self.samples, self.sample_delay, clock)?;
        Ok(self.setpoint_map.apply(raw.min(self.max_raw), self.max_raw))
    }

    pub fn setpoint_map(&self) -> SetpointMap {
        self.setpoint_map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::ScriptedAnalog;
    use envmon_traits::clock::test_clock::TestClock;
    use rstest::rstest;

    #[test]
    fn alternating_extremes_average_to_midscale() {
        let clock = TestClock::new();
        let mut adc = ScriptedAnalog::cycle([0, 4095]);
        let raw = read_averaged(&mut adc, 10, Duration::from_millis(1), &clock).unwrap();
        assert_eq!(raw, 2047);
        let v = LinearMap::new(4095, 50.0, 0.0).apply(raw);
        assert!((v - 25.0).abs() < 0.01, "got {v}");
    }

    #[test]
    fn averaging_sleeps_once_per_sample() {
        let clock = TestClock::new();
        let mut adc = ScriptedAnalog::cycle([100]);
        read_averaged(&mut adc, 10, Duration::from_millis(1), &clock).unwrap();
        assert_eq!(clock.sleeps().len(), 10);
        assert_eq!(clock.elapsed(), Duration::from_millis(10));
    }

    #[test]
    fn zero_samples_reads_once() {
        let clock = TestClock::new();
        let mut adc = ScriptedAnalog::cycle([7]);
        assert_eq!(read_averaged(&mut adc, 0, Duration::ZERO, &clock).unwrap(), 7);
    }

    #[test]
    fn failed_sample_fails_the_average() {
        let clock = TestClock::new();
        let mut adc = ScriptedAnalog::new(vec![Ok(10), Err("adc timeout".into()), Ok(10)]);
        let err = read_averaged(&mut adc, 3, Duration::ZERO, &clock).unwrap_err();
        assert_eq!(err, SensorFault::Timeout);
    }

    #[rstest]
    #[case(0, 20)]
    #[case(4095, 60)]
    #[case(2047, 39)]
    #[case(1024, 30)]
    fn setpoint_is_truncated_and_clamped(#[case] raw: u16, #[case] expected: i32) {
        assert_eq!(SetpointMap::default().apply(raw, 4095), expected);
    }

    #[test]
    fn light_is_clamped_to_full_scale() {
        let clock = TestClock::new();
        let mut sensors = Sensors::new(
            TemperatureSource::Analog {
                input: Box::new(ScriptedAnalog::cycle([0])),
                map: LinearMap::new(1023, 50.0, 0.0),
            },
            Box::new(ScriptedAnalog::cycle([4000])),
            Box::new(ScriptedAnalog::cycle([0])),
            1,
            Duration::ZERO,
            1023,
            SetpointMap::default(),
        );
        assert_eq!(sensors.light(&clock).unwrap(), 1023);
        assert_eq!(sensors.setpoint(&clock).unwrap(), 20);
        let r = sensors.temperature(&clock).unwrap();
        assert_eq!(r.raw, Some(0));
    }

    #[test]
    fn analog_temperature_is_clamped_to_full_scale() {
        let clock = TestClock::new();
        let mut sensors = Sensors::new(
            TemperatureSource::Analog {
                input: Box::new(ScriptedAnalog::cycle([4000])),
                map: LinearMap::new(1023, 50.0, 0.0),
            },
            Box::new(ScriptedAnalog::cycle([0])),
            Box::new(ScriptedAnalog::cycle([0])),
            1,
            Duration::ZERO,
            1023,
            SetpointMap::default(),
        );
        let r = sensors.temperature(&clock).unwrap();
        assert_eq!(r.raw, Some(1023));
        assert!((r.value - 50.0).abs() < 1e-4);
    }

    #[test]
    fn probe_passes_celsius_through() {
        let clock = TestClock::new();
        let mut sensors = Sensors::new(
            TemperatureSource::Probe(Box::new(envmon_hardware::SimulatedProbe::fixed(23.5))),
            Box::new(ScriptedAnalog::cycle([0])),
            Box::new(ScriptedAnalog::cycle([0])),
            10,
            Duration::from_millis(1),
            4095,
            SetpointMap::default(),
        );
        let r = sensors.temperature(&clock).unwrap();
        assert_eq!(r.raw, None);
        assert_eq!(r.value, 23.5);
        assert!(clock.sleeps().is_empty());
    }
}
