//! 1-Wire temperature probe (DS18B20) read through the Linux `w1_therm`
//! sysfs interface.
//!
//! The kernel exposes each probe as `/sys/bus/w1/devices/28-*/w1_slave`:
//!
//! ```text
//! 72 01 4b 46 7f ff 0e 10 57 : crc=57 YES
//! 72 01 4b 46 7f ff 0e 10 57 t=23125
//! ```

use crate::error::{HwError, Result};
use envmon_traits::{BoxError, TemperatureProbe};
use std::path::{Path, PathBuf};

pub struct W1Probe {
    path: PathBuf,
}

impl W1Probe {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<f32> {
        let text = std::fs::read_to_string(&self.path)?;
        parse_w1_slave(&text)
    }
}

/// Parse the two-line `w1_slave` output into degrees Celsius.
pub fn parse_w1_slave(text: &str) -> Result<f32> {
    let mut lines = text.lines();
    let crc_line = lines
        .next()
        .ok_or_else(|| HwError::ProbeFormat("empty output".to_string()))?;
    if !crc_line.trim_end().ends_with("YES") {
        return Err(HwError::ProbeCrc);
    }
    let data_line = lines
        .next()
        .ok_or_else(|| HwError::ProbeFormat("missing data line".to_string()))?;
    let (_, milli) = data_line
        .rsplit_once("t=")
        .ok_or_else(|| HwError::ProbeFormat(format!("no t= field in {data_line:?}")))?;
    let milli: i32 = milli
        .trim()
        .parse()
        .map_err(|e| HwError::ProbeFormat(format!("bad temperature {milli:?}: {e}")))?;
    Ok(milli as f32 / 1000.0)
}

impl TemperatureProbe for W1Probe {
    fn read_celsius(&mut self) -> std::result::Result<f32, BoxError> {
        let c = self.read()?;
        tracing::trace!(celsius = c, path = %self.path.display(), "w1 probe read");
        Ok(c)
    }
}
