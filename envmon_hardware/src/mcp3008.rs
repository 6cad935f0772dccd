//! MCP3008 8-channel 10-bit ADC on SPI0.
//!
//! The Pi has no on-board ADC; the three analog inputs (temperature,
//! light, setpoint dial) share one converter. Full scale is 1023, so
//! `sensor.max_raw` must be set accordingly.

use crate::error::{HwError, Result};
use envmon_traits::{AnalogInput, BoxError};
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
use std::cell::RefCell;
use std::rc::Rc;

pub const MCP3008_MAX_RAW: u16 = 1023;
const SPI_CLOCK_HZ: u32 = 1_350_000;

fn spi_err(e: rppal::spi::Error) -> HwError {
    HwError::Spi(e.to_string())
}

#[derive(Clone)]
pub struct Mcp3008 {
    spi: Rc<RefCell<Spi>>,
}

impl Mcp3008 {
    pub fn open() -> Result<Self> {
        let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, SPI_CLOCK_HZ, Mode::Mode0).map_err(spi_err)?;
        Ok(Self {
            spi: Rc::new(RefCell::new(spi)),
        })
    }

    /// Single-ended channel `0..=7` sharing this converter.
    pub fn channel(&self, channel: u8) -> Result<Mcp3008Channel> {
        if channel > 7 {
            return Err(HwError::Spi(format!("mcp3008 has no channel {channel}")));
        }
        Ok(Mcp3008Channel {
            adc: self.clone(),
            channel,
        })
    }

    fn read(&self, channel: u8) -> Result<u16> {
        // start bit, single-ended + channel in the high nibble, padding
        let tx = [0x01, (0x08 | channel) << 4, 0x00];
        let mut rx = [0u8; 3];
        self.spi.borrow_mut().transfer(&mut rx, &tx).map_err(spi_err)?;
        Ok((u16::from(rx[1] & 0x03) << 8) | u16::from(rx[2]))
    }
}

pub struct Mcp3008Channel {
    adc: Mcp3008,
    channel: u8,
}

impl AnalogInput for Mcp3008Channel {
    fn read_raw(&mut self) -> std::result::Result<u16, BoxError> {
        Ok(self.adc.read(self.channel)?)
    }
}
