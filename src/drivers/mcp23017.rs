// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! MCP23017 16-bit I/O expander, used for H-bridge direction pins.
//!
//! All 16 pins are outputs. The output latch is shadowed in RAM so a single pin change only
//! rewrites the affected port. The expander may sit behind a TCA9548A, in which case the mux
//! channel is re-selected before every transaction.

use embedded_hal::i2c::I2c;

use crate::drivers::{bus_error, Tca9548a};
use crate::error::DeviceError;

// Register addresses (IOCON.BANK = 0)
pub mod reg {
    pub const IODIRA: u8 = 0x00;
    pub const IODIRB: u8 = 0x01;
    pub const OLATA: u8 = 0x14;
    pub const OLATB: u8 = 0x15;
}

pub const PINS: u8 = 16;

/// Multiplexer channel an expander hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MuxRoute {
    pub mux: Tca9548a,
    pub channel: u8,
}

pub struct Mcp23017 {
    address: u8,
    route: Option<MuxRoute>,
    latch: u16,
    ready: bool,
}

impl Mcp23017 {
    /// Create a driver. The device is not ready until [`init`](Self::init) succeeds.
    pub fn new(address: u8, route: Option<MuxRoute>) -> Self {
        Self {
            address,
            route,
            latch: 0,
            ready: false,
        }
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Shadowed output latch, GPA0 in bit 0 through GPB7 in bit 15.
    #[inline]
    pub fn latch(&self) -> u16 {
        self.latch
    }

    /// Configure every pin as an output, driven low.
    pub fn init<I2C: I2c>(&mut self, i2c: &mut I2C) -> Result<(), DeviceError> {
        self.ready = false;
        self.latch = 0;

        self.write(i2c, &[reg::IODIRA, 0x00, 0x00])?;
        self.write(i2c, &[reg::OLATA, 0x00, 0x00])?;

        self.ready = true;
        Ok(())
    }

    /// Drive one pin.
    pub fn set_pin<I2C: I2c>(
        &mut self,
        i2c: &mut I2C,
        pin: u8,
        high: bool,
    ) -> Result<(), DeviceError> {
        if pin >= PINS {
            return Err(DeviceError::InvalidChannel(pin));
        }
        if !self.ready {
            return Err(DeviceError::NotReady);
        }

        let mask = 1u16 << pin;
        if high {
            self.latch |= mask;
        } else {
            self.latch &= !mask;
        }

        let (register, value) = if pin < 8 {
            (reg::OLATA, self.latch as u8)
        } else {
            (reg::OLATB, (self.latch >> 8) as u8)
        };

        let result = self.write(i2c, &[register, value]);
        if result.is_err() {
            self.ready = false;
            #[cfg(feature = "defmt")]
            defmt::warn!("mcp23017 {:#x}: write failed, marking not ready", self.address);
        }
        result
    }

    fn write<I2C: I2c>(&mut self, i2c: &mut I2C, bytes: &[u8]) -> Result<(), DeviceError> {
        if let Some(route) = self.route {
            route.mux.select(i2c, route.channel)?;
        }
        i2c.write(self.address, bytes).map_err(bus_error)
    }
}
