// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! TCA9548A 8-channel I2C multiplexer.
//!
//! The multiplexer has a single control register: each bit enables one downstream channel. Devices
//! behind it share the bus with everything else, so the channel must be selected immediately
//! before every transaction addressed to them.

use embedded_hal::i2c::I2c;

use crate::drivers::bus_error;
use crate::error::DeviceError;

pub const CHANNELS: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tca9548a {
    address: u8,
}

impl Tca9548a {
    pub const fn new(address: u8) -> Self {
        Self { address }
    }

    #[inline]
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Route the bus to exactly one downstream channel.
    pub fn select<I2C: I2c>(&self, i2c: &mut I2C, channel: u8) -> Result<(), DeviceError> {
        if channel >= CHANNELS {
            return Err(DeviceError::InvalidChannel(channel));
        }
        i2c.write(self.address, &[1 << channel]).map_err(bus_error)
    }

    /// Disconnect all downstream channels.
    pub fn deselect_all<I2C: I2c>(&self, i2c: &mut I2C) -> Result<(), DeviceError> {
        i2c.write(self.address, &[0]).map_err(bus_error)
    }
}
