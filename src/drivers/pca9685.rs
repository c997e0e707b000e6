// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! PCA9685 16-channel, 12-bit PWM driver, used for the lighting rig.
//!
//! Each channel has four registers (ON_L, ON_H, OFF_L, OFF_H). Every channel turns on at count 0
//! and off at `duty`, so only the OFF half carries information. Bit 4 of ON_H / OFF_H forces the
//! output fully on / fully off.

use embedded_hal::i2c::I2c;

use crate::drivers::bus_error;
use crate::error::DeviceError;

// Register addresses
pub mod reg {
    pub const MODE1: u8 = 0x00;
    pub const MODE2: u8 = 0x01;
    pub const LED0_ON_L: u8 = 0x06;
    pub const ALL_LED_ON_L: u8 = 0xFA;
    pub const PRE_SCALE: u8 = 0xFE;
}

// MODE1 / MODE2 bits
const MODE1_SLEEP: u8 = 1 << 4;
const MODE1_AI: u8 = 1 << 5;
const MODE2_OUTDRV: u8 = 1 << 2;

/// Full-on / full-off bit in the high byte of ON / OFF.
const FULL: u8 = 1 << 4;

pub const CHANNELS: u8 = 16;
pub const MAX_DUTY: u16 = 4095;

const OSC_HZ: u32 = 25_000_000;
const PRESCALE_MIN: u32 = 3;
const PRESCALE_MAX: u32 = 255;

/// Prescaler for an output frequency: `round(25 MHz / (4096 * f)) - 1`, clamped to `3..=255`.
pub fn prescale_for(frequency_hz: u16) -> u8 {
    let f = (frequency_hz as u32).max(1) * 4096;
    let rounded = (OSC_HZ + f / 2) / f;
    rounded
        .saturating_sub(1)
        .clamp(PRESCALE_MIN, PRESCALE_MAX) as u8
}

pub struct Pca9685 {
    address: u8,
    ready: bool,
}

impl Pca9685 {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            ready: false,
        }
    }

    #[inline]
    pub fn address(&self) -> u8 {
        self.address
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Program the PWM frequency and wake the oscillator with register auto-increment and
    /// totem-pole outputs. All channels end up off.
    pub fn init<I2C: I2c>(&mut self, i2c: &mut I2C, frequency_hz: u16) -> Result<(), DeviceError> {
        self.ready = false;

        // The prescaler can only be written while the oscillator sleeps.
        self.write(i2c, &[reg::MODE1, MODE1_SLEEP])?;
        self.write(i2c, &[reg::PRE_SCALE, prescale_for(frequency_hz)])?;
        self.write(i2c, &[reg::MODE1, MODE1_AI])?;
        self.write(i2c, &[reg::MODE2, MODE2_OUTDRV])?;

        self.ready = true;
        self.all_off(i2c)
    }

    /// Set one channel's duty, `0..=4095`. Larger values saturate.
    pub fn set_duty<I2C: I2c>(
        &mut self,
        i2c: &mut I2C,
        channel: u8,
        duty: u16,
    ) -> Result<(), DeviceError> {
        if channel >= CHANNELS {
            return Err(DeviceError::InvalidChannel(channel));
        }
        if !self.ready {
            return Err(DeviceError::NotReady);
        }

        let base = reg::LED0_ON_L + 4 * channel;
        let frame = match duty.min(MAX_DUTY) {
            0 => [base, 0, 0, 0, FULL],
            MAX_DUTY => [base, 0, FULL, 0, 0],
            d => [base, 0, 0, d as u8, (d >> 8) as u8],
        };
        self.checked_write(i2c, &frame)
    }

    /// Force every channel fully off in one transaction.
    pub fn all_off<I2C: I2c>(&mut self, i2c: &mut I2C) -> Result<(), DeviceError> {
        if !self.ready {
            return Err(DeviceError::NotReady);
        }
        self.checked_write(i2c, &[reg::ALL_LED_ON_L, 0, 0, 0, FULL])
    }

    fn checked_write<I2C: I2c>(&mut self, i2c: &mut I2C, bytes: &[u8]) -> Result<(), DeviceError> {
        let result = self.write(i2c, bytes);
        if result.is_err() {
            self.ready = false;
            #[cfg(feature = "defmt")]
            defmt::warn!("pca9685 {:#x}: write failed, marking not ready", self.address);
        }
        result
    }

    fn write<I2C: I2c>(&mut self, i2c: &mut I2C, bytes: &[u8]) -> Result<(), DeviceError> {
        i2c.write(self.address, bytes).map_err(bus_error)
    }
}
