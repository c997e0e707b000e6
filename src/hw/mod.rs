// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Hardware Layer
//!
//! Narrow capability traits the control code is written against, the [`Hardware`] context that
//! ties them together with the shared I2C bus, and the STM32F7 implementations (feature `stm32`).
//!
//! - [`Board`] - native digital pins, PWM outputs and the battery reading.
//! - [`SerialPort`] - non-blocking byte reads and blocking writes for the inter-board UART.
//! - [`Clock`] - monotonic millisecond counter.

pub mod adc;
pub mod led;

#[cfg(feature = "stm32")]
pub mod board;
#[cfg(feature = "stm32")]
pub mod i2c;
#[cfg(feature = "stm32")]
pub mod pins;
#[cfg(feature = "stm32")]
pub mod pwm;
#[cfg(feature = "stm32")]
pub mod systick;
#[cfg(feature = "stm32")]
pub mod usart;

#[cfg(test)]
pub(crate) mod fake;

use embedded_hal::i2c::I2c;

use crate::config::{Features, PinRef, VehicleConfig};
use crate::drivers::{Mcp23017, MuxRoute, Tca9548a};
use crate::error::DeviceError;

pub use adc::{AdcRead, BatteryMonitor};
pub use led::{ActiveLevel, Led};

/// Board-level outputs and sensors owned by the slave.
pub trait Board {
    /// Drive a native digital pin. Unknown pin indices are ignored.
    fn set_pin(&mut self, pin: u8, high: bool);

    /// Set the duty of a native PWM pin, `0..=max_duty()`. Unknown pin indices are ignored.
    fn set_pwm(&mut self, pin: u8, duty: u16);

    /// Full-scale PWM duty.
    fn max_duty(&self) -> u16;

    /// Battery voltage in volts.
    fn battery_voltage(&mut self) -> f32;
}

/// Byte stream to the other board.
pub trait SerialPort {
    type Error: core::fmt::Debug;

    /// Read one byte if one is buffered, `WouldBlock` otherwise.
    fn read_byte(&mut self) -> nb::Result<u8, Self::Error>;

    /// Write all bytes.
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;
}

/// Monotonic millisecond counter. Wraps after ~49 days; consumers compare with wrapping math.
pub trait Clock {
    fn now_ms(&self) -> u32;
}

/// Explicit hardware context: the board, the shared I2C bus and the optional pin expander.
///
/// Constructed once at startup and passed by `&mut` into whatever needs to touch hardware.
pub struct Hardware<B, I2C> {
    pub board: B,
    pub i2c: I2C,
    expander: Option<Mcp23017>,
}

impl<B, I2C> Hardware<B, I2C>
where
    B: Board,
    I2C: I2c,
{
    pub fn new(board: B, i2c: I2C) -> Self {
        Self {
            board,
            i2c,
            expander: None,
        }
    }

    /// Apply the expander/multiplexer part of a configuration and (re)initialize the expander.
    ///
    /// A failed init leaves the expander in place but not ready; writes to its pins fail fast
    /// until the next configuration arrives.
    pub fn configure(&mut self, config: &VehicleConfig) -> Result<(), DeviceError> {
        if !config.features.contains(Features::EXPANDER) {
            self.expander = None;
            return Ok(());
        }

        let route = if config.features.contains(Features::MUX) {
            Some(MuxRoute {
                mux: Tca9548a::new(config.mux_address),
                channel: config.mux_channel,
            })
        } else {
            None
        };

        let expander = self
            .expander
            .insert(Mcp23017::new(config.expander_address, route));
        let result = expander.init(&mut self.i2c);

        #[cfg(feature = "defmt")]
        {
            match &result {
                Ok(()) => defmt::info!("hw: expander {:#x} ready", config.expander_address),
                Err(e) => defmt::warn!("hw: expander init failed: {}", e),
            }
        }

        result
    }

    /// Re-initialize an expander that dropped out. `Ok(true)` when it came back.
    pub fn reinit_expander(&mut self) -> Result<bool, DeviceError> {
        let Some(expander) = self.expander.as_mut().filter(|e| !e.is_ready()) else {
            return Ok(false);
        };

        let result = expander.init(&mut self.i2c);
        #[cfg(feature = "defmt")]
        {
            if result.is_ok() {
                defmt::info!("hw: expander recovered");
            }
        }
        result.map(|()| true)
    }

    #[inline]
    pub fn expander(&self) -> Option<&Mcp23017> {
        self.expander.as_ref()
    }

    /// Drive a digital line wherever it lives.
    pub fn write_pin(&mut self, pin: PinRef, high: bool) -> Result<(), DeviceError> {
        match pin {
            PinRef::Unassigned => Ok(()),
            PinRef::Native(n) => {
                self.board.set_pin(n, high);
                Ok(())
            }
            PinRef::Expander(n) => match self.expander.as_mut() {
                Some(expander) => expander.set_pin(&mut self.i2c, n, high),
                None => Err(DeviceError::NotReady),
            },
        }
    }

    /// Set a native PWM pin; unassigned pins are skipped.
    #[inline]
    pub fn write_pwm(&mut self, pin: u8, duty: u16) {
        if pin != crate::config::PIN_UNASSIGNED {
            self.board.set_pwm(pin, duty);
        }
    }

    #[inline]
    pub fn max_duty(&self) -> u16 {
        self.board.max_duty()
    }

    #[inline]
    pub fn battery_voltage(&mut self) -> f32 {
        self.board.battery_voltage()
    }
}
