// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Device-Specific Drivers
//!
//! This module contains device-specific drivers that sit above the raw `hw/` layer and below the
//! application logic. All of them share one I2C bus, which is passed in as `&mut` to each call.
//!
//! ## Existing drivers
//!
//! - [`mcp23017`] – Microchip MCP23017 16-bit I/O expander (motor direction pins)
//! - [`tca9548a`] – TI TCA9548A 8-channel I2C multiplexer
//! - [`pca9685`] – NXP PCA9685 16-channel 12-bit PWM driver (lighting)
//!
//! Every driver tracks whether the device is ready. A failed transaction marks it not ready and
//! further writes return [`DeviceError::NotReady`] without touching the bus until `init` succeeds
//! again.

pub mod mcp23017;
pub mod pca9685;
pub mod tca9548a;

pub use mcp23017::{Mcp23017, MuxRoute};
pub use pca9685::Pca9685;
pub use tca9548a::Tca9548a;

use crate::error::DeviceError;

#[inline]
pub(crate) fn bus_error<E: embedded_hal::i2c::Error>(e: E) -> DeviceError {
    DeviceError::Bus(e.kind())
}
