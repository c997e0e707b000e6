// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Error types shared across the firmware.
//!
//! Nothing here is fatal: the poll loops log these and keep running.

use embedded_hal::i2c::ErrorKind;
use thiserror_no_std::Error;

/// Failures talking to an I2C peripheral.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceError {
    /// The bus transaction failed. The device is now marked not ready.
    #[error("I2C bus error: {0:?}")]
    Bus(ErrorKind),

    /// The device failed earlier and has not been re-initialized since.
    #[error("Device not ready")]
    NotReady,

    /// Channel or pin index outside of what the device supports.
    #[error("Invalid channel {0}")]
    InvalidChannel(u8),
}

/// Failures while building an outgoing frame.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// Payload exceeds the frame capacity.
    #[error("Payload too large: {len} bytes")]
    PayloadTooLarge { len: usize },

    /// Output buffer cannot hold the encoded frame.
    #[error("Buffer too small")]
    BufferTooSmall,
}

/// A checksum-valid frame that does not make sense semantically.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Type tag is not one of Config, Command or Status.
    #[error("Unknown frame type 0x{0:02X}")]
    UnknownType(u8),

    /// Payload length does not match the frame type.
    #[error("Invalid length {actual} (expected {expected})")]
    InvalidLength { expected: usize, actual: usize },

    /// An enumerated field carries an undefined value.
    #[error("Invalid value {value} for {field}")]
    InvalidField { field: &'static str, value: u8 },
}

/// Errors surfaced by a link endpoint poll.
#[derive(Error, Debug)]
pub enum LinkError<E: core::fmt::Debug> {
    /// Reading from or writing to the serial port failed.
    #[error("Serial error: {0:?}")]
    Serial(E),

    /// An outgoing frame could not be encoded.
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Errors surfaced by a board runtime poll. Everything is attempted before the first one is
/// returned.
#[derive(Error, Debug)]
pub enum RuntimeError<E: core::fmt::Debug> {
    #[error(transparent)]
    Link(#[from] LinkError<E>),

    #[error(transparent)]
    Device(#[from] DeviceError),
}
