// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Link Endpoints
//!
//! The two ends of the inter-board UART link.
//!
//! - [`originator`] - Master side. Pushes configuration and commands, consumes status.
//! - [`actuator`] - Slave side. Consumes configuration and commands, pushes status.
//!
//! Both endpoints are polled from the main loop with a millisecond timestamp. Every poll first
//! drains all buffered serial bytes, then makes its time-based send decisions. Only the latest
//! payload of each kind is kept; there is no queue and no retransmission.

pub mod actuator;
pub mod originator;

pub use actuator::Actuator;
pub use originator::Originator;

use crate::error::LinkError;
use crate::hw::SerialPort;
use crate::protocol::{Frame, Parser, MAX_FRAME_LEN};

/// Cadences and timeouts, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkTiming {
    /// Command resend period when nothing changed.
    pub command_interval_ms: u32,
    /// Status heartbeat period.
    pub status_interval_ms: u32,
    /// Master considers the link offline after this long without a status.
    pub status_timeout_ms: u32,
    /// Slave falls back to neutral after this long without a command.
    pub command_timeout_ms: u32,
}

impl Default for LinkTiming {
    fn default() -> Self {
        Self {
            command_interval_ms: 20,
            status_interval_ms: 100,
            status_timeout_ms: 500,
            command_timeout_ms: 500,
        }
    }
}

/// `true` if `last` is set and less than `timeout_ms` old. Wrap-safe.
#[inline]
pub fn fresh(last: Option<u32>, now: u32, timeout_ms: u32) -> bool {
    last.is_some_and(|t| now.wrapping_sub(t) < timeout_ms)
}

/// `true` if nothing was ever sent or at least `interval_ms` elapsed since `last`. Wrap-safe.
#[inline]
pub fn due(last: Option<u32>, now: u32, interval_ms: u32) -> bool {
    last.map_or(true, |t| now.wrapping_sub(t) >= interval_ms)
}

/// Pull every buffered byte through the parser and hand each validated frame to `on_frame`.
///
/// A read error stops the drain; frames completed before it have already been delivered.
pub(crate) fn drain<S: SerialPort>(
    serial: &mut S,
    parser: &mut Parser,
    mut on_frame: impl FnMut(Frame),
) -> Result<(), LinkError<S::Error>> {
    loop {
        let byte = match serial.read_byte() {
            Ok(b) => b,
            Err(nb::Error::WouldBlock) => return Ok(()),
            Err(nb::Error::Other(e)) => return Err(LinkError::Serial(e)),
        };

        let Some(raw) = parser.push(byte) else {
            continue;
        };

        match Frame::try_from(raw) {
            Ok(frame) => on_frame(frame),
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::debug!("link: dropped frame: {}", _e);
            }
        }
    }
}

/// Encode and write one frame.
pub(crate) fn send<S: SerialPort>(serial: &mut S, frame: &Frame) -> Result<(), LinkError<S::Error>> {
    let mut buf = [0u8; MAX_FRAME_LEN];
    let len = frame.encode(&mut buf)?;
    serial.write_all(&buf[..len]).map_err(LinkError::Serial)
}
