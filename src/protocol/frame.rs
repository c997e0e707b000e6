// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Wire framing shared by both boards.
//!
//! ```text
//! +-------+------+--------+-----------------+----------+
//! | magic | type | length | payload[length] | checksum |
//! +-------+------+--------+-----------------+----------+
//!    1 B    1 B     1 B       0..=96 B          1 B
//! ```
//!
//! The checksum is the XOR of `type`, `length` and every payload byte. Multi-byte fields inside
//! payloads are little-endian.

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::error::EncodeError;

/// Sync byte for the protocol.
pub const MAGIC: u8 = 0xA5;

/// Largest payload a frame may carry.
pub const MAX_PAYLOAD: usize = 96;

/// Bytes of framing around the payload (magic, type, length, checksum).
pub const FRAME_OVERHEAD: usize = 4;

/// Largest encoded frame.
pub const MAX_FRAME_LEN: usize = MAX_PAYLOAD + FRAME_OVERHEAD;

/// UART baud rate of the inter-board link (8N1, full duplex).
pub const LINK_BAUD: u32 = 921_600;

/// Frame type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FrameType {
    /// Master → slave configuration snapshot.
    Config = 0x01,
    /// Master → slave drive and lighting command.
    Command = 0x02,
    /// Slave → master status heartbeat.
    Status = 0x81,
}

/// XOR-fold checksum over type, length and payload.
#[inline]
pub fn checksum(frame_type: u8, payload: &[u8]) -> u8 {
    payload
        .iter()
        .fold(frame_type ^ payload.len() as u8, |acc, b| acc ^ b)
}

/// Encode a frame into `out` and return the number of bytes written.
pub fn encode(frame_type: u8, payload: &[u8], out: &mut [u8]) -> Result<usize, EncodeError> {
    if payload.len() > MAX_PAYLOAD {
        return Err(EncodeError::PayloadTooLarge { len: payload.len() });
    }

    let total = payload.len() + FRAME_OVERHEAD;
    if out.len() < total {
        return Err(EncodeError::BufferTooSmall);
    }

    out[0] = MAGIC;
    out[1] = frame_type;
    out[2] = payload.len() as u8;
    out[3..3 + payload.len()].copy_from_slice(payload);
    out[total - 1] = checksum(frame_type, payload);

    Ok(total)
}
