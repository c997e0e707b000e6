// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Inter-Board Protocol
//!
//! - [`frame`] - Wire layout, checksum and frame encoding.
//! - [`parser`] - Recoverable byte-at-a-time frame parser.
//! - [`messages`] - Typed payloads and the validated [`Frame`] sum type.

pub mod frame;
pub mod messages;
pub mod parser;

pub use frame::{FrameType, MAX_FRAME_LEN, MAX_PAYLOAD};
pub use messages::{
    CommandPayload, Frame, LightingCommand, LightingFlags, StatusMode, StatusPayload,
};
pub use parser::{Parser, ParserStats, RawFrame};
