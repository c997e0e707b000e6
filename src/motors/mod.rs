// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Actuator Abstractions
//!
//! This module contains motor-level wrappers that sit above the hardware context in `hw`.
//!
//! ## Modules
//!
//! - [`track_motor`] - Ramp-limited track motor on a dual H-bridge.

pub mod track_motor;

pub use track_motor::{TrackMotor, DEAD_ZONE};
