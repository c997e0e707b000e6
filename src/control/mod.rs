// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Control Algorithms
//!
//! This module provides reusable building blocks for closed-loop motor control.
//!
//! ## Modules
//!
//! - [`pid`] - General-purpose PID controller implementation.
//! - [`ramp`] - Slew-rate limiter for actuator commands.
//! - [`drive`] - Proxy (master) and local (slave) drive controllers.

pub mod drive;
pub mod pid;
pub mod ramp;

pub use drive::{DriveController, LocalDrive, ProxyDrive, BATTERY_CUTOFF_V};
pub use pid::Pid;
pub use ramp::Ramp;
