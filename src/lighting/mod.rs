// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Lighting
//!
//! Four RGB fixtures (front-left, front-right, rear-left, rear-right) on a PCA9685.
//!
//! - [`color`] - RGB values, interpolation and the proximity gradient.
//! - [`pattern`] - Pure pattern state machine (hazard, connection alert, normal lighting).
//! - [`controller`] - Feature gating and bus writes.

pub mod color;
pub mod controller;
pub mod pattern;

pub use color::Rgb;
pub use controller::LightingController;
pub use pattern::{Fixture, LightingTuning, Palette, Pattern, Scene};
