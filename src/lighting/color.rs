// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! 8-bit RGB colors and blending.

#[allow(unused_imports)]
use micromath::F32Ext;

use crate::drivers::pca9685::MAX_DUTY;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const OFF: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const RED: Self = Self::new(255, 0, 0);
    pub const YELLOW: Self = Self::new(255, 255, 0);
    pub const GREEN: Self = Self::new(0, 255, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels as 12-bit PWM duties.
    pub fn duties(self) -> [u16; 3] {
        [self.r, self.g, self.b].map(|c| (c as u32 * MAX_DUTY as u32 / 255) as u16)
    }
}

/// Linear interpolation, `t` clamped to `[0, 1]`.
pub fn lerp(from: Rgb, to: Rgb, t: f32) -> Rgb {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let channel = |a: u8, b: u8| {
        let v = a as f32 + (b as f32 - a as f32) * t;
        v.round().clamp(0.0, 255.0) as u8
    };
    Rgb::new(
        channel(from.r, to.r),
        channel(from.g, to.g),
        channel(from.b, to.b),
    )
}

/// Proximity color: green when far (`0.0`), yellow midway, red when touching (`1.0`).
pub fn proximity_gradient(closeness: f32) -> Rgb {
    if closeness >= 0.5 {
        lerp(Rgb::YELLOW, Rgb::RED, (closeness - 0.5) * 2.0)
    } else {
        lerp(Rgb::GREEN, Rgb::YELLOW, closeness * 2.0)
    }
}
