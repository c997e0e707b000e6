// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Slew-rate limiter for normalized actuator commands.

#[allow(unused_imports)]
use micromath::F32Ext;

/// Remaining distances this small count as "within one step" despite float rounding.
pub const SNAP_EPSILON: f32 = 1e-6;

/// Moves `current` toward `target` by at most `rate * dt` per update.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Ramp {
    target: f32,
    current: f32,
    /// Units per second.
    rate: f32,
}

impl Ramp {
    pub fn new(rate: f32) -> Self {
        let mut ramp = Self {
            target: 0.0,
            current: 0.0,
            rate: 0.0,
        };
        ramp.set_rate(rate);
        ramp
    }

    /// Negative or non-finite rates hold the output where it is.
    pub fn set_rate(&mut self, rate: f32) {
        self.rate = if rate.is_finite() && rate > 0.0 { rate } else { 0.0 };
    }

    /// Set the target, clamped to `[-1, 1]`. NaN counts as zero.
    pub fn set_target(&mut self, target: f32) {
        self.target = if target.is_nan() {
            0.0
        } else {
            target.clamp(-1.0, 1.0)
        };
    }

    /// Advance by `dt` seconds and return the new output.
    pub fn update(&mut self, dt: f32) -> f32 {
        if !(dt > 0.0 && dt.is_finite()) {
            return self.current;
        }

        let step = self.rate * dt;
        let remaining = self.target - self.current;

        if remaining.abs() <= step + SNAP_EPSILON {
            self.current = self.target;
        } else if remaining > 0.0 {
            self.current += step;
        } else {
            self.current -= step;
        }
        self.current
    }

    /// Zero target and output immediately.
    pub fn stop(&mut self) {
        self.target = 0.0;
        self.current = 0.0;
    }

    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    #[inline]
    pub fn rate(&self) -> f32 {
        self.rate
    }
}
