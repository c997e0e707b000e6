// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Ramp-limited track motor driven by two H-bridge channels.
//!
//! Each track is powered by both halves of a dual H-bridge wired in parallel, so both channels
//! always receive the same direction and duty. The ramp output is the only state; hardware is
//! written from it by [`TrackMotor::apply`].

#[allow(unused_imports)]
use micromath::F32Ext;

use embedded_hal::i2c::I2c;

use crate::config::{DriverPins, HBridgePins};
use crate::control::Ramp;
use crate::error::DeviceError;
use crate::hw::{Board, Hardware};

/// Outputs at or below this magnitude are treated as stopped.
pub const DEAD_ZONE: f32 = 0.001;

pub struct TrackMotor {
    ramp: Ramp,
    channels: [HBridgePins; 2],
}

impl TrackMotor {
    pub fn new(pins: DriverPins, ramp_rate: f32) -> Self {
        Self {
            ramp: Ramp::new(ramp_rate),
            channels: pins.channels(),
        }
    }

    /// Rewire and retune. The motor stops.
    pub fn configure(&mut self, pins: DriverPins, ramp_rate: f32) {
        self.channels = pins.channels();
        self.ramp.set_rate(ramp_rate);
        self.ramp.stop();
    }

    /// Request a new normalized speed in `[-1, 1]`; reached gradually by [`update`](Self::update).
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.ramp.set_target(target);
    }

    /// Advance the ramp by `dt` seconds.
    #[inline]
    pub fn update(&mut self, dt: f32) -> f32 {
        self.ramp.update(dt)
    }

    /// Zero the output immediately, bypassing the ramp.
    #[inline]
    pub fn stop(&mut self) {
        self.ramp.stop();
    }

    #[inline]
    pub fn current(&self) -> f32 {
        self.ramp.current()
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.ramp.target()
    }

    #[inline]
    pub fn channels(&self) -> &[HBridgePins; 2] {
        &self.channels
    }

    /// Write the current output to both channels.
    ///
    /// Both channels are always attempted; the first failure is returned.
    pub fn apply<B: Board, I2C: I2c>(
        &self,
        hw: &mut Hardware<B, I2C>,
    ) -> Result<(), DeviceError> {
        let mut result = Ok(());
        for channel in &self.channels {
            let r = apply_channel(hw, channel, self.ramp.current());
            if result.is_ok() {
                result = r;
            }
        }
        result
    }
}

fn apply_channel<B: Board, I2C: I2c>(
    hw: &mut Hardware<B, I2C>,
    pins: &HBridgePins,
    output: f32,
) -> Result<(), DeviceError> {
    let magnitude = output.abs();

    let (in1, in2, duty) = if magnitude <= DEAD_ZONE {
        (false, false, 0)
    } else {
        let max = hw.max_duty();
        let duty = (magnitude.min(1.0) * max as f32).round() as u16;
        (output > 0.0, output < 0.0, duty.min(max))
    };

    let direction = hw
        .write_pin(pins.in1, in1)
        .and(hw.write_pin(pins.in2, in2));

    match direction {
        Ok(()) => {
            hw.write_pwm(pins.pwm, duty);
            Ok(())
        }
        Err(e) => {
            hw.write_pwm(pins.pwm, 0);
            Err(e)
        }
    }
}
