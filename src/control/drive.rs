// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Drive controllers.
//!
//! The same [`DriveController`] interface exists on both boards:
//!
//! - [`ProxyDrive`] on the master forwards throttle/turn over the link and reports the battery
//!   voltage the slave sends back.
//! - [`LocalDrive`] on the slave mixes throttle/turn into left/right track targets, shapes each
//!   side with a PID, and ramps the result into a [`TrackMotor`].
//!
//! Typical slave usage:
//!
//! ```ignore
//! drive.set_command(cmd.throttle, cmd.turn);
//! drive.set_battery_voltage(Some(volts));
//! drive.update(now_ms);
//! drive.apply(&mut hw)?;
//! ```

use core::convert::Infallible;

#[allow(unused_imports)]
use micromath::F32Ext;

use embedded_hal::i2c::I2c;

use crate::config::{DriveTuning, Features, VehicleConfig};
use crate::control::Pid;
use crate::error::{DeviceError, LinkError};
use crate::hw::{Board, Hardware, SerialPort};
use crate::link::Originator;
use crate::motors::TrackMotor;

/// Below this battery voltage both tracks stop.
pub const BATTERY_CUTOFF_V: f32 = 11.0;

pub trait DriveController {
    type Error;

    /// Normalized throttle and turn, `-1.0..=1.0`.
    fn set_command(&mut self, throttle: f32, turn: f32);

    /// Advance to `now_ms`.
    fn update(&mut self, now_ms: u32) -> Result<(), Self::Error>;

    /// Battery voltage, if known.
    fn battery_voltage(&self) -> Option<f32>;
}

/// Master-side drive: no local actuation, everything goes over the link.
pub struct ProxyDrive<S> {
    link: Originator<S>,
    throttle: f32,
    turn: f32,
}

impl<S: SerialPort> ProxyDrive<S> {
    pub fn new(link: Originator<S>) -> Self {
        Self {
            link,
            throttle: 0.0,
            turn: 0.0,
        }
    }

    #[inline]
    pub fn link(&self) -> &Originator<S> {
        &self.link
    }

    #[inline]
    pub fn link_mut(&mut self) -> &mut Originator<S> {
        &mut self.link
    }
}

impl<S: SerialPort> DriveController for ProxyDrive<S> {
    type Error = LinkError<S::Error>;

    fn set_command(&mut self, throttle: f32, turn: f32) {
        self.throttle = throttle;
        self.turn = turn;
    }

    fn update(&mut self, now_ms: u32) -> Result<(), Self::Error> {
        self.link.set_drive(self.throttle, self.turn);
        self.link.poll(now_ms)
    }

    fn battery_voltage(&self) -> Option<f32> {
        self.link.battery_voltage()
    }
}

/// Slave-side drive: dual PID + ramp-limited track motors.
pub struct LocalDrive {
    tuning: DriveTuning,
    enabled: bool,

    left: TrackMotor,
    right: TrackMotor,
    left_pid: Pid,
    right_pid: Pid,

    throttle: f32,
    turn: f32,

    battery_voltage: Option<f32>,
    cut_off: bool,
    last_update: Option<u32>,
}

impl LocalDrive {
    pub fn new(config: &VehicleConfig) -> Self {
        let t = config.drive;
        Self {
            tuning: t,
            enabled: config.features.contains(Features::MOTORS),
            left: TrackMotor::new(config.left, t.ramp_rate),
            right: TrackMotor::new(config.right, t.ramp_rate),
            left_pid: Pid::new(t.kp, t.ki, t.kd),
            right_pid: Pid::new(t.kp, t.ki, t.kd),
            throttle: 0.0,
            turn: 0.0,
            battery_voltage: None,
            cut_off: false,
            last_update: None,
        }
    }

    /// Apply a new configuration. Motors stop and the PIDs start fresh.
    pub fn configure(&mut self, config: &VehicleConfig) {
        let t = config.drive;
        self.tuning = t;
        self.enabled = config.features.contains(Features::MOTORS);

        self.left.configure(config.left, t.ramp_rate);
        self.right.configure(config.right, t.ramp_rate);

        for pid in [&mut self.left_pid, &mut self.right_pid] {
            pid.set_gains(t.kp, t.ki, t.kd);
            pid.reset();
        }
    }

    /// `None` disables the low-voltage cutoff.
    #[inline]
    pub fn set_battery_voltage(&mut self, volts: Option<f32>) {
        self.battery_voltage = volts;
    }

    #[inline]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn left(&self) -> &TrackMotor {
        &self.left
    }

    #[inline]
    pub fn right(&self) -> &TrackMotor {
        &self.right
    }

    /// `true` while the battery is below the cutoff.
    #[inline]
    pub fn cut_off(&self) -> bool {
        self.cut_off
    }

    /// Stop both tracks immediately and forget PID history.
    pub fn stop(&mut self) {
        self.left.stop();
        self.right.stop();
        self.left_pid.reset();
        self.right_pid.reset();
    }

    /// Run one control step.
    ///
    /// `dt` — time delta in seconds since the previous call, e.g. 0.01 for 10ms.
    pub fn step(&mut self, dt: f32) {
        let low = self
            .battery_voltage
            .is_some_and(|v| v < BATTERY_CUTOFF_V);

        if low != self.cut_off {
            #[cfg(feature = "defmt")]
            {
                if low {
                    defmt::warn!("drive: battery below cutoff, stopping");
                } else {
                    defmt::info!("drive: battery recovered");
                }
            }
            self.cut_off = low;
        }

        if low || !self.enabled {
            self.stop();
            return;
        }

        let max = if self.tuning.max_magnitude.is_finite() {
            self.tuning.max_magnitude.abs()
        } else {
            1.0
        };
        let throttle = clamp_finite(self.throttle, max);
        let turn = clamp_finite(self.turn, max);

        let left_target = throttle - turn;
        let right_target = throttle + turn;

        let u = self.left_pid.update(left_target, dt);
        self.left.set_target(u);
        self.left.update(dt);

        let u = self.right_pid.update(right_target, dt);
        self.right.set_target(u);
        self.right.update(dt);
    }

    /// Push both tracks to the hardware. Both are always attempted; the first failure is returned.
    pub fn apply<B: Board, I2C: I2c>(
        &self,
        hw: &mut Hardware<B, I2C>,
    ) -> Result<(), DeviceError> {
        let left = self.left.apply(hw);
        let right = self.right.apply(hw);
        left.and(right)
    }
}

impl DriveController for LocalDrive {
    type Error = Infallible;

    fn set_command(&mut self, throttle: f32, turn: f32) {
        self.throttle = throttle;
        self.turn = turn;
    }

    /// Derives `dt` from the previous call. The first call only records the timestamp.
    fn update(&mut self, now_ms: u32) -> Result<(), Self::Error> {
        let dt = match self.last_update {
            Some(last) => now_ms.wrapping_sub(last) as f32 / 1000.0,
            None => 0.0,
        };
        self.last_update = Some(now_ms);
        self.step(dt);
        Ok(())
    }

    fn battery_voltage(&self) -> Option<f32> {
        self.battery_voltage
    }
}

fn clamp_finite(value: f32, max: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-max, max)
    }
}
