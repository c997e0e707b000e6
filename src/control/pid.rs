// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Generic PID controller for closed-loop control.
//!
//! Works in `no_std` and does not allocate memory.
//!
//! The tracks have no encoders, so the drive loop feeds the commanded value in as the error term
//! and the controller acts as a shaping filter rather than a regulator. There is no anti-windup
//! and no output clamp; the ramp and the track motor clamp downstream.

/// PID controller with tunable gains.
#[derive(Debug, Clone)]
pub struct Pid {
    /// Proportional gain
    kp: f32,
    /// Integral gain
    ki: f32,
    /// Derivative gain
    kd: f32,

    /// Integrator state
    integral: f32,
    /// Last error (for derivative term)
    prev_error: f32,
}

impl Pid {
    /// Create a new PID controller.
    ///
    /// `kp`, `ki`, `kd` are the gain constants.
    pub const fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self {
            kp,
            ki,
            kd,

            integral: 0.0,
            prev_error: 0.0,
        }
    }

    /// Replace the gains, keeping integrator state.
    pub fn set_gains(&mut self, kp: f32, ki: f32, kd: f32) {
        self.kp = kp;
        self.ki = ki;
        self.kd = kd;
    }

    /// Reset integrator + derivative history.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = 0.0;
    }

    #[inline]
    pub fn integral(&self) -> f32 {
        self.integral
    }

    /// Update the controller.
    ///
    /// `error` — setpoint minus measurement  
    /// `dt` — timestep in seconds (e.g. 0.02 for 50 Hz control loop)
    ///
    /// A non-positive or non-finite `dt` skips integration and contributes no derivative; the
    /// error is still recorded for the next step.
    pub fn update(&mut self, error: f32, dt: f32) -> f32 {
        let valid_dt = dt > 0.0 && dt.is_finite();

        // ----- I term -----
        if valid_dt {
            self.integral += error * dt;
        }

        // ----- D term -----
        let derivative = if valid_dt {
            (error - self.prev_error) / dt
        } else {
            0.0
        };
        self.prev_error = error;

        self.kp * error + self.ki * self.integral + self.kd * derivative
    }
}
