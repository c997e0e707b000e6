// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pilot input.
//!
//! Receiver decoding lives outside this crate. Whatever produces pilot input implements
//! [`PilotInput`]; receivers that report normalized channels can use [`PilotMapping`] to turn
//! them into a [`PilotFrame`].

use crate::protocol::{LightingCommand, LightingFlags, StatusMode};

/// What the master sends on each poll.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PilotFrame {
    pub throttle: f32,
    pub turn: f32,
    pub lighting: LightingCommand,
}

impl Default for PilotFrame {
    fn default() -> Self {
        Self {
            throttle: 0.0,
            turn: 0.0,
            lighting: LightingCommand::disabled(),
        }
    }
}

pub trait PilotInput {
    fn poll(&mut self, now: u32) -> PilotFrame;
}

/// Normalized receiver channels, each `-1.0..=1.0` unless noted.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PilotChannels {
    pub throttle: f32,
    pub steering: f32,
    /// Three-position status switch.
    pub mode: f32,
    pub hazard: f32,
    pub lights: f32,
    pub rc_linked: bool,
    pub wifi_linked: bool,
    /// `0.0..=1.0`, 1.0 meaning nothing in range.
    pub ultrasonic_left: f32,
    pub ultrasonic_right: f32,
}

impl Default for PilotChannels {
    fn default() -> Self {
        Self {
            throttle: 0.0,
            steering: 0.0,
            mode: 0.0,
            hazard: -1.0,
            lights: -1.0,
            rc_linked: false,
            wifi_linked: false,
            ultrasonic_left: 1.0,
            ultrasonic_right: 1.0,
        }
    }
}

/// Switch thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PilotMapping {
    /// Mode below this is Debug.
    pub mode_debug_below: f32,
    /// Mode above this is Locked.
    pub mode_locked_above: f32,
    /// Hazard and lights switches are on above this.
    pub switch_on_above: f32,
}

impl Default for PilotMapping {
    fn default() -> Self {
        Self {
            mode_debug_below: -0.33,
            mode_locked_above: 0.33,
            switch_on_above: 0.35,
        }
    }
}

impl PilotMapping {
    pub fn status_mode(&self, mode: f32) -> StatusMode {
        if mode < self.mode_debug_below {
            StatusMode::Debug
        } else if mode > self.mode_locked_above {
            StatusMode::Locked
        } else {
            StatusMode::Active
        }
    }

    /// Drive is zeroed while the receiver has no signal.
    pub fn map(&self, ch: &PilotChannels) -> PilotFrame {
        let (throttle, turn) = if ch.rc_linked {
            (normalize(ch.throttle), normalize(ch.steering))
        } else {
            (0.0, 0.0)
        };

        let flags = LightingFlags::empty()
            .with(LightingFlags::ENABLED, ch.lights > self.switch_on_above)
            .with(LightingFlags::HAZARD, ch.hazard > self.switch_on_above)
            .with(LightingFlags::RC_LINKED, ch.rc_linked)
            .with(LightingFlags::WIFI_LINKED, ch.wifi_linked);

        PilotFrame {
            throttle,
            turn,
            lighting: LightingCommand {
                steering: turn,
                throttle,
                ultrasonic_left: ch.ultrasonic_left,
                ultrasonic_right: ch.ultrasonic_right,
                status_mode: self.status_mode(ch.mode),
                flags,
            },
        }
    }
}

fn normalize(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_switch_thresholds() {
        let m = PilotMapping::default();
        assert_eq!(m.status_mode(-1.0), StatusMode::Debug);
        assert_eq!(m.status_mode(-0.33), StatusMode::Active);
        assert_eq!(m.status_mode(0.0), StatusMode::Active);
        assert_eq!(m.status_mode(0.33), StatusMode::Active);
        assert_eq!(m.status_mode(0.34), StatusMode::Locked);
    }

    #[test]
    fn switches_and_link_flags() {
        let m = PilotMapping::default();
        let ch = PilotChannels {
            lights: 0.36,
            hazard: 0.35,
            rc_linked: true,
            wifi_linked: false,
            ..PilotChannels::default()
        };
        let flags = m.map(&ch).lighting.flags;
        assert!(flags.contains(LightingFlags::ENABLED));
        assert!(!flags.contains(LightingFlags::HAZARD));
        assert!(flags.contains(LightingFlags::RC_LINKED));
        assert!(!flags.contains(LightingFlags::WIFI_LINKED));
    }

    #[test]
    fn drive_zeroed_without_rc() {
        let m = PilotMapping::default();
        let mut ch = PilotChannels {
            throttle: 0.7,
            steering: -2.0,
            rc_linked: true,
            ..PilotChannels::default()
        };
        let f = m.map(&ch);
        assert_eq!((f.throttle, f.turn), (0.7, -1.0));
        assert_eq!(f.lighting.steering, -1.0);

        ch.rc_linked = false;
        let f = m.map(&ch);
        assert_eq!((f.throttle, f.turn), (0.0, 0.0));
        assert_eq!(f.lighting.throttle, 0.0);
    }
}
