// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Lighting pattern state machine.
//!
//! [`Pattern::render`] turns a lighting command and a timestamp into a [`Scene`], one color per
//! fixture. Priority, highest first:
//!
//! 1. Hazard blinker on all four fixtures.
//! 2. Connection alert when a watched link is down.
//! 3. Normal lighting: status-mode head/tail colors, reverse lights, turn signals and the
//!    proximity overlay.
//!
//! Rendering touches no hardware; [`LightingController`](super::LightingController) writes the
//! result.

use core::ops::{Index, IndexMut};

use crate::config::Features;
use crate::lighting::color::{lerp, proximity_gradient, Rgb};
use crate::protocol::{LightingCommand, LightingFlags, StatusMode};

/// Thresholds and durations.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LightingTuning {
    /// On, off, on, off.
    pub hazard_phases_ms: [u32; 4],
    /// Time each side of a connection alert stays lit.
    pub alert_period_ms: u32,
    /// Steering beyond this magnitude blinks that side.
    pub turn_threshold: f32,
    /// Throttle below this lights the reverse lights.
    pub reverse_threshold: f32,
    /// Minimum closeness (`1 - reading`) before the proximity overlay shows.
    pub proximity_threshold: f32,
}

impl Default for LightingTuning {
    fn default() -> Self {
        Self {
            hazard_phases_ms: [150, 150, 150, 450],
            alert_period_ms: 180,
            turn_threshold: 0.25,
            reverse_threshold: -0.15,
            proximity_threshold: 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Palette {
    pub head_debug: Rgb,
    pub head_active: Rgb,
    pub tail_debug: Rgb,
    pub tail_active: Rgb,
    /// All four fixtures while locked.
    pub locked: Rgb,
    pub reverse: Rgb,
    /// Turn signals, hazard and RC alert.
    pub amber: Rgb,
    /// Wi-Fi alert.
    pub cyan: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            head_debug: Rgb::new(0, 0, 255),
            head_active: Rgb::WHITE,
            tail_debug: Rgb::new(128, 0, 128),
            tail_active: Rgb::new(96, 0, 0),
            locked: Rgb::RED,
            reverse: Rgb::WHITE,
            amber: Rgb::new(255, 110, 0),
            cyan: Rgb::new(0, 255, 255),
        }
    }
}

impl Palette {
    fn head(&self, mode: StatusMode) -> Rgb {
        match mode {
            StatusMode::Debug => self.head_debug,
            StatusMode::Active => self.head_active,
            StatusMode::Locked => self.locked,
        }
    }

    fn tail(&self, mode: StatusMode) -> Rgb {
        match mode {
            StatusMode::Debug => self.tail_debug,
            StatusMode::Active => self.tail_active,
            StatusMode::Locked => self.locked,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fixture {
    FrontLeft = 0,
    FrontRight = 1,
    RearLeft = 2,
    RearRight = 3,
}

impl Fixture {
    pub const ALL: [Fixture; 4] = [
        Fixture::FrontLeft,
        Fixture::FrontRight,
        Fixture::RearLeft,
        Fixture::RearRight,
    ];
}

/// One color per fixture.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Scene(pub [Rgb; 4]);

impl Scene {
    pub const OFF: Self = Self([Rgb::OFF; 4]);

    pub const fn uniform(color: Rgb) -> Self {
        Self([color; 4])
    }
}

impl Index<Fixture> for Scene {
    type Output = Rgb;

    fn index(&self, f: Fixture) -> &Rgb {
        &self.0[f as usize]
    }
}

impl IndexMut<Fixture> for Scene {
    fn index_mut(&mut self, f: Fixture) -> &mut Rgb {
        &mut self.0[f as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

impl Side {
    fn fixtures(self) -> [Fixture; 2] {
        match self {
            Side::Left => [Fixture::FrontLeft, Fixture::RearLeft],
            Side::Right => [Fixture::FrontRight, Fixture::RearRight],
        }
    }
}

pub struct Pattern {
    pub tuning: LightingTuning,
    pub palette: Palette,
    blink_period_ms: u32,
    hazard_since: Option<u32>,
}

impl Pattern {
    pub fn new(tuning: LightingTuning, palette: Palette, blink_period_ms: u16) -> Self {
        Self {
            tuning,
            palette,
            blink_period_ms: blink_period_ms as u32,
            hazard_since: None,
        }
    }

    pub fn set_blink_period(&mut self, blink_period_ms: u16) {
        self.blink_period_ms = blink_period_ms as u32;
    }

    /// Restart the hazard sequence the next time hazard is requested.
    #[inline]
    pub fn reset(&mut self) {
        self.hazard_since = None;
    }

    /// Render the scene for `now`. `watch` holds the WATCH_RC / WATCH_WIFI features.
    pub fn render(&mut self, cmd: &LightingCommand, watch: Features, now: u32) -> Scene {
        if cmd.flags.contains(LightingFlags::HAZARD) {
            let since = *self.hazard_since.get_or_insert(now);
            return self.hazard(now.wrapping_sub(since));
        }
        self.hazard_since = None;

        if let Some(scene) = self.alert(cmd, watch, now) {
            return scene;
        }

        self.normal(cmd, now)
    }

    fn hazard(&self, elapsed: u32) -> Scene {
        let phases = self.tuning.hazard_phases_ms;
        let cycle = phases.iter().fold(0u32, |a, b| a.saturating_add(*b));
        if cycle == 0 {
            return Scene::uniform(self.palette.amber);
        }

        let mut t = elapsed % cycle;
        for (i, len) in phases.iter().enumerate() {
            if t < *len {
                return if i % 2 == 0 {
                    Scene::uniform(self.palette.amber)
                } else {
                    Scene::OFF
                };
            }
            t -= len;
        }
        Scene::OFF
    }

    fn alert(&self, cmd: &LightingCommand, watch: Features, now: u32) -> Option<Scene> {
        let first_half = (now / self.tuning.alert_period_ms.max(1)) % 2 == 0;

        if watch.contains(Features::WATCH_RC) && !cmd.flags.contains(LightingFlags::RC_LINKED) {
            let lit = if first_half { Side::Left } else { Side::Right };
            let mut scene = Scene::OFF;
            for f in lit.fixtures() {
                scene[f] = self.palette.amber;
            }
            return Some(scene);
        }

        if watch.contains(Features::WATCH_WIFI) && !cmd.flags.contains(LightingFlags::WIFI_LINKED)
        {
            let lit = if first_half {
                [Fixture::FrontLeft, Fixture::FrontRight]
            } else {
                [Fixture::RearLeft, Fixture::RearRight]
            };
            let mut scene = Scene::OFF;
            for f in lit {
                scene[f] = self.palette.cyan;
            }
            return Some(scene);
        }

        None
    }

    fn normal(&self, cmd: &LightingCommand, now: u32) -> Scene {
        let mode = cmd.status_mode;
        let mut scene = if mode == StatusMode::Locked {
            Scene::uniform(self.palette.locked)
        } else {
            let head = self.palette.head(mode);
            let tail = self.palette.tail(mode);
            Scene([head, head, tail, tail])
        };

        if cmd.throttle < self.tuning.reverse_threshold {
            scene[Fixture::RearLeft] = self.palette.reverse;
            scene[Fixture::RearRight] = self.palette.reverse;
        }

        let turning = if cmd.steering > self.tuning.turn_threshold {
            Some(Side::Right)
        } else if cmd.steering < -self.tuning.turn_threshold {
            Some(Side::Left)
        } else {
            None
        };
        if let Some(side) = turning {
            let color = if self.blink_on(now) {
                self.palette.amber
            } else {
                Rgb::OFF
            };
            for f in side.fixtures() {
                scene[f] = color;
            }
        }

        self.overlay_proximity(&mut scene, Fixture::FrontLeft, cmd.ultrasonic_left);
        self.overlay_proximity(&mut scene, Fixture::FrontRight, cmd.ultrasonic_right);

        scene
    }

    /// Global turn-signal toggle: on for the first half of every blink period.
    fn blink_on(&self, now: u32) -> bool {
        let half = (self.blink_period_ms / 2).max(1);
        (now / half) % 2 == 0
    }

    fn overlay_proximity(&self, scene: &mut Scene, fixture: Fixture, reading: f32) {
        if reading.is_nan() {
            return;
        }
        let closeness = (1.0 - reading).clamp(0.0, 1.0);
        if closeness > self.tuning.proximity_threshold {
            let warning = proximity_gradient(closeness);
            scene[fixture] = lerp(scene[fixture], warning, closeness);
        }
    }
}

impl Default for Pattern {
    fn default() -> Self {
        Self::new(LightingTuning::default(), Palette::default(), 450)
    }
}
