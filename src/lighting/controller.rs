// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Lighting controller: renders the pattern and writes it to the PCA9685.

use embedded_hal::i2c::I2c;

use crate::config::{Features, LightingConfig, VehicleConfig};
use crate::drivers::Pca9685;
use crate::error::DeviceError;
use crate::lighting::pattern::{Fixture, LightingTuning, Palette, Pattern, Scene};
use crate::protocol::{LightingCommand, LightingFlags};

pub struct LightingController {
    driver: Pca9685,
    config: LightingConfig,
    installed: bool,
    watch: Features,
    pattern: Pattern,
    /// What the fixtures currently show, `None` if unknown.
    shown: Option<Scene>,
    lit: bool,
}

impl LightingController {
    pub fn new(tuning: LightingTuning, palette: Palette) -> Self {
        let config = LightingConfig::default();
        Self {
            driver: Pca9685::new(config.address),
            config,
            installed: false,
            watch: Features::empty(),
            pattern: Pattern::new(tuning, palette, config.blink_period_ms),
            shown: None,
            lit: false,
        }
    }

    #[inline]
    pub fn pattern_mut(&mut self) -> &mut Pattern {
        &mut self.pattern
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.driver.is_ready()
    }

    /// Apply a configuration and (re)initialize the PWM driver if the rig is installed.
    pub fn configure<I2C: I2c>(
        &mut self,
        i2c: &mut I2C,
        config: &VehicleConfig,
    ) -> Result<(), DeviceError> {
        self.config = config.lighting;
        self.installed = config.features.contains(Features::LIGHTING);
        self.watch = Features::from_bits_retain(
            config.features.bits() & (Features::WATCH_RC | Features::WATCH_WIFI).bits(),
        );
        self.pattern.set_blink_period(self.config.blink_period_ms);
        self.pattern.reset();
        self.driver = Pca9685::new(self.config.address);
        self.shown = None;
        self.lit = false;

        if !self.installed {
            return Ok(());
        }

        let result = self.driver.init(i2c, self.config.pwm_frequency_hz);
        if result.is_ok() {
            self.shown = Some(Scene::OFF);
        }

        #[cfg(feature = "defmt")]
        {
            match &result {
                Ok(()) => defmt::info!("lighting: pca9685 {:#x} ready", self.config.address),
                Err(e) => defmt::warn!("lighting: pca9685 init failed: {}", e),
            }
        }

        result
    }

    /// Re-initialize a PWM driver that dropped out. The next update repaints the scene.
    pub fn reinit<I2C: I2c>(&mut self, i2c: &mut I2C) -> Result<(), DeviceError> {
        if !self.installed || self.driver.is_ready() {
            return Ok(());
        }

        self.driver.init(i2c, self.config.pwm_frequency_hz)?;
        self.shown = Some(Scene::OFF);

        #[cfg(feature = "defmt")]
        defmt::info!("lighting: pca9685 {:#x} recovered", self.config.address);
        Ok(())
    }

    /// Render for `now` and write whatever changed.
    pub fn update<I2C: I2c>(
        &mut self,
        i2c: &mut I2C,
        cmd: &LightingCommand,
        now: u32,
    ) -> Result<(), DeviceError> {
        if !self.installed {
            return Ok(());
        }

        let hazard = cmd.flags.contains(LightingFlags::HAZARD);
        let enabled = cmd.flags.contains(LightingFlags::ENABLED);

        if !enabled && !hazard {
            self.pattern.reset();
            if self.lit {
                self.lit = false;
                return self.show(i2c, Scene::OFF);
            }
            return Ok(());
        }

        self.lit = true;
        let scene = self.pattern.render(cmd, self.watch, now);
        self.show(i2c, scene)
    }

    fn show<I2C: I2c>(&mut self, i2c: &mut I2C, scene: Scene) -> Result<(), DeviceError> {
        if self.shown == Some(scene) {
            return Ok(());
        }

        let result = if scene == Scene::OFF {
            self.driver.all_off(i2c)
        } else {
            self.write_scene(i2c, &scene)
        };

        self.shown = result.is_ok().then_some(scene);
        result
    }

    fn write_scene<I2C: I2c>(&mut self, i2c: &mut I2C, scene: &Scene) -> Result<(), DeviceError> {
        for fixture in Fixture::ALL {
            let color = scene[fixture];
            if self.shown.is_some_and(|s| s[fixture] == color) {
                continue;
            }

            let ch = self.config.fixtures[fixture as usize];
            let [r, g, b] = color.duties();
            self.driver.set_duty(i2c, ch.r, r)?;
            self.driver.set_duty(i2c, ch.g, g)?;
            self.driver.set_duty(i2c, ch.b, b)?;
        }
        Ok(())
    }
}

impl Default for LightingController {
    fn default() -> Self {
        Self::new(LightingTuning::default(), Palette::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hw::fake::FakeI2c;
    use crate::protocol::StatusMode;

    fn configured(i2c: &mut FakeI2c, features: Features) -> LightingController {
        let mut cfg = VehicleConfig::default();
        cfg.features = features;
        let mut ctrl = LightingController::default();
        ctrl.configure(i2c, &cfg).unwrap();
        i2c.clear();
        ctrl
    }

    fn cmd(flags: LightingFlags) -> LightingCommand {
        LightingCommand {
            flags: flags | LightingFlags::RC_LINKED | LightingFlags::WIFI_LINKED,
            ..LightingCommand::disabled()
        }
    }

    #[test]
    fn not_installed_never_touches_the_bus() {
        let mut i2c = FakeI2c::new();
        let mut ctrl = configured(&mut i2c, Features::MOTORS);
        ctrl.update(&mut i2c, &cmd(LightingFlags::ENABLED | LightingFlags::HAZARD), 0)
            .unwrap();
        assert!(i2c.writes().is_empty());
    }

    #[test]
    fn disabled_is_a_no_op() {
        let mut i2c = FakeI2c::new();
        let mut ctrl = configured(&mut i2c, Features::LIGHTING);
        ctrl.update(&mut i2c, &cmd(LightingFlags::empty()), 0).unwrap();
        ctrl.update(&mut i2c, &cmd(LightingFlags::empty()), 100).unwrap();
        assert!(i2c.writes().is_empty());
    }

    #[test]
    fn unchanged_scene_is_not_rewritten() {
        let mut i2c = FakeI2c::new();
        let mut ctrl = configured(&mut i2c, Features::LIGHTING);
        let on = cmd(LightingFlags::ENABLED);

        ctrl.update(&mut i2c, &on, 0).unwrap();
        // Four fixtures, three channels each.
        assert_eq!(i2c.writes().len(), 12);

        i2c.clear();
        ctrl.update(&mut i2c, &on, 20).unwrap();
        assert!(i2c.writes().is_empty());
    }

    #[test]
    fn only_changed_fixtures_are_written() {
        let mut i2c = FakeI2c::new();
        let mut ctrl = configured(&mut i2c, Features::LIGHTING);
        let mut on = cmd(LightingFlags::ENABLED);
        ctrl.update(&mut i2c, &on, 0).unwrap();
        i2c.clear();

        on.status_mode = StatusMode::Debug;
        ctrl.update(&mut i2c, &on, 1).unwrap();
        // Head and tail colors both change, all four fixtures rewritten.
        assert_eq!(i2c.writes().len(), 12);

        i2c.clear();
        on.throttle = -1.0;
        ctrl.update(&mut i2c, &on, 2).unwrap();
        // Only the two rear fixtures.
        assert_eq!(i2c.writes().len(), 6);
    }

    #[test]
    fn disabling_blanks_once() {
        let mut i2c = FakeI2c::new();
        let mut ctrl = configured(&mut i2c, Features::LIGHTING);
        ctrl.update(&mut i2c, &cmd(LightingFlags::ENABLED), 0).unwrap();
        i2c.clear();

        ctrl.update(&mut i2c, &cmd(LightingFlags::empty()), 10).unwrap();
        assert_eq!(i2c.writes(), vec![(0x40, vec![0xFA, 0, 0, 0, 0x10])]);

        i2c.clear();
        ctrl.update(&mut i2c, &cmd(LightingFlags::empty()), 20).unwrap();
        assert!(i2c.writes().is_empty());
    }

    #[test]
    fn hazard_works_with_lights_switched_off() {
        let mut i2c = FakeI2c::new();
        let mut ctrl = configured(&mut i2c, Features::LIGHTING);
        ctrl.update(&mut i2c, &cmd(LightingFlags::HAZARD), 0).unwrap();
        assert_eq!(i2c.writes().len(), 12);

        // Off phase blanks everything in one transaction.
        i2c.clear();
        ctrl.update(&mut i2c, &cmd(LightingFlags::HAZARD), 150).unwrap();
        assert_eq!(i2c.writes(), vec![(0x40, vec![0xFA, 0, 0, 0, 0x10])]);
    }

    #[test]
    fn hazard_beats_connection_alert_on_the_wire() {
        let mut i2c = FakeI2c::new();
        let mut ctrl = configured(&mut i2c, Features::LIGHTING | Features::WATCH_RC);

        let hazard = LightingCommand {
            flags: LightingFlags::ENABLED | LightingFlags::HAZARD,
            ..LightingCommand::disabled()
        };
        ctrl.update(&mut i2c, &hazard, 0).unwrap();

        // The RC alert would leave the right side dark. Front-right red is channel 3, and amber
        // red is full on.
        assert_eq!(i2c.writes().len(), 12);
        assert!(i2c.writes_to(0x40).contains(&vec![0x12, 0, 0x10, 0, 0]));
    }

    #[test]
    fn failed_write_is_reported_and_retried_after_reinit() {
        let mut i2c = FakeI2c::new();
        let mut cfg = VehicleConfig::default();
        cfg.features = Features::LIGHTING;
        let mut ctrl = LightingController::default();
        ctrl.configure(&mut i2c, &cfg).unwrap();

        i2c.fail_address = Some(0x40);
        assert!(ctrl.update(&mut i2c, &cmd(LightingFlags::ENABLED), 0).is_err());
        assert!(!ctrl.is_ready());

        i2c.fail_address = None;
        assert_eq!(
            ctrl.update(&mut i2c, &cmd(LightingFlags::ENABLED), 1),
            Err(DeviceError::NotReady)
        );

        ctrl.configure(&mut i2c, &cfg).unwrap();
        i2c.clear();
        ctrl.update(&mut i2c, &cmd(LightingFlags::ENABLED), 2).unwrap();
        assert_eq!(i2c.writes().len(), 12);
    }
}
