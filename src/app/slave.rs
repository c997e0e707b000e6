// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Slave board runtime: link in, tracks and lights out.
//!
//! One [`SlaveRuntime::poll`] is a full control tick:
//!
//! 1. sample the battery and hand it to the link and the drive,
//! 2. service the link,
//! 3. apply a newly received configuration,
//! 4. retry I2C devices that dropped out, at most every [`DEVICE_RETRY_MS`],
//! 5. drive the tracks from the (fail-safe) command,
//! 6. animate the lights.

use embedded_hal::i2c::I2c;

use crate::config::{Features, PinRef, VehicleConfig};
use crate::control::{DriveController, LocalDrive};
use crate::error::{DeviceError, RuntimeError};
use crate::hw::{Board, Hardware, SerialPort};
use crate::lighting::LightingController;
use crate::link::{self, Actuator, LinkTiming};

/// Minimum spacing between re-init attempts on a device that is not ready.
pub const DEVICE_RETRY_MS: u32 = 1000;

pub struct SlaveRuntime<S, B, I2C> {
    link: Actuator<S>,
    hw: Hardware<B, I2C>,
    drive: LocalDrive,
    lighting: LightingController,
    standby: PinRef,
    was_fresh: bool,
    last_retry: Option<u32>,
}

impl<S, B, I2C> SlaveRuntime<S, B, I2C>
where
    S: SerialPort,
    B: Board,
    I2C: I2c,
{
    /// Build the runtime and bring up the hardware with the default configuration. Hardware
    /// that fails to come up is retried on the next configuration.
    pub fn new(serial: S, hw: Hardware<B, I2C>, timing: LinkTiming) -> Self {
        let config = VehicleConfig::default();
        let mut rt = Self {
            link: Actuator::new(serial, timing),
            hw,
            drive: LocalDrive::new(&config),
            lighting: LightingController::default(),
            standby: PinRef::Unassigned,
            was_fresh: false,
            last_retry: None,
        };

        if let Err(_e) = rt.reconfigure(&config) {
            #[cfg(feature = "defmt")]
            defmt::warn!("slave: startup hardware init failed: {}", _e);
        }
        rt
    }

    /// Apply a full configuration: drive tuning and pins, expander, lighting, standby line.
    ///
    /// Every part is attempted; the first failure is returned.
    pub fn reconfigure(&mut self, config: &VehicleConfig) -> Result<(), DeviceError> {
        self.drive.configure(config);

        // Best effort: the old line may live on an expander that is about to be replaced.
        let _ = self.hw.write_pin(self.standby, false);

        let expander = self.hw.configure(config);
        let lighting = self.lighting.configure(&mut self.hw.i2c, config);

        self.standby = config.standby;
        let standby = self
            .hw
            .write_pin(self.standby, config.features.contains(Features::MOTORS));

        // Direction pins and PWM to a known state.
        let motors = self.drive.apply(&mut self.hw);

        #[cfg(feature = "defmt")]
        defmt::info!("slave: config applied, features {:#x}", config.features.bits());

        expander.and(lighting).and(standby).and(motors)
    }

    pub fn poll(&mut self, now: u32) -> Result<(), RuntimeError<S::Error>> {
        let volts = self.hw.battery_voltage();
        self.link.set_battery_voltage(volts);
        self.drive.set_battery_voltage(Some(volts));

        let link = self.link.poll(now);

        let config = match self.link.take_config() {
            Some(config) => self.reconfigure(&config),
            None => Ok(()),
        };
        let recovery = self.reinit_devices(now);

        let fresh = self.link.command_fresh(now);
        if self.was_fresh && !fresh {
            self.drive.stop();
        }
        self.was_fresh = fresh;

        let cmd = self.link.command(now);
        self.drive.set_command(cmd.throttle, cmd.turn);
        if let Err(never) = self.drive.update(now) {
            match never {}
        }
        let motors = self.drive.apply(&mut self.hw);

        let lights = self.lighting.update(&mut self.hw.i2c, &cmd.lighting, now);

        link?;
        config.and(recovery).and(motors).and(lights)?;
        Ok(())
    }

    /// Bring back the expander and the lighting driver after a bus failure. The standby line is
    /// restored if it lives on the expander; direction pins follow on the next apply.
    fn reinit_devices(&mut self, now: u32) -> Result<(), DeviceError> {
        if !link::due(self.last_retry, now, DEVICE_RETRY_MS) {
            return Ok(());
        }
        self.last_retry = Some(now);

        let expander = match self.hw.reinit_expander() {
            Ok(true) => self.hw.write_pin(self.standby, self.drive.enabled()),
            Ok(false) => Ok(()),
            Err(e) => Err(e),
        };
        let lighting = self.lighting.reinit(&mut self.hw.i2c);

        expander.and(lighting)
    }

    #[inline]
    pub fn drive(&self) -> &LocalDrive {
        &self.drive
    }

    #[inline]
    pub fn lighting(&self) -> &LightingController {
        &self.lighting
    }

    #[inline]
    pub fn hw(&self) -> &Hardware<B, I2C> {
        &self.hw
    }

    #[inline]
    pub fn hw_mut(&mut self) -> &mut Hardware<B, I2C> {
        &mut self.hw
    }

    #[inline]
    pub fn link(&self) -> &Actuator<S> {
        &self.link
    }

    #[inline]
    pub fn serial_mut(&mut self) -> &mut S {
        self.link.serial_mut()
    }

    #[inline]
    pub fn command_fresh(&self, now: u32) -> bool {
        self.link.command_fresh(now)
    }
}
