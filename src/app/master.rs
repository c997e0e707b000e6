// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Master board runtime: pilot input in, commands out over the link.

use crate::config::{ConfigStore, VehicleConfig};
use crate::control::{DriveController, ProxyDrive};
use crate::error::LinkError;
use crate::hw::SerialPort;
use crate::link::{LinkTiming, Originator};
use crate::pilot::PilotInput;
use crate::protocol::ParserStats;

pub struct MasterRuntime<S, P, C> {
    drive: ProxyDrive<S>,
    pilot: P,
    store: C,
}

impl<S, P, C> MasterRuntime<S, P, C>
where
    S: SerialPort,
    P: PilotInput,
    C: ConfigStore,
{
    /// Starts from the stored configuration, or the defaults if there is none.
    pub fn new(serial: S, pilot: P, mut store: C, timing: LinkTiming) -> Self {
        let config = match store.load() {
            Ok(Some(config)) => config,
            Ok(None) => VehicleConfig::default(),
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!(
                    "master: config load failed, using defaults: {}",
                    defmt::Debug2Format(&_e)
                );
                VehicleConfig::default()
            }
        };

        Self {
            drive: ProxyDrive::new(Originator::new(serial, config, timing)),
            pilot,
            store,
        }
    }

    /// Sample the pilot and service the link.
    pub fn poll(&mut self, now: u32) -> Result<(), LinkError<S::Error>> {
        let frame = self.pilot.poll(now);
        self.drive.link_mut().set_lighting(frame.lighting);
        self.drive.set_command(frame.throttle, frame.turn);
        self.drive.update(now)
    }

    /// Persist a new configuration and push it to the slave on the next poll.
    ///
    /// The slave gets the new configuration even if saving it fails.
    pub fn update_config(&mut self, config: VehicleConfig) -> Result<(), C::Error> {
        self.drive.link_mut().set_config(config);
        self.store.save(&config)
    }

    #[inline]
    pub fn config(&self) -> &VehicleConfig {
        self.drive.link().config()
    }

    #[inline]
    pub fn online(&self, now: u32) -> bool {
        self.drive.link().online(now)
    }

    #[inline]
    pub fn battery_voltage(&self) -> Option<f32> {
        self.drive.battery_voltage()
    }

    #[inline]
    pub fn parser_stats(&self) -> ParserStats {
        self.drive.link().parser_stats()
    }

    #[inline]
    pub fn serial_mut(&mut self) -> &mut S {
        self.drive.link_mut().serial_mut()
    }
}
