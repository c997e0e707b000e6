// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Slave end of the link.
//!
//! A Config frame replaces the whole configuration and is handed to the runtime once through
//! [`Actuator::take_config`]. A Command frame replaces the drive target and lighting intent.
//! Status goes out every `status_interval_ms` whether or not commands are arriving.
//!
//! [`Actuator::command`] is the fail-safe view: once commands stop for `command_timeout_ms` it
//! returns a neutral command with lighting disabled.

use crate::config::VehicleConfig;
use crate::error::LinkError;
use crate::hw::SerialPort;
use crate::link::{drain, due, fresh, send, LinkTiming};
use crate::protocol::{CommandPayload, Frame, Parser, ParserStats, StatusPayload};

pub struct Actuator<S> {
    serial: S,
    parser: Parser,
    timing: LinkTiming,

    config: VehicleConfig,
    config_pending: bool,

    command: CommandPayload,
    last_command: Option<u32>,
    was_fresh: bool,

    battery_voltage: f32,
    last_status_sent: Option<u32>,
}

impl<S: SerialPort> Actuator<S> {
    pub fn new(serial: S, timing: LinkTiming) -> Self {
        Self {
            serial,
            parser: Parser::new(),
            timing,
            config: VehicleConfig::default(),
            config_pending: false,
            command: CommandPayload::neutral(),
            last_command: None,
            was_fresh: false,
            battery_voltage: 0.0,
            last_status_sent: None,
        }
    }

    /// Most recent configuration, received or default.
    #[inline]
    pub fn config(&self) -> &VehicleConfig {
        &self.config
    }

    /// A configuration received since the last call, if any.
    pub fn take_config(&mut self) -> Option<VehicleConfig> {
        if self.config_pending {
            self.config_pending = false;
            Some(self.config)
        } else {
            None
        }
    }

    #[inline]
    pub fn command_fresh(&self, now: u32) -> bool {
        fresh(self.last_command, now, self.timing.command_timeout_ms)
    }

    /// The last command while the stream is fresh, neutral otherwise.
    pub fn command(&self, now: u32) -> CommandPayload {
        if self.command_fresh(now) {
            self.command
        } else {
            CommandPayload::neutral()
        }
    }

    /// Voltage reported in the next status frame.
    #[inline]
    pub fn set_battery_voltage(&mut self, volts: f32) {
        self.battery_voltage = volts;
    }

    #[inline]
    pub fn parser_stats(&self) -> ParserStats {
        self.parser.stats()
    }

    #[inline]
    pub fn timing(&self) -> &LinkTiming {
        &self.timing
    }

    #[inline]
    pub fn serial_mut(&mut self) -> &mut S {
        &mut self.serial
    }

    /// Drain inbound config and commands, then send status if due.
    pub fn poll(&mut self, now: u32) -> Result<(), LinkError<S::Error>> {
        let drained = drain(&mut self.serial, &mut self.parser, |frame| match frame {
            Frame::Config(config) => {
                self.config = config;
                self.config_pending = true;
            }
            Frame::Command(command) => {
                self.command = command;
                self.last_command = Some(now);
            }
            Frame::Status(_) => {
                #[cfg(feature = "defmt")]
                defmt::debug!("link: ignoring status on slave side");
            }
        });

        let is_fresh = self.command_fresh(now);
        if is_fresh != self.was_fresh {
            #[cfg(feature = "defmt")]
            {
                if is_fresh {
                    defmt::info!("link: command stream fresh");
                } else {
                    defmt::warn!("link: command stream stale, failing safe");
                }
            }
            self.was_fresh = is_fresh;
        }

        if due(self.last_status_sent, now, self.timing.status_interval_ms) {
            let status = StatusPayload {
                battery_voltage: self.battery_voltage,
            };
            send(&mut self.serial, &Frame::Status(status))?;
            self.last_status_sent = Some(now);
        }

        drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hw::fake::{decode_all, FakeSerial};
    use crate::protocol::{LightingCommand, LightingFlags, MAX_FRAME_LEN};

    fn actuator() -> Actuator<FakeSerial> {
        Actuator::new(FakeSerial::new(), LinkTiming::default())
    }

    fn inject(a: &mut Actuator<FakeSerial>, frame: Frame) {
        let mut buf = [0u8; MAX_FRAME_LEN];
        let n = frame.encode(&mut buf).unwrap();
        a.serial_mut().inject(&buf[..n]);
    }

    fn drive(throttle: f32, turn: f32) -> CommandPayload {
        let mut lighting = LightingCommand::disabled();
        lighting.flags = LightingFlags::ENABLED;
        CommandPayload {
            throttle,
            turn,
            lighting,
        }
    }

    #[test]
    fn config_is_taken_once() {
        let mut a = actuator();
        assert_eq!(a.take_config(), None);

        let mut cfg = VehicleConfig::default();
        cfg.expander_address = 0x27;
        inject(&mut a, Frame::Config(cfg));
        a.poll(0).unwrap();

        assert_eq!(a.take_config(), Some(cfg));
        assert_eq!(a.take_config(), None);
        assert_eq!(a.config().expander_address, 0x27);
    }

    #[test]
    fn last_config_wins() {
        let mut a = actuator();
        let mut first = VehicleConfig::default();
        first.mux_channel = 1;
        let mut second = first;
        second.mux_channel = 6;

        inject(&mut a, Frame::Config(first));
        inject(&mut a, Frame::Config(second));
        a.poll(0).unwrap();

        assert_eq!(a.take_config(), Some(second));
    }

    #[test]
    fn stale_command_fails_safe() {
        let mut a = actuator();
        inject(&mut a, Frame::Command(drive(0.8, 0.1)));
        a.poll(1000).unwrap();

        assert_eq!(a.command(1000).throttle, 0.8);
        assert_eq!(a.command(1499).throttle, 0.8);
        assert!(a.command_fresh(1499));

        let safe = a.command(1500);
        assert!(!a.command_fresh(1500));
        assert_eq!(safe, CommandPayload::neutral());
        assert!(!safe.lighting.flags.contains(LightingFlags::ENABLED));

        // A new command restores the stream.
        inject(&mut a, Frame::Command(drive(0.2, 0.0)));
        a.poll(1600).unwrap();
        assert_eq!(a.command(1600).throttle, 0.2);
    }

    #[test]
    fn no_command_yet_is_neutral() {
        let a = actuator();
        assert_eq!(a.command(0), CommandPayload::neutral());
    }

    #[test]
    fn status_cadence_is_independent_of_commands() {
        let mut a = actuator();
        a.set_battery_voltage(11.8);

        a.poll(0).unwrap();
        a.poll(50).unwrap();
        inject(&mut a, Frame::Command(drive(0.1, 0.0)));
        a.poll(99).unwrap();
        a.poll(100).unwrap();

        let frames = decode_all(&a.serial_mut().take_tx());
        assert_eq!(
            frames,
            vec![
                Frame::Status(StatusPayload {
                    battery_voltage: 11.8
                });
                2
            ]
        );
    }

    #[test]
    fn failed_status_is_retried() {
        let mut a = actuator();
        a.serial_mut().fail_writes = true;
        assert!(a.poll(0).is_err());

        a.serial_mut().fail_writes = false;
        a.poll(1).unwrap();
        assert_eq!(decode_all(&a.serial_mut().take_tx()).len(), 1);
    }

    #[test]
    fn corrupted_bytes_do_not_disturb_state() {
        let mut a = actuator();
        inject(&mut a, Frame::Command(drive(0.4, 0.0)));

        let mut buf = [0u8; MAX_FRAME_LEN];
        let n = Frame::Command(drive(-1.0, 0.0)).encode(&mut buf).unwrap();
        buf[5] ^= 0x10;
        a.serial_mut().inject(&buf[..n]);
        a.poll(0).unwrap();

        assert_eq!(a.command(0).throttle, 0.4);
        assert_eq!(a.parser_stats().checksum_errors, 1);

        inject(&mut a, Frame::Command(drive(0.6, 0.0)));
        a.poll(1).unwrap();
        assert_eq!(a.command(1).throttle, 0.6);
    }
}
