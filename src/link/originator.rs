// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Master end of the link.
//!
//! Config goes out once at startup, whenever it changes, and again every time the link comes
//! back online (the slave may have rebooted and lost it). Commands go out every
//! `command_interval_ms`, or on the next poll when they change. Status frames keep the link
//! online and carry the slave's battery voltage.

use crate::config::VehicleConfig;
use crate::error::LinkError;
use crate::hw::SerialPort;
use crate::link::{drain, due, fresh, send, LinkTiming};
use crate::protocol::{CommandPayload, Frame, LightingCommand, Parser, ParserStats};

pub struct Originator<S> {
    serial: S,
    parser: Parser,
    timing: LinkTiming,

    config: VehicleConfig,
    config_pending: bool,

    command: CommandPayload,
    command_dirty: bool,
    last_command_sent: Option<u32>,

    last_status: Option<u32>,
    battery_voltage: Option<f32>,
    was_online: bool,
}

impl<S: SerialPort> Originator<S> {
    /// The initial config is sent on the first poll.
    pub fn new(serial: S, config: VehicleConfig, timing: LinkTiming) -> Self {
        Self {
            serial,
            parser: Parser::new(),
            timing,
            config,
            config_pending: true,
            command: CommandPayload::neutral(),
            command_dirty: true,
            last_command_sent: None,
            last_status: None,
            battery_voltage: None,
            was_online: false,
        }
    }

    /// Replace the configuration and queue it for sending.
    pub fn set_config(&mut self, config: VehicleConfig) {
        self.config = config;
        self.config_pending = true;
    }

    #[inline]
    pub fn config(&self) -> &VehicleConfig {
        &self.config
    }

    /// Replace the outgoing command. A change is sent on the next poll.
    pub fn set_command(&mut self, command: CommandPayload) {
        if command != self.command {
            self.command = command;
            self.command_dirty = true;
        }
    }

    pub fn set_drive(&mut self, throttle: f32, turn: f32) {
        self.set_command(CommandPayload {
            throttle,
            turn,
            ..self.command
        });
    }

    pub fn set_lighting(&mut self, lighting: LightingCommand) {
        self.set_command(CommandPayload {
            lighting,
            ..self.command
        });
    }

    #[inline]
    pub fn command(&self) -> &CommandPayload {
        &self.command
    }

    /// `true` while status frames keep arriving.
    #[inline]
    pub fn online(&self, now: u32) -> bool {
        fresh(self.last_status, now, self.timing.status_timeout_ms)
    }

    /// Last reported slave battery voltage, if any status was ever received.
    #[inline]
    pub fn battery_voltage(&self) -> Option<f32> {
        self.battery_voltage
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

    /// Drain inbound status, then send whatever is due.
    ///
    /// Failed sends stay pending and are retried on the next poll.
    pub fn poll(&mut self, now: u32) -> Result<(), LinkError<S::Error>> {
        let drained = drain(&mut self.serial, &mut self.parser, |frame| match frame {
            Frame::Status(status) => {
                self.last_status = Some(now);
                self.battery_voltage = Some(status.battery_voltage);
            }
            _other => {
                #[cfg(feature = "defmt")]
                defmt::debug!("link: ignoring {} on master side", _other.frame_type());
            }
        });

        let online = self.online(now);
        if online != self.was_online {
            if online {
                #[cfg(feature = "defmt")]
                defmt::info!("link: online, resending config");
                self.config_pending = true;
            } else {
                #[cfg(feature = "defmt")]
                defmt::warn!("link: offline");
            }
            self.was_online = online;
        }

        if self.config_pending {
            send(&mut self.serial, &Frame::Config(self.config))?;
            self.config_pending = false;
        }

        if self.command_dirty || due(self.last_command_sent, now, self.timing.command_interval_ms) {
            send(&mut self.serial, &Frame::Command(self.command))?;
            self.command_dirty = false;
            self.last_command_sent = Some(now);
        }

        drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hw::fake::{decode_all, FakeSerial};
    use crate::protocol::{LightingFlags, StatusPayload, MAX_FRAME_LEN};

    fn originator() -> Originator<FakeSerial> {
        Originator::new(FakeSerial::new(), VehicleConfig::default(), LinkTiming::default())
    }

    fn sent(o: &mut Originator<FakeSerial>) -> std::vec::Vec<Frame> {
        decode_all(&o.serial_mut().take_tx())
    }

    fn status(volts: f32) -> std::vec::Vec<u8> {
        let mut buf = [0u8; MAX_FRAME_LEN];
        let n = Frame::Status(StatusPayload {
            battery_voltage: volts,
        })
        .encode(&mut buf)
        .unwrap();
        buf[..n].to_vec()
    }

    #[test]
    fn first_poll_sends_config_then_command() {
        let mut o = originator();
        o.poll(0).unwrap();

        let frames = sent(&mut o);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0], Frame::Config(VehicleConfig::default()));
        assert_eq!(frames[1], Frame::Command(CommandPayload::neutral()));
    }

    #[test]
    fn command_cadence_and_dirty_short_circuit() {
        let mut o = originator();
        o.poll(0).unwrap();
        o.serial_mut().take_tx();

        o.poll(10).unwrap();
        assert!(sent(&mut o).is_empty());

        o.poll(20).unwrap();
        assert_eq!(sent(&mut o).len(), 1);

        o.set_drive(0.5, -0.25);
        o.poll(21).unwrap();
        let frames = sent(&mut o);
        assert_eq!(frames.len(), 1);
        match frames[0] {
            Frame::Command(cmd) => {
                assert_eq!(cmd.throttle, 0.5);
                assert_eq!(cmd.turn, -0.25);
            }
            other => panic!("unexpected {other:?}"),
        }

        // Same values again are not a change.
        o.set_drive(0.5, -0.25);
        o.poll(22).unwrap();
        assert!(sent(&mut o).is_empty());
    }

    #[test]
    fn set_lighting_keeps_drive() {
        let mut o = originator();
        o.set_drive(0.3, 0.1);
        let mut lighting = LightingCommand::disabled();
        lighting.flags = LightingFlags::ENABLED | LightingFlags::HAZARD;
        o.set_lighting(lighting);

        assert_eq!(o.command().throttle, 0.3);
        assert_eq!(o.command().lighting.flags, lighting.flags);
    }

    #[test]
    fn status_brings_link_online_and_resends_config() {
        let mut o = originator();
        o.poll(0).unwrap();
        o.serial_mut().take_tx();
        assert!(!o.online(0));

        o.serial_mut().inject(&status(12.6));
        o.poll(5).unwrap();

        assert!(o.online(5));
        assert_eq!(o.battery_voltage(), Some(12.6));
        let frames = sent(&mut o);
        assert!(matches!(frames[0], Frame::Config(_)));

        // Goes offline after the status timeout, and the next status resends config again.
        o.poll(505).unwrap();
        assert!(!o.online(505));
        o.serial_mut().take_tx();

        o.serial_mut().inject(&status(12.5));
        o.poll(510).unwrap();
        assert!(sent(&mut o)
            .iter()
            .any(|f| matches!(f, Frame::Config(_))));
    }

    #[test]
    fn config_change_is_sent_once() {
        let mut o = originator();
        o.poll(0).unwrap();
        o.serial_mut().take_tx();

        let mut cfg = VehicleConfig::default();
        cfg.mux_channel = 5;
        o.set_config(cfg);
        o.poll(1).unwrap();
        o.poll(2).unwrap();

        let configs: std::vec::Vec<_> = sent(&mut o)
            .into_iter()
            .filter(|f| matches!(f, Frame::Config(_)))
            .collect();
        assert_eq!(configs, vec![Frame::Config(cfg)]);
    }

    #[test]
    fn failed_write_keeps_sends_pending() {
        let mut o = originator();
        o.serial_mut().fail_writes = true;
        assert!(matches!(o.poll(0), Err(LinkError::Serial(_))));

        o.serial_mut().fail_writes = false;
        o.poll(1).unwrap();
        let frames = sent(&mut o);
        assert_eq!(frames.len(), 2);
        assert!(matches!(frames[0], Frame::Config(_)));
    }

    #[test]
    fn ignores_non_status_frames() {
        let mut o = originator();
        let mut buf = [0u8; MAX_FRAME_LEN];
        let n = Frame::Command(CommandPayload::neutral())
            .encode(&mut buf)
            .unwrap();
        o.serial_mut().inject(&buf[..n]);
        o.poll(0).unwrap();

        assert!(!o.online(0));
        assert_eq!(o.parser_stats().frames, 1);
    }
}
