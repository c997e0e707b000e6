// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Typed payloads carried over the inter-board link.
//!
//! A [`Frame`] only exists once a [`RawFrame`] has passed both the checksum and the per-type
//! length and field checks, so nothing downstream ever sees an ill-formed frame.

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::config::{
    DriveTuning, DriverPins, Features, HBridgePins, LightingConfig, PinRef, RgbChannels,
    VehicleConfig,
};
use crate::error::{EncodeError, FrameError};
use crate::protocol::frame::{self, FrameType};
use crate::protocol::parser::RawFrame;

/// Encoded size of a [`VehicleConfig`].
pub const CONFIG_LEN: usize = 54;

/// Encoded size of a [`LightingCommand`].
pub const LIGHTING_LEN: usize = 18;

/// Encoded size of a [`CommandPayload`].
pub const COMMAND_LEN: usize = 8 + LIGHTING_LEN;

/// Encoded size of a [`StatusPayload`].
pub const STATUS_LEN: usize = 4;

/// Headlight/taillight scheme requested by the pilot.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StatusMode {
    Debug = 0,
    #[default]
    Active = 1,
    Locked = 2,
}

bit_flags! {
    /// Lighting flags carried in every command.
    pub struct LightingFlags {
        /// Lighting is switched on by the pilot.
        const ENABLED = 0x01;
        /// Hazard blinker requested.
        const HAZARD = 0x02;
        /// RC receiver currently has signal.
        const RC_LINKED = 0x04;
        /// Wi-Fi station/AP currently connected.
        const WIFI_LINKED = 0x08;
    }
}

/// Lighting intent, independent of the drive numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LightingCommand {
    pub steering: f32,
    pub throttle: f32,
    /// 0.0 = obstacle touching, 1.0 = nothing in range.
    pub ultrasonic_left: f32,
    pub ultrasonic_right: f32,
    pub status_mode: StatusMode,
    pub flags: LightingFlags,
}

impl Default for LightingCommand {
    fn default() -> Self {
        Self::disabled()
    }
}

impl LightingCommand {
    /// Lights off, no hazard, nothing linked.
    pub const fn disabled() -> Self {
        Self {
            steering: 0.0,
            throttle: 0.0,
            ultrasonic_left: 1.0,
            ultrasonic_right: 1.0,
            status_mode: StatusMode::Active,
            flags: LightingFlags::empty(),
        }
    }
}

/// Drive command plus lighting intent.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandPayload {
    /// -1.0 (full reverse) to 1.0 (full forward).
    pub throttle: f32,
    /// -1.0 (full left) to 1.0 (full right).
    pub turn: f32,
    pub lighting: LightingCommand,
}

impl Default for CommandPayload {
    fn default() -> Self {
        Self::neutral()
    }
}

impl CommandPayload {
    /// Zero drive, lighting disabled.
    pub const fn neutral() -> Self {
        Self {
            throttle: 0.0,
            turn: 0.0,
            lighting: LightingCommand::disabled(),
        }
    }
}

/// Slave → master heartbeat.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusPayload {
    pub battery_voltage: f32,
}

/// A validated frame.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Frame {
    Config(VehicleConfig),
    Command(CommandPayload),
    Status(StatusPayload),
}

impl Frame {
    pub fn frame_type(&self) -> FrameType {
        match self {
            Frame::Config(_) => FrameType::Config,
            Frame::Command(_) => FrameType::Command,
            Frame::Status(_) => FrameType::Status,
        }
    }

    /// Encode the full frame (header, payload, checksum) into `out`.
    pub fn encode(&self, out: &mut [u8]) -> Result<usize, EncodeError> {
        let mut payload = [0u8; CONFIG_LEN];
        let len = match self {
            Frame::Config(cfg) => encode_config(cfg, &mut payload),
            Frame::Command(cmd) => encode_command(cmd, &mut payload),
            Frame::Status(status) => encode_status(status, &mut payload),
        };
        frame::encode(self.frame_type().into(), &payload[..len], out)
    }
}

impl TryFrom<RawFrame<'_>> for Frame {
    type Error = FrameError;

    fn try_from(raw: RawFrame<'_>) -> Result<Self, Self::Error> {
        let frame_type =
            FrameType::try_from(raw.frame_type).map_err(|_| FrameError::UnknownType(raw.frame_type))?;

        let expected = match frame_type {
            FrameType::Config => CONFIG_LEN,
            FrameType::Command => COMMAND_LEN,
            FrameType::Status => STATUS_LEN,
        };
        if raw.payload.len() != expected {
            return Err(FrameError::InvalidLength {
                expected,
                actual: raw.payload.len(),
            });
        }

        let mut r = Reader::new(raw.payload);
        Ok(match frame_type {
            FrameType::Config => Frame::Config(decode_config(&mut r)?),
            FrameType::Command => Frame::Command(decode_command(&mut r)?),
            FrameType::Status => Frame::Status(StatusPayload {
                battery_voltage: r.f32(),
            }),
        })
    }
}

// Little-endian cursors. Callers size buffers from the *_LEN constants above, so the
// per-field bounds are fixed at compile time.

struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Writer<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn u8(&mut self, v: u8) {
        self.buf[self.pos] = v;
        self.pos += 1;
    }

    fn u16(&mut self, v: u16) {
        self.buf[self.pos..self.pos + 2].copy_from_slice(&v.to_le_bytes());
        self.pos += 2;
    }

    fn f32(&mut self, v: f32) {
        self.buf[self.pos..self.pos + 4].copy_from_slice(&v.to_le_bytes());
        self.pos += 4;
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn u8(&mut self) -> u8 {
        let v = self.buf[self.pos];
        self.pos += 1;
        v
    }

    fn u16(&mut self) -> u16 {
        let v = u16::from_le_bytes([self.buf[self.pos], self.buf[self.pos + 1]]);
        self.pos += 2;
        v
    }

    fn f32(&mut self) -> f32 {
        let mut b = [0u8; 4];
        b.copy_from_slice(&self.buf[self.pos..self.pos + 4]);
        self.pos += 4;
        f32::from_le_bytes(b)
    }
}

fn write_hbridge(w: &mut Writer<'_>, ch: &HBridgePins) {
    w.u8(ch.pwm);
    w.u8(ch.in1.to_byte());
    w.u8(ch.in2.to_byte());
}

fn read_pin(r: &mut Reader<'_>) -> Result<PinRef, FrameError> {
    let value = r.u8();
    PinRef::from_byte(value).ok_or(FrameError::InvalidField { field: "pin", value })
}

fn read_hbridge(r: &mut Reader<'_>) -> Result<HBridgePins, FrameError> {
    Ok(HBridgePins {
        pwm: r.u8(),
        in1: read_pin(r)?,
        in2: read_pin(r)?,
    })
}

fn encode_config(cfg: &VehicleConfig, buf: &mut [u8]) -> usize {
    let mut w = Writer::new(buf);
    for driver in [&cfg.left, &cfg.right] {
        write_hbridge(&mut w, &driver.a);
        write_hbridge(&mut w, &driver.b);
    }
    w.u8(cfg.standby.to_byte());
    w.u8(cfg.features.bits());
    w.u8(cfg.expander_address);
    w.u8(cfg.mux_address);
    w.u8(cfg.mux_channel);

    w.f32(cfg.drive.max_magnitude);
    w.f32(cfg.drive.ramp_rate);
    w.f32(cfg.drive.kp);
    w.f32(cfg.drive.ki);
    w.f32(cfg.drive.kd);

    w.u8(cfg.lighting.address);
    w.u16(cfg.lighting.pwm_frequency_hz);
    for fixture in &cfg.lighting.fixtures {
        w.u8(fixture.r);
        w.u8(fixture.g);
        w.u8(fixture.b);
    }
    w.u16(cfg.lighting.blink_period_ms);
    w.pos
}

fn decode_config(r: &mut Reader<'_>) -> Result<VehicleConfig, FrameError> {
    let left = DriverPins {
        a: read_hbridge(r)?,
        b: read_hbridge(r)?,
    };
    let right = DriverPins {
        a: read_hbridge(r)?,
        b: read_hbridge(r)?,
    };
    let standby = read_pin(r)?;
    let features = Features::from_bits_retain(r.u8());
    let expander_address = r.u8();
    let mux_address = r.u8();
    let mux_channel = r.u8();

    let drive = DriveTuning {
        max_magnitude: r.f32(),
        ramp_rate: r.f32(),
        kp: r.f32(),
        ki: r.f32(),
        kd: r.f32(),
    };

    let address = r.u8();
    let pwm_frequency_hz = r.u16();
    let mut fixtures = [RgbChannels::new(0, 0, 0); 4];
    for fixture in fixtures.iter_mut() {
        *fixture = RgbChannels::new(r.u8(), r.u8(), r.u8());
    }
    let blink_period_ms = r.u16();

    Ok(VehicleConfig {
        left,
        right,
        standby,
        features,
        expander_address,
        mux_address,
        mux_channel,
        drive,
        lighting: LightingConfig {
            address,
            pwm_frequency_hz,
            fixtures,
            blink_period_ms,
        },
    })
}

fn encode_command(cmd: &CommandPayload, buf: &mut [u8]) -> usize {
    let mut w = Writer::new(buf);
    w.f32(cmd.throttle);
    w.f32(cmd.turn);
    w.f32(cmd.lighting.steering);
    w.f32(cmd.lighting.throttle);
    w.f32(cmd.lighting.ultrasonic_left);
    w.f32(cmd.lighting.ultrasonic_right);
    w.u8(cmd.lighting.status_mode.into());
    w.u8(cmd.lighting.flags.bits());
    w.pos
}

fn decode_command(r: &mut Reader<'_>) -> Result<CommandPayload, FrameError> {
    let throttle = r.f32();
    let turn = r.f32();
    let steering = r.f32();
    let light_throttle = r.f32();
    let ultrasonic_left = r.f32();
    let ultrasonic_right = r.f32();
    let mode = r.u8();
    let status_mode = StatusMode::try_from(mode).map_err(|_| FrameError::InvalidField {
        field: "status_mode",
        value: mode,
    })?;
    let flags = LightingFlags::from_bits_retain(r.u8());

    Ok(CommandPayload {
        throttle,
        turn,
        lighting: LightingCommand {
            steering,
            throttle: light_throttle,
            ultrasonic_left,
            ultrasonic_right,
            status_mode,
            flags,
        },
    })
}

fn encode_status(status: &StatusPayload, buf: &mut [u8]) -> usize {
    let mut w = Writer::new(buf);
    w.f32(status.battery_voltage);
    w.pos
}
