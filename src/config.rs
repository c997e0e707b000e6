// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Vehicle configuration.
//!
//! [`VehicleConfig`] is the snapshot the master pushes to the slave in a Config frame. The slave
//! never merges: every Config frame fully replaces the previous configuration and re-initializes
//! the hardware that depends on it.
//!
//! Pin numbering:
//! - native pins are indices into the slave board's pin table (see `hw::board`),
//! - expander pins are MCP23017 pins `0..16` (GPA0..GPA7, GPB0..GPB7).

/// Pin reference byte meaning "not wired".
pub const PIN_UNASSIGNED: u8 = 0xFF;

/// Bit marking a pin reference as an expander pin.
pub const PIN_EXPANDER_BIT: u8 = 0x80;

/// Highest expander pin index.
pub const EXPANDER_PIN_MAX: u8 = 15;

/// Where a digital line lives.
///
/// On the wire this is one byte: `0xFF` unassigned, `0x80 | n` expander pin `n` (`n <= 15`),
/// otherwise native pin `n` (`n < 0x80`). Bytes `0x90..=0xFE` are invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinRef {
    Unassigned,
    /// MCU pin, by board table index (`0..0x80`).
    Native(u8),
    /// MCP23017 pin (0..16).
    Expander(u8),
}

impl PinRef {
    /// Decode the one-byte wire representation. `None` for bytes that name no pin.
    pub const fn from_byte(raw: u8) -> Option<Self> {
        if raw == PIN_UNASSIGNED {
            Some(PinRef::Unassigned)
        } else if raw & PIN_EXPANDER_BIT == 0 {
            Some(PinRef::Native(raw))
        } else if raw & !PIN_EXPANDER_BIT <= EXPANDER_PIN_MAX {
            Some(PinRef::Expander(raw & !PIN_EXPANDER_BIT))
        } else {
            None
        }
    }

    /// Encode to the one-byte wire representation. Indices that have no encoding go out as
    /// unassigned rather than aliasing another pin.
    pub const fn to_byte(self) -> u8 {
        match self {
            PinRef::Native(n) if n & PIN_EXPANDER_BIT == 0 => n,
            PinRef::Expander(n) if n <= EXPANDER_PIN_MAX => PIN_EXPANDER_BIT | n,
            _ => PIN_UNASSIGNED,
        }
    }

    #[inline]
    pub const fn is_assigned(self) -> bool {
        !matches!(self, PinRef::Unassigned)
    }
}

/// One half of a dual H-bridge: a PWM magnitude pin plus two direction pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HBridgePins {
    /// Native PWM pin index, or [`PIN_UNASSIGNED`].
    pub pwm: u8,
    /// Asserted when driving forward.
    pub in1: PinRef,
    /// Asserted when driving in reverse.
    pub in2: PinRef,
}

impl HBridgePins {
    pub const UNASSIGNED: Self = Self {
        pwm: PIN_UNASSIGNED,
        in1: PinRef::Unassigned,
        in2: PinRef::Unassigned,
    };

    pub const fn native(pwm: u8, in1: u8, in2: u8) -> Self {
        Self {
            pwm,
            in1: PinRef::Native(in1),
            in2: PinRef::Native(in2),
        }
    }
}

/// A dual H-bridge driver (e.g. TB6612). Both channels drive the same track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriverPins {
    pub a: HBridgePins,
    pub b: HBridgePins,
}

impl DriverPins {
    pub const UNASSIGNED: Self = Self {
        a: HBridgePins::UNASSIGNED,
        b: HBridgePins::UNASSIGNED,
    };

    #[inline]
    pub fn channels(&self) -> [HBridgePins; 2] {
        [self.a, self.b]
    }
}

bit_flags! {
    /// Feature toggles carried in the Config frame.
    pub struct Features {
        /// Track motors are driven.
        const MOTORS = 0x01;
        /// Lighting rig is animated.
        const LIGHTING = 0x02;
        /// Direction pins may live on an MCP23017.
        const EXPANDER = 0x04;
        /// The MCP23017 sits behind a TCA9548A.
        const MUX = 0x08;
        /// Flash a connection alert while the RC receiver is down.
        const WATCH_RC = 0x10;
        /// Flash a connection alert while Wi-Fi is down.
        const WATCH_WIFI = 0x20;
    }
}

/// Drive tuning carried in the Config frame.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriveTuning {
    /// Throttle and turn are clamped to this magnitude before mixing.
    pub max_magnitude: f32,
    /// Maximum duty-cycle change per second.
    pub ramp_rate: f32,
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
}

impl Default for DriveTuning {
    fn default() -> Self {
        Self {
            max_magnitude: 1.0,
            ramp_rate: 2.0,
            kp: 0.6,
            ki: 0.1,
            kd: 0.0,
        }
    }
}

/// PCA9685 channels for one RGB fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RgbChannels {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbChannels {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Lighting rig configuration carried in the Config frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LightingConfig {
    /// PCA9685 I2C address.
    pub address: u8,
    pub pwm_frequency_hz: u16,
    /// Front-left, front-right, rear-left, rear-right.
    pub fixtures: [RgbChannels; 4],
    /// Full on/off period of turn signals.
    pub blink_period_ms: u16,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            address: 0x40,
            pwm_frequency_hz: 1000,
            fixtures: [
                RgbChannels::new(0, 1, 2),
                RgbChannels::new(3, 4, 5),
                RgbChannels::new(6, 7, 8),
                RgbChannels::new(9, 10, 11),
            ],
            blink_period_ms: 450,
        }
    }
}

/// Full configuration snapshot shared from master to slave.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VehicleConfig {
    pub left: DriverPins,
    pub right: DriverPins,
    /// Driver standby line, held high while the motors are enabled.
    pub standby: PinRef,
    pub features: Features,
    pub expander_address: u8,
    pub mux_address: u8,
    pub mux_channel: u8,
    pub drive: DriveTuning,
    pub lighting: LightingConfig,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            left: DriverPins {
                a: HBridgePins::native(0, 4, 5),
                b: HBridgePins::native(1, 6, 7),
            },
            right: DriverPins {
                a: HBridgePins::native(2, 8, 9),
                b: HBridgePins::native(3, 10, 11),
            },
            standby: PinRef::Native(12),
            features: Features::MOTORS | Features::LIGHTING | Features::WATCH_RC,
            expander_address: 0x20,
            mux_address: 0x70,
            mux_channel: 0,
            drive: DriveTuning::default(),
            lighting: LightingConfig::default(),
        }
    }
}

/// Persistence backend for the master's configuration.
///
/// Flash storage lives outside this crate; the firmware only needs load and save of a whole
/// snapshot.
pub trait ConfigStore {
    type Error: core::fmt::Debug;

    /// Load the stored snapshot, `None` if nothing was ever saved.
    fn load(&mut self) -> Result<Option<VehicleConfig>, Self::Error>;

    fn save(&mut self, config: &VehicleConfig) -> Result<(), Self::Error>;
}

/// Volatile store, used when no flash backend is wired up.
#[derive(Debug, Default)]
pub struct RamConfigStore {
    config: Option<VehicleConfig>,
}

impl RamConfigStore {
    pub const fn new() -> Self {
        Self { config: None }
    }
}

impl ConfigStore for RamConfigStore {
    type Error = core::convert::Infallible;

    fn load(&mut self) -> Result<Option<VehicleConfig>, Self::Error> {
        Ok(self.config)
    }

    fn save(&mut self, config: &VehicleConfig) -> Result<(), Self::Error> {
        self.config = Some(*config);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_ref_byte_mapping() {
        assert_eq!(PinRef::from_byte(0xFF), Some(PinRef::Unassigned));
        assert_eq!(PinRef::from_byte(0x05), Some(PinRef::Native(5)));
        assert_eq!(PinRef::from_byte(0x8C), Some(PinRef::Expander(12)));
        assert_eq!(PinRef::Expander(3).to_byte(), 0x83);
        assert_eq!(PinRef::Native(17).to_byte(), 17);
        assert!(!PinRef::Unassigned.is_assigned());
    }

    #[test]
    fn out_of_range_pins_never_alias() {
        assert_eq!(PinRef::from_byte(0x90), None);
        assert_eq!(PinRef::from_byte(0xFE), None);
        assert_eq!(PinRef::Native(0x85).to_byte(), PIN_UNASSIGNED);
        assert_eq!(PinRef::Expander(16).to_byte(), PIN_UNASSIGNED);
    }

    #[test]
    fn feature_flags() {
        let mut f = Features::MOTORS | Features::MUX;
        assert!(f.contains(Features::MOTORS));
        assert!(!f.contains(Features::LIGHTING));
        f.set(Features::MOTORS, false);
        assert_eq!(f.bits(), 0x08);
        assert!(Features::from_bits_retain(0xC0).with(Features::MOTORS, true).contains(Features::MOTORS));
    }

    #[test]
    fn ram_store_round_trip() {
        let mut store = RamConfigStore::new();
        assert_eq!(store.load().unwrap(), None);

        let mut cfg = VehicleConfig::default();
        cfg.mux_channel = 3;
        store.save(&cfg).unwrap();
        assert_eq!(store.load().unwrap(), Some(cfg));
    }
}
