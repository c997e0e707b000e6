// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Board Runtimes
//!
//! The poll loops run by the firmware binaries. Each is generic over the hardware traits so the
//! whole master ↔ slave system can run on the host against the test doubles in `hw::fake`.
//!
//! - [`master`] - Pilot input → proxy drive → link.
//! - [`slave`] - Link → local drive, lighting and status.

pub mod master;
pub mod slave;

pub use master::MasterRuntime;
pub use slave::SlaveRuntime;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        ConfigStore, DriveTuning, Features, PinRef, RamConfigStore, VehicleConfig,
    };
    use crate::hw::fake::{pump, FakeBoard, FakeI2c, FakeSerial};
    use crate::hw::Hardware;
    use crate::link::LinkTiming;
    use crate::pilot::{PilotFrame, PilotInput};
    use crate::protocol::{LightingCommand, LightingFlags};

    struct Stick(PilotFrame);

    impl PilotInput for Stick {
        fn poll(&mut self, _now: u32) -> PilotFrame {
            self.0
        }
    }

    type Master = MasterRuntime<FakeSerial, Stick, RamConfigStore>;
    type Slave = SlaveRuntime<FakeSerial, FakeBoard, FakeI2c>;

    fn vehicle_config() -> VehicleConfig {
        let mut cfg = VehicleConfig::default();
        cfg.standby = PinRef::Native(20);
        cfg.drive = DriveTuning {
            max_magnitude: 1.0,
            ramp_rate: 4.0,
            kp: 1.0,
            ki: 0.0,
            kd: 0.0,
        };
        cfg
    }

    fn master(throttle: f32) -> Master {
        let mut store = RamConfigStore::new();
        store.save(&vehicle_config()).unwrap();
        let stick = Stick(PilotFrame {
            throttle,
            turn: 0.0,
            lighting: LightingCommand {
                flags: LightingFlags::ENABLED | LightingFlags::RC_LINKED,
                ..LightingCommand::disabled()
            },
        });
        MasterRuntime::new(FakeSerial::new(), stick, store, LinkTiming::default())
    }

    fn slave() -> Slave {
        let hw = Hardware::new(FakeBoard::new(), FakeI2c::new());
        SlaveRuntime::new(FakeSerial::new(), hw, LinkTiming::default())
    }

    /// One tick on each board with the wire carried both ways.
    fn exchange(m: &mut Master, s: &mut Slave, now: u32) {
        m.poll(now).unwrap();
        pump(m.serial_mut(), s.serial_mut());
        s.poll(now).unwrap();
        pump(s.serial_mut(), m.serial_mut());
    }

    /// Like [`exchange`], but the slave tick may fail.
    fn exchange_faulty(m: &mut Master, s: &mut Slave, now: u32) -> bool {
        m.poll(now).unwrap();
        pump(m.serial_mut(), s.serial_mut());
        let ok = s.poll(now).is_ok();
        pump(s.serial_mut(), m.serial_mut());
        ok
    }

    #[test]
    fn config_reaches_the_slave() {
        let mut m = master(0.0);
        let mut s = slave();
        assert!(s.hw().board.pin(12));

        exchange(&mut m, &mut s, 0);

        assert_eq!(s.link().config(), &vehicle_config());
        assert!(s.hw().board.pin(20));
        assert!(!s.hw().board.pin(12));
    }

    #[test]
    fn command_drives_the_tracks_and_status_comes_back() {
        let mut m = master(0.5);
        let mut s = slave();

        exchange(&mut m, &mut s, 0);
        assert_eq!(s.drive().left().current(), 0.0);

        exchange(&mut m, &mut s, 125);
        assert_eq!(s.drive().left().current(), 0.5);
        assert_eq!(s.drive().right().current(), 0.5);
        assert_eq!(s.hw().board.pwm(0), 500);
        assert!(s.hw().board.pin(4));

        m.poll(130).unwrap();
        assert!(m.online(130));
        assert_eq!(m.battery_voltage(), Some(12.4));
    }

    #[test]
    fn link_loss_stops_the_motors() {
        let mut m = master(0.5);
        let mut s = slave();
        exchange(&mut m, &mut s, 0);
        exchange(&mut m, &mut s, 125);
        m.poll(130).unwrap();
        assert!(s.drive().left().current() > 0.0);

        // Master goes quiet.
        s.poll(624).unwrap();
        assert!(s.command_fresh(624));
        assert!(s.drive().left().current() > 0.0);

        s.poll(625).unwrap();
        assert!(!s.command_fresh(625));
        assert_eq!(s.drive().left().current(), 0.0);
        assert_eq!(s.drive().right().current(), 0.0);
        assert_eq!(s.hw().board.pwm(0), 0);
        assert!(!s.hw().board.pin(4));

        // And the master notices too.
        m.poll(700).unwrap();
        assert!(!m.online(700));
    }

    #[test]
    fn low_battery_cuts_off_and_is_reported() {
        let mut m = master(1.0);
        let mut s = slave();
        exchange(&mut m, &mut s, 0);
        exchange(&mut m, &mut s, 100);
        assert!(s.drive().left().current() > 0.0);

        s.hw_mut().board.voltage = 10.5;
        exchange(&mut m, &mut s, 200);
        assert_eq!(s.drive().left().current(), 0.0);
        assert_eq!(s.drive().right().current(), 0.0);

        m.poll(210).unwrap();
        assert_eq!(m.battery_voltage(), Some(10.5));
    }

    #[test]
    fn config_update_propagates() {
        let mut m = master(0.0);
        let mut s = slave();
        exchange(&mut m, &mut s, 0);

        let mut cfg = vehicle_config();
        cfg.features = Features::LIGHTING;
        m.update_config(cfg).unwrap();
        exchange(&mut m, &mut s, 20);

        assert_eq!(s.link().config().features, Features::LIGHTING);
        assert!(!s.drive().enabled());
        assert!(!s.hw().board.pin(20));
    }

    #[test]
    fn rebooted_slave_gets_config_again() {
        let mut m = master(0.0);
        let mut s = slave();
        exchange(&mut m, &mut s, 0);
        exchange(&mut m, &mut s, 20);
        assert!(m.online(20));

        // Slave power-cycles; the master sees the link drop.
        let mut s = slave();
        m.poll(600).unwrap();
        assert!(!m.online(600));
        m.serial_mut().take_tx();

        // The new slave only hears commands until the master sees status again.
        exchange(&mut m, &mut s, 620);
        assert!(!s.hw().board.pin(20));

        exchange(&mut m, &mut s, 640);
        assert!(s.hw().board.pin(20));
        assert_eq!(s.link().config(), &vehicle_config());
    }

    #[test]
    fn survives_line_noise() {
        let mut m = master(0.5);
        let mut s = slave();
        // Oversized length aborts the partial frame.
        s.serial_mut().inject(&[0x00, 0x13, 0xA5, 0x02, 0xFF]);
        exchange(&mut m, &mut s, 0);
        exchange(&mut m, &mut s, 125);

        assert_eq!(s.drive().left().current(), 0.5);
    }

    #[test]
    fn expander_comes_back_after_a_bus_glitch() {
        let mut m = master(0.5);
        let mut s = slave();
        let mut cfg = vehicle_config();
        cfg.features = cfg.features.with(Features::EXPANDER, true);
        cfg.left.a.in1 = PinRef::Expander(0);
        cfg.left.a.in2 = PinRef::Expander(1);
        m.update_config(cfg).unwrap();

        exchange(&mut m, &mut s, 0);
        exchange(&mut m, &mut s, 125);
        assert_eq!(s.hw().board.pwm(0), 500);

        s.hw_mut().i2c.fail_address = Some(0x20);
        assert!(!exchange_faulty(&mut m, &mut s, 150));
        assert_eq!(s.hw().board.pwm(0), 0);
        assert!(!s.hw().expander().unwrap().is_ready());

        // Bus is healthy again; the retry waits for its slot.
        s.hw_mut().i2c.fail_address = None;
        for now in (200..1000).step_by(100) {
            assert!(!exchange_faulty(&mut m, &mut s, now));
        }
        assert_eq!(s.hw().board.pwm(0), 0);

        exchange(&mut m, &mut s, 1000);
        let expander = s.hw().expander().unwrap();
        assert!(expander.is_ready());
        assert_eq!(expander.latch() & 0b11, 0b01);
        assert_eq!(s.drive().left().current(), 0.5);
        assert_eq!(s.hw().board.pwm(0), 500);
        assert!(s.hw().board.pin(20));
    }

    #[test]
    fn lighting_comes_back_after_a_bus_glitch() {
        let mut m = master(0.0);
        let mut s = slave();

        s.hw_mut().i2c.fail_address = Some(0x40);
        assert!(!exchange_faulty(&mut m, &mut s, 0));
        assert!(!s.lighting().is_ready());

        s.hw_mut().i2c.fail_address = None;
        s.hw_mut().i2c.clear();
        exchange_faulty(&mut m, &mut s, 500);
        assert!(!s.lighting().is_ready());
        assert!(s.hw().i2c.writes_to(0x40).is_empty());

        exchange(&mut m, &mut s, 1000);
        assert!(s.lighting().is_ready());
        // Re-init, blank, then the active head lights.
        assert!(s.hw().i2c.writes_to(0x40).len() > 5);
    }
}
