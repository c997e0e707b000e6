// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Status LED.
//!
//! Both boards show link health on an LED: solid while the link is up, a slow blink while it is
//! down.

use embedded_hal::digital::OutputPin;

/// Blink period while the link is down.
pub const LINK_DOWN_BLINK_MS: u32 = 1000;

/// Whether the LED is driven active-high or active-low on the board wiring.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActiveLevel {
    High,
    Low,
}

/// LED abstraction that remembers its active level and last known state.
pub struct Led<PIN: OutputPin> {
    pin: PIN,
    active: ActiveLevel,
    is_on: bool,
}

impl<PIN: OutputPin> Led<PIN> {
    /// Create an LED wrapper, initializing it to OFF.
    pub fn new(pin: PIN, active: ActiveLevel) -> Self {
        let mut led = Self {
            pin,
            active,
            is_on: true,
        };
        led.set(false);
        led
    }

    pub fn active_high(pin: PIN) -> Self {
        Self::new(pin, ActiveLevel::High)
    }

    pub fn active_low(pin: PIN) -> Self {
        Self::new(pin, ActiveLevel::Low)
    }

    /// Drive the LED logically ON (true) or OFF (false). Pin errors are ignored.
    pub fn set(&mut self, on: bool) {
        if on == self.is_on {
            return;
        }
        let high = on == (self.active == ActiveLevel::High);
        let _ = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        self.is_on = on;
    }

    #[inline]
    pub fn on(&mut self) {
        self.set(true);
    }

    #[inline]
    pub fn off(&mut self) {
        self.set(false);
    }

    pub fn toggle(&mut self) {
        self.set(!self.is_on);
    }

    #[inline]
    pub fn is_on(&self) -> bool {
        self.is_on
    }

    /// Solid while `online`, blinking otherwise.
    pub fn show_link(&mut self, online: bool, now: u32) {
        let on = online || (now / (LINK_DOWN_BLINK_MS / 2)) % 2 == 0;
        self.set(on);
    }

    pub fn free(self) -> PIN {
        self.pin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    #[derive(Default)]
    struct Pin {
        high: bool,
        writes: usize,
    }

    impl ErrorType for Pin {
        type Error = Infallible;
    }

    impl OutputPin for Pin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.high = false;
            self.writes += 1;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.high = true;
            self.writes += 1;
            Ok(())
        }
    }

    #[test]
    fn active_low_inverts() {
        let mut led = Led::active_low(Pin::default());
        assert!(led.pin.high);
        led.on();
        assert!(!led.pin.high);
        assert!(led.is_on());
    }

    #[test]
    fn link_display() {
        let mut led = Led::active_high(Pin::default());
        led.show_link(true, 0);
        assert!(led.is_on());
        led.show_link(true, 600);
        assert!(led.is_on());

        led.show_link(false, 100);
        assert!(led.is_on());
        led.show_link(false, 600);
        assert!(!led.is_on());
        led.show_link(false, 1000);
        assert!(led.is_on());
    }

    #[test]
    fn unchanged_state_skips_the_pin() {
        let mut led = Led::active_high(Pin::default());
        let writes = led.pin.writes;
        led.off();
        led.off();
        assert_eq!(led.pin.writes, writes);
        led.toggle();
        assert_eq!(led.free().writes, writes + 1);
    }
}
