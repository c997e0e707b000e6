// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Master board firmware: samples the wired pilot controls and commands the slave.

#![no_main]
#![no_std]

use cortex_m_rt::{entry, exception};
use panic_halt as _;

use hal::{pac, prelude::*, serial::Serial};
use stm32f7xx_hal as hal;

use trackbot::app::MasterRuntime;
use trackbot::config::RamConfigStore;
use trackbot::control::BATTERY_CUTOFF_V;
use trackbot::hw::{
    adc::{Adc, AdcRead, FULL_SCALE},
    pins::{MasterPins, PilotPins},
    systick::{self, SysTickClock},
    usart::{link_config, LinkSerial},
    Clock, Led,
};
use trackbot::link::LinkTiming;
use trackbot::pilot::{PilotChannels, PilotFrame, PilotInput, PilotMapping};

const THROTTLE_CH: u8 = 12;
const STEERING_CH: u8 = 13;
const MODE_CH: u8 = 15;

/// Joystick, mode potentiometer and two toggle switches wired straight to the master.
struct WiredPilot {
    adc: Adc,
    pins: PilotPins,
    mapping: PilotMapping,
}

impl WiredPilot {
    /// Raw sample mapped to `-1.0..=1.0`, centered at mid-scale.
    fn axis(&mut self, ch: u8) -> f32 {
        let raw = self.adc.read_channel(ch).min(FULL_SCALE) as f32;
        raw / FULL_SCALE as f32 * 2.0 - 1.0
    }
}

impl PilotInput for WiredPilot {
    fn poll(&mut self, _now: u32) -> PilotFrame {
        // Switches pull to ground when on.
        let switch = |on: bool| if on { 1.0 } else { -1.0 };

        let channels = PilotChannels {
            throttle: self.axis(THROTTLE_CH),
            steering: self.axis(STEERING_CH),
            mode: self.axis(MODE_CH),
            hazard: switch(self.pins.hazard.is_low()),
            lights: switch(self.pins.lights.is_low()),
            rc_linked: true,
            ..PilotChannels::default()
        };
        self.mapping.map(&channels)
    }
}

#[entry]
fn main() -> ! {
    // Peripherals
    let dp = pac::Peripherals::take().unwrap();
    let cp = cortex_m::Peripherals::take().unwrap();

    // Clocks
    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.sysclk(216.MHz()).freeze();

    systick::init(cp.SYST, clocks.sysclk().raw());
    let clock = SysTickClock;

    // GPIO
    let pins = MasterPins::new(dp.GPIOA, dp.GPIOC, dp.GPIOD);

    // LEDs
    let mut led_red = Led::active_low(pins.leds.red);
    let mut led_yellow = Led::active_low(pins.leds.yellow);
    let mut led_green = Led::active_low(pins.leds.green);

    // USART1 (link)
    let serial = Serial::new(
        dp.USART1,
        (pins.link.tx, pins.link.rx),
        &clocks,
        link_config(),
    );
    let link = LinkSerial::new(serial);

    let pilot = WiredPilot {
        adc: Adc::adc1(dp.ADC1),
        pins: pins.pilot,
        mapping: PilotMapping::default(),
    };

    let mut master = MasterRuntime::new(
        link,
        pilot,
        RamConfigStore::new(),
        LinkTiming::default(),
    );

    loop {
        let now = clock.now_ms();

        let ok = master.poll(now).is_ok();
        led_red.set(!ok);
        led_green.show_link(master.online(now), now);
        led_yellow.set(
            master
                .battery_voltage()
                .is_some_and(|v| v < BATTERY_CUTOFF_V),
        );
    }
}

#[exception]
fn SysTick() {
    systick::tick();
}
