// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Slave board firmware: drives the tracks and the lighting rig.

#![no_main]
#![no_std]

use cortex_m_rt::{entry, exception};
use panic_halt as _;

use hal::{
    i2c::{BlockingI2c, Mode},
    pac,
    prelude::*,
    serial::Serial,
};
use stm32f7xx_hal as hal;

use trackbot::app::SlaveRuntime;
use trackbot::hw::{
    adc::Adc,
    board::Stm32Board,
    i2c::I2cBus,
    pins::SlavePins,
    pwm::MotorPwm,
    systick::{self, SysTickClock},
    usart::{link_config, LinkSerial},
    Clock, Hardware, Led,
};
use trackbot::link::LinkTiming;

/// Main-loop heartbeat toggles every this many milliseconds.
const HEARTBEAT_MS: u32 = 500;

#[entry]
fn main() -> ! {
    // Peripherals
    let dp = pac::Peripherals::take().unwrap();
    let cp = cortex_m::Peripherals::take().unwrap();

    // Clocks
    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.sysclk(216.MHz()).freeze();
    let mut apb1 = rcc.apb1;

    systick::init(cp.SYST, clocks.sysclk().raw());
    let clock = SysTickClock;

    // GPIO
    let pins = SlavePins::new(dp.GPIOA, dp.GPIOB, dp.GPIOC, dp.GPIOD, dp.GPIOE);

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

    // I2C1 (expander, mux, lighting)
    let i2c = BlockingI2c::i2c1(
        dp.I2C1,
        (pins.i2c.scl, pins.i2c.sda),
        Mode::standard(100.kHz()),
        &clocks,
        &mut apb1,
        50_000,
    );

    // TIM4 motor PWM, ADC1 battery sense
    let pwm = MotorPwm::tim4(dp.TIM4, clocks.timclk1().raw());
    let adc = Adc::adc1(dp.ADC1);
    let board = Stm32Board::new(pins.outputs, pwm, adc, pins.battery);

    let hw = Hardware::new(board, I2cBus::new(i2c));
    let mut slave = SlaveRuntime::new(link, hw, LinkTiming::default());

    let mut last_beat = clock.now_ms();

    loop {
        let now = clock.now_ms();

        let ok = slave.poll(now).is_ok();
        led_red.set(!ok);
        led_green.show_link(slave.command_fresh(now), now);
        led_yellow.set(slave.drive().cut_off());

        if now.wrapping_sub(last_beat) >= HEARTBEAT_MS {
            last_beat = now;
            #[cfg(feature = "defmt")]
            defmt::trace!("slave: alive at {} ms", now);
        }
    }
}

#[exception]
fn SysTick() {
    systick::tick();
}
