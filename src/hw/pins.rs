// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pin definitions for the STM32F777 trackbot boards.
//!
//! Both boards share the LED and link wiring. The slave adds the motor PWM timer, the native
//! output bank, the I2C bus and the battery divider; the master adds the pilot controls.

use heapless::Vec;
use stm32f7xx_hal::{
    gpio::{
        gpioa, gpiob, gpioc, gpiod, Alternate, Analog, ErasedPin, Input, OpenDrain, Output,
        PullUp, PushPull,
    },
    pac,
    prelude::*,
};

/// Size of the native digital output table.
pub const NATIVE_OUTPUTS: usize = 16;

pub struct LedPins {
    pub red: gpiod::PD8<Output<PushPull>>,
    pub yellow: gpiod::PD9<Output<PushPull>>,
    pub green: gpiod::PD10<Output<PushPull>>,
}

/// USART1, the inter-board link.
pub struct LinkPins {
    pub tx: gpioa::PA9<Alternate<7>>,
    pub rx: gpioa::PA10<Alternate<7>>,
}

/// TIM4 CH1..CH4, native PWM pins 0..3.
pub struct PwmPins {
    pub ch1: gpiod::PD12<Alternate<2>>,
    pub ch2: gpiod::PD13<Alternate<2>>,
    pub ch3: gpiod::PD14<Alternate<2>>,
    pub ch4: gpiod::PD15<Alternate<2>>,
}

/// I2C1 (expander, multiplexer, lighting PWM driver).
pub struct I2cPins {
    pub scl: gpiob::PB8<Alternate<4, OpenDrain>>,
    pub sda: gpiob::PB9<Alternate<4, OpenDrain>>,
}

pub struct SlavePins {
    pub leds: LedPins,
    pub link: LinkPins,
    pub pwm: PwmPins,
    pub i2c: I2cPins,
    /// PE0..PE15, native digital pins 0..15.
    pub outputs: Vec<ErasedPin<Output<PushPull>>, NATIVE_OUTPUTS>,
    /// Battery divider, ADC1_IN14.
    pub battery: gpioc::PC4<Analog>,
}

/// Wired pilot controls on the master.
pub struct PilotPins {
    pub throttle: gpioc::PC2<Analog>, // ADC1_IN12
    pub steering: gpioc::PC3<Analog>, // ADC1_IN13
    pub mode: gpioc::PC5<Analog>,     // ADC1_IN15
    pub hazard: gpiod::PD0<Input<PullUp>>,
    pub lights: gpiod::PD1<Input<PullUp>>,
}

pub struct MasterPins {
    pub leds: LedPins,
    pub link: LinkPins,
    pub pilot: PilotPins,
}

impl SlavePins {
    pub fn new(
        gpioa: pac::GPIOA,
        gpiob: pac::GPIOB,
        gpioc: pac::GPIOC,
        gpiod: pac::GPIOD,
        gpioe: pac::GPIOE,
    ) -> Self {
        let gpioa = gpioa.split();
        let gpiob = gpiob.split();
        let gpioc = gpioc.split();
        let gpiod = gpiod.split();
        let gpioe = gpioe.split();

        let mut outputs = Vec::new();
        for pin in [
            gpioe.pe0.into_push_pull_output().erase(),
            gpioe.pe1.into_push_pull_output().erase(),
            gpioe.pe2.into_push_pull_output().erase(),
            gpioe.pe3.into_push_pull_output().erase(),
            gpioe.pe4.into_push_pull_output().erase(),
            gpioe.pe5.into_push_pull_output().erase(),
            gpioe.pe6.into_push_pull_output().erase(),
            gpioe.pe7.into_push_pull_output().erase(),
            gpioe.pe8.into_push_pull_output().erase(),
            gpioe.pe9.into_push_pull_output().erase(),
            gpioe.pe10.into_push_pull_output().erase(),
            gpioe.pe11.into_push_pull_output().erase(),
            gpioe.pe12.into_push_pull_output().erase(),
            gpioe.pe13.into_push_pull_output().erase(),
            gpioe.pe14.into_push_pull_output().erase(),
            gpioe.pe15.into_push_pull_output().erase(),
        ] {
            // Capacity matches the array length.
            let _ = outputs.push(pin);
        }

        Self {
            leds: LedPins {
                red: gpiod.pd8.into_push_pull_output(),
                yellow: gpiod.pd9.into_push_pull_output(),
                green: gpiod.pd10.into_push_pull_output(),
            },

            link: LinkPins {
                tx: gpioa.pa9.into_alternate::<7>(),
                rx: gpioa.pa10.into_alternate::<7>(),
            },

            pwm: PwmPins {
                ch1: gpiod.pd12.into_alternate::<2>(),
                ch2: gpiod.pd13.into_alternate::<2>(),
                ch3: gpiod.pd14.into_alternate::<2>(),
                ch4: gpiod.pd15.into_alternate::<2>(),
            },

            i2c: I2cPins {
                scl: gpiob.pb8.into_alternate_open_drain::<4>(),
                sda: gpiob.pb9.into_alternate_open_drain::<4>(),
            },

            outputs,

            battery: gpioc.pc4.into_analog(),
        }
    }
}

impl MasterPins {
    pub fn new(gpioa: pac::GPIOA, gpioc: pac::GPIOC, gpiod: pac::GPIOD) -> Self {
        let gpioa = gpioa.split();
        let gpioc = gpioc.split();
        let gpiod = gpiod.split();

        Self {
            leds: LedPins {
                red: gpiod.pd8.into_push_pull_output(),
                yellow: gpiod.pd9.into_push_pull_output(),
                green: gpiod.pd10.into_push_pull_output(),
            },

            link: LinkPins {
                tx: gpioa.pa9.into_alternate::<7>(),
                rx: gpioa.pa10.into_alternate::<7>(),
            },

            pilot: PilotPins {
                throttle: gpioc.pc2.into_analog(),
                steering: gpioc.pc3.into_analog(),
                mode: gpioc.pc5.into_analog(),
                hazard: gpiod.pd0.into_pull_up_input(),
                lights: gpiod.pd1.into_pull_up_input(),
            },
        }
    }
}
