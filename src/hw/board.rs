// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Slave board [`Board`] implementation.
//!
//! Native digital pin `n` is `PE<n>`; native PWM pin `n` is TIM4 channel `n + 1` (PD12..PD15).

use heapless::Vec;
use stm32f7xx_hal::gpio::{gpioc, Analog, ErasedPin, Output, PushPull};

use super::adc::{Adc, BatteryMonitor};
use super::pins::NATIVE_OUTPUTS;
use super::pwm::MotorPwm;
use super::Board;

/// ADC1 input wired to the battery divider (PC4).
pub const BATTERY_ADC_CHANNEL: u8 = 14;

/// 47k over 10k.
pub const BATTERY_DIVIDER_RATIO: f32 = 5.7;

pub struct Stm32Board {
    outputs: Vec<ErasedPin<Output<PushPull>>, NATIVE_OUTPUTS>,
    pwm: MotorPwm,
    battery: BatteryMonitor<Adc>,
    _battery_pin: gpioc::PC4<Analog>,
}

impl Stm32Board {
    pub fn new(
        outputs: Vec<ErasedPin<Output<PushPull>>, NATIVE_OUTPUTS>,
        pwm: MotorPwm,
        adc: Adc,
        battery_pin: gpioc::PC4<Analog>,
    ) -> Self {
        Self {
            outputs,
            pwm,
            battery: BatteryMonitor::new(adc, BATTERY_ADC_CHANNEL, BATTERY_DIVIDER_RATIO),
            _battery_pin: battery_pin,
        }
    }
}

impl Board for Stm32Board {
    fn set_pin(&mut self, pin: u8, high: bool) {
        if let Some(p) = self.outputs.get_mut(pin as usize) {
            if high {
                p.set_high();
            } else {
                p.set_low();
            }
        }
    }

    fn set_pwm(&mut self, pin: u8, duty: u16) {
        self.pwm.set_duty(pin, duty);
    }

    fn max_duty(&self) -> u16 {
        self.pwm.max_duty()
    }

    fn battery_voltage(&mut self) -> f32 {
        self.battery.read()
    }
}
