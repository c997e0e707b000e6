// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Four-channel motor PWM on TIM4 (PD12..PD15).
//!
//! The timer is configured directly through the PAC: edge-aligned PWM mode 1 with preload on
//! every channel, one shared period. Duty is expressed in timer counts, `0..=max_duty()`.

use stm32f7xx_hal::pac;

/// Motor PWM frequency, above the audible range.
pub const PWM_FREQUENCY_HZ: u32 = 20_000;

pub const CHANNELS: usize = 4;

pub struct MotorPwm {
    tim: pac::TIM4,
    max_duty: u16,
}

impl MotorPwm {
    /// Enable the TIM4 clock and start all four channels at 0% duty.
    ///
    /// `timer_clock_hz` is the APB1 timer clock feeding TIM4.
    pub fn tim4(tim4: pac::TIM4, timer_clock_hz: u32) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.tim4en().set_bit());

        let tim = tim4;

        // Disable counter while configuring
        tim.cr1.modify(|_, w| w.cen().clear_bit());

        // Smallest prescaler that keeps the period within 16 bits
        let ticks = (timer_clock_hz / PWM_FREQUENCY_HZ).max(2);
        let psc = (ticks - 1) / 0x1_0000;
        let arr = ticks / (psc + 1) - 1;
        tim.psc.write(|w| unsafe { w.bits(psc) });
        tim.arr.write(|w| unsafe { w.bits(arr) });

        // PWM mode 1 (OCxM = 0b110) with preload (OCxPE) on both channels of each CCMR
        const PWM1_PRELOAD: u32 = (0b110 << 4) | (1 << 3) | (0b110 << 12) | (1 << 11);
        tim.ccmr1_output().write(|w| unsafe { w.bits(PWM1_PRELOAD) });
        tim.ccmr2_output().write(|w| unsafe { w.bits(PWM1_PRELOAD) });

        tim.ccr1.write(|w| unsafe { w.bits(0) });
        tim.ccr2.write(|w| unsafe { w.bits(0) });
        tim.ccr3.write(|w| unsafe { w.bits(0) });
        tim.ccr4.write(|w| unsafe { w.bits(0) });

        // Active-high outputs
        tim.ccer.modify(|_, w| {
            w.cc1p()
                .clear_bit()
                .cc1e()
                .set_bit()
                .cc2p()
                .clear_bit()
                .cc2e()
                .set_bit()
                .cc3p()
                .clear_bit()
                .cc3e()
                .set_bit()
                .cc4p()
                .clear_bit()
                .cc4e()
                .set_bit()
        });

        // Latch PSC/ARR, then start
        tim.cr1.modify(|_, w| w.arpe().set_bit());
        tim.egr.write(|w| w.ug().set_bit());
        tim.cr1.modify(|_, w| w.cen().set_bit());

        Self {
            tim,
            max_duty: arr as u16,
        }
    }

    #[inline]
    pub fn max_duty(&self) -> u16 {
        self.max_duty
    }

    /// Set one channel's duty. Channels outside `0..4` are ignored.
    pub fn set_duty(&mut self, channel: u8, duty: u16) {
        let duty = duty.min(self.max_duty) as u32;
        let tim = &self.tim;
        match channel {
            0 => tim.ccr1.write(|w| unsafe { w.bits(duty) }),
            1 => tim.ccr2.write(|w| unsafe { w.bits(duty) }),
            2 => tim.ccr3.write(|w| unsafe { w.bits(duty) }),
            3 => tim.ccr4.write(|w| unsafe { w.bits(duty) }),
            _ => {}
        }
    }

    /// Consume the wrapper and return the underlying timer peripheral.
    #[inline]
    pub fn free(self) -> pac::TIM4 {
        self.tim
    }
}
