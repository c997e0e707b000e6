// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Battery voltage sensing.
//!
//! [`BatteryMonitor`] scales raw 12-bit samples through the board's resistor divider and smooths
//! them so a single noisy sample cannot trip the low-voltage cutoff. With the `stm32` feature,
//! [`Adc`] provides blocking single-channel reads from ADC1 using direct PAC register access.

/// Trait for reading a single channel from an ADC peripheral.
pub trait AdcRead {
    fn read_channel(&mut self, ch: u8) -> u16;
}

/// ADC reference voltage.
pub const VREF: f32 = 3.3;

/// Full-scale 12-bit reading.
pub const FULL_SCALE: u16 = 4095;

/// Smoothing factor applied to each new sample.
pub const DEFAULT_ALPHA: f32 = 0.2;

pub struct BatteryMonitor<A> {
    adc: A,
    channel: u8,
    volts_per_count: f32,
    alpha: f32,
    filtered: Option<f32>,
}

impl<A: AdcRead> BatteryMonitor<A> {
    /// `divider_ratio` is battery volts per ADC-pin volt, e.g. 5.7 for 47k/10k.
    pub fn new(adc: A, channel: u8, divider_ratio: f32) -> Self {
        Self {
            adc,
            channel,
            volts_per_count: VREF / FULL_SCALE as f32 * divider_ratio,
            alpha: DEFAULT_ALPHA,
            filtered: None,
        }
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha.clamp(0.0, 1.0);
        self
    }

    /// Sample and return the smoothed battery voltage. The first sample is taken as-is.
    pub fn read(&mut self) -> f32 {
        let sample = self.adc.read_channel(self.channel).min(FULL_SCALE) as f32 * self.volts_per_count;
        let v = match self.filtered {
            Some(prev) => prev + (sample - prev) * self.alpha,
            None => sample,
        };
        self.filtered = Some(v);
        v
    }

    #[inline]
    pub fn last(&self) -> Option<f32> {
        self.filtered
    }

    pub fn free(self) -> A {
        self.adc
    }
}

#[cfg(feature = "stm32")]
pub use self::stm32::Adc;

#[cfg(feature = "stm32")]
mod stm32 {
    use stm32f7xx_hal::pac;

    use super::AdcRead;

    /// Blocking ADC1 wrapper.
    pub struct Adc {
        adc: pac::ADC1,
    }

    impl Adc {
        /// Enable the ADC1 clock and configure 12-bit, right-aligned, software-triggered
        /// single conversions.
        pub fn adc1(adc1: pac::ADC1) -> Self {
            let rcc = unsafe { &*pac::RCC::ptr() };
            rcc.apb2enr.modify(|_, w| w.adc1en().set_bit());

            let common = unsafe { &*pac::ADC_COMMON::ptr() };
            // ADC prescaler: PCLK2 / 4
            common.ccr.modify(|_, w| w.adcpre().div4());

            // Power off to configure
            adc1.cr2.modify(|_, w| w.adon().clear_bit());
            adc1.cr1.modify(|_, w| w.res().bits(0b00));
            adc1.cr2.modify(|_, w| {
                w.cont().clear_bit();
                w.align().right();
                w.exten().disabled();
                w
            });
            adc1.cr2.modify(|_, w| w.adon().set_bit());

            Self { adc: adc1 }
        }

        pub fn free(self) -> pac::ADC1 {
            self.adc
        }
    }

    impl AdcRead for Adc {
        fn read_channel(&mut self, ch: u8) -> u16 {
            let adc = &self.adc;
            let ch = ch & 0x1F;

            // Longest sample time; the divider has a high source impedance.
            if ch <= 9 {
                let shift = 3 * ch as u32;
                adc.smpr2
                    .modify(|r, w| unsafe { w.bits(r.bits() | (0b111 << shift)) });
            } else if ch <= 18 {
                let shift = 3 * (ch as u32 - 10);
                adc.smpr1
                    .modify(|r, w| unsafe { w.bits(r.bits() | (0b111 << shift)) });
            }

            // Sequence length = 1 conversion
            adc.sqr1.modify(|_, w| w.l().bits(0));
            adc.sqr3.modify(|_, w| unsafe { w.sq1().bits(ch) });

            adc.cr2.modify(|_, w| w.swstart().set_bit());
            while adc.sr.read().eoc().bit_is_clear() {}

            adc.dr.read().data().bits() as u16
        }
    }
}
