// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Millisecond time base from SysTick.
//!
//! The binaries install a `SysTick` exception handler that calls [`tick`].

use core::sync::atomic::{AtomicU32, Ordering};

use cortex_m::peripheral::{syst::SystClkSource, SYST};

use super::Clock;

static MILLIS: AtomicU32 = AtomicU32::new(0);

/// Start SysTick at 1 kHz from the core clock.
pub fn init(mut syst: SYST, sysclk_hz: u32) {
    syst.set_clock_source(SystClkSource::Core);
    syst.set_reload(sysclk_hz / 1000 - 1);
    syst.clear_current();
    syst.enable_interrupt();
    syst.enable_counter();
}

/// Advance the counter by one millisecond. Call from the SysTick handler only.
#[inline]
pub fn tick() {
    MILLIS.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub fn now_ms() -> u32 {
    MILLIS.load(Ordering::Relaxed)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SysTickClock;

impl Clock for SysTickClock {
    fn now_ms(&self) -> u32 {
        now_ms()
    }
}
