//! Blocking delay behind `embedded_hal::delay::DelayNs`.
//!
//! Sub-millisecond waits busy-spin on ESP-IDF (the scheduler tick is far
//! coarser); everything else yields the thread.

use std::time::Duration;

use embedded_hal::delay::DelayNs;

#[derive(Debug, Clone, Copy, Default)]
pub struct SysDelay;

impl DelayNs for SysDelay {
    fn delay_ns(&mut self, ns: u32) {
        #[cfg(target_os = "espidf")]
        if ns < 1_000_000 {
            // SAFETY: ROM busy-wait, no shared state.
            unsafe { esp_idf_svc::sys::esp_rom_delay_us(ns.div_ceil(1_000)) };
            return;
        }
        std::thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}
