//! Clock helpers.
//!
//! - **`target_os = "espidf"`**: wraps `esp_timer_get_time()` for uptime
//!   and `gettimeofday()` for wall-clock time (valid once SNTP synced).
//! - **otherwise**: `std::time` clocks.

/// Milliseconds since the Unix epoch, 0 if the wall clock is unset.
#[cfg(target_os = "espidf")]
pub fn unix_ms() -> u64 {
    let mut tv = esp_idf_svc::sys::timeval {
        tv_sec: 0,
        tv_usec: 0,
    };
    // SAFETY: writes only into `tv`.
    if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, core::ptr::null_mut()) } != 0 {
        return 0;
    }
    // Reject obviously unsynced time (before 2020-01-01).
    const EPOCH_2020: i64 = 1_577_836_800;
    if (tv.tv_sec as i64) < EPOCH_2020 {
        return 0;
    }
    tv.tv_sec as u64 * 1_000 + tv.tv_usec as u64 / 1_000
}

/// Milliseconds since the Unix epoch, 0 if the clock is before it.
#[cfg(not(target_os = "espidf"))]
pub fn unix_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64)
}

/// Microseconds since boot (monotonic).
#[cfg(target_os = "espidf")]
pub fn uptime_us() -> u64 {
    // SAFETY: reads the high-resolution timer; no shared state.
    (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
}

/// Microseconds since the first call (monotonic).
#[cfg(not(target_os = "espidf"))]
pub fn uptime_us() -> u64 {
    use std::sync::OnceLock;
    use std::time::Instant;
    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_micros() as u64
}
