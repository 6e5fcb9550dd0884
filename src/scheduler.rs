//! Periodic check countdown.
//!
//! ```text
//!   interval = 30 s
//!   ┌────┬────┬────┬─ ─ ─┬────┐
//!   │ 30 │ 29 │ 28 │     │  1 │──▶ fire, reload to 30
//!   └────┴────┴────┴─ ─ ─┴────┘
//!        ▲ one tick per second from the alert task
//! ```
//!
//! The schedule only counts; the alert task decides what a fire means.
//! Kept free of clocks and threads so it is testable with plain calls.

use log::debug;

/// Countdown that fires every `interval_secs` seconds of ticks.
#[derive(Debug, Clone)]
pub struct CheckSchedule {
    interval_secs: u32,
    remaining: u32,
}

impl CheckSchedule {
    /// An interval of 0 is treated as 1.
    pub fn new(interval_secs: u32) -> Self {
        let interval_secs = interval_secs.max(1);
        Self {
            interval_secs,
            remaining: interval_secs,
        }
    }

    pub fn interval_secs(&self) -> u32 {
        self.interval_secs
    }

    /// Seconds until the next fire.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Advance by `elapsed_secs`.  Returns `true` if the countdown reached
    /// zero; the countdown then restarts from the full interval.  Missed
    /// fires are coalesced: a long stall fires once, not once per interval.
    pub fn tick(&mut self, elapsed_secs: u32) -> bool {
        if elapsed_secs >= self.remaining {
            if elapsed_secs > self.remaining + self.interval_secs {
                debug!(
                    "schedule: {}s stall, coalescing missed checks",
                    elapsed_secs
                );
            }
            self.remaining = self.interval_secs;
            true
        } else {
            self.remaining -= elapsed_secs;
            false
        }
    }
}
