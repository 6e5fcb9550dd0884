//! Task bodies and the cooperative shutdown signal.
//!
//! ```text
//!   ┌──────────────────┐   publish    ┌──────────────────┐
//!   │ AcquisitionTask  │─────────────▶│ SharedFrameStore │
//!   │ (sensor thread)  │              └────────┬─────────┘
//!   └──────────────────┘                       │ snapshot
//!                                              ▼
//!   ┌──────────────────┐  1 Hz tick   ┌──────────────────┐
//!   │ CheckSchedule    │─────────────▶│ AlertTask        │──▶ bin link, buzzer,
//!   └──────────────────┘   on fire    │ (alert thread)   │    event sinks
//!                                     └──────────────────┘
//! ```
//!
//! Both loops poll one [`Shutdown`] and exit at their next wait point.

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::frame::store::SharedFrameStore;
use crate::scheduler::CheckSchedule;

use super::evaluator::AlertEvaluator;
use super::ports::{BuzzerPort, EventSink, NotificationPort};

// ───────────────────────────────────────────────────────────────
// Shutdown
// ───────────────────────────────────────────────────────────────

/// Cloneable stop flag with an interruptible sleep.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every task to stop.  Idempotent.
    pub fn trigger(&self) {
        let (flag, cv) = &*self.inner;
        *flag.lock().unwrap_or_else(|e| e.into_inner()) = true;
        cv.notify_all();
    }

    pub fn is_triggered(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Sleep for `duration` or until triggered.  Returns `true` if the
    /// shutdown was triggered.
    pub fn sleep(&self, duration: Duration) -> bool {
        self.sleep_until(Instant::now() + duration)
    }

    /// Sleep until `deadline` or until triggered.  Returns `true` if the
    /// shutdown was triggered.
    pub fn sleep_until(&self, deadline: Instant) -> bool {
        let (flag, cv) = &*self.inner;
        let mut stopped = flag.lock().unwrap_or_else(|e| e.into_inner());
        while !*stopped {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            stopped = match cv.wait_timeout(stopped, deadline - now) {
                Ok((guard, _)) => guard,
                Err(e) => e.into_inner().0,
            };
        }
        *stopped
    }

    /// Trigger on drop, including when a task unwinds from a panic.
    pub fn guard(&self) -> ShutdownGuard {
        ShutdownGuard(self.clone())
    }
}

/// Returned by [`Shutdown::guard`]; stops every task when it goes away.
#[must_use]
pub struct ShutdownGuard(Shutdown);

impl Drop for ShutdownGuard {
    fn drop(&mut self) {
        self.0.trigger();
    }
}

// ───────────────────────────────────────────────────────────────
// Alert task
// ───────────────────────────────────────────────────────────────

/// Counts what the alert loop did before it stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertTaskReport {
    pub checks: u32,
    pub fevers: u32,
}

/// Drives the [`AlertEvaluator`] from a [`CheckSchedule`].
///
/// Startup sends the bin `Start` command and a short confirmation buzz,
/// then ticks the schedule once per `tick_period`.  Each tick counts as
/// one second of schedule time.
pub struct AlertTask<H, K> {
    evaluator: AlertEvaluator,
    schedule: CheckSchedule,
    store: Arc<SharedFrameStore>,
    hw: H,
    sink: K,
    startup_buzz: Duration,
    tick_period: Duration,
    clock: fn() -> u64,
}

impl<H, K> AlertTask<H, K>
where
    H: NotificationPort + BuzzerPort,
    K: EventSink,
{
    pub fn new(
        evaluator: AlertEvaluator,
        schedule: CheckSchedule,
        store: Arc<SharedFrameStore>,
        hw: H,
        sink: K,
    ) -> Self {
        Self {
            evaluator,
            schedule,
            store,
            hw,
            sink,
            startup_buzz: Duration::ZERO,
            tick_period: Duration::from_secs(1),
            clock: crate::adapters::time::unix_ms,
        }
    }

    pub fn with_startup_buzz(mut self, duration: Duration) -> Self {
        self.startup_buzz = duration;
        self
    }

    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    pub fn with_clock(mut self, clock: fn() -> u64) -> Self {
        self.clock = clock;
        self
    }

    fn announce(&mut self) {
        if let Err(e) = self.hw.start() {
            warn!("alert: bin start command failed: {}", e);
        }
        if !self.startup_buzz.is_zero() {
            if let Err(e) = self.hw.sound(self.startup_buzz) {
                warn!("alert: startup buzz failed: {}", e);
            }
        }
    }

    /// Run until `shutdown` fires.  Hands back the actuators and sink.
    pub fn run(mut self, shutdown: &Shutdown) -> (AlertTaskReport, H, K) {
        let status = self.evaluator.status();
        let mut report = AlertTaskReport::default();

        self.announce();
        info!(
            "alert: monitoring, threshold {:.1}\u{00b0}C every {}s",
            self.evaluator.threshold(),
            self.schedule.interval_secs()
        );

        let mut deadline = Instant::now();
        loop {
            status.set_next_check_in(self.schedule.remaining());
            debug!("alert: {}", status.display_text());
            deadline += self.tick_period;
            if shutdown.sleep_until(deadline) {
                break;
            }
            // A slow check must not make the next ticks fire in a burst.
            let now = Instant::now();
            if now > deadline + self.tick_period {
                deadline = now;
            }

            if self.schedule.tick(1) {
                let outcome =
                    self.evaluator
                        .tick(&self.store, &mut self.hw, &mut self.sink, (self.clock)());
                if !outcome.skipped {
                    report.checks += 1;
                    if outcome.hotspot_count > 0 {
                        report.fevers += 1;
                    }
                }
            }
        }

        info!(
            "alert: stopped after {} checks ({} fevers)",
            report.checks, report.fevers
        );
        (report, self.hw, self.sink)
    }
}
