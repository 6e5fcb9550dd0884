//! Wires the pipeline into running threads.
//!
//! ```text
//!   FrameSource ─▶ [acquire thread] ─▶ SharedFrameStore ◀─ [alert thread] ─▶ actuators, sinks
//! ```
//!
//! The store is created here and handed to both tasks; the actuators and
//! sinks move into the alert thread.  When the sensor stream ends the
//! whole monitor shuts down.

use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use log::{error, info};

use crate::app::acquisition::{AcquisitionStats, AcquisitionTask};
use crate::app::evaluator::{AlertEvaluator, EvaluatorStatus};
use crate::app::ports::{BuzzerPort, EventSink, FramePort, NotificationPort};
use crate::app::runtime::{AlertTask, AlertTaskReport, Shutdown};
use crate::config::SystemConfig;
use crate::drivers::task_pin::{Core, spawn_on_core};
use crate::frame::reconstruct::FrameReconstructor;
use crate::frame::store::SharedFrameStore;
use crate::scheduler::CheckSchedule;

const ACQUIRE_STACK_KB: usize = 16;
const ALERT_STACK_KB: usize = 16;

/// Final counters from both tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorReport {
    pub acquisition: AcquisitionStats,
    pub alerts: AlertTaskReport,
}

/// Running monitor handle.
pub struct Monitor {
    store: Arc<SharedFrameStore>,
    status: EvaluatorStatus,
    shutdown: Shutdown,
    acquire: JoinHandle<AcquisitionStats>,
    alert: JoinHandle<AlertTaskReport>,
}

/// Knobs the tests shorten.
#[derive(Debug, Clone, Copy)]
pub struct Timing {
    /// Wall time per schedule second.
    pub tick_period: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_secs(1),
        }
    }
}

impl Monitor {
    /// Spawn both tasks.  `grid` is the frame shape the source delivers.
    pub fn start<S, H, K>(
        config: &SystemConfig,
        grid: (u16, u16),
        source: S,
        hw: H,
        sink: K,
        shutdown: Shutdown,
        timing: Timing,
    ) -> io::Result<Self>
    where
        S: FramePort + Send + 'static,
        H: NotificationPort + BuzzerPort + Send + 'static,
        K: EventSink + Send + 'static,
    {
        let (width, height) = grid;
        let store = Arc::new(SharedFrameStore::new(width, height));
        let reconstructor = FrameReconstructor::new(width, height, config.neighbor_rule);

        let evaluator = AlertEvaluator::new(config);
        let status = evaluator.status();
        let alert_task = AlertTask::new(
            evaluator,
            CheckSchedule::new(config.check_interval_seconds),
            Arc::clone(&store),
            hw,
            sink,
        )
        .with_startup_buzz(Duration::from_secs_f32(config.startup_buzz_seconds))
        .with_tick_period(timing.tick_period);

        let acquisition = AcquisitionTask::new(source, reconstructor, Arc::clone(&store));
        let sd = shutdown.clone();
        let acquire = spawn_on_core(Core::Pro, 5, ACQUIRE_STACK_KB, "acquire\0", move || {
            // Nothing left to evaluate once the stream is gone.
            let _guard = sd.guard();
            acquisition.run(&sd)
        })?;

        let sd = shutdown.clone();
        let alert = spawn_on_core(Core::App, 4, ALERT_STACK_KB, "alert\0", move || {
            let _guard = sd.guard();
            alert_task.run(&sd).0
        });
        let alert = match alert {
            Ok(h) => h,
            Err(e) => {
                shutdown.trigger();
                return Err(e);
            }
        };

        info!("monitor: {}x{} grid, tasks running", width, height);
        Ok(Self {
            store,
            status,
            shutdown,
            acquire,
            alert,
        })
    }

    pub fn store(&self) -> Arc<SharedFrameStore> {
        Arc::clone(&self.store)
    }

    pub fn status(&self) -> EvaluatorStatus {
        self.status.clone()
    }

    pub fn shutdown(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Wait for both tasks to stop.  A task that exits or panics stops the
    /// other, and a panicked task reports zeroes.
    pub fn join(self) -> MonitorReport {
        let acquisition = self.acquire.join().unwrap_or_else(|_| {
            error!("monitor: acquisition task panicked");
            self.shutdown.trigger();
            AcquisitionStats::default()
        });
        let alerts = self.alert.join().unwrap_or_else(|_| {
            error!("monitor: alert task panicked");
            AlertTaskReport::default()
        });
        MonitorReport {
            acquisition,
            alerts,
        }
    }
}
