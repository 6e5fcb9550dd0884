//! Mock adapters for integration tests.
//!
//! Every actuator call and emitted event is recorded behind an
//! `Arc<Mutex<_>>` so tests can inspect them while the monitor threads
//! still own the adapters.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use thermoguard::app::events::AlertEvent;
use thermoguard::app::ports::{BinCommand, BuzzerPort, EventSink, FramePort, NotificationPort};
use thermoguard::error::{ActuatorError, SensorError};
use thermoguard::frame::RawFrame;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ActuatorCall {
    Send(BinCommand),
    Sound(Duration),
}

// ── MockHardware ──────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockHardware {
    calls: Arc<Mutex<Vec<ActuatorCall>>>,
    fail_link: bool,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every bin command fails.
    pub fn with_failing_link() -> Self {
        Self {
            fail_link: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<ActuatorCall> {
        lock(&self.calls).clone()
    }

    pub fn sent(&self) -> Vec<BinCommand> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ActuatorCall::Send(cmd) => Some(cmd),
                ActuatorCall::Sound(_) => None,
            })
            .collect()
    }

    pub fn sounds(&self) -> Vec<Duration> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ActuatorCall::Sound(d) => Some(d),
                ActuatorCall::Send(_) => None,
            })
            .collect()
    }
}

impl NotificationPort for MockHardware {
    fn send(&mut self, command: BinCommand) -> Result<(), ActuatorError> {
        if self.fail_link {
            return Err(ActuatorError::LinkWriteFailed);
        }
        lock(&self.calls).push(ActuatorCall::Send(command));
        Ok(())
    }
}

impl BuzzerPort for MockHardware {
    fn sound(&mut self, duration: Duration) -> Result<(), ActuatorError> {
        lock(&self.calls).push(ActuatorCall::Sound(duration));
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<AlertEvent>>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AlertEvent> {
        lock(&self.events).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.events).len()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AlertEvent) {
        lock(&self.events).push(event.clone());
    }
}

// ── Frame sources ─────────────────────────────────────────────

/// Replays a script, then repeats the last frame forever at `pace`.
pub struct LoopingSource {
    script: VecDeque<RawFrame>,
    last: RawFrame,
    pace: Duration,
}

#[allow(dead_code)]
impl LoopingSource {
    pub fn new(frames: Vec<RawFrame>, pace: Duration) -> Self {
        let last = frames.last().cloned().unwrap_or_default();
        Self {
            script: frames.into(),
            last,
            pace,
        }
    }
}

impl FramePort for LoopingSource {
    fn acquire(&mut self) -> Result<RawFrame, SensorError> {
        thread::sleep(self.pace);
        Ok(self.script.pop_front().unwrap_or_else(|| self.last.clone()))
    }
}

// ── Helpers ───────────────────────────────────────────────────

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// `n` copies of `celsius`.
#[allow(dead_code)]
pub fn uniform(n: usize, celsius: f32) -> Vec<f32> {
    vec![celsius; n]
}

/// Poll `cond` until it holds or `timeout` passes.
#[allow(dead_code)]
pub fn wait_for(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    cond()
}
