//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AcquisitionTask / AlertEvaluator (domain)
//! ```
//!
//! Driven adapters (frame transports, actuators, event sinks, config
//! storage, remote upload) implement these traits.  The domain consumes
//! them via generics, so it never touches hardware directly.

use std::time::Duration;

use crate::config::SystemConfig;
use crate::error::{ActuatorError, ConfigError, SensorError, SyncError};
use crate::frame::RawFrame;

use super::events::{AlertEvent, LogRecord};

// ───────────────────────────────────────────────────────────────
// Frame port (driven adapter: sensor transport → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the acquisition task calls this once per cycle.
pub trait FramePort {
    /// Block until the transport delivers the next frame's readings.
    ///
    /// A short or partly invalid frame is `Ok`; only transport failures
    /// are `Err`.
    fn acquire(&mut self) -> Result<RawFrame, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator ports (driven adapters: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// One-byte commands understood by the bin microcontroller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BinCommand {
    /// Monitor is up and ready.
    Start = b's',
    /// Fever detected.
    Notify = b'n',
}

impl BinCommand {
    pub const fn byte(self) -> u8 {
        self as u8
    }
}

/// Fire-and-forget signalling to the external microcontroller.
pub trait NotificationPort {
    /// Write one command.  No acknowledgement is awaited.
    fn send(&mut self, command: BinCommand) -> Result<(), ActuatorError>;

    fn start(&mut self) -> Result<(), ActuatorError> {
        self.send(BinCommand::Start)
    }

    fn notify(&mut self) -> Result<(), ActuatorError> {
        self.send(BinCommand::Notify)
    }
}

/// Audible alarm.
pub trait BuzzerPort {
    /// Sound for `duration`, blocking the caller until done.
    fn sound(&mut self, duration: Duration) -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / sync)
// ───────────────────────────────────────────────────────────────

/// The evaluator emits [`AlertEvent`]s through this port.  Adapters
/// decide where they go (serial log, remote sync, a status display).
pub trait EventSink {
    fn emit(&mut self, event: &AlertEvent);
}

impl<T: EventSink + ?Sized> EventSink for Box<T> {
    fn emit(&mut self, event: &AlertEvent) {
        (**self).emit(event);
    }
}

/// An absent sink drops everything.
impl<T: EventSink> EventSink for Option<T> {
    fn emit(&mut self, event: &AlertEvent) {
        if let Some(sink) = self {
            sink.emit(event);
        }
    }
}

/// Fan out to two sinks, in order.
impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    fn emit(&mut self, event: &AlertEvent) {
        self.0.emit(event);
        self.1.emit(event);
    }
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate before persisting; invalid ranges are
/// rejected with [`ConfigError::ValidationFailed`], not clamped.
pub trait ConfigPort {
    /// Load configuration.  Returns [`SystemConfig::default()`] if no
    /// stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Upload port (driven adapter: sync worker → remote log store)
// ───────────────────────────────────────────────────────────────

/// Pushes one log record to the remote store.
///
/// [`SyncError::Connectivity`] is retried by the caller; any other
/// error aborts that record.
pub trait UploadPort {
    fn upload(&mut self, record: &LogRecord) -> Result<(), SyncError>;
}
