//! Outbound application events.
//!
//! The [`AlertEvaluator`](super::evaluator::AlertEvaluator) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them (serial log or remote sync).

use heapless::Vec;
use serde::Serialize;

use crate::frame::{FrameStats, Hotspot};

/// Hotspots carried inline in an event; the count covers the rest.
pub const MAX_REPORTED_HOTSPOTS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// At least one cell exceeded the threshold.
    Fever,
    /// Emitted on every evaluation, hotspot or not.
    RoutineCheck,
}

/// Result of one evaluation, as seen by sinks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertEvent {
    pub kind: AlertKind,
    pub stats: FrameStats,
    /// Total cells above threshold.
    pub hotspot_count: u16,
    /// First hotspots in row-major order, at most [`MAX_REPORTED_HOTSPOTS`].
    pub hotspots: Vec<Hotspot, MAX_REPORTED_HOTSPOTS>,
    /// Sequence of the evaluated frame (0 = nothing published yet).
    pub frame_sequence: u64,
    /// Wall-clock time of the evaluation, ms since the Unix epoch.
    pub timestamp_ms: u64,
}

// ───────────────────────────────────────────────────────────────
// Remote log records
// ───────────────────────────────────────────────────────────────

/// Remote table a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogTable {
    FeverLog,
    MonitorLog,
}

/// Flat row pushed to the remote log store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub table: LogTable,
    pub logged_at_ms: u64,
    pub min_temperature: f32,
    pub max_temperature: f32,
    pub avg_temperature: f32,
    pub hotspot_count: u16,
}

impl From<&AlertEvent> for LogRecord {
    fn from(event: &AlertEvent) -> Self {
        Self {
            table: match event.kind {
                AlertKind::Fever => LogTable::FeverLog,
                AlertKind::RoutineCheck => LogTable::MonitorLog,
            },
            logged_at_ms: event.timestamp_ms,
            min_temperature: event.stats.min,
            max_temperature: event.stats.max,
            avg_temperature: event.stats.mean,
            hotspot_count: event.hotspot_count,
        }
    }
}
