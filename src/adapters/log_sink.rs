//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing alert events to the logger (serial
//! console on the device, stderr on host).

use log::{info, warn};

use crate::app::events::{AlertEvent, AlertKind};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AlertEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AlertEvent) {
        let s = &event.stats;
        match event.kind {
            AlertKind::Fever => {
                warn!(
                    "FEVER | {} hotspot(s) | min={:.1} max={:.1} avg={:.1}\u{00b0}C | frame #{}",
                    event.hotspot_count, s.min, s.max, s.mean, event.frame_sequence
                );
                for h in &event.hotspots {
                    info!("FEVER |   ({:>2},{:>2}) {:.1}\u{00b0}C", h.row, h.col, h.celsius);
                }
            }
            AlertKind::RoutineCheck => {
                info!(
                    "CHECK | min={:.1} max={:.1} avg={:.1}\u{00b0}C | hotspots={} | frame #{}",
                    s.min, s.max, s.mean, event.hotspot_count, event.frame_sequence
                );
            }
        }
    }
}
