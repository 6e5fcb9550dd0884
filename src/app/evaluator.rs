//! Hotspot evaluation and the Idle/Checking alert state machine.
//!
//! ```text
//!            timer fires                    check done
//!   Idle ─────────────────▶ Checking ─────────────────▶ Idle
//!                              │
//!                              ├─ hotspots? ─▶ Fever event, notify, buzzer
//!                              └─ always ────▶ RoutineCheck event
//! ```
//!
//! The state lives in an [`EvaluatorStatus`] so status displays on other
//! threads can show "checking…" and the countdown to the next check.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU32, Ordering};
use std::time::Duration;

use log::{debug, info, warn};

use crate::config::SystemConfig;
use crate::frame::store::{FrameSnapshot, SharedFrameStore};

use super::events::{AlertEvent, AlertKind, MAX_REPORTED_HOTSPOTS};
use super::ports::{BuzzerPort, EventSink, NotificationPort};

// ───────────────────────────────────────────────────────────────
// State + shared status
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EvaluatorState {
    Idle = 0,
    Checking = 1,
}

/// Cheap, cloneable view of the evaluator for other threads.
#[derive(Debug, Clone)]
pub struct EvaluatorStatus {
    state: Arc<AtomicU8>,
    next_check_secs: Arc<AtomicU32>,
}

impl EvaluatorStatus {
    fn new(next_check_secs: u32) -> Self {
        Self {
            state: Arc::new(AtomicU8::new(EvaluatorState::Idle as u8)),
            next_check_secs: Arc::new(AtomicU32::new(next_check_secs)),
        }
    }

    pub fn state(&self) -> EvaluatorState {
        if self.state.load(Ordering::Acquire) == EvaluatorState::Checking as u8 {
            EvaluatorState::Checking
        } else {
            EvaluatorState::Idle
        }
    }

    /// Seconds until the next scheduled check.
    pub fn next_check_in(&self) -> u32 {
        self.next_check_secs.load(Ordering::Relaxed)
    }

    pub fn set_next_check_in(&self, secs: u32) {
        self.next_check_secs.store(secs, Ordering::Relaxed);
    }

    /// One-line status for a display.
    pub fn display_text(&self) -> String {
        match self.state() {
            EvaluatorState::Checking => "Checking Temperature...".to_string(),
            EvaluatorState::Idle => format!("Checking in {} seconds", self.next_check_in()),
        }
    }

    /// `Idle → Checking`; `false` if a check is already in flight.
    fn try_begin(&self) -> bool {
        self.state
            .compare_exchange(
                EvaluatorState::Idle as u8,
                EvaluatorState::Checking as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    fn finish(&self) {
        self.state.store(EvaluatorState::Idle as u8, Ordering::Release);
    }
}

// ───────────────────────────────────────────────────────────────
// Outcome
// ───────────────────────────────────────────────────────────────

/// What one evaluation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckOutcome {
    /// `true` if the tick was ignored because a check was in flight.
    pub skipped: bool,
    pub hotspot_count: u16,
    pub notified: bool,
    pub sounded: bool,
}

// ───────────────────────────────────────────────────────────────
// AlertEvaluator
// ───────────────────────────────────────────────────────────────

pub struct AlertEvaluator {
    threshold: f32,
    buzzer_duration: Duration,
    notification_enabled: bool,
    status: EvaluatorStatus,
}

impl AlertEvaluator {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            threshold: config.temperature_threshold,
            buzzer_duration: Duration::from_secs_f32(config.buzzer_duration_seconds),
            notification_enabled: config.notification_enabled,
            status: EvaluatorStatus::new(config.check_interval_seconds),
        }
    }

    pub fn status(&self) -> EvaluatorStatus {
        self.status.clone()
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Run one check against the store's latest frame.
    ///
    /// The `hw` parameter satisfies **both** [`NotificationPort`] and
    /// [`BuzzerPort`], one owner for every physical actuator.
    pub fn tick(
        &mut self,
        store: &SharedFrameStore,
        hw: &mut (impl NotificationPort + BuzzerPort),
        sink: &mut impl EventSink,
        now_ms: u64,
    ) -> CheckOutcome {
        if !self.status.try_begin() {
            debug!("evaluator: check already in flight, tick ignored");
            return CheckOutcome {
                skipped: true,
                ..CheckOutcome::default()
            };
        }

        let snapshot = store.snapshot();
        let outcome = self.check(&snapshot, hw, sink, now_ms);

        self.status.finish();
        outcome
    }

    fn check(
        &self,
        snapshot: &FrameSnapshot,
        hw: &mut (impl NotificationPort + BuzzerPort),
        sink: &mut impl EventSink,
        now_ms: u64,
    ) -> CheckOutcome {
        let mut event = AlertEvent {
            kind: AlertKind::RoutineCheck,
            stats: snapshot.stats,
            hotspot_count: 0,
            hotspots: heapless::Vec::new(),
            frame_sequence: snapshot.sequence,
            timestamp_ms: now_ms,
        };
        for hotspot in snapshot.frame.hotspots(self.threshold) {
            if event.hotspots.len() < MAX_REPORTED_HOTSPOTS {
                // Capacity checked above.
                let _ = event.hotspots.push(hotspot);
            }
            event.hotspot_count = event.hotspot_count.saturating_add(1);
        }

        let mut outcome = CheckOutcome {
            hotspot_count: event.hotspot_count,
            ..CheckOutcome::default()
        };

        if event.hotspot_count > 0 {
            info!(
                "evaluator: {} cell(s) above {:.1}\u{00b0}C (max {:.1}\u{00b0}C, frame #{})",
                event.hotspot_count, self.threshold, snapshot.stats.max, snapshot.sequence
            );
            event.kind = AlertKind::Fever;
            sink.emit(&event);

            if self.notification_enabled {
                match hw.notify() {
                    Ok(()) => outcome.notified = true,
                    Err(e) => warn!("evaluator: bin notification failed: {}", e),
                }
            }

            match hw.sound(self.buzzer_duration) {
                Ok(()) => outcome.sounded = true,
                Err(e) => warn!("evaluator: buzzer failed: {}", e),
            }
        }

        event.kind = AlertKind::RoutineCheck;
        sink.emit(&event);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::BinCommand;
    use crate::error::ActuatorError;
    use crate::frame::{Frame, FrameStats};

    #[derive(Default)]
    struct Hw {
        sent: Vec<BinCommand>,
        sounded: Vec<Duration>,
        fail_link: bool,
    }

    impl NotificationPort for Hw {
        fn send(&mut self, command: BinCommand) -> Result<(), ActuatorError> {
            if self.fail_link {
                return Err(ActuatorError::LinkWriteFailed);
            }
            self.sent.push(command);
            Ok(())
        }
    }

    impl BuzzerPort for Hw {
        fn sound(&mut self, duration: Duration) -> Result<(), ActuatorError> {
            self.sounded.push(duration);
            Ok(())
        }
    }

    #[derive(Default)]
    struct Sink(Vec<AlertEvent>);

    impl EventSink for Sink {
        fn emit(&mut self, event: &AlertEvent) {
            self.0.push(event.clone());
        }
    }

    fn store_with(cells: Vec<f32>) -> SharedFrameStore {
        let store = SharedFrameStore::new(32, 6);
        let frame = Frame::from_cells(32, 6, cells).unwrap();
        let stats = FrameStats::of(&frame);
        store.publish(frame, stats);
        store
    }

    #[test]
    fn fever_frame_emits_both_events_and_actuates() {
        let mut cells = vec![36.0; 192];
        cells[3] = 41.0;
        cells[50] = 40.7;
        cells[190] = 42.5;
        let store = store_with(cells);
        let mut ev = AlertEvaluator::new(&SystemConfig::default());
        let (mut hw, mut sink) = (Hw::default(), Sink::default());

        let out = ev.tick(&store, &mut hw, &mut sink, 1_000);

        assert_eq!(out.hotspot_count, 3);
        assert!(out.notified && out.sounded && !out.skipped);
        let kinds: Vec<_> = sink.0.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![AlertKind::Fever, AlertKind::RoutineCheck]);
        assert_eq!(hw.sent, vec![BinCommand::Notify]);
        assert_eq!(hw.sounded, vec![Duration::from_millis(2500)]);
        assert_eq!(sink.0[0].hotspots[2].index, 190);
        assert_eq!(sink.0[0].timestamp_ms, 1_000);
        assert_eq!(ev.status().state(), EvaluatorState::Idle);
    }

    #[test]
    fn cool_frame_only_logs_routine_check() {
        let store = store_with(vec![36.5; 192]);
        let mut ev = AlertEvaluator::new(&SystemConfig::default());
        let (mut hw, mut sink) = (Hw::default(), Sink::default());

        let out = ev.tick(&store, &mut hw, &mut sink, 0);

        assert_eq!(out.hotspot_count, 0);
        assert_eq!(sink.0.len(), 1);
        assert_eq!(sink.0[0].kind, AlertKind::RoutineCheck);
        assert!(hw.sent.is_empty());
        assert!(hw.sounded.is_empty());
    }

    #[test]
    fn notification_can_be_disabled() {
        let mut cells = vec![36.0; 192];
        cells[0] = 45.0;
        let store = store_with(cells);
        let mut cfg = SystemConfig::default();
        cfg.notification_enabled = false;
        let mut ev = AlertEvaluator::new(&cfg);
        let (mut hw, mut sink) = (Hw::default(), Sink::default());

        let out = ev.tick(&store, &mut hw, &mut sink, 0);

        assert!(!out.notified);
        assert!(out.sounded);
        assert!(hw.sent.is_empty());
    }

    #[test]
    fn link_failure_does_not_stop_buzzer_or_logging() {
        let mut cells = vec![36.0; 192];
        cells[0] = 45.0;
        let store = store_with(cells);
        let mut ev = AlertEvaluator::new(&SystemConfig::default());
        let mut hw = Hw {
            fail_link: true,
            ..Hw::default()
        };
        let mut sink = Sink::default();

        let out = ev.tick(&store, &mut hw, &mut sink, 0);

        assert!(!out.notified);
        assert!(out.sounded);
        assert_eq!(sink.0.len(), 2);
    }

    #[test]
    fn reported_hotspots_are_capped_but_counted() {
        let store = store_with(vec![41.0; 192]);
        let mut ev = AlertEvaluator::new(&SystemConfig::default());
        let (mut hw, mut sink) = (Hw::default(), Sink::default());

        ev.tick(&store, &mut hw, &mut sink, 0);

        assert_eq!(sink.0[0].hotspot_count, 192);
        assert_eq!(sink.0[0].hotspots.len(), MAX_REPORTED_HOTSPOTS);
    }

    #[test]
    fn empty_store_is_a_routine_check() {
        let store = SharedFrameStore::new(32, 24);
        let mut ev = AlertEvaluator::new(&SystemConfig::default());
        let (mut hw, mut sink) = (Hw::default(), Sink::default());

        ev.tick(&store, &mut hw, &mut sink, 0);

        assert_eq!(sink.0.len(), 1);
        assert_eq!(sink.0[0].frame_sequence, 0);
    }

    #[test]
    fn tick_while_checking_is_ignored() {
        let store = store_with(vec![45.0; 192]);
        let mut ev = AlertEvaluator::new(&SystemConfig::default());
        let status = ev.status();
        assert!(status.try_begin());
        assert_eq!(status.display_text(), "Checking Temperature...");

        let (mut hw, mut sink) = (Hw::default(), Sink::default());
        let out = ev.tick(&store, &mut hw, &mut sink, 0);

        assert!(out.skipped);
        assert!(sink.0.is_empty());
        assert!(hw.sounded.is_empty());
    }

    #[test]
    fn idle_status_shows_countdown() {
        let ev = AlertEvaluator::new(&SystemConfig::default());
        let status = ev.status();
        status.set_next_check_in(12);
        assert_eq!(status.display_text(), "Checking in 12 seconds");
    }
}
