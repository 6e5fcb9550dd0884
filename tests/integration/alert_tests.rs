//! AlertEvaluator + AlertTask against mock actuators.

use std::sync::Arc;
use std::time::Duration;

use thermoguard::app::evaluator::{AlertEvaluator, EvaluatorState};
use thermoguard::app::events::{AlertKind, LogRecord, LogTable};
use thermoguard::app::ports::BinCommand;
use thermoguard::app::runtime::{AlertTask, Shutdown};
use thermoguard::config::SystemConfig;
use thermoguard::frame::store::SharedFrameStore;
use thermoguard::frame::{Frame, FrameStats};
use thermoguard::scheduler::CheckSchedule;

use crate::mock_hw::{ActuatorCall, MockHardware, RecordingSink, uniform, wait_for};

const W: u16 = 32;
const H: u16 = 6;

fn store_with(cells: Vec<f32>) -> Arc<SharedFrameStore> {
    let store = Arc::new(SharedFrameStore::new(W, H));
    let frame = Frame::from_cells(W, H, cells).expect("valid frame");
    let stats = FrameStats::of(&frame);
    store.publish(frame, stats);
    store
}

#[test]
fn three_hot_cells_trigger_one_fever_cycle() {
    let mut cells = uniform(192, 36.4);
    cells[10] = 41.2;
    cells[75] = 40.9;
    cells[150] = 42.0;
    let store = store_with(cells);
    let mut ev = AlertEvaluator::new(&SystemConfig::default());
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();

    let out = ev.tick(&store, &mut hw, &mut sink, 42);

    assert_eq!(out.hotspot_count, 3);
    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].kind, AlertKind::Fever);
    assert_eq!(events[1].kind, AlertKind::RoutineCheck);
    assert_eq!(events[0].stats.max, 42.0);
    let positions: Vec<_> = events[0].hotspots.iter().map(|h| (h.row, h.col)).collect();
    assert_eq!(positions, vec![(0, 10), (2, 11), (4, 22)]);

    assert_eq!(
        hw.calls(),
        vec![
            ActuatorCall::Send(BinCommand::Notify),
            ActuatorCall::Sound(Duration::from_millis(2500)),
        ]
    );
}

#[test]
fn cool_frame_only_logs_monitor_record() {
    let store = store_with(uniform(192, 36.9));
    let mut ev = AlertEvaluator::new(&SystemConfig::default());
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();

    ev.tick(&store, &mut hw, &mut sink, 0);

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(LogRecord::from(&events[0]).table, LogTable::MonitorLog);
    assert!(hw.calls().is_empty());
}

#[test]
fn threshold_is_strict() {
    let mut cells = uniform(192, 36.0);
    cells[0] = 40.6;
    let store = store_with(cells);
    let mut ev = AlertEvaluator::new(&SystemConfig::default());
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();

    let out = ev.tick(&store, &mut hw, &mut sink, 0);

    assert_eq!(out.hotspot_count, 0);
    assert!(hw.sent().is_empty());
}

#[test]
fn failed_notification_still_buzzes_and_logs() {
    let mut cells = uniform(192, 36.0);
    cells[5] = 41.0;
    let store = store_with(cells);
    let mut ev = AlertEvaluator::new(&SystemConfig::default());
    let mut hw = MockHardware::with_failing_link();
    let mut sink = RecordingSink::new();

    let out = ev.tick(&store, &mut hw, &mut sink, 0);

    assert!(!out.notified);
    assert_eq!(hw.sounds().len(), 1);
    assert_eq!(sink.len(), 2);
    assert_eq!(ev.status().state(), EvaluatorState::Idle);
}

#[test]
fn alert_task_announces_then_checks_on_schedule() {
    let mut cells = uniform(192, 36.0);
    cells[100] = 41.5;
    let store = store_with(cells);
    let config = SystemConfig {
        check_interval_seconds: 2,
        ..SystemConfig::default()
    };
    let hw = MockHardware::new();
    let sink = RecordingSink::new();
    let task = AlertTask::new(
        AlertEvaluator::new(&config),
        CheckSchedule::new(config.check_interval_seconds),
        store,
        hw.clone(),
        sink.clone(),
    )
    .with_startup_buzz(Duration::from_secs(2))
    .with_tick_period(Duration::from_millis(5))
    .with_clock(|| 1_700_000_000_000);

    let shutdown = Shutdown::new();
    let sd = shutdown.clone();
    let handle = std::thread::spawn(move || task.run(&sd).0);

    assert!(wait_for(Duration::from_secs(5), || sink.len() >= 4));
    shutdown.trigger();
    let report = handle.join().unwrap();

    assert!(report.checks >= 2);
    assert_eq!(report.checks, report.fevers);
    let calls = hw.calls();
    assert_eq!(calls[0], ActuatorCall::Send(BinCommand::Start));
    assert_eq!(calls[1], ActuatorCall::Sound(Duration::from_secs(2)));
    assert_eq!(calls[2], ActuatorCall::Send(BinCommand::Notify));
    assert!(
        sink.events()
            .iter()
            .all(|e| e.timestamp_ms == 1_700_000_000_000)
    );
}
