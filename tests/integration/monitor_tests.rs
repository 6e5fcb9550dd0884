//! Full monitor: both threads running against mock adapters.

use std::io::Cursor;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use thermoguard::app::events::{AlertEvent, AlertKind};
use thermoguard::app::ports::{BinCommand, EventSink};
use thermoguard::app::runtime::Shutdown;
use thermoguard::config::SystemConfig;
use thermoguard::frame::RawFrame;
use thermoguard::monitor::{Monitor, Timing};
use thermoguard::sensors::FrameSource;

use crate::mock_hw::{LoopingSource, MockHardware, RecordingSink, uniform, wait_for};

const W: u16 = 32;
const H: u16 = 6;
const N: usize = (W as usize) * (H as usize);

fn fast() -> Timing {
    Timing {
        tick_period: Duration::from_millis(10),
    }
}

fn config() -> SystemConfig {
    SystemConfig {
        grid_width: W,
        grid_height: H,
        check_interval_seconds: 1,
        startup_buzz_seconds: 0.5,
        buzzer_duration_seconds: 0.25,
        ..SystemConfig::default()
    }
}

#[test]
fn fever_frame_notifies_and_buzzes() {
    let mut cells = uniform(N, 36.0);
    cells[64] = 41.8;
    let source = LoopingSource::new(vec![RawFrame::new(cells)], Duration::from_millis(2));
    let hw = MockHardware::new();
    let sink = RecordingSink::new();

    let monitor = Monitor::start(
        &config(),
        (W, H),
        source,
        hw.clone(),
        sink.clone(),
        Shutdown::new(),
        fast(),
    )
    .expect("monitor starts");

    let store = monitor.store();
    assert!(wait_for(Duration::from_secs(5), || {
        sink.events().iter().any(|e| e.kind == AlertKind::Fever)
    }));
    assert!(store.snapshot().sequence >= 1);

    monitor.shutdown().trigger();
    let report = monitor.join();

    assert!(report.acquisition.published >= 1);
    assert!(report.alerts.fevers >= 1);
    let sent = hw.sent();
    assert_eq!(sent[0], BinCommand::Start);
    assert!(sent.contains(&BinCommand::Notify));
    assert_eq!(hw.sounds()[0], Duration::from_millis(500));
}

#[test]
fn notifications_can_be_disabled() {
    let mut cells = uniform(N, 36.0);
    cells[3] = 42.0;
    let source = LoopingSource::new(vec![RawFrame::new(cells)], Duration::from_millis(2));
    let hw = MockHardware::new();
    let sink = RecordingSink::new();
    let config = SystemConfig {
        notification_enabled: false,
        ..config()
    };

    let monitor = Monitor::start(
        &config,
        (W, H),
        source,
        hw.clone(),
        sink.clone(),
        Shutdown::new(),
        fast(),
    )
    .expect("monitor starts");
    assert!(wait_for(Duration::from_secs(5), || {
        sink.events().iter().any(|e| e.kind == AlertKind::Fever)
    }));
    monitor.shutdown().trigger();
    monitor.join();

    assert!(!hw.sent().contains(&BinCommand::Notify));
    // startup buzz plus at least one alarm
    assert!(hw.sounds().len() >= 2);
}

#[test]
fn closed_stream_stops_the_monitor() {
    let line: String = uniform(N, 30.0).iter().map(|c| format!("{c},")).collect();
    let source = FrameSource::serial(Box::new(Cursor::new(format!("{line}\r\n").into_bytes())));
    let sink = RecordingSink::new();

    let monitor = Monitor::start(
        &config(),
        (W, H),
        source,
        MockHardware::new(),
        sink,
        Shutdown::new(),
        fast(),
    )
    .expect("monitor starts");

    let shutdown = monitor.shutdown();
    assert!(wait_for(Duration::from_secs(5), || shutdown.is_triggered()));
    let report = monitor.join();
    assert_eq!(report.acquisition.published, 1);
}

#[test]
fn status_reports_countdown_between_checks() {
    let source = LoopingSource::new(
        vec![RawFrame::new(uniform(N, 30.0))],
        Duration::from_millis(2),
    );
    let config = SystemConfig {
        check_interval_seconds: 600,
        ..config()
    };
    let monitor = Monitor::start(
        &config,
        (W, H),
        source,
        MockHardware::new(),
        RecordingSink::new(),
        Shutdown::new(),
        fast(),
    )
    .expect("monitor starts");

    let status = monitor.status();
    assert!(wait_for(Duration::from_secs(5), || status.next_check_in() > 0));
    assert!(status.display_text().starts_with("Checking in "));

    monitor.shutdown().trigger();
    let report = monitor.join();
    assert_eq!(report.alerts.checks, 0);
}

/// Panics on the first event, taking the alert thread down with it.
struct PanickingSink;

impl EventSink for PanickingSink {
    fn emit(&mut self, _event: &AlertEvent) {
        panic!("sink failed");
    }
}

#[test]
fn alert_task_panic_stops_acquisition() {
    let source = LoopingSource::new(
        vec![RawFrame::new(uniform(N, 30.0))],
        Duration::from_millis(2),
    );
    let monitor = Monitor::start(
        &config(),
        (W, H),
        source,
        MockHardware::new(),
        PanickingSink,
        Shutdown::new(),
        fast(),
    )
    .expect("monitor starts");
    let shutdown = monitor.shutdown();

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(monitor.join());
    });
    let report = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("join returns after the alert task panics");

    assert!(shutdown.is_triggered());
    assert_eq!(report.alerts.checks, 0);
    assert!(report.acquisition.published >= 1);
}
