//! Sync worker against a flaky uploader.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use thermoguard::adapters::sync::{JsonLinesUploader, RetryPolicy, SyncEventSink};
use thermoguard::app::events::{AlertEvent, AlertKind, LogRecord, LogTable};
use thermoguard::app::ports::{EventSink, UploadPort};
use thermoguard::app::runtime::Shutdown;
use thermoguard::error::SyncError;
use thermoguard::frame::FrameStats;

fn event(kind: AlertKind, ts: u64) -> AlertEvent {
    AlertEvent {
        kind,
        stats: FrameStats {
            min: 24.0,
            max: 41.0,
            mean: 29.5,
        },
        hotspot_count: u16::from(kind == AlertKind::Fever),
        hotspots: heapless::Vec::new(),
        frame_sequence: ts,
        timestamp_ms: ts,
    }
}

/// Fails the first `outages` calls with `Connectivity`, records the rest.
#[derive(Clone, Default)]
struct FlakyRemote {
    inner: Arc<Mutex<(u32, Vec<LogRecord>)>>,
}

impl FlakyRemote {
    fn with_outages(n: u32) -> Self {
        Self {
            inner: Arc::new(Mutex::new((n, Vec::new()))),
        }
    }

    fn stored(&self) -> Vec<LogRecord> {
        self.inner.lock().unwrap().1.clone()
    }
}

impl UploadPort for FlakyRemote {
    fn upload(&mut self, record: &LogRecord) -> Result<(), SyncError> {
        let mut g = self.inner.lock().unwrap();
        if g.0 > 0 {
            g.0 -= 1;
            return Err(SyncError::Connectivity);
        }
        g.1.push(record.clone());
        Ok(())
    }
}

fn policy(attempts: u32) -> RetryPolicy {
    RetryPolicy {
        attempts,
        delay: Duration::from_millis(1),
    }
}

#[test]
fn records_survive_a_short_outage_in_order() {
    let remote = FlakyRemote::with_outages(2);
    let (mut sink, handle) =
        SyncEventSink::spawn(remote.clone(), policy(3), Shutdown::new()).expect("worker spawns");

    sink.emit(&event(AlertKind::Fever, 1));
    sink.emit(&event(AlertKind::RoutineCheck, 2));
    drop(sink);
    let report = handle.join().unwrap();

    assert_eq!(report.uploaded, 2);
    assert_eq!(report.failed, 0);
    let stored = remote.stored();
    assert_eq!(stored[0].table, LogTable::FeverLog);
    assert_eq!(stored[1].table, LogTable::MonitorLog);
    assert_eq!(stored[1].logged_at_ms, 2);
}

#[test]
fn long_outage_drops_the_record_and_moves_on() {
    let remote = FlakyRemote::with_outages(3);
    let (mut sink, handle) =
        SyncEventSink::spawn(remote.clone(), policy(3), Shutdown::new()).expect("worker spawns");

    sink.emit(&event(AlertKind::Fever, 10));
    sink.emit(&event(AlertKind::RoutineCheck, 11));
    drop(sink);
    let report = handle.join().unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(report.uploaded, 1);
    assert_eq!(remote.stored()[0].logged_at_ms, 11);
}

#[test]
fn json_lines_file_gets_one_row_per_event() {
    let mut uploader = JsonLinesUploader::new(Vec::new());
    uploader
        .upload(&LogRecord::from(&event(AlertKind::Fever, 5)))
        .unwrap();
    uploader
        .upload(&LogRecord::from(&event(AlertKind::RoutineCheck, 6)))
        .unwrap();

    let text = String::from_utf8(uploader.into_inner()).unwrap();
    let rows: Vec<serde_json::Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["table"], "fever_log");
    assert_eq!(rows[0]["hotspot_count"], 1);
    assert_eq!(rows[1]["table"], "monitor_log");
    assert_eq!(rows[1]["max_temperature"], 41.0);
}
