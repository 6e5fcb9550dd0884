//! Serial CSV stream → reconstruction → store → evaluator, single-threaded.

use std::io::Cursor;
use std::sync::Arc;

use thermoguard::app::acquisition::{AcquisitionTask, CycleOutcome};
use thermoguard::app::evaluator::AlertEvaluator;
use thermoguard::app::events::AlertKind;
use thermoguard::config::SystemConfig;
use thermoguard::frame::reconstruct::{FrameReconstructor, NeighborRule, ReconstructError};
use thermoguard::frame::store::SharedFrameStore;
use thermoguard::sensors::FrameSource;
use thermoguard::sensors::simulated::SimulatedArray;

use crate::mock_hw::{MockHardware, RecordingSink, uniform};

const W: u16 = 32;
const H: u16 = 6;
const N: usize = (W as usize) * (H as usize);

/// One CSV line the way the array bridge prints it.
fn csv_line(cells: &[f32]) -> String {
    let mut s: String = cells
        .iter()
        .map(|c| if c.is_nan() { "nan,".to_string() } else { format!("{c},") })
        .collect();
    s.push_str("\r\n");
    s
}

fn serial_task(text: String) -> (AcquisitionTask<FrameSource>, Arc<SharedFrameStore>) {
    let store = Arc::new(SharedFrameStore::new(W, H));
    let source = FrameSource::serial(Box::new(Cursor::new(text.into_bytes())));
    let task = AcquisitionTask::new(
        source,
        FrameReconstructor::new(W, H, NeighborRule::Reference),
        Arc::clone(&store),
    );
    (task, store)
}

#[test]
fn dead_cell_is_filled_from_neighbors() {
    let mut cells = uniform(N, 30.0);
    // row 1, col 1: above = 1, below = 65, left = 32, right = 34
    cells[1] = 31.0;
    cells[65] = 33.0;
    cells[32] = 35.0;
    cells[34] = 37.0;
    cells[33] = f32::NAN;
    let (mut task, store) = serial_task(csv_line(&cells));

    assert_eq!(task.run_cycle(), CycleOutcome::Published(1));

    let snap = store.snapshot();
    assert_eq!(snap.frame.get(1, 1), Some(34.0));
    assert_eq!(snap.stats.max, 37.0);
    assert_eq!(snap.stats.min, 30.0);
    assert!(snap.frame.cells().iter().all(|c| c.is_finite()));
}

#[test]
fn short_and_garbled_lines_keep_the_last_good_frame() {
    let good = csv_line(&uniform(N, 31.0));
    let short = csv_line(&uniform(N - 1, 45.0));
    let garbled = "\u{fffd}\u{fffd}\r\n".to_string();
    let (mut task, store) = serial_task(format!("{good}{short}{garbled}"));

    assert_eq!(task.run_cycle(), CycleOutcome::Published(1));
    assert_eq!(
        task.run_cycle(),
        CycleOutcome::Discarded(ReconstructError::ShortFrame {
            received: N - 1,
            expected: N
        })
    );
    assert!(matches!(
        task.run_cycle(),
        CycleOutcome::Discarded(ReconstructError::ShortFrame { .. })
    ));
    assert_eq!(task.run_cycle(), CycleOutcome::EndOfStream);

    let snap = store.snapshot();
    assert_eq!(snap.sequence, 1);
    assert_eq!(snap.stats.max, 31.0);
}

#[test]
fn extra_readings_are_ignored() {
    let mut cells = uniform(N, 30.0);
    cells.extend([99.0, 99.0, 99.0]);
    let (mut task, store) = serial_task(csv_line(&cells));

    task.run_cycle();

    assert_eq!(store.snapshot().stats.max, 30.0);
}

#[test]
fn streamed_fever_reaches_the_actuators() {
    let mut cells = uniform(N, 36.5);
    cells[40] = 41.0;
    let (mut task, store) = serial_task(csv_line(&cells));
    task.run_cycle();

    let mut ev = AlertEvaluator::new(&SystemConfig::default());
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    ev.tick(&store, &mut hw, &mut sink, 0);

    assert_eq!(sink.events()[0].kind, AlertKind::Fever);
    assert_eq!(sink.events()[0].hotspots[0].index, 40);
    assert_eq!(hw.sounds().len(), 1);
}

#[test]
fn simulated_bus_array_feeds_the_same_pipeline() {
    let array = SimulatedArray::new(W, H, 24.0);
    let handle = array.handle();
    handle.set_hotspot(17, 42.0);
    handle.set_dead_pixel(18);
    let store = Arc::new(SharedFrameStore::new(W, H));
    let mut task = AcquisitionTask::new(
        FrameSource::bus(Box::new(array), 64),
        FrameReconstructor::new(W, H, NeighborRule::Reference),
        Arc::clone(&store),
    );

    assert_eq!(task.run_cycle(), CycleOutcome::Published(1));

    let snap = store.snapshot();
    assert_eq!(snap.stats.max, 42.0);
    assert!(snap.frame.cells()[18].is_finite());
}

#[test]
fn default_grid_accepts_a_bridge_line() {
    let config = SystemConfig::default();
    let n = config.cell_count();
    let mut cells = uniform(n, 29.0);
    cells[100] = f32::NAN;
    let store = Arc::new(SharedFrameStore::new(config.grid_width, config.grid_height));
    let source = FrameSource::serial(Box::new(Cursor::new(csv_line(&cells).into_bytes())));
    let mut task = AcquisitionTask::new(
        source,
        FrameReconstructor::new(config.grid_width, config.grid_height, config.neighbor_rule),
        Arc::clone(&store),
    );

    assert_eq!(task.run_cycle(), CycleOutcome::Published(1));
    assert_eq!(store.snapshot().frame.cells()[100], 29.0);
}
