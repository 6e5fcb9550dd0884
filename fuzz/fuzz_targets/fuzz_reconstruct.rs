//! Fuzz target: `FrameReconstructor::reconstruct`
//!
//! The first two bytes pick the grid shape, the rest become little-endian
//! f32 readings (NaN and infinities included).  A frame that comes out
//! must be dense and finite with stats bracketing every cell.
//!
//! cargo fuzz run fuzz_reconstruct

#![no_main]

use libfuzzer_sys::fuzz_target;
use thermoguard::frame::RawFrame;
use thermoguard::frame::reconstruct::{FrameReconstructor, NeighborRule};

fuzz_target!(|data: &[u8]| {
    let [w, h, rest @ ..] = data else { return };
    let (w, h) = (u16::from(*w % 33).max(1), u16::from(*h % 25).max(1));
    let rule = if w % 2 == 0 { NeighborRule::Reference } else { NeighborRule::Symmetric };

    let cells: Vec<f32> = rest
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    if let Ok((frame, stats)) = FrameReconstructor::new(w, h, rule).reconstruct(&RawFrame::new(cells)) {
        assert_eq!(frame.cells().len(), usize::from(w) * usize::from(h));
        for &c in frame.cells() {
            assert!(c.is_finite());
            assert!(c >= stats.min && c <= stats.max);
        }
    }
});
