//! Latest-frame store shared between the acquisition task and every reader.
//!
//! The current `(Frame, FrameStats)` pair lives in one immutable
//! [`FrameSnapshot`] behind an `Arc`.  `publish` swaps in a new `Arc`;
//! `snapshot` clones the current one.  Either side holds the lock only
//! for a pointer copy, so readers can never stall the writer for longer
//! than that and can never observe a frame paired with another frame's
//! stats.

use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use super::{Frame, FrameStats};

/// One published frame with its stats and freshness marker.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    pub frame: Frame,
    pub stats: FrameStats,
    /// Number of publishes so far; 0 for the initial empty frame.
    pub sequence: u64,
    /// When this frame was published; `None` before the first publish.
    pub published_at: Option<Instant>,
}

impl FrameSnapshot {
    /// Time since publish, `None` for the initial empty frame.
    pub fn age(&self) -> Option<Duration> {
        self.published_at.map(|t| t.elapsed())
    }

    /// `true` if nothing was published yet or the frame is older than `max_age`.
    pub fn is_stale(&self, max_age: Duration) -> bool {
        self.age().is_none_or(|age| age > max_age)
    }
}

/// Single-writer, many-reader slot for the latest frame.
#[derive(Debug)]
pub struct SharedFrameStore {
    slot: RwLock<Arc<FrameSnapshot>>,
}

impl SharedFrameStore {
    /// Store holding an all-zero `width × height` frame.
    pub fn new(width: u16, height: u16) -> Self {
        let initial = FrameSnapshot {
            frame: Frame::zeroed(width, height),
            stats: FrameStats::default(),
            sequence: 0,
            published_at: None,
        };
        Self {
            slot: RwLock::new(Arc::new(initial)),
        }
    }

    /// Replace the current frame.  Called only by the acquisition task.
    pub fn publish(&self, frame: Frame, stats: FrameStats) {
        // The snapshot is built outside the lock; only the swap is guarded.
        let sequence = self.snapshot().sequence + 1;
        let next = Arc::new(FrameSnapshot {
            frame,
            stats,
            sequence,
            published_at: Some(Instant::now()),
        });
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *slot = next;
    }

    /// The last published frame (or the initial empty frame).
    pub fn snapshot(&self) -> Arc<FrameSnapshot> {
        let slot = self.slot.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&slot)
    }
}
