//! Sensor thread body: acquire, reconstruct, publish.
//!
//! Each cycle pulls one [`RawFrame`] from the [`FramePort`], repairs it
//! with the [`FrameReconstructor`] and publishes the result.  Short or
//! degenerate frames are dropped and the store keeps its last good frame.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::error::SensorError;
use crate::frame::reconstruct::{FrameReconstructor, ReconstructError};
use crate::frame::store::SharedFrameStore;

use super::ports::FramePort;
use super::runtime::Shutdown;

/// Pause after a transport error before the next attempt.
pub const TRANSPORT_ERROR_BACKOFF: Duration = Duration::from_millis(500);

/// What one cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Frame published with this sequence number.
    Published(u64),
    /// Frame dropped; the store is unchanged.
    Discarded(ReconstructError),
    /// The transport failed this time.
    TransportError(SensorError),
    /// The transport is closed for good.
    EndOfStream,
}

/// Running counters for the acquisition loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcquisitionStats {
    pub published: u64,
    pub short_frames: u64,
    pub degenerate_frames: u64,
    pub transport_errors: u64,
}

pub struct AcquisitionTask<S> {
    source: S,
    reconstructor: FrameReconstructor,
    store: Arc<SharedFrameStore>,
    stats: AcquisitionStats,
    backoff: Duration,
}

impl<S: FramePort> AcquisitionTask<S> {
    pub fn new(source: S, reconstructor: FrameReconstructor, store: Arc<SharedFrameStore>) -> Self {
        Self {
            source,
            reconstructor,
            store,
            stats: AcquisitionStats::default(),
            backoff: TRANSPORT_ERROR_BACKOFF,
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn stats(&self) -> AcquisitionStats {
        self.stats
    }

    pub fn run_cycle(&mut self) -> CycleOutcome {
        let raw = match self.source.acquire() {
            Ok(raw) => raw,
            Err(SensorError::EndOfStream) => return CycleOutcome::EndOfStream,
            Err(e) => {
                self.stats.transport_errors += 1;
                return CycleOutcome::TransportError(e);
            }
        };

        match self.reconstructor.reconstruct(&raw) {
            Ok((frame, stats)) => {
                self.store.publish(frame, stats);
                self.stats.published += 1;
                CycleOutcome::Published(self.stats.published)
            }
            Err(e) => {
                match e {
                    ReconstructError::ShortFrame { .. } => self.stats.short_frames += 1,
                    ReconstructError::DegenerateFrame => self.stats.degenerate_frames += 1,
                }
                CycleOutcome::Discarded(e)
            }
        }
    }

    /// Loop until the stream ends or `shutdown` fires.
    pub fn run(mut self, shutdown: &Shutdown) -> AcquisitionStats {
        info!(
            "acquisition: started, {} cells per frame, {:?} neighbor rule",
            self.reconstructor.cell_count(),
            self.reconstructor.rule()
        );
        while !shutdown.is_triggered() {
            match self.run_cycle() {
                CycleOutcome::Published(seq) => debug!("acquisition: frame #{} published", seq),
                CycleOutcome::Discarded(e) => debug!("acquisition: frame dropped: {}", e),
                CycleOutcome::TransportError(e) => {
                    warn!("acquisition: {}, retrying", e);
                    if shutdown.sleep(self.backoff) {
                        break;
                    }
                }
                CycleOutcome::EndOfStream => {
                    warn!("acquisition: sensor stream closed");
                    break;
                }
            }
        }
        let s = self.stats;
        info!(
            "acquisition: stopped ({} published, {} short, {} degenerate, {} transport errors)",
            s.published, s.short_frames, s.degenerate_frames, s.transport_errors
        );
        s
    }
}
