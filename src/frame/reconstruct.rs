//! Frame reconstruction: fill invalid cells from their valid neighbors.
//!
//! Each invalid cell becomes the mean of the *raw* readings of its valid
//! 4-neighbors (above, below, left, right) that lie inside the frame.
//! Left is never taken in column 0 and right never in the last column,
//! so the flattened grid does not wrap between rows.  A cell with no
//! usable neighbor becomes 0.0.
//!
//! ## Neighbor rule
//!
//! The deployed reference devices only take the right neighbor when the
//! cell *below* also exists, so bottom-row cells never look right.
//! [`NeighborRule::Reference`] keeps that condition and
//! [`NeighborRule::Symmetric`] drops it.
//!
//! Neither rule is bit-exact with the devices' firmware.  Two edge cases
//! are corrected under both rules:
//!
//! - The firmware tests the above index with `> 0`, so the first cell of
//!   the second row never borrows from cell 0.  Here any in-frame cell
//!   above counts.
//! - The firmware swaps the column guards.  It skips left in the last
//!   column and right in column 0, so edge cells read across row
//!   boundaries.  Here left is skipped in column 0 and right in the last
//!   column.
//!
//! Frames with dead cells on those edges therefore reconstruct
//! differently from the devices.
//!
//! ## Output gating
//!
//! Min/max are tracked against the sentinels `0.0` (max) and `500.0`
//! (min).  A frame whose max never rose above 0.0 or whose min never fell
//! below 500.0 carries no information and is rejected.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::{Frame, FrameStats, RawFrame};

/// Running-max seed; a frame still at this value is dropped.
pub const NO_MAX_SEEN: f32 = 0.0;
/// Running-min seed; above any plausible reading.
pub const NO_MIN_SEEN: f32 = 500.0;

/// Which neighbors an invalid cell may borrow from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborRule {
    /// Right neighbor additionally requires the below neighbor in range.
    #[default]
    Reference,
    /// Right neighbor only requires not being in the last column.
    Symmetric,
}

/// Why a cycle produced no frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconstructError {
    /// Fewer readings than cells in a frame.
    ShortFrame { received: usize, expected: usize },
    /// Every reconstructed value left a min/max sentinel untouched.
    DegenerateFrame,
}

impl fmt::Display for ReconstructError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShortFrame { received, expected } => {
                write!(f, "short frame ({}/{} cells)", received, expected)
            }
            Self::DegenerateFrame => write!(f, "degenerate frame (no informative min/max)"),
        }
    }
}

/// Turns raw readings into a dense [`Frame`] plus its [`FrameStats`].
#[derive(Debug, Clone, Copy)]
pub struct FrameReconstructor {
    width: u16,
    height: u16,
    rule: NeighborRule,
}

impl FrameReconstructor {
    pub fn new(width: u16, height: u16, rule: NeighborRule) -> Self {
        Self {
            width,
            height,
            rule,
        }
    }

    /// Number of readings a cycle must deliver.
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn rule(&self) -> NeighborRule {
        self.rule
    }

    /// Reconstruct one cycle.  Readings beyond the frame size are ignored.
    pub fn reconstruct(&self, raw: &RawFrame) -> Result<(Frame, FrameStats), ReconstructError> {
        let n = self.cell_count();
        if raw.len() < n {
            return Err(ReconstructError::ShortFrame {
                received: raw.len(),
                expected: n,
            });
        }

        let readings = &raw.cells()[..n];
        let mut cells = Vec::with_capacity(n);
        let mut max = NO_MAX_SEEN;
        let mut min = NO_MIN_SEEN;
        let mut sum = 0.0f64;

        for (i, &reading) in readings.iter().enumerate() {
            let value = if reading.is_finite() {
                reading
            } else {
                self.interpolate(readings, i)
            };
            max = max.max(value);
            min = min.min(value);
            sum += value as f64;
            cells.push(value);
        }

        if max == NO_MAX_SEEN || min == NO_MIN_SEEN {
            return Err(ReconstructError::DegenerateFrame);
        }

        let stats = FrameStats {
            min,
            max,
            mean: (sum / n as f64) as f32,
        };
        let frame = Frame {
            width: self.width,
            height: self.height,
            cells,
        };
        Ok((frame, stats))
    }

    /// Mean of the valid raw neighbors of cell `i`, or 0.0 if none qualify.
    fn interpolate(&self, readings: &[f32], i: usize) -> f32 {
        let n = readings.len();
        let w = self.width as usize;
        let col = i % w;
        let below = i + w;

        let above = i.checked_sub(w);
        let below = (below < n).then_some(below);
        let left = (col != 0).then(|| i - 1);
        let right_allowed = col != w - 1
            && match self.rule {
                NeighborRule::Reference => below.is_some(),
                NeighborRule::Symmetric => true,
            };
        let right = right_allowed.then_some(i + 1);

        let mut count = 0u32;
        let mut total = 0.0f64;
        for idx in [above, below, left, right].into_iter().flatten() {
            let v = readings[idx];
            if v.is_finite() {
                count += 1;
                total += v as f64;
            }
        }

        if count == 0 {
            0.0
        } else {
            (total / count as f64) as f32
        }
    }
}
