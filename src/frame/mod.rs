//! Thermal frame data model.
//!
//! ```text
//!  RawFrame ──▶ reconstruct() ──▶ (Frame, FrameStats) ──▶ SharedFrameStore
//!  (f32, NaN = invalid)            (dense, finite)          (latest only)
//! ```
//!
//! Cells are stored row-major; cell `i` sits at row `i / width`,
//! column `i % width`.

pub mod reconstruct;
pub mod store;

use serde::Serialize;

// ───────────────────────────────────────────────────────────────
// RawFrame
// ───────────────────────────────────────────────────────────────

/// One acquisition cycle's readings as received from the transport.
///
/// Invalid cells (the `nan` token, unparseable text, a pixel the driver
/// flagged) are carried as NaN.  May hold fewer cells than a full frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFrame {
    cells: Vec<f32>,
}

impl RawFrame {
    pub fn new(cells: Vec<f32>) -> Self {
        Self { cells }
    }

    /// Build from text tokens.  Surrounding whitespace is ignored.
    pub fn from_tokens<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Self {
        let cells = tokens.into_iter().map(parse_cell).collect();
        Self { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[f32] {
        &self.cells
    }
}

/// `"25.5"` → 25.5, `"nan"` / `"abc"` / `"inf"` → NaN.
fn parse_cell(token: &str) -> f32 {
    match token.trim().parse::<f32>() {
        Ok(v) if v.is_finite() => v,
        _ => f32::NAN,
    }
}

// ───────────────────────────────────────────────────────────────
// Frame
// ───────────────────────────────────────────────────────────────

/// A fully populated `width × height` temperature grid (Celsius).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    width: u16,
    height: u16,
    cells: Vec<f32>,
}

impl Frame {
    /// All-zero frame, served before the first acquisition completes.
    pub fn zeroed(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![0.0; width as usize * height as usize],
        }
    }

    /// Wrap already-reconstructed cells.  Returns `None` if the length
    /// does not match the dimensions or any cell is non-finite.
    pub fn from_cells(width: u16, height: u16, cells: Vec<f32>) -> Option<Self> {
        if cells.len() != width as usize * height as usize {
            return None;
        }
        if cells.iter().any(|c| !c.is_finite()) {
            return None;
        }
        Some(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn cells(&self) -> &[f32] {
        &self.cells
    }

    pub fn get(&self, row: u16, col: u16) -> Option<f32> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.cells
            .get(row as usize * self.width as usize + col as usize)
            .copied()
    }

    /// Cells strictly above `threshold`, in row-major order.
    pub fn hotspots(&self, threshold: f32) -> impl Iterator<Item = Hotspot> + '_ {
        let width = self.width as usize;
        self.cells
            .iter()
            .enumerate()
            .filter(move |(_, c)| **c > threshold)
            .map(move |(i, c)| Hotspot {
                index: i as u16,
                row: (i / width) as u16,
                col: (i % width) as u16,
                celsius: *c,
            })
    }
}

/// A cell above the fever threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hotspot {
    pub index: u16,
    pub row: u16,
    pub col: u16,
    pub celsius: f32,
}

// ───────────────────────────────────────────────────────────────
// FrameStats
// ───────────────────────────────────────────────────────────────

/// Extremes and mean of one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FrameStats {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
}

impl FrameStats {
    /// Compute directly from a frame (no sentinels).
    pub fn of(frame: &Frame) -> Self {
        let cells = frame.cells();
        if cells.is_empty() {
            return Self::default();
        }
        let (min, max, sum) = cells.iter().fold(
            (f32::INFINITY, f32::NEG_INFINITY, 0.0f64),
            |(lo, hi, sum), &c| (lo.min(c), hi.max(c), sum + c as f64),
        );
        Self {
            min,
            max,
            mean: (sum / cells.len() as f64) as f32,
        }
    }
}
