//! Simulated IR array for host builds and tests.
//!
//! Produces a room-temperature background with a mild vertical gradient,
//! a face-sized warm blob, a little deterministic noise, and whatever
//! hotspots or dead pixels have been injected through a [`SimHandle`].

use std::sync::{Arc, Mutex};

use super::ThermalArray;
use crate::error::SensorError;

/// Scene parameters shared between the array and its handle.
#[derive(Debug, Clone, Default)]
struct Scene {
    /// `(index, celsius)` overrides.
    hotspots: Vec<(usize, f32)>,
    /// Pixels that read as NaN.
    dead: Vec<usize>,
    /// Forces a bus failure on the next read.
    fail_next: bool,
}

/// Injection handle, cloneable across threads.
#[derive(Debug, Clone, Default)]
pub struct SimHandle {
    scene: Arc<Mutex<Scene>>,
}

impl SimHandle {
    pub fn set_hotspot(&self, index: usize, celsius: f32) {
        let mut s = self.lock();
        s.hotspots.retain(|(i, _)| *i != index);
        s.hotspots.push((index, celsius));
    }

    pub fn clear_hotspots(&self) {
        self.lock().hotspots.clear();
    }

    pub fn set_dead_pixel(&self, index: usize) {
        let mut s = self.lock();
        if !s.dead.contains(&index) {
            s.dead.push(index);
        }
    }

    pub fn fail_next_read(&self) {
        self.lock().fail_next = true;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Scene> {
        self.scene.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Synthetic `width × height` array.
pub struct SimulatedArray {
    width: usize,
    height: usize,
    ambient_c: f32,
    handle: SimHandle,
    rng: u32,
}

impl SimulatedArray {
    pub fn new(width: u16, height: u16, ambient_c: f32) -> Self {
        Self {
            width: width as usize,
            height: height as usize,
            ambient_c,
            handle: SimHandle::default(),
            rng: 0x1234_5678,
        }
    }

    pub fn handle(&self) -> SimHandle {
        self.handle.clone()
    }

    /// xorshift32 noise in [-0.1, 0.1).
    fn noise(&mut self) -> f32 {
        let mut x = self.rng;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.rng = x;
        (x % 2000) as f32 / 10_000.0 - 0.1
    }

    fn background(&mut self, row: usize, col: usize) -> f32 {
        let gradient = row as f32 / self.height.max(1) as f32;
        let (cr, cc) = (self.height as f32 / 2.0, self.width as f32 / 2.0);
        let (dr, dc) = (row as f32 - cr, (col as f32 - cc) / 1.5);
        let face = if dr * dr + dc * dc <= (self.height as f32 / 4.0).powi(2) {
            10.5
        } else {
            0.0
        };
        self.ambient_c + gradient + face + self.noise()
    }
}

impl ThermalArray for SimulatedArray {
    fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    fn read_frame(&mut self, out: &mut [f32]) -> Result<(), SensorError> {
        let scene = {
            let mut s = self.handle.lock();
            if s.fail_next {
                s.fail_next = false;
                return Err(SensorError::Transport);
            }
            s.clone()
        };

        for (i, cell) in out.iter_mut().enumerate() {
            *cell = self.background(i / self.width, i % self.width);
        }
        for &(i, t) in &scene.hotspots {
            if let Some(cell) = out.get_mut(i) {
                *cell = t;
            }
        }
        for &i in &scene.dead {
            if let Some(cell) = out.get_mut(i) {
                *cell = f32::NAN;
            }
        }
        Ok(())
    }
}
