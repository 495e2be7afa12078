use crate::marker::Marker;
use anyhow::Result;
use driftboard_common::config::{Bounds, MotionConfig};
use rand::rngs::StdRng;

/// A fixed-size row-major grid of bouncing markers.
///
/// Dimensions are fixed at construction; markers are never added or removed
/// individually. Each marker evolves independently against the shared bounds.
#[derive(Debug, Clone)]
pub struct Board {
    rows: u32,
    cols: u32,
    markers: Vec<Marker>,
}

impl Board {
    /// Creates a board of exactly `rows * cols` markers, spawned row-major
    /// from the given RNG.
    pub fn new(rows: u32, cols: u32, motion: &MotionConfig, rng: &mut StdRng) -> Result<Self> {
        if rows == 0 || cols == 0 {
            anyhow::bail!("Board dimensions must be non-zero (got {}x{}).", rows, cols);
        }
        let mut markers = Vec::with_capacity((rows * cols) as usize);
        for _row in 0..rows {
            for _col in 0..cols {
                markers.push(Marker::spawn(motion, rng)?);
            }
        }
        Ok(Self { rows, cols, markers })
    }

    /// Advances every marker by the same elapsed time against the shared bounds.
    pub fn advance_all(&mut self, elapsed_seconds: f32, bounds: &Bounds) {
        for marker in &mut self.markers {
            marker.advance(elapsed_seconds, bounds);
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.rows, self.cols)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Row-major cell access; `None` when the cell is out of range.
    pub fn get(&self, row: u32, col: u32) -> Option<&Marker> {
        if row < self.rows && col < self.cols {
            self.markers.get((row * self.cols + col) as usize)
        } else {
            None
        }
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Current positions of all markers, row-major, as (x, y) tuples.
    pub fn positions(&self) -> Vec<(f32, f32)> {
        self.markers.iter().map(|m| (m.pos.x, m.pos.y)).collect()
    }

    /// Mean marker speed (px/s), used in snapshots and progress logs.
    pub fn mean_speed(&self) -> f32 {
        if self.markers.is_empty() {
            return 0.0;
        }
        let total: f32 = self.markers.iter().map(|m| m.speed()).sum();
        total / self.markers.len() as f32
    }
}
