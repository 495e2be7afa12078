use anyhow::Result;
use driftboard_common::config::{Bounds, MinMax, MotionConfig};
use driftboard_common::vecmath::{clamp, Vec2};
use rand::prelude::*;
use rand::distr::Uniform;

/// A single bouncing marker: continuous position and signed per-axis velocity.
///
/// Invariant: after every `advance` against a fixed, non-degenerate `Bounds`,
/// the position lies within `[min, max]` on each axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    /// Position in px.
    pub pos: Vec2,
    /// Velocity in px/s.
    pub vel: Vec2,
}

impl Marker {
    pub fn new(pos: Vec2, vel: Vec2) -> Self {
        Self { pos, vel }
    }

    /// Spawns a marker with randomized position and velocity.
    ///
    /// Sampling truncates to whole pixels in `[min, max)`, so a marker can
    /// spawn exactly at `min` but never exactly at `max`.
    pub fn spawn(motion: &MotionConfig, rng: &mut StdRng) -> Result<Self> {
        let pos = Vec2::new(
            sample_truncated(&motion.bounds.x, rng)?,
            sample_truncated(&motion.bounds.y, rng)?,
        );
        let vel = Vec2::new(
            sample_truncated(&motion.velocity.x, rng)?,
            sample_truncated(&motion.velocity.y, rng)?,
        );
        Ok(Self::new(pos, vel))
    }

    /// Advances the position by `vel * elapsed_seconds` per axis, reflecting
    /// off the boundary: a crossed bound clamps the position to that bound and
    /// negates the velocity component. Sign flip only, no energy loss.
    pub fn advance(&mut self, elapsed_seconds: f32, bounds: &Bounds) {
        self.pos = self.pos.add(self.vel.scale(elapsed_seconds));

        if self.pos.x > bounds.x.max || self.pos.x < bounds.x.min {
            self.pos.x = clamp(self.pos.x, bounds.x.min, bounds.x.max);
            self.vel.x = -self.vel.x;
        }
        if self.pos.y > bounds.y.max || self.pos.y < bounds.y.min {
            self.pos.y = clamp(self.pos.y, bounds.y.min, bounds.y.max);
            self.vel.y = -self.vel.y;
        }
    }

    /// CSS-style `(left, top)` pixel offsets derived from the current
    /// position, for embedding layers that bind offsets rather than raw
    /// coordinates.
    pub fn offset_px(&self) -> (String, String) {
        (format!("{}px", self.pos.x), format!("{}px", self.pos.y))
    }

    /// Current speed in px/s.
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

// Truncating sample: floor(random * (max - min)) + min, whole units in [min, max).
fn sample_truncated(range: &MinMax, rng: &mut StdRng) -> Result<f32> {
    let dist = Uniform::new(range.min as i32, range.max as i32)?;
    Ok(rng.sample(dist) as f32)
}
