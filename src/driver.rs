use crate::board::Board;
use anyhow::Result;
use driftboard_common::config::DriftConfig;
use driftboard_common::snapshot::Snapshot;
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Converts a millisecond-timestamp pair into elapsed seconds.
#[inline]
pub fn elapsed_seconds(begin_ms: f64, end_ms: f64) -> f32 {
    ((end_ms - begin_ms) / 1000.0) as f32
}

/// Per-frame stepper that owns the board and the shared motion configuration.
///
/// The previous frame timestamp is an explicit field rather than a closure
/// capture, so a single tick is a plain function of (state, timestamp) and can
/// be driven by any host clock.
pub struct FrameDriver {
    config: DriftConfig,
    board: Board,
    /// Timestamp (ms) of the previous tick; `None` before the first tick.
    last_tick_ms: Option<f64>,
    /// Number of ticks performed so far.
    frame_count: u32,
    /// Stores collected board snapshots at record intervals.
    recorded_snapshots: Vec<Snapshot>,
}

impl FrameDriver {
    /// Creates a driver with a freshly spawned board, seeded from the config.
    pub fn new(config: DriftConfig) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(config.board.spawn_seed);
        let board = Board::new(config.board.rows, config.board.cols, &config.motion, &mut rng)?;
        Ok(Self {
            config,
            board,
            last_tick_ms: None,
            frame_count: 0,
            recorded_snapshots: Vec::new(),
        })
    }

    /// Advances the whole board by the time elapsed since the previous tick.
    ///
    /// The first tick has no previous timestamp and advances by zero elapsed
    /// time; it only establishes the reference point for the next frame.
    pub fn tick(&mut self, now_ms: f64) {
        let elapsed = match self.last_tick_ms {
            Some(prev_ms) => elapsed_seconds(prev_ms, now_ms),
            None => 0.0,
        };
        self.board.advance_all(elapsed, &self.config.motion.bounds);
        self.last_tick_ms = Some(now_ms);
        self.frame_count += 1;
    }

    /// Captures the current board state as a snapshot.
    /// Should be called at record intervals.
    pub fn record_snapshot(&mut self) {
        let time = self.last_tick_ms.unwrap_or(0.0) as f32 / 1000.0;
        debug!("Recording snapshot at {:.2} s (frame {})...", time, self.frame_count);

        let positions = if self.config.output.save_positions_in_snapshot {
            Some(self.board.positions())
        } else {
            None
        };

        self.recorded_snapshots.push(Snapshot {
            time,
            frame: self.frame_count,
            marker_count: self.board.len() as u32,
            mean_speed: self.board.mean_speed(),
            positions,
        });
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn config(&self) -> &DriftConfig {
        &self.config
    }

    /// Provides access to the recorded snapshots.
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.recorded_snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftboard_common::config::{
        BoardConfig, Bounds, MinMax, MotionConfig, OutputConfig, TimingConfig,
    };

    fn test_config() -> DriftConfig {
        DriftConfig {
            board: BoardConfig {
                rows: 4,
                cols: 3,
                spawn_seed: 11,
            },
            motion: MotionConfig {
                bounds: Bounds {
                    x: MinMax::new(100.0, 900.0),
                    y: MinMax::new(100.0, 700.0),
                },
                velocity: Bounds {
                    x: MinMax::new(10.0, 100.0),
                    y: MinMax::new(10.0, 100.0),
                },
            },
            timing: TimingConfig {
                target_fps: 60.0,
                total_time_s: 1.0,
                record_interval_s: 0.5,
                realtime: false,
            },
            output: OutputConfig {
                base_filename: "test".to_string(),
                format: None,
                save_positions_in_snapshot: true,
                save_final_positions: false,
            },
        }
    }

    #[test]
    fn elapsed_seconds_converts_milliseconds() {
        assert_eq!(elapsed_seconds(0.0, 1000.0), 1.0);
        assert_eq!(elapsed_seconds(250.0, 1000.0), 0.75);
        assert_eq!(elapsed_seconds(500.0, 500.0), 0.0);
    }

    #[test]
    fn first_tick_does_not_move_the_board() {
        let mut driver = FrameDriver::new(test_config()).unwrap();
        let before = driver.board().positions();
        // Even a large first timestamp must not translate into a jump.
        driver.tick(123_456.0);
        assert_eq!(driver.board().positions(), before);
        assert_eq!(driver.frame_count(), 1);
    }

    #[test]
    fn second_tick_advances_by_the_timestamp_delta() {
        let mut driver = FrameDriver::new(test_config()).unwrap();
        driver.tick(1000.0);
        let before = driver.board().positions();
        let velocities: Vec<_> = driver.board().markers().iter().map(|m| m.vel).collect();

        driver.tick(1500.0); // 0.5 s later
        let bounds = driver.config().motion.bounds;
        for ((pos, before_pos), vel) in driver
            .board()
            .positions()
            .iter()
            .zip(before.iter())
            .zip(velocities.iter())
        {
            // Per axis: plain Euler step, unless the raw step crosses a bound,
            // in which case the position is clamped to that bound.
            let raw_x = before_pos.0 + vel.x * 0.5;
            let expected_x = if raw_x > bounds.x.max {
                bounds.x.max
            } else if raw_x < bounds.x.min {
                bounds.x.min
            } else {
                raw_x
            };
            let raw_y = before_pos.1 + vel.y * 0.5;
            let expected_y = if raw_y > bounds.y.max {
                bounds.y.max
            } else if raw_y < bounds.y.min {
                bounds.y.min
            } else {
                raw_y
            };
            assert!((pos.0 - expected_x).abs() < 1e-3);
            assert!((pos.1 - expected_y).abs() < 1e-3);
        }
    }

    #[test]
    fn snapshots_respect_position_gating() {
        let mut config = test_config();
        config.output.save_positions_in_snapshot = false;
        let mut driver = FrameDriver::new(config).unwrap();
        driver.record_snapshot();
        assert!(driver.snapshots()[0].positions.is_none());

        let mut driver = FrameDriver::new(test_config()).unwrap();
        driver.record_snapshot();
        let snapshot = &driver.snapshots()[0];
        assert_eq!(snapshot.frame, 0);
        assert_eq!(snapshot.marker_count, 12);
        assert_eq!(snapshot.positions.as_ref().unwrap().len(), 12);
    }

    #[test]
    fn snapshot_time_tracks_last_tick() {
        let mut driver = FrameDriver::new(test_config()).unwrap();
        driver.tick(0.0);
        driver.tick(2500.0);
        driver.record_snapshot();
        let snapshot = driver.snapshots().last().unwrap();
        assert!((snapshot.time - 2.5).abs() < 1e-6);
        assert_eq!(snapshot.frame, 2);
    }
}
