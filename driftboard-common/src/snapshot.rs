use serde::{Serialize, Deserialize};

/// A snapshot of the board state at a specific frame.
#[derive(Debug, Clone, Serialize, Deserialize)] // Derive traits for easy saving/loading
pub struct Snapshot {
    /// The board time (in seconds since the run started) at which the snapshot was taken.
    pub time: f32,
    /// The frame counter at the time of the snapshot (0 for the initial snapshot).
    pub frame: u32,
    /// The total number of markers on the board.
    pub marker_count: u32,
    /// The mean marker speed (px/s) at the snapshot time.
    pub mean_speed: f32,
    /// Raw [x, y] positions of all markers, row-major.
    /// Included only if `config.output.save_positions_in_snapshot` is true.
    #[serde(skip_serializing_if = "Option::is_none")] // Don't write "positions": null
    pub positions: Option<Vec<(f32, f32)>>,
}
