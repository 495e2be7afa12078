use serde::{Deserialize, Serialize};
use anyhow::Result;
use std::path::Path;

/// A closed numeric range along one axis (px for positions, px/s for velocities).
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct MinMax {
    pub min: f32,
    pub max: f32,
}

impl MinMax {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f32 {
        self.max - self.min
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Rectangular region described by a pair of per-axis ranges.
#[derive(Deserialize, Serialize, Debug, Clone, Copy)]
pub struct Bounds {
    pub x: MinMax,
    pub y: MinMax,
}

/// Spawn/bounce bounds and velocity bounds shared by every marker on the board.
/// Immutable after construction.
#[derive(Deserialize, Serialize, Debug, Clone, Copy)]
pub struct MotionConfig {
    pub bounds: Bounds,
    pub velocity: Bounds,
}

// Grid dimensions and spawn seeding, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct BoardConfig {
    pub rows: u32,
    pub cols: u32,
    #[serde(default = "default_spawn_seed")]
    pub spawn_seed: u64,
}

fn default_spawn_seed() -> u64 {
    42
}

// Frame-loop timing, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TimingConfig {
    pub target_fps: f32,
    pub total_time_s: f32,
    pub record_interval_s: f32,
    /// When true the driver uses wall-clock timestamps and paces itself to
    /// `target_fps`; when false it synthesizes exact frame timestamps.
    #[serde(default)]
    pub realtime: bool,
}

// Configuration for output settings, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OutputConfig {
    pub base_filename: String,
    pub format: Option<String>, // Output format: "json", "bincode", "messagepack"
    #[serde(default = "default_save_positions_in_snapshot")]
    pub save_positions_in_snapshot: bool,
    #[serde(default = "default_save_final_positions")]
    pub save_final_positions: bool, // CSV of final marker positions
}

fn default_save_positions_in_snapshot() -> bool {
    true
}

fn default_save_final_positions() -> bool {
    true
}

// Main configuration structure, loaded from config.toml.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct DriftConfig {
    pub board: BoardConfig,
    pub motion: MotionConfig,
    pub timing: TimingConfig,
    pub output: OutputConfig,
}

impl DriftConfig {
    /// Loads the board configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path_ref.display(), e))?;
        let config: DriftConfig = toml::from_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML from '{}': {}", path_ref.display(), e))?;

        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants the rest of the system relies on.
    pub fn validate(&self) -> Result<()> {
        if self.board.rows == 0 || self.board.cols == 0 {
            anyhow::bail!("board.rows and board.cols must both be greater than 0.");
        }
        validate_position_range("motion.bounds.x", &self.motion.bounds.x)?;
        validate_position_range("motion.bounds.y", &self.motion.bounds.y)?;
        validate_velocity_range("motion.velocity.x", &self.motion.velocity.x)?;
        validate_velocity_range("motion.velocity.y", &self.motion.velocity.y)?;
        if !self.timing.target_fps.is_finite() || self.timing.target_fps <= 0.0 {
            anyhow::bail!("timing.target_fps must be positive.");
        }
        if !self.timing.total_time_s.is_finite() || self.timing.total_time_s < 0.0 {
            anyhow::bail!("timing.total_time_s must be non-negative.");
        }
        if !self.timing.record_interval_s.is_finite() || self.timing.record_interval_s < 0.0 {
            anyhow::bail!("timing.record_interval_s must be non-negative.");
        }
        if let Some(format) = self.output.format.as_deref() {
            match format {
                "json" | "bincode" | "messagepack" => {}
                other => anyhow::bail!("Unknown output format: '{}'.", other),
            }
        }
        Ok(())
    }

    /// Total number of markers the board holds.
    pub fn marker_count(&self) -> u32 {
        self.board.rows * self.board.cols
    }
}

// Spawn sampling truncates to integers, so a range needs at least 1 px of span
// to be non-empty.
fn validate_position_range(name: &str, range: &MinMax) -> Result<()> {
    if !range.min.is_finite() || !range.max.is_finite() {
        anyhow::bail!("{} must be finite.", name);
    }
    if range.span() < 1.0 {
        anyhow::bail!("{} must span at least 1 px (min < max).", name);
    }
    Ok(())
}

fn validate_velocity_range(name: &str, range: &MinMax) -> Result<()> {
    if !range.min.is_finite() || !range.max.is_finite() {
        anyhow::bail!("{} must be finite.", name);
    }
    if range.min < 0.0 {
        anyhow::bail!("{} min must be non-negative.", name);
    }
    if range.span() < 1.0 {
        anyhow::bail!("{} must span at least 1 px/s (min < max).", name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_CONFIG: &str = r#"
        [board]
        rows = 30
        cols = 10
        spawn_seed = 7

        [motion.bounds.x]
        min = 100.0
        max = 900.0
        [motion.bounds.y]
        min = 100.0
        max = 700.0
        [motion.velocity.x]
        min = 0.0
        max = 100.0
        [motion.velocity.y]
        min = 0.0
        max = 100.0

        [timing]
        target_fps = 60.0
        total_time_s = 10.0
        record_interval_s = 0.5

        [output]
        base_filename = "driftboard"
        format = "bincode"
    "#;

    fn parse(toml_str: &str) -> DriftConfig {
        toml::from_str(toml_str).expect("config should parse")
    }

    #[test]
    fn full_config_parses_and_validates() {
        let config = parse(FULL_CONFIG);
        config.validate().expect("config should validate");
        assert_eq!(config.board.rows, 30);
        assert_eq!(config.board.cols, 10);
        assert_eq!(config.marker_count(), 300);
        assert_eq!(config.motion.bounds.x.max, 900.0);
        // Defaults for fields the file omits.
        assert!(!config.timing.realtime);
        assert!(config.output.save_positions_in_snapshot);
        assert!(config.output.save_final_positions);
    }

    #[test]
    fn rejects_zero_rows() {
        let mut config = parse(FULL_CONFIG);
        config.board.rows = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_inverted_bounds() {
        let mut config = parse(FULL_CONFIG);
        config.motion.bounds.x = MinMax::new(900.0, 100.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_degenerate_velocity_range() {
        let mut config = parse(FULL_CONFIG);
        config.motion.velocity.y = MinMax::new(50.0, 50.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_positive_fps() {
        let mut config = parse(FULL_CONFIG);
        config.timing.target_fps = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_unknown_output_format() {
        let mut config = parse(FULL_CONFIG);
        config.output.format = Some("yaml".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn min_max_helpers() {
        let range = MinMax::new(100.0, 900.0);
        assert_eq!(range.span(), 800.0);
        assert!(range.contains(100.0));
        assert!(range.contains(900.0));
        assert!(!range.contains(900.1));
    }
}
