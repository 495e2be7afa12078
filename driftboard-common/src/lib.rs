pub mod config;
pub mod snapshot;
pub mod vecmath;

// Re-export key types for easier use by dependent crates
pub use config::{DriftConfig, BoardConfig, TimingConfig, OutputConfig, MotionConfig, Bounds, MinMax};
pub use snapshot::Snapshot;
pub use vecmath::{Vec2, clamp};
