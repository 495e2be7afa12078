pub mod board;
pub mod driver;
pub mod marker;

// Re-export key types for the binary and integration tests
pub use board::Board;
pub use driver::{elapsed_seconds, FrameDriver};
pub use marker::Marker;
