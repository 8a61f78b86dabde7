pub mod core;

// Re-export everything from core for ergonomic library use
// Users can write `stagehand::image` instead of `stagehand::core::image`
pub use core::*;
