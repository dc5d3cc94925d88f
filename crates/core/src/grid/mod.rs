//! Viewport grid: metric spacing, lattice generation, and vertex snapping

pub mod lattice;
pub mod nearest;
pub mod steps;

// Re-export main types
pub use lattice::*;
pub use nearest::*;
pub use steps::*;
