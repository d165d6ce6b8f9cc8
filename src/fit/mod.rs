//! Curve fitting orchestration.
//!
//! Responsibilities:
//!
//! - accumulate per-piece normal-equation sums (sharded with rayon)
//! - assemble the constrained system and solve it
//! - search a grid of shapes and keep the best-scoring fit

pub mod accumulator;
pub mod fitter;
pub mod grid;
pub mod selection;
pub mod system;

pub use accumulator::*;
pub use fitter::*;
pub use grid::*;
pub use selection::*;
pub use system::*;
