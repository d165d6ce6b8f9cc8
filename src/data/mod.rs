//! Sample sources and the empirical CDF fed to the fitter.

pub mod ecdf;
pub mod sample;

pub use ecdf::*;
pub use sample::*;
