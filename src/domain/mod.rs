//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - engine configuration (`Shape`, `Anchors`, `Continuity`, `PiecewiseConfig`)
//! - the fitted curve (`PiecewisePolynomial`) and its quality (`FitQuality`)
//! - run configuration and saved curve files (`RunConfig`, `CurveFile`)

pub mod types;

pub use types::*;
