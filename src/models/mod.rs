//! Piecewise polynomial model evaluation.
//!
//! The curve type itself lives in `domain`; this module adds evaluation so the
//! fitting and reporting code can stay generic.

pub mod model;
