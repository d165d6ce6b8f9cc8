//! Reporting utilities: polynomial formulas, candidate tables and run summaries.

pub mod format;

pub use format::*;
