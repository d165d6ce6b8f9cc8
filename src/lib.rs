//! `cdf-curves` library crate.
//!
//! Constrained piecewise polynomial least-squares fitting of cumulative
//! distribution functions. The binary (`cdf`) is a thin wrapper around this
//! library so that:
//!
//! - the fitting core is testable without spawning processes
//! - the engine (`fit`, `models`) is reusable without the CLI
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
