//! Mathematical utilities: monomial basis helpers and Gauss–Jordan elimination.

pub mod basis;
pub mod gauss_jordan;

pub use basis::*;
pub use gauss_jordan::*;
