//! Error types.
//!
//! Two layers:
//!
//! - [`FitError`] is the numeric/engine taxonomy returned by the fitting core
//!   (accumulator, system builder, solver).
//! - [`AppError`] is what the binary reports: a message plus a process exit code.
//!
//! Exit codes: `2` bad input/config or I/O, `3` not enough data, `4` numeric failure.

use thiserror::Error;

/// Failures of a single fit attempt.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    /// The engine configuration cannot describe a fit.
    #[error("invalid fit configuration: {0}")]
    InvalidConfig(String),

    /// Two objects built for different order/piece shapes were combined.
    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    /// Elimination hit a zero or near-zero pivot.
    ///
    /// Typical causes: a piece with fewer than `order + 1` distinct sample
    /// positions and no constraints to pin it down, or contradictory constraints.
    #[error("ill-conditioned fit: pivot {pivot:e} in column {column}{}", piece_note(.piece))]
    SingularSystem {
        column: usize,
        pivot: f64,
        piece: Option<usize>,
    },

    /// The solve completed but produced NaN/Inf coefficients.
    #[error("fit produced non-finite coefficients")]
    NonFinite,
}

fn piece_note(piece: &Option<usize>) -> String {
    match piece {
        Some(k) => format!(" (piece {k})"),
        None => String::new(),
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        let code = match err {
            FitError::InvalidConfig(_) | FitError::ShapeMismatch { .. } => 2,
            FitError::SingularSystem { .. } | FitError::NonFinite => 4,
        };
        AppError::new(code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singular_error_names_piece() {
        let err = FitError::SingularSystem {
            column: 3,
            pivot: 0.0,
            piece: Some(1),
        };
        let msg = err.to_string();
        assert!(msg.contains("column 3"), "{msg}");
        assert!(msg.contains("piece 1"), "{msg}");
    }

    #[test]
    fn fit_errors_map_to_exit_codes() {
        let app: AppError = FitError::NonFinite.into();
        assert_eq!(app.exit_code(), 4);
        let app: AppError = FitError::InvalidConfig("pieces".to_string()).into();
        assert_eq!(app.exit_code(), 2);
    }
}
