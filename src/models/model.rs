//! Piecewise polynomial evaluation.
//!
//! The fitter relies on two primitive operations:
//! - pick the piece owning `x` (shared with the accumulator via `piece_index`)
//! - evaluate that piece's polynomial with Horner's scheme
//!
//! A `PiecewisePolynomial` is immutable once built, so evaluation is safe to call
//! from many threads at once.

use crate::domain::{PiecewisePolynomial, Shape};
use crate::error::FitError;
use crate::math::{horner, horner_derivative, piece_index};

impl PiecewisePolynomial {
    /// Build from a flat table: `order + 1` coefficients per piece, each piece
    /// highest power first.
    pub fn from_coefficients(shape: Shape, coefficients: Vec<f64>) -> Result<Self, FitError> {
        shape.validate()?;
        if coefficients.len() != shape.coefficient_count() {
            return Err(FitError::ShapeMismatch {
                expected: format!("{} coefficients ({shape})", shape.coefficient_count()),
                actual: format!("{} coefficients", coefficients.len()),
            });
        }
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(FitError::NonFinite);
        }
        Ok(Self { shape, coefficients })
    }

    /// Build from per-piece coefficients in ascending power order, as produced
    /// by the solver.
    pub(crate) fn from_ascending(shape: Shape, ascending: &[f64]) -> Result<Self, FitError> {
        let per_piece = shape.coefficients_per_piece();
        let mut coefficients = Vec::with_capacity(ascending.len());
        for chunk in ascending.chunks(per_piece) {
            coefficients.extend(chunk.iter().rev());
        }
        Self::from_coefficients(shape, coefficients)
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn order(&self) -> usize {
        self.shape.order
    }

    pub fn pieces(&self) -> usize {
        self.shape.pieces
    }

    /// Flat, read-only coefficient table (piece 0 first, highest power first).
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Coefficients of piece `k`, highest power first.
    ///
    /// # Panics
    /// Panics if `k >= self.pieces()`.
    pub fn piece(&self, k: usize) -> &[f64] {
        let n = self.shape.coefficients_per_piece();
        &self.coefficients[k * n..(k + 1) * n]
    }

    /// Iterate over per-piece coefficient slices.
    pub fn iter_pieces(&self) -> impl Iterator<Item = &[f64]> {
        self.coefficients.chunks(self.shape.coefficients_per_piece())
    }

    /// Evaluate the curve at `x`.
    pub fn evaluate(&self, x: f64) -> f64 {
        let k = piece_index(x, self.shape.pieces);
        horner(self.piece(k), x)
    }

    /// Single-precision entry point: computes in `f64`, narrows the result.
    pub fn evaluate_f32(&self, x: f32) -> f32 {
        self.evaluate(f64::from(x)) as f32
    }

    /// Evaluate piece `k`'s polynomial at `x`, without piece selection.
    pub fn evaluate_piece(&self, k: usize, x: f64) -> f64 {
        horner(self.piece(k), x)
    }

    /// First derivative at `x`.
    pub fn derivative(&self, x: f64) -> f64 {
        let k = piece_index(x, self.shape.pieces);
        horner_derivative(self.piece(k), x)
    }

    /// First derivative of piece `k` at `x`, without piece selection.
    pub fn derivative_piece(&self, k: usize, x: f64) -> f64 {
        horner_derivative(self.piece(k), x)
    }

    /// Evaluate on `n` evenly spaced points covering `[0, 1]`.
    pub fn sample_grid(&self, n: usize) -> (Vec<f64>, Vec<f64>) {
        let n = n.max(2);
        let xs: Vec<f64> = (0..n).map(|i| i as f64 / (n as f64 - 1.0)).collect();
        let ys = xs.iter().map(|&x| self.evaluate(x)).collect();
        (xs, ys)
    }
}
