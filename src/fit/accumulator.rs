//! Streaming normal-equation accumulation.
//!
//! Each piece keeps the sufficient statistics of an ordinary least squares fit
//! of `y ~ c_0 + c_1 x + ... + c_n x^n` over the samples it owns:
//!
//! ```text
//! power_sums[k] = Σ x^k        k = 0..=2n   (Hankel entries of AᵀA)
//! moments[k]    = Σ x^k · y    k = 0..=n    (Aᵀy)
//! ```
//!
//! Raw samples are never retained. Sums are plain `f64` additions, so two
//! accumulators of the same shape can be merged in any order; this is what makes
//! the sharded (rayon) accumulation below valid.

use log::warn;
use rayon::prelude::*;

use crate::domain::{SamplePoint, Shape};
use crate::error::FitError;
use crate::math::{fill_power_row, piece_index};

/// Sufficient statistics of one piece.
#[derive(Debug, Clone, PartialEq)]
pub struct PieceSums {
    power_sums: Vec<f64>,
    moments: Vec<f64>,
    count: usize,
}

impl PieceSums {
    fn new(shape: Shape) -> Self {
        Self {
            power_sums: vec![0.0; shape.power_sum_len()],
            moments: vec![0.0; shape.coefficients_per_piece()],
            count: 0,
        }
    }

    /// `Σ x^k` for `k = 0..=2 * order`.
    pub fn power_sums(&self) -> &[f64] {
        &self.power_sums
    }

    /// `Σ x^k · y` for `k = 0..=order`.
    pub fn moments(&self) -> &[f64] {
        &self.moments
    }

    /// Number of samples folded into this piece.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Entry `(row, col)` of this piece's `AᵀA` block.
    pub fn normal_entry(&self, row: usize, col: usize) -> f64 {
        self.power_sums[row + col]
    }

    fn add(&mut self, x: f64, y: f64, row: &mut [f64]) {
        fill_power_row(x, row);
        for (sum, &xpow) in self.power_sums.iter_mut().zip(row.iter()) {
            *sum += xpow;
        }
        for (m, &xpow) in self.moments.iter_mut().zip(row.iter()) {
            *m += xpow * y;
        }
        self.count += 1;
    }

    fn merge(&mut self, other: &PieceSums) {
        for (a, b) in self.power_sums.iter_mut().zip(&other.power_sums) {
            *a += b;
        }
        for (a, b) in self.moments.iter_mut().zip(&other.moments) {
            *a += b;
        }
        self.count += other.count;
    }
}

/// Per-piece accumulators for one fit shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Accumulator {
    shape: Shape,
    pieces: Vec<PieceSums>,
    rejected: usize,
    // Scratch power row, sized `2 * order + 1`.
    row: Vec<f64>,
}

impl Accumulator {
    pub fn new(shape: Shape) -> Result<Self, FitError> {
        shape.validate()?;
        Ok(Self {
            shape,
            pieces: (0..shape.pieces).map(|_| PieceSums::new(shape)).collect(),
            rejected: 0,
            row: vec![0.0; shape.power_sum_len()],
        })
    }

    /// Accumulate `points` across rayon workers and merge the shards.
    ///
    /// Produces the same sums as sequential accumulation up to floating-point
    /// summation order.
    pub fn from_points_par(shape: Shape, points: &[SamplePoint]) -> Result<Self, FitError> {
        let empty = Self::new(shape)?;
        const CHUNK: usize = 16 * 1024;

        let merged = points
            .par_chunks(CHUNK)
            .map(|chunk| -> Result<Accumulator, FitError> {
                let mut acc = empty.clone();
                acc.add_points(chunk);
                Ok(acc)
            })
            .try_reduce(|| empty.clone(), |mut a, b| {
                a.merge(&b)?;
                Ok(a)
            })?;

        if merged.rejected > 0 {
            warn!("ignored {} non-finite sample(s) during accumulation", merged.rejected);
        }
        Ok(merged)
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Fold one sample into the piece owning `x`.
    ///
    /// Non-finite samples are counted in [`Accumulator::rejected`] and otherwise ignored.
    pub fn add_point(&mut self, x: f64, y: f64) {
        if !(x.is_finite() && y.is_finite()) {
            self.rejected += 1;
            return;
        }
        let k = piece_index(x, self.shape.pieces);
        self.pieces[k].add(x, y, &mut self.row);
    }

    pub fn add_points(&mut self, points: &[SamplePoint]) {
        for p in points {
            self.add_point(p.x, p.y);
        }
    }

    /// Add another accumulator's sums into this one.
    pub fn merge(&mut self, other: &Accumulator) -> Result<(), FitError> {
        if self.shape != other.shape {
            return Err(FitError::ShapeMismatch {
                expected: self.shape.to_string(),
                actual: other.shape.to_string(),
            });
        }
        for (a, b) in self.pieces.iter_mut().zip(&other.pieces) {
            a.merge(b);
        }
        self.rejected += other.rejected;
        Ok(())
    }

    pub fn piece(&self, k: usize) -> &PieceSums {
        &self.pieces[k]
    }

    pub fn pieces(&self) -> &[PieceSums] {
        &self.pieces
    }

    /// Samples accepted across all pieces.
    pub fn sample_count(&self) -> usize {
        self.pieces.iter().map(PieceSums::count).sum()
    }

    /// Non-finite samples that were skipped.
    pub fn rejected(&self) -> usize {
        self.rejected
    }
}
