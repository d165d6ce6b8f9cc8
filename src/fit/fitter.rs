//! The piecewise least-squares fit engine.
//!
//! Given:
//! - a `PiecewiseConfig` (order, piece count, anchors, continuity)
//! - a stream of `(x, y)` samples
//!
//! we:
//! - fold samples into per-piece normal-equation sums (`Accumulator`)
//! - build the constraint list and the augmented system (`system`)
//! - solve it by Gauss–Jordan elimination (`math::gauss_jordan`)
//!
//! and return an immutable `PiecewisePolynomial`.
//!
//! Two solve paths:
//! - **unconstrained**: pieces are independent, so each piece's `AᵀA` block is
//!   inverted on its own (`[AᵀA | I]`) and multiplied by its `Aᵀy`. A singular
//!   block names the failing piece.
//! - **constrained**: one augmented `[KKT | rhs]` elimination; the first
//!   `coefficient_count` entries of the solution are the coefficients.

use log::debug;
use nalgebra::{DMatrix, DVector};

use crate::domain::{PiecewiseConfig, PiecewisePolynomial, SamplePoint};
use crate::error::FitError;
use crate::fit::accumulator::Accumulator;
use crate::fit::system::{assemble, constraint_list, Constraint};
use crate::math::{invert, solve_augmented};

/// One fit-engine instance: configuration plus its accumulated sums.
#[derive(Debug, Clone)]
pub struct PiecewiseFit {
    config: PiecewiseConfig,
    accumulator: Accumulator,
}

impl PiecewiseFit {
    pub fn new(config: PiecewiseConfig) -> Result<Self, FitError> {
        config.validate()?;
        Ok(Self {
            accumulator: Accumulator::new(config.shape)?,
            config,
        })
    }

    /// Wrap sums accumulated elsewhere (e.g. by `Accumulator::from_points_par`).
    pub fn from_accumulator(config: PiecewiseConfig, accumulator: Accumulator) -> Result<Self, FitError> {
        config.validate()?;
        if accumulator.shape() != config.shape {
            return Err(FitError::ShapeMismatch {
                expected: config.shape.to_string(),
                actual: accumulator.shape().to_string(),
            });
        }
        Ok(Self { config, accumulator })
    }

    pub fn config(&self) -> &PiecewiseConfig {
        &self.config
    }

    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }

    pub fn add_point(&mut self, x: f64, y: f64) {
        self.accumulator.add_point(x, y);
    }

    pub fn add_points(&mut self, points: &[SamplePoint]) {
        self.accumulator.add_points(points);
    }

    /// Merge another accumulator of the same shape into this fit.
    pub fn merge(&mut self, other: &Accumulator) -> Result<(), FitError> {
        self.accumulator.merge(other)
    }

    /// The constraints this configuration imposes, in matrix row order.
    pub fn constraints(&self) -> Vec<Constraint> {
        constraint_list(&self.config)
    }

    /// Build and solve the system for the samples seen so far.
    ///
    /// Pure with respect to the accumulated sums: calling it twice without new
    /// points returns identical coefficients.
    pub fn calculate_coefficients(&self) -> Result<PiecewisePolynomial, FitError> {
        let constraints = self.constraints();
        let shape = self.config.shape;

        let ascending = if constraints.is_empty() {
            self.solve_unconstrained()?
        } else {
            let system = assemble(&self.accumulator, &constraints)?;
            debug!(
                "solving {}x{} augmented system ({shape}, {} constraint(s))",
                system.dimension(),
                system.dimension() + 1,
                constraints.len()
            );
            let solution = solve_augmented(system.into_matrix()).map_err(|e| attribute_piece(e, &self.config))?;
            solution.rows(0, shape.coefficient_count()).iter().copied().collect()
        };

        PiecewisePolynomial::from_ascending(shape, &ascending)
    }

    fn solve_unconstrained(&self) -> Result<Vec<f64>, FitError> {
        let shape = self.config.shape;
        let n = shape.coefficients_per_piece();
        let mut out = Vec::with_capacity(shape.coefficient_count());

        for (k, sums) in self.accumulator.pieces().iter().enumerate() {
            let ata = DMatrix::<f64>::from_fn(n, n, |r, c| sums.normal_entry(r, c));
            let aty = DVector::<f64>::from_column_slice(sums.moments());
            let inverse = invert(&ata).map_err(|e| match e {
                FitError::SingularSystem { column, pivot, .. } => FitError::SingularSystem {
                    column: k * n + column,
                    pivot,
                    piece: Some(k),
                },
                other => other,
            })?;
            let coefs = inverse * aty;
            out.extend(coefs.iter().copied());
        }

        if out.iter().all(|v| v.is_finite()) {
            Ok(out)
        } else {
            Err(FitError::NonFinite)
        }
    }
}

/// Name the piece owning a failing coefficient column, when there is one.
fn attribute_piece(err: FitError, config: &PiecewiseConfig) -> FitError {
    match err {
        FitError::SingularSystem { column, pivot, .. } => {
            let shape = config.shape;
            let piece = (column < shape.coefficient_count()).then(|| column / shape.coefficients_per_piece());
            FitError::SingularSystem { column, pivot, piece }
        }
        other => other,
    }
}

/// Convenience: fit `points` with `config` in one call.
pub fn fit_points(config: PiecewiseConfig, points: &[SamplePoint]) -> Result<PiecewisePolynomial, FitError> {
    let acc = Accumulator::from_points_par(config.shape, points)?;
    PiecewiseFit::from_accumulator(config, acc)?.calculate_coefficients()
}
