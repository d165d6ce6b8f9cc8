//! Model selection over a grid of (order, pieces) shapes.
//!
//! Every shape in the grid is fitted to the same samples and scored against a
//! reference curve sampled at evenly spaced percentiles. The score is an
//! incremental mean of squared error:
//!
//! ```text
//! avg_0 = 0
//! avg_{i+1} = lerp(avg_i, err_i², 1 / (i + 1))
//! ```
//!
//! Selection rules:
//! 1. Candidates whose solve fails are skipped (never abort the search)
//! 2. Choose the lowest score
//! 3. Ties go to the earlier grid entry (the simpler model)

use log::{debug, warn};
use rayon::prelude::*;

use crate::domain::{Anchors, Continuity, FitQuality, FitResult, PiecewiseConfig, PiecewisePolynomial, SamplePoint, SelectionGrid, Shape};
use crate::error::FitError;
use crate::fit::accumulator::Accumulator;
use crate::fit::fitter::PiecewiseFit;
use crate::fit::grid::{percentile, shape_grid};

/// Output of fitting + selection.
#[derive(Debug, Clone)]
pub struct FitSelection {
    pub best: FitResult,
    /// Successful candidates, in grid order.
    pub candidates: Vec<FitResult>,
    /// Shapes whose fit failed, and why.
    pub skipped: Vec<(Shape, FitError)>,
}

/// Score `model` against `reference`, where `reference[i]` is the target value at
/// percentile `i / (len - 1)`.
pub fn reference_quality(model: &PiecewisePolynomial, reference: &[f64]) -> Result<FitQuality, FitError> {
    if reference.is_empty() {
        return Err(FitError::InvalidConfig("reference curve is empty".to_string()));
    }

    let n = reference.len();
    let mut score = 0.0_f64;
    let mut max_abs_error = 0.0_f64;
    for (i, &target) in reference.iter().enumerate() {
        let err = model.evaluate(percentile(i, n)) - target;
        let sq = err * err;
        score += (sq - score) / (i + 1) as f64;
        max_abs_error = max_abs_error.max(err.abs());
    }

    if !score.is_finite() {
        return Err(FitError::NonFinite);
    }
    Ok(FitQuality {
        score,
        rmse: score.sqrt(),
        max_abs_error,
        n_reference: n,
    })
}

/// Fit one configuration and score it.
pub fn fit_and_score(config: PiecewiseConfig, points: &[SamplePoint], reference: &[f64]) -> Result<FitResult, FitError> {
    let acc = Accumulator::from_points_par(config.shape, points)?;
    let model = PiecewiseFit::from_accumulator(config, acc)?.calculate_coefficients()?;
    let quality = reference_quality(&model, reference)?;
    Ok(FitResult { config, model, quality })
}

/// Fit every shape of `grid` and keep the lowest-scoring one.
pub fn find_best_fit(
    points: &[SamplePoint],
    reference: &[f64],
    grid: &SelectionGrid,
    anchors: Anchors,
    continuity: Continuity,
) -> Result<FitSelection, FitError> {
    let shapes = shape_grid(grid)?;
    if reference.is_empty() {
        return Err(FitError::InvalidConfig("reference curve is empty".to_string()));
    }

    // Evaluate each shape independently (parallel); collect keeps grid order.
    let outcomes: Vec<(Shape, Result<FitResult, FitError>)> = shapes
        .par_iter()
        .map(|&shape| {
            let config = PiecewiseConfig {
                shape,
                anchors,
                continuity,
            };
            (shape, fit_and_score(config, points, reference))
        })
        .collect();

    let mut candidates = Vec::new();
    let mut skipped = Vec::new();
    for (shape, outcome) in outcomes {
        match outcome {
            Ok(fit) => {
                debug!("candidate {shape}: score={:.3e} rmse={:.3e}", fit.quality.score, fit.quality.rmse);
                candidates.push(fit);
            }
            Err(err) => {
                warn!("skipping candidate {shape}: {err}");
                skipped.push((shape, err));
            }
        }
    }

    let Some(best_idx) = lowest_score(&candidates) else {
        // Every shape failed; report the simplest one's reason.
        return Err(skipped
            .first()
            .map(|(_, err)| err.clone())
            .unwrap_or_else(|| FitError::InvalidConfig("empty selection grid".to_string())));
    };

    Ok(FitSelection {
        best: candidates[best_idx].clone(),
        candidates,
        skipped,
    })
}

/// Index of the minimum score; the first one wins ties.
fn lowest_score(fits: &[FitResult]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, f) in fits.iter().enumerate() {
        match best {
            Some(b) if f.quality.score >= fits[b].quality.score => {}
            _ => best = Some(i),
        }
    }
    best
}
