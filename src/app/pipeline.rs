//! Shared "fit pipeline" logic used by the `fit` and `select` commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! samples -> empirical CDF -> parallel accumulation -> fit or grid search -> quality
//!
//! The commands can then focus on presentation and exports.

use log::{info, warn};

use crate::data::{generate_samples, EmpiricalCdf, SampleSpec};
use crate::domain::{FitMode, FitResult, PiecewiseConfig, RunConfig, SampleSource, SampleStats};
use crate::error::AppError;
use crate::fit::selection::{find_best_fit, fit_and_score, FitSelection};
use crate::io::ingest::{load_samples, RowError};

/// Where the samples of a run came from, and how many survived.
#[derive(Debug, Clone)]
pub struct SampleInput {
    /// Human-readable origin, e.g. `beta(2, 5)` or a CSV path.
    pub origin: String,
    pub values: Vec<f64>,
    pub stats: SampleStats,
    pub rows_read: usize,
    pub row_errors: Vec<RowError>,
}

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub input: SampleInput,
    pub ecdf: EmpiricalCdf,
    /// Number of `(x, F(x))` points fed to the accumulator.
    pub fit_points: usize,
    pub best: FitResult,
    /// Present for grid searches.
    pub selection: Option<FitSelection>,
}

/// Execute the full pipeline and return the computed outputs.
pub fn run_pipeline(config: &RunConfig) -> Result<RunOutput, AppError> {
    // 1) Samples.
    let input = load_input(config)?;
    info!(
        "loaded {} sample(s) from {} (min={:.4}, max={:.4}, mean={:.4})",
        input.stats.n, input.origin, input.stats.min, input.stats.max, input.stats.mean
    );

    // 2) Empirical CDF and the points it implies.
    let ecdf = EmpiricalCdf::from_samples(&input.values, config.buckets)?;
    let points = ecdf.fit_points(&input.values);
    if config.reference_len < 2 {
        return Err(AppError::new(2, "Reference curve needs at least 2 percentiles."));
    }
    let reference = ecdf.reference(config.reference_len);
    info!(
        "empirical CDF: {} bucket(s), {} fit point(s), {} reference percentile(s)",
        ecdf.buckets(),
        points.len(),
        reference.len()
    );

    // 3) Fit or search.
    let (best, selection) = match config.mode {
        FitMode::Fixed(shape) => {
            let fit_config = PiecewiseConfig {
                shape,
                anchors: config.anchors,
                continuity: config.continuity,
            };
            (fit_and_score(fit_config, &points, &reference)?, None)
        }
        FitMode::Select(grid) => {
            let selection = find_best_fit(&points, &reference, &grid, config.anchors, config.continuity)?;
            (selection.best.clone(), Some(selection))
        }
    };
    info!(
        "fitted {}: score={:.3e} rmse={:.3e}",
        best.config.shape, best.quality.score, best.quality.rmse
    );

    Ok(RunOutput {
        input,
        ecdf,
        fit_points: points.len(),
        best,
        selection,
    })
}

fn load_input(config: &RunConfig) -> Result<SampleInput, AppError> {
    if let Some(path) = &config.input {
        let ingested = load_samples(path, config.column.as_deref())?;
        if !ingested.row_errors.is_empty() {
            warn!(
                "skipped {} of {} row(s) in '{}'",
                ingested.row_errors.len(),
                ingested.rows_read,
                path.display()
            );
        }
        return Ok(SampleInput {
            origin: format!("{} [{}]", path.display(), ingested.column),
            values: ingested.values,
            stats: ingested.stats,
            rows_read: ingested.rows_read,
            row_errors: ingested.row_errors,
        });
    }

    let spec = SampleSpec {
        source: config.source,
        count: config.sample_count,
        seed: config.seed,
        beta_a: config.beta_a,
        beta_b: config.beta_b,
    };
    let sample = generate_samples(&spec)?;
    let origin = match config.source {
        SampleSource::Beta => format!("beta({}, {}) seed={}", config.beta_a, config.beta_b, config.seed),
        other => format!("{} seed={}", other.display_name(), config.seed),
    };
    Ok(SampleInput {
        origin,
        rows_read: sample.values.len(),
        values: sample.values,
        stats: sample.stats,
        row_errors: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Anchors, Continuity, SelectionGrid, Shape};

    fn config(mode: FitMode, source: SampleSource) -> RunConfig {
        RunConfig {
            input: None,
            column: None,
            source,
            sample_count: 50_000,
            seed: 7,
            beta_a: 2.0,
            beta_b: 5.0,
            buckets: 128,
            reference_len: 101,
            mode,
            anchors: Anchors::CDF,
            continuity: Continuity::Slope,
            export_table: None,
            export_curve: None,
            grid_points: 11,
        }
    }

    #[test]
    fn uniform_samples_fit_the_identity() {
        let run = run_pipeline(&config(FitMode::Fixed(Shape::new(1, 1)), SampleSource::Uniform)).unwrap();
        let c = run.best.model.coefficients();
        assert!((c[0] - 1.0).abs() < 0.02, "slope {}", c[0]);
        assert!(c[1].abs() < 1e-9, "anchored intercept {}", c[1]);
        assert!(run.best.quality.rmse < 0.01);
        assert!(run.selection.is_none());
        assert_eq!(run.fit_points, 50_000);
    }

    #[test]
    fn triangular_cdf_is_tracked_by_piecewise_cubic() {
        let run = run_pipeline(&config(FitMode::Fixed(Shape::new(3, 4)), SampleSource::Triangular)).unwrap();
        // F(x) = 2x² below 0.5.
        assert!((run.best.model.evaluate(0.25) - 0.125).abs() < 0.01);
        assert!((run.best.model.evaluate(0.5) - 0.5).abs() < 0.01);
        assert!(run.best.model.evaluate(0.0).abs() < 1e-9);
        assert!((run.best.model.evaluate(1.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn grid_search_reports_candidates() {
        let run = run_pipeline(&config(FitMode::Select(SelectionGrid::default()), SampleSource::Beta)).unwrap();
        let selection = run.selection.unwrap();
        assert_eq!(selection.candidates.len() + selection.skipped.len(), 12);
        let best_score = selection
            .candidates
            .iter()
            .map(|c| c.quality.score)
            .fold(f64::INFINITY, f64::min);
        assert_eq!(run.best.quality.score, best_score);
    }

    #[test]
    fn too_short_reference_is_rejected() {
        let mut cfg = config(FitMode::Fixed(Shape::new(1, 1)), SampleSource::Uniform);
        cfg.reference_len = 1;
        assert_eq!(run_pipeline(&cfg).unwrap_err().exit_code(), 2);
    }
}
