//! Synthetic sample generation.
//!
//! All sources draw values in `[0, 1]` from a seeded `StdRng`, so a run is
//! reproducible from its flags alone.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Beta, Distribution, Triangular, Uniform};

use crate::domain::{SampleSource, SampleStats};
use crate::error::AppError;

/// Parameters of a synthetic draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleSpec {
    pub source: SampleSource,
    pub count: usize,
    pub seed: u64,
    pub beta_a: f64,
    pub beta_b: f64,
}

#[derive(Debug, Clone)]
pub struct SampleData {
    pub values: Vec<f64>,
    pub stats: SampleStats,
}

pub fn generate_samples(spec: &SampleSpec) -> Result<SampleData, AppError> {
    if spec.count == 0 {
        return Err(AppError::new(2, "Sample count must be > 0."));
    }

    let mut rng = StdRng::seed_from_u64(spec.seed);
    let values: Vec<f64> = match spec.source {
        SampleSource::Uniform => draw(&mut rng, Uniform::new_inclusive(0.0, 1.0), spec.count),
        SampleSource::Triangular => {
            let dist = Triangular::new(0.0, 1.0, 0.5)
                .map_err(|e| AppError::new(2, format!("Triangular distribution error: {e}")))?;
            draw(&mut rng, dist, spec.count)
        }
        SampleSource::Beta => {
            if !(spec.beta_a.is_finite() && spec.beta_b.is_finite() && spec.beta_a > 0.0 && spec.beta_b > 0.0) {
                return Err(AppError::new(
                    2,
                    format!("Beta parameters must be finite and > 0 (a={}, b={}).", spec.beta_a, spec.beta_b),
                ));
            }
            let dist = Beta::new(spec.beta_a, spec.beta_b)
                .map_err(|e| AppError::new(2, format!("Beta distribution error: {e}")))?;
            draw(&mut rng, dist, spec.count)
        }
    };

    let stats = compute_stats(&values).ok_or_else(|| AppError::new(4, "Failed to compute sample stats."))?;
    Ok(SampleData { values, stats })
}

fn draw<D: Distribution<f64>>(rng: &mut StdRng, dist: D, count: usize) -> Vec<f64> {
    // Clamp guards against round-off just outside the support.
    dist.sample_iter(rng).take(count).map(|v| v.clamp(0.0, 1.0)).collect()
}

/// Min/max/mean of `values`; `None` when empty or non-finite.
pub fn compute_stats(values: &[f64]) -> Option<SampleStats> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;

    for &v in values {
        min = min.min(v);
        max = max.max(v);
        sum += v;
    }

    if values.is_empty() || !min.is_finite() || !max.is_finite() || !sum.is_finite() {
        return None;
    }

    Some(SampleStats {
        n: values.len(),
        min,
        max,
        mean: sum / values.len() as f64,
    })
}
