//! Empirical CDF from a bucket histogram.
//!
//! Samples are counted into `buckets` equal-width bins over `[0, 1]` (same
//! clamp rule as piece selection, so `1.0` lands in the last bin). The running
//! sum of the normalized counts gives `cumulative[i] = F(i / buckets)`, with
//! `cumulative[0] = 0` and `cumulative[buckets] = 1`. Between edges the CDF is
//! linear.

use crate::domain::SamplePoint;
use crate::error::AppError;
use crate::fit::grid::percentile;
use crate::math::piece_index;

#[derive(Debug, Clone, PartialEq)]
pub struct EmpiricalCdf {
    counts: Vec<usize>,
    cumulative: Vec<f64>,
    total: usize,
    ignored: usize,
}

impl EmpiricalCdf {
    /// Build from raw sample values. Values outside `[0, 1]` (or non-finite)
    /// are counted in [`EmpiricalCdf::ignored`].
    pub fn from_samples(values: &[f64], buckets: usize) -> Result<Self, AppError> {
        if buckets == 0 {
            return Err(AppError::new(2, "Histogram bucket count must be > 0."));
        }

        let mut counts = vec![0usize; buckets];
        let mut ignored = 0usize;
        for &v in values {
            if !(0.0..=1.0).contains(&v) {
                ignored += 1;
                continue;
            }
            counts[piece_index(v, buckets)] += 1;
        }

        let total = values.len() - ignored;
        if total == 0 {
            return Err(AppError::new(3, "No samples in [0, 1] to build a CDF from."));
        }

        let mut cumulative = Vec::with_capacity(buckets + 1);
        let mut running = 0usize;
        cumulative.push(0.0);
        for &c in &counts {
            running += c;
            cumulative.push(running as f64 / total as f64);
        }

        Ok(Self {
            counts,
            cumulative,
            total,
            ignored,
        })
    }

    pub fn buckets(&self) -> usize {
        self.counts.len()
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// `F` at each bucket edge, `buckets + 1` values.
    pub fn cumulative(&self) -> &[f64] {
        &self.cumulative
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn ignored(&self) -> usize {
        self.ignored
    }

    /// `F(x)`, linearly interpolated between bucket edges and clamped to `[0, 1]`.
    pub fn value_at(&self, x: f64) -> f64 {
        if x.is_nan() || x <= 0.0 {
            return 0.0;
        }
        if x >= 1.0 {
            return 1.0;
        }
        let n = self.buckets();
        let pos = x * n as f64;
        let i = (pos as usize).min(n - 1);
        let frac = pos - i as f64;
        let (lo, hi) = (self.cumulative[i], self.cumulative[i + 1]);
        lo + frac * (hi - lo)
    }

    /// `(x, F(x))` for every in-range sample value, ready for accumulation.
    pub fn fit_points(&self, values: &[f64]) -> Vec<SamplePoint> {
        values
            .iter()
            .filter(|v| (0.0..=1.0).contains(*v))
            .map(|&v| SamplePoint::new(v, self.value_at(v)))
            .collect()
    }

    /// `F` at `n` evenly spaced percentiles `i / (n - 1)`.
    pub fn reference(&self, n: usize) -> Vec<f64> {
        (0..n).map(|i| self.value_at(percentile(i, n))).collect()
    }
}
