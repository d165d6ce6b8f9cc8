//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for evaluation

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::FitError;

/// One `(x, y)` observation fed to the accumulator.
///
/// For CDF fitting `x` is the sample value in `[0, 1]` and `y` the empirical
/// cumulative probability at `x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    pub x: f64,
    pub y: f64,
}

impl SamplePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Polynomial order and piece count of a fit.
///
/// Every accumulator and coefficient table carries the shape it was built for,
/// so objects of different shapes cannot be combined silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    /// Degree of each piece's polynomial.
    pub order: usize,
    /// Number of equal-width pieces partitioning `[0, 1]`.
    pub pieces: usize,
}

impl Shape {
    pub fn new(order: usize, pieces: usize) -> Self {
        Self { order, pieces }
    }

    /// Coefficients per piece (`order + 1`).
    pub fn coefficients_per_piece(self) -> usize {
        self.order + 1
    }

    /// Coefficients over all pieces.
    pub fn coefficient_count(self) -> usize {
        self.coefficients_per_piece() * self.pieces
    }

    /// Length of a piece's power-sum accumulator (`2 * order + 1`).
    pub fn power_sum_len(self) -> usize {
        2 * self.order + 1
    }

    /// Left and right x bounds of piece `k`.
    pub fn piece_bounds(self, k: usize) -> (f64, f64) {
        let n = self.pieces as f64;
        (k as f64 / n, (k + 1) as f64 / n)
    }

    pub fn validate(self) -> Result<(), FitError> {
        if self.pieces == 0 {
            return Err(FitError::InvalidConfig("pieces must be >= 1".to_string()));
        }
        Ok(())
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "order={}, pieces={}", self.order, self.pieces)
    }
}

/// Which seam continuity constraints to impose between adjacent pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Continuity {
    /// Pieces are fitted independently.
    None,
    /// Equal values at each breakpoint (C0).
    Value,
    /// Equal values and first derivatives at each breakpoint (C0 + C1).
    ///
    /// The derivative condition only applies when `order > 1`; for lines it
    /// would force adjacent pieces to coincide.
    Slope,
}

impl Continuity {
    pub fn display_name(self) -> &'static str {
        match self {
            Continuity::None => "none",
            Continuity::Value => "C0",
            Continuity::Slope => "C1",
        }
    }

    pub fn matches_value(self) -> bool {
        matches!(self, Continuity::Value | Continuity::Slope)
    }

    pub fn matches_slope(self, order: usize) -> bool {
        self == Continuity::Slope && order > 1
    }
}

/// Fixed values the curve must take at the domain edges.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Anchors {
    /// Target for `f(0)` (first piece).
    pub start: Option<f64>,
    /// Target for `f(1)` (last piece).
    pub end: Option<f64>,
}

impl Anchors {
    /// A CDF starts at 0 and ends at 1.
    pub const CDF: Anchors = Anchors {
        start: Some(0.0),
        end: Some(1.0),
    };

    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// Full configuration of one fit-engine instance.
///
/// Bound once at construction; accumulators and coefficient tables produced by
/// the instance always share its [`Shape`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PiecewiseConfig {
    pub shape: Shape,
    pub anchors: Anchors,
    pub continuity: Continuity,
}

impl PiecewiseConfig {
    /// An unconstrained fit.
    pub fn new(order: usize, pieces: usize) -> Self {
        Self {
            shape: Shape::new(order, pieces),
            anchors: Anchors::none(),
            continuity: Continuity::None,
        }
    }

    pub fn with_anchors(mut self, anchors: Anchors) -> Self {
        self.anchors = anchors;
        self
    }

    pub fn with_continuity(mut self, continuity: Continuity) -> Self {
        self.continuity = continuity;
        self
    }

    pub fn order(&self) -> usize {
        self.shape.order
    }

    pub fn pieces(&self) -> usize {
        self.shape.pieces
    }

    pub fn validate(&self) -> Result<(), FitError> {
        self.shape.validate()?;
        for (label, value) in [("start", self.anchors.start), ("end", self.anchors.end)] {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(FitError::InvalidConfig(format!(
                        "{label} anchor must be finite, got {v}"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// A fitted piecewise polynomial over `[0, 1]`.
///
/// `coefficients` holds `order + 1` values per piece, piece 0 first, each
/// piece ordered from the highest power down to the constant term. Evaluation
/// lives in [`crate::models`].
///
/// Deserialization goes through [`PiecewisePolynomial::from_coefficients`], so a
/// loaded table always has at least one piece and the right length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CoefficientTable")]
pub struct PiecewisePolynomial {
    pub(crate) shape: Shape,
    pub(crate) coefficients: Vec<f64>,
}

/// Unchecked wire form of [`PiecewisePolynomial`].
#[derive(Deserialize)]
struct CoefficientTable {
    shape: Shape,
    coefficients: Vec<f64>,
}

impl TryFrom<CoefficientTable> for PiecewisePolynomial {
    type Error = FitError;

    fn try_from(table: CoefficientTable) -> Result<Self, FitError> {
        Self::from_coefficients(table.shape, table.coefficients)
    }
}

/// Where synthetic samples come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SampleSource {
    /// Uniform on `[0, 1]`.
    Uniform,
    /// Symmetric triangle on `[0, 1]` peaking at 0.5.
    Triangular,
    /// Beta(a, b).
    Beta,
}

impl SampleSource {
    pub fn display_name(self) -> &'static str {
        match self {
            SampleSource::Uniform => "uniform",
            SampleSource::Triangular => "triangular",
            SampleSource::Beta => "beta",
        }
    }
}

/// Summary stats about the sample values actually used.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleStats {
    pub n: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Fit quality against the reference curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitQuality {
    /// Incremental mean of squared error over the reference percentiles.
    pub score: f64,
    /// `sqrt(score)`.
    pub rmse: f64,
    /// Largest absolute error over the reference percentiles.
    pub max_abs_error: f64,
    /// Number of reference percentiles compared.
    pub n_reference: usize,
}

/// Fit output for a single configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub config: PiecewiseConfig,
    pub model: PiecewisePolynomial,
    pub quality: FitQuality,
}

/// Range of configurations searched by the model selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionGrid {
    pub min_order: usize,
    pub max_order: usize,
    pub min_pieces: usize,
    pub max_pieces: usize,
}

impl Default for SelectionGrid {
    fn default() -> Self {
        Self {
            min_order: 1,
            max_order: 3,
            min_pieces: 1,
            max_pieces: 4,
        }
    }
}

/// Fixed fit or grid search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FitMode {
    Fixed(Shape),
    Select(SelectionGrid),
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// CSV of sample values. When unset, samples are generated.
    pub input: Option<PathBuf>,
    /// Column holding the sample values (defaults to the first column).
    pub column: Option<String>,

    pub source: SampleSource,
    pub sample_count: usize,
    pub seed: u64,
    pub beta_a: f64,
    pub beta_b: f64,

    /// Histogram buckets for the empirical CDF.
    pub buckets: usize,
    /// Number of evenly spaced percentiles in the reference curve.
    pub reference_len: usize,

    pub mode: FitMode,
    pub anchors: Anchors,
    pub continuity: Continuity,

    pub export_table: Option<PathBuf>,
    pub export_curve: Option<PathBuf>,
    /// Points in the evaluated grid written to the curve JSON.
    pub grid_points: usize,
}

/// A saved curve file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub config: PiecewiseConfig,
    pub model: PiecewisePolynomial,
    pub fit_quality: FitQuality,
    pub grid: CurveGrid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveGrid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_sizes() {
        let shape = Shape::new(3, 4);
        assert_eq!(shape.coefficients_per_piece(), 4);
        assert_eq!(shape.coefficient_count(), 16);
        assert_eq!(shape.power_sum_len(), 7);
        assert_eq!(shape.piece_bounds(3), (0.75, 1.0));
    }

    #[test]
    fn zero_pieces_is_rejected() {
        assert!(PiecewiseConfig::new(2, 0).validate().is_err());
        assert!(PiecewiseConfig::new(0, 1).validate().is_ok());
    }

    #[test]
    fn non_finite_anchor_is_rejected() {
        let config = PiecewiseConfig::new(1, 1).with_anchors(Anchors {
            start: Some(f64::NAN),
            end: None,
        });
        assert!(matches!(config.validate(), Err(FitError::InvalidConfig(_))));
    }

    #[test]
    fn slope_continuity_needs_curvature() {
        assert!(!Continuity::Slope.matches_slope(1));
        assert!(Continuity::Slope.matches_slope(2));
        assert!(Continuity::Slope.matches_value());
        assert!(!Continuity::None.matches_value());
    }
}
