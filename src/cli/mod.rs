//! Command-line parsing for the CDF curve fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fitting/math code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{Continuity, SampleSource};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "cdf", version, about = "Piecewise polynomial CDF fitter")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit one (order, pieces) shape to the empirical CDF.
    Fit(FitArgs),
    /// Search a grid of shapes and keep the lowest-error fit.
    Select(SelectArgs),
    /// Evaluate a saved curve JSON at given x values.
    Eval(EvalArgs),
}

/// Sample, histogram, constraint and export options shared by `fit` and `select`.
#[derive(Debug, Args, Clone)]
pub struct CommonArgs {
    /// CSV of sample values in [0, 1]. When omitted, samples are generated.
    #[arg(short = 'i', long, value_name = "CSV")]
    pub input: Option<PathBuf>,

    /// CSV column holding the samples (defaults to the first column).
    #[arg(long)]
    pub column: Option<String>,

    /// Distribution for generated samples.
    #[arg(long, value_enum, default_value_t = SampleSource::Triangular)]
    pub source: SampleSource,

    /// Number of samples to generate.
    #[arg(short = 'n', long, default_value_t = 100_000)]
    pub sample_count: usize,

    /// Random seed for sample generation.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Beta distribution `a` parameter.
    #[arg(long, default_value_t = 2.0)]
    pub beta_a: f64,

    /// Beta distribution `b` parameter.
    #[arg(long, default_value_t = 5.0)]
    pub beta_b: f64,

    /// Histogram buckets for the empirical CDF.
    #[arg(long, default_value_t = 256)]
    pub buckets: usize,

    /// Percentiles in the reference curve used for scoring.
    #[arg(long, default_value_t = 101)]
    pub reference_len: usize,

    /// Value the curve is pinned to at x = 0.
    #[arg(long, default_value_t = 0.0)]
    pub start: f64,

    /// Value the curve is pinned to at x = 1.
    #[arg(long, default_value_t = 1.0)]
    pub end: f64,

    /// Do not pin the curve ends.
    #[arg(long)]
    pub no_anchors: bool,

    /// Continuity enforced at piece seams.
    #[arg(long, value_enum, default_value_t = Continuity::Slope)]
    pub continuity: Continuity,

    /// Export the coefficient table to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export curve (config + coefficients + evaluated grid) to JSON.
    #[arg(long = "export-curve")]
    pub export_curve: Option<PathBuf>,

    /// Points in the evaluated grid written with `--export-curve`.
    #[arg(long, default_value_t = 101)]
    pub grid_points: usize,
}

/// Options for a fixed-shape fit.
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    /// Polynomial order of every piece.
    #[arg(short = 'o', long, default_value_t = 3)]
    pub order: usize,

    /// Number of equal-width pieces over [0, 1].
    #[arg(short = 'p', long, default_value_t = 4)]
    pub pieces: usize,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Options for the grid search.
#[derive(Debug, Args, Clone)]
pub struct SelectArgs {
    #[arg(long, default_value_t = 1)]
    pub min_order: usize,

    #[arg(long, default_value_t = 3)]
    pub max_order: usize,

    #[arg(long, default_value_t = 1)]
    pub min_pieces: usize,

    #[arg(long, default_value_t = 4)]
    pub max_pieces: usize,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Options for evaluating a saved curve.
#[derive(Debug, Args, Clone)]
pub struct EvalArgs {
    /// Curve JSON file produced by `--export-curve`.
    #[arg(long, value_name = "JSON")]
    pub curve: PathBuf,

    /// Query points. When omitted, an evenly spaced grid is printed.
    #[arg(value_name = "X", allow_negative_numbers = true)]
    pub x: Vec<f64>,

    /// Grid size used when no query points are given.
    #[arg(long, default_value_t = 11)]
    pub steps: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_defaults_to_piecewise_cubic() {
        let cli = Cli::parse_from(["cdf", "fit"]);
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!((args.order, args.pieces), (3, 4));
        assert_eq!(args.common.continuity, Continuity::Slope);
        assert!(!args.common.no_anchors);
    }

    #[test]
    fn select_accepts_grid_bounds() {
        let cli = Cli::parse_from(["cdf", "select", "--max-order", "2", "--source", "beta", "--no-anchors"]);
        let Command::Select(args) = cli.command else {
            panic!("expected select");
        };
        assert_eq!(args.max_order, 2);
        assert_eq!(args.common.source, SampleSource::Beta);
        assert!(args.common.no_anchors);
    }

    #[test]
    fn eval_takes_query_points() {
        let cli = Cli::parse_from(["cdf", "eval", "--curve", "c.json", "0.25", "1"]);
        let Command::Eval(args) = cli.command else {
            panic!("expected eval");
        };
        assert_eq!(args.x, vec![0.25, 1.0]);
    }
}
