//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads or generates samples
//! - runs the fit or the grid search
//! - prints the summary
//! - writes optional exports

use clap::Parser;
use log::info;

use crate::cli::{Cli, Command, CommonArgs, EvalArgs, FitArgs, SelectArgs};
use crate::domain::{Anchors, FitMode, RunConfig, SelectionGrid, Shape};
use crate::error::AppError;
use crate::fit::grid::percentiles;

pub mod pipeline;

/// Entry point for the `cdf` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Fit(args) => handle_run(run_config_from_fit_args(&args)),
        Command::Select(args) => handle_run(run_config_from_select_args(&args)),
        Command::Eval(args) => handle_eval(&args),
    }
}

fn handle_run(config: RunConfig) -> Result<(), AppError> {
    let run = pipeline::run_pipeline(&config)?;

    println!("{}", crate::report::format_run_summary(&run, &config));

    // Optional exports.
    if let Some(path) = &config.export_table {
        crate::io::export::write_coefficients_csv(path, &run.best.model)?;
        info!("wrote coefficient table to {}", path.display());
    }
    if let Some(path) = &config.export_curve {
        let curve = crate::io::curve::build_curve_file(&run.best, config.grid_points);
        crate::io::curve::write_curve_json(path, &curve)?;
        info!("wrote curve JSON to {}", path.display());
    }

    Ok(())
}

fn handle_eval(args: &EvalArgs) -> Result<(), AppError> {
    let curve = crate::io::curve::read_curve_json(&args.curve)?;

    let xs = if args.x.is_empty() {
        if args.steps < 2 {
            return Err(AppError::new(2, "Grid steps must be >= 2."));
        }
        percentiles(args.steps)
    } else {
        args.x.clone()
    };

    print!("{}", crate::report::format_evaluations(&curve, &xs));
    Ok(())
}

pub fn run_config_from_fit_args(args: &FitArgs) -> RunConfig {
    run_config(&args.common, FitMode::Fixed(Shape::new(args.order, args.pieces)))
}

pub fn run_config_from_select_args(args: &SelectArgs) -> RunConfig {
    let grid = SelectionGrid {
        min_order: args.min_order,
        max_order: args.max_order,
        min_pieces: args.min_pieces,
        max_pieces: args.max_pieces,
    };
    run_config(&args.common, FitMode::Select(grid))
}

fn run_config(common: &CommonArgs, mode: FitMode) -> RunConfig {
    let anchors = if common.no_anchors {
        Anchors::none()
    } else {
        Anchors {
            start: Some(common.start),
            end: Some(common.end),
        }
    };

    RunConfig {
        input: common.input.clone(),
        column: common.column.clone(),
        source: common.source,
        sample_count: common.sample_count,
        seed: common.seed,
        beta_a: common.beta_a,
        beta_b: common.beta_b,
        buckets: common.buckets,
        reference_len: common.reference_len,
        mode,
        anchors,
        continuity: common.continuity,
        export_table: common.export.clone(),
        export_curve: common.export_curve.clone(),
        grid_points: common.grid_points,
    }
}
