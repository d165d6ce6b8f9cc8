//! Read/write curve JSON files.
//!
//! Curve JSON is the "portable" representation of a fitted CDF:
//! - the fit configuration (order, pieces, anchors, continuity)
//! - the coefficient table (highest power first per piece)
//! - fit quality on the reference curve
//! - a precomputed evaluated grid for quick plotting
//!
//! The schema is defined by `domain::CurveFile`.

use std::fs::File;
use std::path::Path;

use chrono::Utc;

use crate::domain::{CurveFile, CurveGrid, FitResult};
use crate::error::AppError;

pub const TOOL_NAME: &str = "cdf-curves";

/// Bundle `best` into a curve file with a `grid_points`-point evaluated grid.
pub fn build_curve_file(best: &FitResult, grid_points: usize) -> CurveFile {
    let (x, y) = best.model.sample_grid(grid_points);
    CurveFile {
        tool: TOOL_NAME.to_string(),
        generated_at: Utc::now(),
        config: best.config,
        model: best.model.clone(),
        fit_quality: best.quality,
        grid: CurveGrid { x, y },
    }
}

/// Write a curve JSON file.
pub fn write_curve_json(path: &Path, curve: &CurveFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create curve JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, curve)
        .map_err(|e| AppError::new(2, format!("Failed to write curve JSON: {e}")))?;
    Ok(())
}

/// Read a curve JSON file. The coefficient table is validated while parsing.
pub fn read_curve_json(path: &Path) -> Result<CurveFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open curve JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid curve JSON: {e}")))
}
