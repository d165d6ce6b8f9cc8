//! Search grids.
//!
//! The selector searches a deterministic grid of (order, pieces) shapes, and
//! scores each candidate on evenly spaced percentiles. Both grids are built
//! here so the ordering (which decides ties) lives in one place.

use crate::domain::{SelectionGrid, Shape};
use crate::error::FitError;

/// Largest polynomial order accepted by the search grid.
pub const MAX_GRID_ORDER: usize = 8;
/// Largest piece count accepted by the search grid.
pub const MAX_GRID_PIECES: usize = 64;

/// Enumerate the shapes of `grid`, orders outermost, then piece counts.
///
/// Earlier entries are simpler models; the selector breaks score ties in
/// their favour.
pub fn shape_grid(grid: &SelectionGrid) -> Result<Vec<Shape>, FitError> {
    if grid.min_order > grid.max_order {
        return Err(FitError::InvalidConfig(format!(
            "empty order range {}..={}",
            grid.min_order, grid.max_order
        )));
    }
    if grid.min_pieces == 0 || grid.min_pieces > grid.max_pieces {
        return Err(FitError::InvalidConfig(format!(
            "invalid piece range {}..={} (pieces must be >= 1)",
            grid.min_pieces, grid.max_pieces
        )));
    }
    if grid.max_order > MAX_GRID_ORDER || grid.max_pieces > MAX_GRID_PIECES {
        return Err(FitError::InvalidConfig(format!(
            "grid too large: order <= {MAX_GRID_ORDER} and pieces <= {MAX_GRID_PIECES}"
        )));
    }

    let mut out = Vec::new();
    for order in grid.min_order..=grid.max_order {
        for pieces in grid.min_pieces..=grid.max_pieces {
            out.push(Shape::new(order, pieces));
        }
    }
    Ok(out)
}

/// The `i`-th of `n` evenly spaced percentiles, `i / (n - 1)`.
///
/// A single-point grid sits at 0.
pub fn percentile(i: usize, n: usize) -> f64 {
    if n < 2 {
        0.0
    } else {
        i as f64 / (n - 1) as f64
    }
}

/// `n` evenly spaced percentiles covering `[0, 1]`.
pub fn percentiles(n: usize) -> Vec<f64> {
    (0..n).map(|i| percentile(i, n)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grid_is_orders_then_pieces() {
        let shapes = shape_grid(&SelectionGrid::default()).unwrap();
        assert_eq!(shapes.len(), 12);
        assert_eq!(shapes[0], Shape::new(1, 1));
        assert_eq!(shapes[3], Shape::new(1, 4));
        assert_eq!(shapes[4], Shape::new(2, 1));
        assert_eq!(shapes[11], Shape::new(3, 4));
    }

    #[test]
    fn invalid_ranges_are_rejected() {
        let mut grid = SelectionGrid::default();
        grid.min_pieces = 0;
        assert!(shape_grid(&grid).is_err());

        let grid = SelectionGrid {
            min_order: 3,
            max_order: 1,
            ..SelectionGrid::default()
        };
        assert!(shape_grid(&grid).is_err());
    }

    #[test]
    fn percentiles_include_both_ends() {
        assert_eq!(percentiles(5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(percentiles(1), vec![0.0]);
        assert!(percentiles(0).is_empty());
    }
}
