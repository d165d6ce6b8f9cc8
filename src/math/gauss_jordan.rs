//! Gauss–Jordan elimination with partial pivoting.
//!
//! The fitting engine solves small dense systems (at most a few dozen unknowns),
//! either as an augmented `[A | b]` matrix or as `[A | I]` to obtain `A^-1`.
//! Both cases share one elimination routine:
//!
//! ```text
//! for each target column c:
//!     pick the row r >= c with the largest |m[r, c]|
//!     swap rows r and c
//!     divide row c by the pivot
//!     subtract multiples of row c from every other row
//! ```
//!
//! Numerical notes:
//! - Constraint-augmented systems have zeros on the diagonal of the constraint
//!   block, so pivoting is mandatory, not an optimization.
//! - A pivot at or below `RELATIVE_PIVOT_EPS` times the largest original entry
//!   of its own column is treated as singular. Power sums grow with the sample
//!   count while the constraint-column pivots (the Schur complement
//!   `-C (AᵀA)^-1 Cᵀ`) shrink like `1/n`, so one matrix-wide threshold would
//!   reject well-posed constrained fits at a few million samples. An exactly
//!   empty piece, or a constraint that repeats another, still gives 0.

use nalgebra::{DMatrix, DVector};

use crate::error::FitError;

/// Pivots smaller than this fraction of their column's largest entry are rejected.
pub const RELATIVE_PIVOT_EPS: f64 = 1e-12;

/// Reduce the leading square block of `m` to the identity in place.
///
/// `m` must have at least as many columns as rows; the extra columns receive the
/// same row operations (right-hand sides or an identity block). On success row
/// `i` corresponds to unknown `i`.
pub fn gauss_jordan(m: &mut DMatrix<f64>) -> Result<(), FitError> {
    let n = m.nrows();
    let ncols = m.ncols();
    if ncols < n {
        return Err(FitError::ShapeMismatch {
            expected: format!("at least {n} columns"),
            actual: format!("{ncols} columns"),
        });
    }
    if n == 0 {
        return Ok(());
    }

    if m.view((0, 0), (n, n)).iter().any(|v| !v.is_finite()) {
        return Err(FitError::NonFinite);
    }
    let tolerances: Vec<f64> = (0..n).map(|col| m.view((0, col), (n, 1)).amax() * RELATIVE_PIVOT_EPS).collect();

    for target in 0..n {
        let mut best_row = target;
        let mut best_abs = m[(target, target)].abs();
        for row in (target + 1)..n {
            let v = m[(row, target)].abs();
            if v > best_abs {
                best_row = row;
                best_abs = v;
            }
        }

        if !(best_abs > tolerances[target]) {
            return Err(FitError::SingularSystem {
                column: target,
                pivot: m[(best_row, target)],
                piece: None,
            });
        }

        if best_row != target {
            m.swap_rows(best_row, target);
        }

        let pivot = m[(target, target)];
        for col in 0..ncols {
            m[(target, col)] /= pivot;
        }

        for row in 0..n {
            if row == target {
                continue;
            }
            let factor = m[(row, target)];
            if factor == 0.0 {
                continue;
            }
            for col in 0..ncols {
                let delta = factor * m[(target, col)];
                m[(row, col)] -= delta;
            }
        }
    }

    Ok(())
}

/// Solve an augmented system `[A | b]` (`n x (n + 1)`) and return `x`.
pub fn solve_augmented(mut m: DMatrix<f64>) -> Result<DVector<f64>, FitError> {
    let n = m.nrows();
    if m.ncols() != n + 1 {
        return Err(FitError::ShapeMismatch {
            expected: format!("{n}x{}", n + 1),
            actual: format!("{}x{}", n, m.ncols()),
        });
    }

    gauss_jordan(&mut m)?;

    let x = m.column(n).into_owned();
    if x.iter().all(|v| v.is_finite()) {
        Ok(x)
    } else {
        Err(FitError::NonFinite)
    }
}

/// Invert a square matrix by eliminating `[A | I]`.
pub fn invert(a: &DMatrix<f64>) -> Result<DMatrix<f64>, FitError> {
    let n = a.nrows();
    if a.ncols() != n {
        return Err(FitError::ShapeMismatch {
            expected: format!("{n}x{n}"),
            actual: format!("{}x{}", n, a.ncols()),
        });
    }

    let mut m = DMatrix::<f64>::from_fn(n, 2 * n, |row, col| {
        if col < n {
            a[(row, col)]
        } else if col - n == row {
            1.0
        } else {
            0.0
        }
    });

    gauss_jordan(&mut m)?;

    let inverse = m.columns(n, n).into_owned();
    if inverse.iter().all(|v| v.is_finite()) {
        Ok(inverse)
    } else {
        Err(FitError::NonFinite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solves_small_system_like_lu() {
        let a = DMatrix::from_row_slice(3, 3, &[4.0, -2.0, 1.0, -2.0, 4.0, -2.0, 1.0, -2.0, 4.0]);
        let b = DVector::from_row_slice(&[11.0, -16.0, 17.0]);

        let mut aug = DMatrix::<f64>::zeros(3, 4);
        aug.view_mut((0, 0), (3, 3)).copy_from(&a);
        aug.set_column(3, &b);

        let x = solve_augmented(aug).unwrap();
        let expected = a.clone().lu().solve(&b).unwrap();
        for i in 0..3 {
            assert!((x[i] - expected[i]).abs() < 1e-12, "x[{i}]={} vs {}", x[i], expected[i]);
        }
    }

    #[test]
    fn zero_diagonal_needs_pivoting() {
        // [0 1; 1 0] x = [2; 3] -> x = [3; 2]
        let aug = DMatrix::from_row_slice(2, 3, &[0.0, 1.0, 2.0, 1.0, 0.0, 3.0]);
        let x = solve_augmented(aug).unwrap();
        assert!((x[0] - 3.0).abs() < 1e-15);
        assert!((x[1] - 2.0).abs() < 1e-15);
    }

    #[test]
    fn symmetric_saddle_point_system() {
        // Minimize (c - 2)^2 subject to c = 5, written as a KKT system:
        // [1 1; 1 0] [c; lambda] = [2; 5]
        let aug = DMatrix::from_row_slice(2, 3, &[1.0, 1.0, 2.0, 1.0, 0.0, 5.0]);
        let x = solve_augmented(aug).unwrap();
        assert!((x[0] - 5.0).abs() < 1e-12);
        assert!((x[1] + 3.0).abs() < 1e-12);
    }

    #[test]
    fn singular_matrix_is_reported() {
        let aug = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 1.0, 2.0, 4.0, 2.0]);
        let err = solve_augmented(aug).unwrap_err();
        match err {
            FitError::SingularSystem { column, .. } => assert_eq!(column, 1),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn small_pivot_in_a_unit_column_is_accepted() {
        // [1e8 1; 1 0] x = [0; 1]: det = -1, the second pivot is -1e-8.
        let aug = DMatrix::from_row_slice(2, 3, &[1e8, 1.0, 0.0, 1.0, 0.0, 1.0]);
        let x = solve_augmented(aug).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-12, "x0={}", x[0]);
        assert!((x[1] + 1e8).abs() < 1e-4, "x1={}", x[1]);
    }

    #[test]
    fn non_finite_entry_is_rejected() {
        let aug = DMatrix::from_row_slice(2, 3, &[1.0, f64::NAN, 0.0, 0.0, 1.0, 1.0]);
        assert!(matches!(solve_augmented(aug), Err(FitError::NonFinite)));
    }

    #[test]
    fn all_zero_matrix_is_singular() {
        let err = invert(&DMatrix::<f64>::zeros(2, 2)).unwrap_err();
        assert!(matches!(err, FitError::SingularSystem { column: 0, .. }));
    }

    #[test]
    fn inverse_times_matrix_is_identity() {
        let a = DMatrix::from_row_slice(3, 3, &[2.0, 1.0, 0.5, 1.0, 3.0, 0.25, 0.5, 0.25, 1.5]);
        let inv = invert(&a).unwrap();
        let id = &a * &inv;
        for r in 0..3 {
            for c in 0..3 {
                let expected = if r == c { 1.0 } else { 0.0 };
                assert!((id[(r, c)] - expected).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn wrong_augmented_shape_is_rejected() {
        let err = solve_augmented(DMatrix::<f64>::zeros(2, 2)).unwrap_err();
        assert!(matches!(err, FitError::ShapeMismatch { .. }));
    }
}
