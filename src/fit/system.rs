//! Constraint list and augmented system assembly.
//!
//! The constrained least-squares problem
//!
//! ```text
//! minimize ‖A c − y‖²   subject to   C c = d
//! ```
//!
//! is solved through its symmetric KKT (Lagrange) form
//!
//! ```text
//! [ AᵀA  Cᵀ ] [ c ]   [ Aᵀy ]
//! [ C    0  ] [ λ ] = [ d   ]
//! ```
//!
//! `AᵀA` is block diagonal: block `k` is piece `k`'s Hankel matrix of power sums.
//! Each constraint becomes one extra row and the mirrored column; the multipliers
//! `λ` occupy those extra unknowns and are discarded after the solve.
//!
//! Assembly is split in three auditable steps: [`constraint_list`] (which
//! constraints), [`Constraint::row`] (their coefficients) and [`assemble`]
//! (where they land in the matrix).

use nalgebra::DMatrix;

use crate::domain::{PiecewiseConfig, Shape};
use crate::error::FitError;
use crate::fit::accumulator::Accumulator;
use crate::math::{fill_power_row, fill_slope_row};

/// One equality constraint on the coefficient vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constraint {
    /// `p_piece(x) = target`.
    Value { piece: usize, x: f64, target: f64 },
    /// `p_left(x) − p_{left+1}(x) = 0`.
    ValueMatch { left: usize, x: f64 },
    /// `p'_left(x) − p'_{left+1}(x) = 0`.
    SlopeMatch { left: usize, x: f64 },
}

/// Sparse coefficient row of one constraint: `(column, coefficient)` pairs plus target.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintRow {
    pub entries: Vec<(usize, f64)>,
    pub target: f64,
}

impl Constraint {
    /// Coefficient row over the `shape.coefficient_count()` unknowns.
    ///
    /// Piece `k` owns columns `k * (order + 1) ..`, in ascending power order.
    pub fn row(&self, shape: Shape) -> ConstraintRow {
        let n = shape.coefficients_per_piece();
        let mut basis = vec![0.0; n];
        let mut entries = Vec::with_capacity(2 * n);

        match *self {
            Constraint::Value { piece, x, target } => {
                fill_power_row(x, &mut basis);
                entries.extend(basis.iter().enumerate().map(|(j, &b)| (piece * n + j, b)));
                return ConstraintRow { entries, target };
            }
            Constraint::ValueMatch { x, .. } => fill_power_row(x, &mut basis),
            Constraint::SlopeMatch { x, .. } => fill_slope_row(x, &mut basis),
        }

        let left = self.pieces().0;
        for (j, &b) in basis.iter().enumerate() {
            if b == 0.0 {
                continue;
            }
            entries.push((left * n + j, b));
            entries.push(((left + 1) * n + j, -b));
        }
        ConstraintRow { entries, target: 0.0 }
    }

    /// Pieces involved (the second equals the first for single-piece constraints).
    pub fn pieces(&self) -> (usize, usize) {
        match *self {
            Constraint::Value { piece, .. } => (piece, piece),
            Constraint::ValueMatch { left, .. } | Constraint::SlopeMatch { left, .. } => (left, left + 1),
        }
    }

    pub fn describe(&self) -> String {
        match *self {
            Constraint::Value { piece, x, target } => format!("p{piece}({x}) = {target}"),
            Constraint::ValueMatch { left, x } => format!("p{left}({x}) = p{}({x})", left + 1),
            Constraint::SlopeMatch { left, x } => format!("p{left}'({x}) = p{}'({x})", left + 1),
        }
    }
}

/// Constraints implied by a configuration, in a fixed order:
/// start anchor, end anchor, value seams left to right, slope seams left to right.
pub fn constraint_list(config: &PiecewiseConfig) -> Vec<Constraint> {
    let shape = config.shape;
    let mut out = Vec::new();

    if let Some(target) = config.anchors.start {
        out.push(Constraint::Value {
            piece: 0,
            x: 0.0,
            target,
        });
    }
    if let Some(target) = config.anchors.end {
        out.push(Constraint::Value {
            piece: shape.pieces - 1,
            x: 1.0,
            target,
        });
    }

    let seams = 1..shape.pieces;
    if config.continuity.matches_value() {
        for k in seams.clone() {
            out.push(Constraint::ValueMatch {
                left: k - 1,
                x: shape.piece_bounds(k).0,
            });
        }
    }
    if config.continuity.matches_slope(shape.order) {
        for k in seams {
            out.push(Constraint::SlopeMatch {
                left: k - 1,
                x: shape.piece_bounds(k).0,
            });
        }
    }

    out
}

/// The assembled `[KKT | rhs]` matrix and the constraint each extra row encodes.
#[derive(Debug, Clone)]
pub struct AugmentedSystem {
    shape: Shape,
    matrix: DMatrix<f64>,
    constraints: Vec<Constraint>,
}

impl AugmentedSystem {
    /// `n x (n + 1)` with `n = coefficient_count + constraints`; the last column is the rhs.
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    pub fn into_matrix(self) -> DMatrix<f64> {
        self.matrix
    }

    /// Number of unknowns (coefficients + multipliers).
    pub fn dimension(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Matrix row (and column) holding constraint `i`.
    pub fn constraint_row_index(&self, i: usize) -> usize {
        self.shape.coefficient_count() + i
    }
}

/// Build the augmented system from accumulated sums and a constraint list.
pub fn assemble(acc: &Accumulator, constraints: &[Constraint]) -> Result<AugmentedSystem, FitError> {
    let shape = acc.shape();
    let per_piece = shape.coefficients_per_piece();
    let n_coef = shape.coefficient_count();
    let dim = n_coef + constraints.len();
    let rhs = dim;

    for c in constraints {
        let (_, right) = c.pieces();
        if right >= shape.pieces {
            return Err(FitError::InvalidConfig(format!(
                "constraint `{}` refers to a piece outside {shape}",
                c.describe()
            )));
        }
    }

    let mut m = DMatrix::<f64>::zeros(dim, dim + 1);

    for (k, sums) in acc.pieces().iter().enumerate() {
        let base = k * per_piece;
        for row in 0..per_piece {
            for col in 0..per_piece {
                m[(base + row, base + col)] = sums.normal_entry(row, col);
            }
            m[(base + row, rhs)] = sums.moments()[row];
        }
    }

    for (i, c) in constraints.iter().enumerate() {
        let r = n_coef + i;
        let row = c.row(shape);
        for &(col, coef) in &row.entries {
            m[(r, col)] += coef;
            m[(col, r)] += coef;
        }
        m[(r, rhs)] = row.target;
    }

    Ok(AugmentedSystem {
        shape,
        matrix: m,
        constraints: constraints.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Anchors, Continuity};

    fn filled(shape: Shape) -> Accumulator {
        let mut acc = Accumulator::new(shape).unwrap();
        for i in 0..200 {
            let x = (i as f64 + 0.5) / 200.0;
            acc.add_point(x, x * x);
        }
        acc
    }

    #[test]
    fn constraint_list_order_and_count() {
        let config = PiecewiseConfig::new(2, 3)
            .with_anchors(Anchors::CDF)
            .with_continuity(Continuity::Slope);
        let list = constraint_list(&config);
        assert_eq!(list.len(), 2 + 2 + 2);
        assert_eq!(
            list[0],
            Constraint::Value {
                piece: 0,
                x: 0.0,
                target: 0.0
            }
        );
        assert_eq!(
            list[1],
            Constraint::Value {
                piece: 2,
                x: 1.0,
                target: 1.0
            }
        );
        assert!(matches!(list[2], Constraint::ValueMatch { left: 0, .. }));
        assert!(matches!(list[3], Constraint::ValueMatch { left: 1, .. }));
        assert!(matches!(list[5], Constraint::SlopeMatch { left: 1, .. }));
    }

    #[test]
    fn slope_seams_skipped_for_lines() {
        let config = PiecewiseConfig::new(1, 4).with_continuity(Continuity::Slope);
        let list = constraint_list(&config);
        assert_eq!(list.len(), 3);
        assert!(list.iter().all(|c| matches!(c, Constraint::ValueMatch { .. })));
    }

    #[test]
    fn single_piece_has_no_seams() {
        let config = PiecewiseConfig::new(3, 1).with_continuity(Continuity::Slope);
        assert!(constraint_list(&config).is_empty());
    }

    #[test]
    fn value_match_row_coefficients() {
        let shape = Shape::new(2, 2);
        let row = Constraint::ValueMatch { left: 0, x: 0.5 }.row(shape);
        assert_eq!(row.target, 0.0);
        assert_eq!(
            row.entries,
            vec![(0, 1.0), (3, -1.0), (1, 0.5), (4, -0.5), (2, 0.25), (5, -0.25)]
        );
    }

    #[test]
    fn slope_match_row_skips_constant_column() {
        let shape = Shape::new(2, 2);
        let row = Constraint::SlopeMatch { left: 0, x: 0.5 }.row(shape);
        assert_eq!(row.entries, vec![(1, 1.0), (4, -1.0), (2, 1.0), (5, -1.0)]);
    }

    #[test]
    fn assembled_matrix_shape_and_symmetry() {
        let config = PiecewiseConfig::new(2, 3)
            .with_anchors(Anchors::CDF)
            .with_continuity(Continuity::Slope);
        let acc = filled(config.shape);
        let constraints = constraint_list(&config);
        let system = assemble(&acc, &constraints).unwrap();

        let n = 3 * 3 + constraints.len();
        assert_eq!(system.dimension(), n);
        let m = system.matrix();
        assert_eq!(m.ncols(), n + 1);
        for r in 0..n {
            for c in 0..n {
                assert_eq!(m[(r, c)], m[(c, r)], "asymmetry at ({r}, {c})");
            }
        }
        // Constraint block on the diagonal is zero.
        for r in 9..n {
            for c in 9..n {
                assert_eq!(m[(r, c)], 0.0);
            }
        }
    }

    #[test]
    fn blocks_hold_hankel_power_sums() {
        let shape = Shape::new(1, 2);
        let acc = filled(shape);
        let system = assemble(&acc, &[]).unwrap();
        let m = system.matrix();

        let p1 = acc.piece(1);
        assert_eq!(m[(2, 2)], p1.power_sums()[0]);
        assert_eq!(m[(2, 3)], p1.power_sums()[1]);
        assert_eq!(m[(3, 3)], p1.power_sums()[2]);
        assert_eq!(m[(3, 4)], p1.moments()[1]);
        // Off-diagonal blocks are empty.
        assert_eq!(m[(0, 2)], 0.0);
        assert_eq!(m[(3, 1)], 0.0);
    }

    #[test]
    fn constraint_rows_land_where_reported() {
        let config = PiecewiseConfig::new(1, 2).with_anchors(Anchors {
            start: None,
            end: Some(0.75),
        });
        let acc = filled(config.shape);
        let constraints = constraint_list(&config);
        let system = assemble(&acc, &constraints).unwrap();

        let r = system.constraint_row_index(0);
        assert_eq!(r, 4);
        let m = system.matrix();
        // End anchor on piece 1 at x = 1: columns 2 and 3 get [1, 1].
        assert_eq!(m[(r, 2)], 1.0);
        assert_eq!(m[(r, 3)], 1.0);
        assert_eq!(m[(r, 0)], 0.0);
        assert_eq!(m[(r, 5)], 0.75);
        assert_eq!(system.constraints()[0].describe(), "p1(1) = 0.75");
    }

    #[test]
    fn out_of_range_constraint_is_rejected() {
        let acc = filled(Shape::new(1, 2));
        let bad = [Constraint::ValueMatch { left: 1, x: 1.0 }];
        assert!(matches!(assemble(&acc, &bad), Err(FitError::InvalidConfig(_))));
    }
}
