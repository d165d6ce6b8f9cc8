//! Monomial basis helpers shared by accumulation, constraint rows and evaluation.
//!
//! Conventions:
//!
//! - "power rows" are in **ascending** power order: `[1, x, x^2, ...]`. This is
//!   the column order of a piece's block in the normal equations.
//! - stored coefficient tables are in **descending** power order so they can be
//!   fed straight into Horner's scheme.
//!
//! Piece selection is a single pure function so ingestion and evaluation can
//! never disagree about which piece owns a point.

/// Index of the piece owning `x` among `pieces` equal-width pieces of `[0, 1]`.
///
/// `clamp(floor(x * pieces), 0, pieces - 1)`: `x = 1.0` belongs to the last piece,
/// anything at or below zero (and NaN) to the first.
///
/// # Panics
/// Panics if `pieces == 0`. Shapes are validated on construction and on deserialization.
pub fn piece_index(x: f64, pieces: usize) -> usize {
    assert!(pieces > 0, "piece_index needs at least one piece");
    if !(x > 0.0) {
        return 0;
    }
    let scaled = (x * pieces as f64).floor();
    if scaled >= pieces as f64 {
        pieces - 1
    } else {
        scaled as usize
    }
}

/// Fill `out` with ascending powers of `x`: `out[k] = x^k`.
pub fn fill_power_row(x: f64, out: &mut [f64]) {
    let mut xpow = 1.0;
    for v in out.iter_mut() {
        *v = xpow;
        xpow *= x;
    }
}

/// Fill `out` with the derivative of the ascending power row: `out[k] = k * x^(k-1)`.
pub fn fill_slope_row(x: f64, out: &mut [f64]) {
    let mut xpow = 1.0;
    for (k, v) in out.iter_mut().enumerate() {
        if k == 0 {
            *v = 0.0;
            continue;
        }
        *v = k as f64 * xpow;
        xpow *= x;
    }
}

/// Evaluate a polynomial stored highest power first.
pub fn horner(coefs: &[f64], x: f64) -> f64 {
    let mut acc = 0.0;
    for &c in coefs {
        acc = f64::mul_add(acc, x, c);
    }
    acc
}

/// First derivative of a polynomial stored highest power first.
pub fn horner_derivative(coefs: &[f64], x: f64) -> f64 {
    let Some(order) = coefs.len().checked_sub(1) else {
        return 0.0;
    };
    let mut acc = 0.0;
    for (i, &c) in coefs[..order].iter().enumerate() {
        let power = (order - i) as f64;
        acc = f64::mul_add(acc, x, power * c);
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piece_index_edges() {
        assert_eq!(piece_index(0.0, 4), 0);
        assert_eq!(piece_index(1.0, 4), 3);
        assert_eq!(piece_index(0.25, 4), 1);
        assert_eq!(piece_index(0.2499, 4), 0);
        assert_eq!(piece_index(-3.0, 4), 0);
        assert_eq!(piece_index(7.0, 4), 3);
        assert_eq!(piece_index(f64::NAN, 4), 0);
        assert_eq!(piece_index(0.7, 1), 0);
    }

    #[test]
    fn power_and_slope_rows() {
        let mut row = [0.0; 4];
        fill_power_row(2.0, &mut row);
        assert_eq!(row, [1.0, 2.0, 4.0, 8.0]);

        fill_slope_row(2.0, &mut row);
        assert_eq!(row, [0.0, 1.0, 4.0, 12.0]);
    }

    #[test]
    fn horner_matches_direct_sum() {
        // 2x^3 - x + 5
        let coefs = [2.0, 0.0, -1.0, 5.0];
        for &x in &[0.0, 0.3, 1.0, -2.0] {
            let direct = 2.0 * x * x * x - x + 5.0;
            assert!((horner(&coefs, x) - direct).abs() < 1e-12);
            let slope = 6.0 * x * x - 1.0;
            assert!((horner_derivative(&coefs, x) - slope).abs() < 1e-12);
        }
    }

    #[test]
    fn constant_has_zero_slope() {
        assert_eq!(horner_derivative(&[4.0], 0.5), 0.0);
        assert_eq!(horner_derivative(&[], 0.5), 0.0);
        assert_eq!(horner(&[4.0], 0.5), 4.0);
    }
}
