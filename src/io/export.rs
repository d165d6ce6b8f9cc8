//! Export the coefficient table to CSV.
//!
//! One row per piece: its x range, then the coefficients highest power first
//! (the order lookup-table consumers evaluate them in with Horner's scheme).
//! Values use Rust's shortest round-trip formatting, so nothing is lost.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::PiecewisePolynomial;
use crate::error::AppError;

/// Write the coefficient table of `model` to a CSV file.
pub fn write_coefficients_csv(path: &Path, model: &PiecewisePolynomial) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_coefficients(file, model)
}

/// Same as [`write_coefficients_csv`], into any writer.
pub fn write_coefficients<W: Write>(mut out: W, model: &PiecewisePolynomial) -> Result<(), AppError> {
    let shape = model.shape();

    let powers: Vec<String> = (0..=shape.order).rev().map(|p| format!("c{p}")).collect();
    writeln!(out, "piece,x_start,x_end,{}", powers.join(","))
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for (k, coefs) in model.iter_pieces().enumerate() {
        let (x0, x1) = shape.piece_bounds(k);
        let cells: Vec<String> = coefs.iter().map(|c| c.to_string()).collect();
        writeln!(out, "{k},{x0},{x1},{}", cells.join(","))
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Shape;

    #[test]
    fn table_has_one_row_per_piece() {
        let model = PiecewisePolynomial::from_coefficients(Shape::new(1, 2), vec![2.0, 1.0, -1.0, 2.5]).unwrap();
        let mut buf = Vec::new();
        write_coefficients(&mut buf, &model).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["piece,x_start,x_end,c1,c0", "0,0,0.5,2,1", "1,0.5,1,-1,2.5"]);
    }

    #[test]
    fn writes_file() {
        let model = PiecewisePolynomial::from_coefficients(Shape::new(0, 1), vec![0.125]).unwrap();
        let path = std::env::temp_dir().join(format!("cdf_curves_export_{}.csv", std::process::id()));
        write_coefficients_csv(&path, &model).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("0,0,1,0.125\n"));
        let _ = std::fs::remove_file(&path);
    }
}
