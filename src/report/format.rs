//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized

use crate::app::pipeline::RunOutput;
use crate::domain::{CurveFile, PiecewisePolynomial, RunConfig};
use crate::fit::selection::FitSelection;

/// One piece's polynomial, highest power first, e.g. `1.500000x^2 - 0.250000x + 0.000000`.
pub fn format_polynomial(coefs_desc: &[f64]) -> String {
    let degree = coefs_desc.len().saturating_sub(1);
    let mut out = String::new();

    for (i, &c) in coefs_desc.iter().enumerate() {
        let power = degree - i;
        let term = match power {
            0 => format!("{:.6}", c.abs()),
            1 => format!("{:.6}x", c.abs()),
            p => format!("{:.6}x^{p}", c.abs()),
        };
        if i == 0 {
            if c.is_sign_negative() && c != 0.0 {
                out.push('-');
            }
        } else {
            out.push_str(if c.is_sign_negative() && c != 0.0 { " - " } else { " + " });
        }
        out.push_str(&term);
    }

    out
}

/// One line per piece: its x range and formula.
pub fn format_formulas(model: &PiecewisePolynomial) -> String {
    let shape = model.shape();
    let mut out = String::new();
    for (k, coefs) in model.iter_pieces().enumerate() {
        let (x0, x1) = shape.piece_bounds(k);
        let close = if k + 1 == shape.pieces { ']' } else { ')' };
        out.push_str(&format!("  [{x0:.4}, {x1:.4}{close}  y = {}\n", format_polynomial(coefs)));
    }
    out
}

/// The selection candidate table, chosen row marked with `*`.
pub fn format_candidates(selection: &FitSelection) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "  {:>5} {:>6} {:>12} {:>12} {:>12}\n",
        "order", "pieces", "score", "rmse", "max_err"
    ));
    for fit in &selection.candidates {
        let chosen = if fit.config.shape == selection.best.config.shape { "*" } else { " " };
        out.push_str(&format!(
            "{chosen} {:>5} {:>6} {:>12.4e} {:>12.4e} {:>12.4e}\n",
            fit.config.order(),
            fit.config.pieces(),
            fit.quality.score,
            fit.quality.rmse,
            fit.quality.max_abs_error,
        ));
    }
    for (shape, reason) in &selection.skipped {
        out.push_str(&format!("  (skipped {shape}) {reason}\n"));
    }
    out
}

/// Format the full run summary (samples + CDF + fit diagnostics + chosen curve).
pub fn format_run_summary(run: &RunOutput, config: &RunConfig) -> String {
    let mut out = String::new();
    let best = &run.best;

    out.push_str("=== cdf - piecewise polynomial CDF fit ===\n");
    out.push_str(&format!("Samples: {}\n", run.input.origin));
    out.push_str(&format!(
        "Points: n={} | x=[{:.4}, {:.4}] | mean={:.4}\n",
        run.input.stats.n, run.input.stats.min, run.input.stats.max, run.input.stats.mean
    ));
    if !run.input.row_errors.is_empty() {
        out.push_str(&format!(
            "Rows: read={} skipped={}\n",
            run.input.rows_read,
            run.input.row_errors.len()
        ));
        for e in run.input.row_errors.iter().take(5) {
            out.push_str(&format!("  line {}: {}\n", e.line, e.message));
        }
    }
    out.push_str(&format!(
        "ECDF: buckets={} | fit points={} | reference percentiles={}\n",
        run.ecdf.buckets(),
        run.fit_points,
        config.reference_len
    ));

    let anchors = match (best.config.anchors.start, best.config.anchors.end) {
        (None, None) => "none".to_string(),
        (s, e) => format!(
            "f(0)={} f(1)={}",
            s.map(|v| v.to_string()).unwrap_or_else(|| "free".to_string()),
            e.map(|v| v.to_string()).unwrap_or_else(|| "free".to_string())
        ),
    };
    out.push_str(&format!(
        "Constraints: anchors {anchors} | continuity {}\n",
        best.config.continuity.display_name()
    ));

    if let Some(selection) = &run.selection {
        out.push_str("\nCandidates:\n");
        out.push_str(&format_candidates(selection));
    }

    out.push_str(&format!("\nChosen curve ({}):\n", best.config.shape));
    out.push_str(&format_formulas(&best.model));
    out.push_str(&format!(
        "- score={:.4e} rmse={:.4e} max_err={:.4e} (n={})\n",
        best.quality.score, best.quality.rmse, best.quality.max_abs_error, best.quality.n_reference
    ));

    out
}

/// `x -> y` table for the `eval` command.
pub fn format_evaluations(curve: &CurveFile, xs: &[f64]) -> String {
    let mut out = String::new();
    out.push_str(&format!("Curve: {} ({})\n", curve.config.shape, curve.generated_at.format("%Y-%m-%d %H:%M:%S UTC")));
    out.push_str(&format!("{:>10} {:>14} {:>14}\n", "x", "y", "dy/dx"));
    for &x in xs {
        out.push_str(&format!(
            "{x:>10.4} {:>14.8} {:>14.8}\n",
            curve.model.evaluate(x),
            curve.model.derivative(x)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitQuality, FitResult, PiecewiseConfig, Shape};
    use crate::error::FitError;

    #[test]
    fn polynomial_signs_and_powers() {
        assert_eq!(
            format_polynomial(&[1.5, -0.25, 0.0]),
            "1.500000x^2 - 0.250000x + 0.000000"
        );
        assert_eq!(format_polynomial(&[-2.0, 1.0]), "-2.000000x + 1.000000");
        assert_eq!(format_polynomial(&[0.5]), "0.500000");
    }

    #[test]
    fn formulas_close_the_last_piece() {
        let model = PiecewisePolynomial::from_coefficients(Shape::new(1, 2), vec![2.0, 1.0, -1.0, 2.5]).unwrap();
        let text = format_formulas(&model);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("  [0.0000, 0.5000)"));
        assert!(lines[1].starts_with("  [0.5000, 1.0000]"));
        assert!(lines[1].ends_with("-1.000000x + 2.500000"));
    }

    #[test]
    fn candidate_table_marks_best_and_skips() {
        let model = PiecewisePolynomial::from_coefficients(Shape::new(1, 1), vec![1.0, 0.0]).unwrap();
        let fit = FitResult {
            config: PiecewiseConfig::new(1, 1),
            model,
            quality: FitQuality {
                score: 1e-4,
                rmse: 1e-2,
                max_abs_error: 0.03,
                n_reference: 11,
            },
        };
        let selection = FitSelection {
            best: fit.clone(),
            candidates: vec![fit],
            skipped: vec![(
                Shape::new(1, 2),
                FitError::SingularSystem {
                    column: 2,
                    pivot: 0.0,
                    piece: Some(1),
                },
            )],
        };
        let text = format_candidates(&selection);
        assert!(text.lines().nth(1).unwrap().starts_with('*'));
        assert!(text.contains("(skipped order=1, pieces=2)"));
        assert!(text.contains("piece 1"));
    }
}
