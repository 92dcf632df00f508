//! Least-squares polynomial fitting.

use crate::error::{AnalysisError, AnalysisResult};

/// A polynomial fitted by least squares.
///
/// The fit is solved in a centred and scaled abscissa so that walker
/// counts spanning several decades stay well conditioned.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    /// Coefficients in the normalised abscissa, lowest power first.
    normalized: Vec<f64>,
    center: f64,
    scale: f64,
}

impl Polynomial {
    /// Fit a polynomial of the given degree to `(xs, ys)`.
    pub fn fit(xs: &[f64], ys: &[f64], degree: usize) -> AnalysisResult<Self> {
        if xs.len() != ys.len() {
            return Err(AnalysisError::LengthMismatch {
                what: "fit ordinates",
                expected: xs.len(),
                found: ys.len(),
            });
        }
        if xs.len() <= degree {
            return Err(AnalysisError::Underdetermined {
                degree,
                points: xs.len(),
            });
        }

        let center = xs.iter().sum::<f64>() / xs.len() as f64;
        let spread = xs.iter().map(|x| (x - center).abs()).fold(0.0, f64::max);
        let scale = if spread > 0.0 { spread } else { 1.0 };

        // Normal equations: (VᵀV) a = Vᵀy with V the Vandermonde matrix.
        let n = degree + 1;
        let mut matrix = vec![vec![0.0; n + 1]; n];
        for (&x, &y) in xs.iter().zip(ys) {
            let t = (x - center) / scale;
            let powers: Vec<f64> = (0..2 * n - 1)
                .scan(1.0, |acc, _| {
                    let current = *acc;
                    *acc *= t;
                    Some(current)
                })
                .collect();
            for (row, coefficients) in matrix.iter_mut().enumerate() {
                for (col, entry) in coefficients.iter_mut().take(n).enumerate() {
                    *entry += powers[row + col];
                }
                coefficients[n] += powers[row] * y;
            }
        }

        let normalized = solve(matrix)?;
        Ok(Self {
            normalized,
            center,
            scale,
        })
    }

    /// Degree of the polynomial.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.normalized.len() - 1
    }

    /// Evaluate the polynomial at `x`.
    #[must_use]
    pub fn eval(&self, x: f64) -> f64 {
        let t = (x - self.center) / self.scale;
        self.normalized.iter().rev().fold(0.0, |acc, c| acc * t + c)
    }

    /// Coefficients in `x`, highest power first.
    #[must_use]
    pub fn coefficients(&self) -> Vec<f64> {
        // Horner composition with the linear map t = (x - center) / scale.
        let mut ascending: Vec<f64> = Vec::with_capacity(self.normalized.len());
        for &c in self.normalized.iter().rev() {
            let mut next = vec![0.0; ascending.len() + 1];
            for (i, &a) in ascending.iter().enumerate() {
                next[i] -= a * self.center / self.scale;
                next[i + 1] += a / self.scale;
            }
            next[0] += c;
            ascending = next;
        }
        ascending.reverse();
        ascending
    }
}

/// Solve an augmented linear system by Gaussian elimination with partial
/// pivoting.
fn solve(mut matrix: Vec<Vec<f64>>) -> AnalysisResult<Vec<f64>> {
    let n = matrix.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&a, &b| matrix[a][col].abs().total_cmp(&matrix[b][col].abs()))
            .unwrap_or(col);
        if matrix[pivot][col].abs() < 1e-12 {
            return Err(AnalysisError::Singular);
        }
        matrix.swap(col, pivot);

        let pivot_row = matrix[col].clone();
        for row in &mut matrix[col + 1..] {
            let factor = row[col] / pivot_row[col];
            for (entry, &p) in row.iter_mut().zip(&pivot_row).skip(col) {
                *entry -= factor * p;
            }
        }
    }

    let mut solution = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| matrix[row][k] * solution[k]).sum();
        solution[row] = (matrix[row][n] - tail) / matrix[row][row];
    }
    Ok(solution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn assert_close(a: f64, b: f64, tolerance: f64) {
        assert!((a - b).abs() <= tolerance, "{a} != {b}");
    }

    #[test]
    fn linear_fit_recovers_line() {
        let xs = [1.0, 10.0, 100.0, 1000.0, 10_000.0];
        let ys: Vec<f64> = xs.iter().map(|x| 0.002 * x + 1.5).collect();
        let p = Polynomial::fit(&xs, &ys, 1).unwrap();

        let c = p.coefficients();
        assert_eq!(c.len(), 2);
        assert_close(c[0], 0.002, 1e-12);
        assert_close(c[1], 1.5, 1e-9);
        assert_close(p.eval(1e6), 2001.5, 1e-6);
    }

    #[test]
    fn linear_fit_of_noisy_points_minimises_residuals() {
        // Same data as numpy.polyfit([0, 1, 2, 3], [1, 3, 2, 5], 1).
        let p = Polynomial::fit(&[0.0, 1.0, 2.0, 3.0], &[1.0, 3.0, 2.0, 5.0], 1).unwrap();
        let c = p.coefficients();
        assert_close(c[0], 1.1, 1e-12);
        assert_close(c[1], 1.1, 1e-12);
    }

    #[test]
    fn quadratic_fit_is_exact_on_quadratic_data() {
        let xs = [-2.0, -1.0, 0.0, 1.0, 2.0, 3.0];
        let ys: Vec<f64> = xs.iter().map(|x| 3.0 * x * x - 2.0 * x + 0.5).collect();
        let p = Polynomial::fit(&xs, &ys, 2).unwrap();
        assert_eq!(p.degree(), 2);
        for (got, want) in p.coefficients().into_iter().zip([3.0, -2.0, 0.5]) {
            assert_close(got, want, 1e-9);
        }
    }

    #[test]
    fn rejects_bad_inputs() {
        assert!(matches!(
            Polynomial::fit(&[1.0], &[1.0], 1),
            Err(AnalysisError::Underdetermined { .. })
        ));
        assert!(matches!(
            Polynomial::fit(&[1.0, 2.0], &[1.0], 1),
            Err(AnalysisError::LengthMismatch { .. })
        ));
        assert!(matches!(
            Polynomial::fit(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0], 1),
            Err(AnalysisError::Singular)
        ));
    }

    proptest! {
        #[test]
        fn eval_matches_expanded_coefficients(
            slope in -100.0f64..100.0,
            intercept in -100.0f64..100.0,
            x in 0.0f64..1e4,
        ) {
            let xs = [1.0, 10.0, 100.0, 1000.0];
            let ys: Vec<f64> = xs.iter().map(|x| slope * x + intercept).collect();
            let p = Polynomial::fit(&xs, &ys, 1).unwrap();
            let c = p.coefficients();
            let expanded = c[0] * x + c[1];
            prop_assert!((p.eval(x) - expanded).abs() <= 1e-6 * (1.0 + expanded.abs()));
            prop_assert!((p.eval(x) - (slope * x + intercept)).abs() <= 1e-6 * (1.0 + expanded.abs()));
        }
    }
}
