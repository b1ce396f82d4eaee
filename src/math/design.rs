//! Design-matrix construction for the straight-line model.

use nalgebra::{DMatrix, DVector};

/// Build the `n x 2` design matrix `[x, 1]`.
///
/// Column 0 holds the predictor values; column 1 is the constant bias column
/// appended after it. Row order matches the input order.
pub fn design_matrix(xs: &[f64]) -> DMatrix<f64> {
    let n = xs.len();
    let mut design = DMatrix::<f64>::zeros(n, 2);
    for (i, &x) in xs.iter().enumerate() {
        design[(i, 0)] = x;
        design[(i, 1)] = 1.0;
    }
    design
}

/// Outcome values as a column vector, row order preserved.
pub fn outcome_vector(ys: &[f64]) -> DVector<f64> {
    DVector::from_column_slice(ys)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn design_matrix_appends_bias_column() {
        let design = design_matrix(&[10.0, 20.0, 30.0]);
        assert_eq!(design.shape(), (3, 2));
        assert_eq!(design[(0, 0)], 10.0);
        assert_eq!(design[(1, 0)], 20.0);
        assert_eq!(design[(2, 0)], 30.0);
        for i in 0..3 {
            assert_eq!(design[(i, 1)], 1.0);
        }
    }

    #[test]
    fn outcome_vector_preserves_order() {
        let y = outcome_vector(&[2.0, 4.0, 6.0]);
        assert_eq!(y.len(), 3);
        assert_eq!(y[0], 2.0);
        assert_eq!(y[2], 6.0);
    }
}
