//! SVD least-squares and pseudo-inverse solvers.
//!
//! Both solvers share one rank cutoff so their notion of "numerically zero"
//! singular values stays consistent:
//!
//! ```text
//! eps = s_max * machine_epsilon * max(n_rows, n_cols)
//! ```
//!
//! With singular values at or below `eps` zeroed out, the SVD solve and the
//! pseudo-inverse multiply both return the minimum-norm least-squares
//! solution, even when the design matrix is rank deficient.

use nalgebra::{DMatrix, DVector};

use crate::error::AppError;

/// Full output of an SVD least-squares solve.
#[derive(Debug, Clone)]
pub struct LstsqSolution {
    /// Solution vector in design-matrix column order.
    pub solution: DVector<f64>,
    /// Sum of squared residuals; `None` below full column rank.
    pub ss_resid: Option<f64>,
    /// Numerical rank of the design matrix.
    pub rank: usize,
    /// Singular values in decreasing order.
    pub singular_values: Vec<f64>,
}

/// Relative rank cutoff derived from the singular spectrum.
fn rank_eps(singular_values: &[f64], nrows: usize, ncols: usize) -> f64 {
    let s_max = singular_values.iter().copied().fold(0.0_f64, f64::max);
    s_max * f64::EPSILON * nrows.max(ncols) as f64
}

/// Solve a least-squares problem via SVD, reporting rank diagnostics.
pub fn solve_lstsq(design: &DMatrix<f64>, outcomes: &DVector<f64>) -> Result<LstsqSolution, AppError> {
    let (nrows, ncols) = design.shape();
    let svd = design.clone().svd(true, true);
    let singular_values: Vec<f64> = svd.singular_values.iter().copied().collect();
    let eps = rank_eps(&singular_values, nrows, ncols);
    let rank = svd.rank(eps);

    let solution = svd
        .solve(outcomes, eps)
        .map_err(|e| AppError::runtime(format!("SVD solve failed: {e}")))?;
    if solution.iter().any(|v| !v.is_finite()) {
        return Err(AppError::runtime(
            "SVD solve produced non-finite coefficients.",
        ));
    }

    let ss_resid = if rank == ncols {
        let fitted = design * &solution;
        Some((outcomes - fitted).norm_squared())
    } else {
        None
    };

    Ok(LstsqSolution {
        solution,
        ss_resid,
        rank,
        singular_values,
    })
}

/// Solve via the Moore-Penrose pseudo-inverse: `x = pinv(design) * outcomes`.
///
/// Returns the minimum-norm least-squares solution regardless of rank, with
/// no rank reporting.
pub fn pinv_solve(design: &DMatrix<f64>, outcomes: &DVector<f64>) -> Result<DVector<f64>, AppError> {
    let (nrows, ncols) = design.shape();
    let svd = design.clone().svd(true, true);
    let eps = rank_eps(svd.singular_values.as_slice(), nrows, ncols);

    let pinv = svd
        .pseudo_inverse(eps)
        .map_err(|e| AppError::runtime(format!("Pseudo-inverse failed: {e}")))?;

    let solution = pinv * outcomes;
    if solution.iter().any(|v| !v.is_finite()) {
        return Err(AppError::runtime(
            "Pseudo-inverse produced non-finite coefficients.",
        ));
    }
    Ok(solution)
}
