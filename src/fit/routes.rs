//! The three coefficient routes.
//!
//! All three estimate the same line `y = intercept + slope * x`:
//!
//! - `fit_formula`: closed-form simple regression on the dataset columns
//! - `fit_lstsq`: SVD least-squares on an explicit design matrix, with rank
//!   and singular-value diagnostics
//! - `fit_pinv`: pseudo-inverse multiply on the same design matrix
//!
//! At full column rank they agree to numerical precision. When every
//! predictor value is identical they deliberately part ways: the formula
//! route refuses (undefined slope), the lstsq route reports rank 1 and
//! withholds the residual sum, and the pinv route quietly returns the
//! minimum-norm pair.

use nalgebra::{DMatrix, DVector};

use crate::domain::{Coefficients, Dataset, LstsqDiagnostics};
use crate::error::AppError;
use crate::math::{pinv_solve, solve_lstsq};

/// Closed-form simple regression: `slope = cov(x, y) / var(x)`.
pub fn fit_formula(dataset: &Dataset) -> Result<Coefficients, AppError> {
    if dataset.is_empty() {
        return Err(AppError::no_data("No observations to fit."));
    }

    let n = dataset.len() as f64;
    let x_mean = dataset.observations.iter().map(|o| o.x).sum::<f64>() / n;
    let y_mean = dataset.observations.iter().map(|o| o.y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var = 0.0;
    for obs in &dataset.observations {
        let dx = obs.x - x_mean;
        cov += dx * (obs.y - y_mean);
        var += dx * dx;
    }

    // A (near-)constant predictor leaves the slope undefined. Scale the
    // cutoff by the magnitude of the column so it stays meaningful for both
    // tiny and huge predictor units.
    let ss_x: f64 = dataset.observations.iter().map(|o| o.x * o.x).sum();
    if var <= 1e-12 * ss_x.max(1.0) {
        return Err(AppError::usage(format!(
            "Column '{}' has (near-)zero variance; the closed-form slope is undefined.",
            dataset.x_name
        )));
    }

    let slope = cov / var;
    let intercept = y_mean - slope * x_mean;
    if !(slope.is_finite() && intercept.is_finite()) {
        return Err(AppError::runtime(
            "Closed-form fit produced non-finite coefficients.",
        ));
    }

    Ok(Coefficients { intercept, slope })
}

/// SVD least-squares fit on an explicit design matrix.
pub fn fit_lstsq(
    design: &DMatrix<f64>,
    outcomes: &DVector<f64>,
) -> Result<(Coefficients, LstsqDiagnostics), AppError> {
    check_shapes(design, outcomes)?;
    let sol = solve_lstsq(design, outcomes)?;
    let coefficients = coefficients_from_solution(&sol.solution)?;
    let diagnostics = LstsqDiagnostics {
        rank: sol.rank,
        singular_values: sol.singular_values,
        ss_resid: sol.ss_resid,
    };
    Ok((coefficients, diagnostics))
}

/// Pseudo-inverse fit on an explicit design matrix.
pub fn fit_pinv(design: &DMatrix<f64>, outcomes: &DVector<f64>) -> Result<Coefficients, AppError> {
    check_shapes(design, outcomes)?;
    let solution = pinv_solve(design, outcomes)?;
    coefficients_from_solution(&solution)
}

fn check_shapes(design: &DMatrix<f64>, outcomes: &DVector<f64>) -> Result<(), AppError> {
    if design.nrows() == 0 {
        return Err(AppError::no_data("No observations to fit."));
    }
    if design.ncols() != 2 {
        return Err(AppError::usage(format!(
            "Expected a two-column design matrix (predictor + bias), got {} columns.",
            design.ncols()
        )));
    }
    if design.nrows() != outcomes.len() {
        return Err(AppError::usage(format!(
            "Design matrix has {} rows but the outcome vector has {} entries.",
            design.nrows(),
            outcomes.len()
        )));
    }
    Ok(())
}

/// The design matrix orders columns `[x, 1]`, so the raw solution vector
/// is `(slope, intercept)`.
fn coefficients_from_solution(solution: &DVector<f64>) -> Result<Coefficients, AppError> {
    let slope = solution[0];
    let intercept = solution[1];
    if !(slope.is_finite() && intercept.is_finite()) {
        return Err(AppError::runtime("Fit produced non-finite coefficients."));
    }
    Ok(Coefficients { intercept, slope })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Observation;
    use crate::math::{design_matrix, outcome_vector};

    fn dataset_from_pairs(pairs: &[(f64, f64)]) -> Dataset {
        let observations = pairs
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Observation {
                label: format!("P{}", i + 1),
                x,
                y,
            })
            .collect();
        Dataset {
            observations,
            x_name: "TV".to_string(),
            y_name: "sales".to_string(),
        }
    }

    #[test]
    fn formula_recovers_exact_line() {
        let dataset = dataset_from_pairs(&[(1.0, 2.0), (2.0, 4.0), (3.0, 6.0)]);
        let c = fit_formula(&dataset).unwrap();
        assert!(c.intercept.abs() < 1e-12);
        assert!((c.slope - 2.0).abs() < 1e-12);
    }

    #[test]
    fn formula_rejects_constant_predictor() {
        let dataset = dataset_from_pairs(&[(1.0, 3.0), (1.0, 3.0), (1.0, 3.0)]);
        let err = fit_formula(&dataset).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn formula_rejects_empty_dataset() {
        let dataset = dataset_from_pairs(&[]);
        let err = fit_formula(&dataset).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn lstsq_reports_full_rank_diagnostics() {
        let dataset = dataset_from_pairs(&[(1.0, 2.0), (2.0, 4.0), (3.0, 6.0)]);
        let design = design_matrix(&dataset.xs());
        let outcomes = outcome_vector(&dataset.ys());

        let (c, diag) = fit_lstsq(&design, &outcomes).unwrap();
        assert!(c.intercept.abs() < 1e-9);
        assert!((c.slope - 2.0).abs() < 1e-9);
        assert_eq!(diag.rank, 2);
        assert_eq!(diag.singular_values.len(), 2);
        assert!(diag.ss_resid.unwrap() < 1e-9);
    }

    #[test]
    fn pinv_agrees_with_lstsq() {
        let dataset = dataset_from_pairs(&[(1.0, 2.2), (2.0, 3.8), (3.0, 6.1), (4.0, 7.9)]);
        let design = design_matrix(&dataset.xs());
        let outcomes = outcome_vector(&dataset.ys());

        let (a, _) = fit_lstsq(&design, &outcomes).unwrap();
        let b = fit_pinv(&design, &outcomes).unwrap();
        assert!(a.max_abs_diff(&b) < 1e-10);
    }

    #[test]
    fn empty_design_is_no_data() {
        let design = design_matrix(&[]);
        let outcomes = outcome_vector(&[]);
        let err = fit_lstsq(&design, &outcomes).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn mismatched_shapes_are_usage_errors() {
        let design = design_matrix(&[1.0, 2.0, 3.0]);
        let outcomes = outcome_vector(&[1.0, 2.0]);
        let err = fit_pinv(&design, &outcomes).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
