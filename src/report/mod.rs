//! Reporting utilities: residuals and rankings.

use crate::domain::{Coefficients, Dataset, PointResidual};
use crate::error::AppError;

pub mod format;

pub use format::*;

/// Over/under-performer rankings (top-N each side).
#[derive(Debug, Clone)]
pub struct Rankings {
    pub over: Vec<PointResidual>,
    pub under: Vec<PointResidual>,
}

/// Compute fitted values and residuals for each observation.
pub fn compute_residuals(
    dataset: &Dataset,
    coefficients: &Coefficients,
) -> Result<Vec<PointResidual>, AppError> {
    let mut out = Vec::with_capacity(dataset.len());
    for obs in &dataset.observations {
        let y_fit = coefficients.predict(obs.x);
        if !y_fit.is_finite() {
            return Err(AppError::runtime(
                "Non-finite prediction during residual computation.",
            ));
        }
        let residual = obs.y - y_fit;
        out.push(PointResidual {
            observation: obs.clone(),
            y_fit,
            residual,
        });
    }
    Ok(out)
}

/// Rank the top over- and under-performers by residual.
pub fn rank_over_under(residuals: &[PointResidual], top_n: usize) -> Rankings {
    let mut sorted = residuals.to_vec();
    sorted.sort_by(|a, b| {
        b.residual
            .partial_cmp(&a.residual)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let over = sorted.iter().take(top_n).cloned().collect();

    let mut sorted_under = residuals.to_vec();
    sorted_under.sort_by(|a, b| {
        a.residual
            .partial_cmp(&b.residual)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let under = sorted_under.iter().take(top_n).cloned().collect();

    Rankings { over, under }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Observation;

    fn dataset() -> Dataset {
        Dataset {
            observations: vec![
                Observation {
                    label: "P1".to_string(),
                    x: 1.0,
                    y: 100.0,
                },
                Observation {
                    label: "P2".to_string(),
                    x: 2.0,
                    y: 105.0,
                },
                Observation {
                    label: "P3".to_string(),
                    x: 3.0,
                    y: 95.0,
                },
            ],
            x_name: "TV".to_string(),
            y_name: "sales".to_string(),
        }
    }

    #[test]
    fn compute_residuals_basic() {
        let c = Coefficients {
            intercept: 100.0,
            slope: 0.0,
        };
        let residuals = compute_residuals(&dataset(), &c).unwrap();
        assert_eq!(residuals.len(), 3);
        assert!((residuals[0].residual - 0.0).abs() < 1e-12);
        assert!((residuals[1].residual - 5.0).abs() < 1e-12);
        assert!((residuals[2].residual + 5.0).abs() < 1e-12);
    }

    #[test]
    fn rank_over_under_basic() {
        let c = Coefficients {
            intercept: 100.0,
            slope: 0.0,
        };
        let residuals = compute_residuals(&dataset(), &c).unwrap();
        let rankings = rank_over_under(&residuals, 1);

        assert_eq!(rankings.over.len(), 1);
        assert_eq!(rankings.over[0].observation.label, "P2");
        assert_eq!(rankings.under.len(), 1);
        assert_eq!(rankings.under[0].observation.label, "P3");
    }
}
