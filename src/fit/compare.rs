//! Runs the requested routes against one dataset and cross-checks the
//! coefficients they return.

use crate::domain::{
    Agreement, Coefficients, Dataset, FitQuality, FitRoute, RouteFit, RouteSpec,
};
use crate::error::AppError;
use crate::fit::routes::{fit_formula, fit_lstsq, fit_pinv};
use crate::math::{design_matrix, outcome_vector};

/// Everything a fit run produces: per-route coefficients, skipped routes
/// with their reasons, the pairwise agreement verdict, and fit quality for
/// the consensus line.
#[derive(Debug, Clone)]
pub struct RouteComparison {
    /// The fit whose coefficients downstream consumers should use.
    pub consensus: RouteFit,
    pub fits: Vec<RouteFit>,
    pub skipped: Vec<(FitRoute, String)>,
    /// `None` when fewer than two routes produced coefficients.
    pub agreement: Option<Agreement>,
    pub quality: FitQuality,
}

/// Fits the dataset with every route in `spec` and compares the results.
///
/// With a single requested route any failure is fatal. With several, a
/// failing route is recorded as skipped and the rest carry on; the run only
/// fails if no route at all produced coefficients.
pub fn run_routes(
    dataset: &Dataset,
    spec: RouteSpec,
    tol: f64,
) -> Result<RouteComparison, AppError> {
    if dataset.is_empty() {
        return Err(AppError::no_data("No observations to fit."));
    }
    if !(tol.is_finite() && tol > 0.0) {
        return Err(AppError::usage(format!(
            "Agreement tolerance must be a positive number, got {tol}."
        )));
    }

    let design = design_matrix(&dataset.xs());
    let outcomes = outcome_vector(&dataset.ys());

    let routes = spec.routes();
    let multi = routes.len() > 1;
    let mut fits: Vec<RouteFit> = Vec::new();
    let mut skipped: Vec<(FitRoute, String)> = Vec::new();

    for route in routes {
        let outcome = match route {
            FitRoute::Formula => fit_formula(dataset).map(|coefficients| RouteFit {
                route,
                coefficients,
                diagnostics: None,
            }),
            FitRoute::Lstsq => {
                fit_lstsq(&design, &outcomes).map(|(coefficients, diagnostics)| RouteFit {
                    route,
                    coefficients,
                    diagnostics: Some(diagnostics),
                })
            }
            FitRoute::Pinv => fit_pinv(&design, &outcomes).map(|coefficients| RouteFit {
                route,
                coefficients,
                diagnostics: None,
            }),
        };
        match outcome {
            Ok(fit) => fits.push(fit),
            Err(err) if multi => skipped.push((route, err.to_string())),
            Err(err) => return Err(err),
        }
    }

    if fits.is_empty() {
        return Err(AppError::runtime(
            "All fit routes failed; no coefficients to report.",
        ));
    }

    let agreement = if fits.len() >= 2 {
        let mut max_abs_diff: f64 = 0.0;
        for (i, a) in fits.iter().enumerate() {
            for b in &fits[i + 1..] {
                max_abs_diff = max_abs_diff.max(a.coefficients.max_abs_diff(&b.coefficients));
            }
        }
        Some(Agreement {
            max_abs_diff,
            tol,
            within_tol: max_abs_diff <= tol,
        })
    } else {
        None
    };

    // Prefer lstsq as the consensus: it is the only route that also carries
    // rank and singular-value diagnostics.
    let consensus = fits
        .iter()
        .find(|f| f.route == FitRoute::Lstsq)
        .unwrap_or(&fits[0])
        .clone();

    let quality = compute_quality(dataset, &consensus.coefficients);

    Ok(RouteComparison {
        consensus,
        fits,
        skipped,
        agreement,
        quality,
    })
}

fn compute_quality(dataset: &Dataset, coefficients: &Coefficients) -> FitQuality {
    let n = dataset.len();
    let y_mean = dataset.observations.iter().map(|o| o.y).sum::<f64>() / n as f64;

    let mut sse = 0.0;
    let mut ss_tot = 0.0;
    for obs in &dataset.observations {
        let resid = obs.y - coefficients.predict(obs.x);
        sse += resid * resid;
        let dy = obs.y - y_mean;
        ss_tot += dy * dy;
    }

    let rmse = (sse / n as f64).sqrt();
    let r_squared = if ss_tot > 0.0 {
        1.0 - sse / ss_tot
    } else if sse == 0.0 {
        1.0
    } else {
        0.0
    };

    FitQuality {
        sse,
        rmse,
        r_squared,
        n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Observation;

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
    fn routes_agree_on_clean_line() {
        let dataset = dataset_from_pairs(&[(1.0, 2.0), (2.0, 4.0), (3.0, 6.0)]);
        let cmp = run_routes(&dataset, RouteSpec::All, 1e-6).unwrap();

        assert_eq!(cmp.fits.len(), 3);
        assert!(cmp.skipped.is_empty());
        let agreement = cmp.agreement.unwrap();
        assert!(agreement.within_tol, "max diff {}", agreement.max_abs_diff);

        let c = cmp.consensus.coefficients;
        assert!(c.intercept.abs() < 1e-9);
        assert!((c.slope - 2.0).abs() < 1e-9);

        let diag = cmp.consensus.diagnostics.as_ref().unwrap();
        assert_eq!(diag.rank, 2);
        assert!(diag.ss_resid.unwrap() < 1e-9);
        assert!(cmp.quality.sse < 1e-9);
        assert!((cmp.quality.r_squared - 1.0).abs() < 1e-9);
    }

    #[test]
    fn routes_agree_on_noisy_data() {
        let dataset = dataset_from_pairs(&[
            (10.0, 8.2),
            (20.0, 12.1),
            (30.0, 13.9),
            (40.0, 18.4),
            (50.0, 21.7),
        ]);
        let cmp = run_routes(&dataset, RouteSpec::All, 1e-6).unwrap();
        let agreement = cmp.agreement.unwrap();
        assert!(agreement.within_tol, "max diff {}", agreement.max_abs_diff);
        assert!(cmp.quality.r_squared > 0.9);
    }

    #[test]
    fn constant_predictor_diverges_by_route() {
        // Every x identical: the formula route bails out, lstsq sees rank 1
        // and withholds the residual sum, pinv returns the minimum-norm
        // pair. For x = 1 and y = 3 that pair is (1.5, 1.5).
        let dataset = dataset_from_pairs(&[(1.0, 3.0), (1.0, 3.0), (1.0, 3.0)]);
        let cmp = run_routes(&dataset, RouteSpec::All, 1e-6).unwrap();

        assert_eq!(cmp.skipped.len(), 1);
        assert_eq!(cmp.skipped[0].0, FitRoute::Formula);
        assert_eq!(cmp.fits.len(), 2);

        let lstsq = cmp
            .fits
            .iter()
            .find(|f| f.route == FitRoute::Lstsq)
            .unwrap();
        let diag = lstsq.diagnostics.as_ref().unwrap();
        assert_eq!(diag.rank, 1);
        assert!(diag.ss_resid.is_none());

        let pinv = cmp.fits.iter().find(|f| f.route == FitRoute::Pinv).unwrap();
        for fit in [lstsq, pinv] {
            assert!(fit.coefficients.intercept.is_finite());
            assert!(fit.coefficients.slope.is_finite());
            assert!((fit.coefficients.intercept - 1.5).abs() < 1e-9);
            assert!((fit.coefficients.slope - 1.5).abs() < 1e-9);
        }

        // Both surviving routes hand back the same minimum-norm solution.
        assert!(cmp.agreement.unwrap().within_tol);
    }

    #[test]
    fn single_route_failure_is_fatal() {
        let dataset = dataset_from_pairs(&[(1.0, 3.0), (1.0, 3.0), (1.0, 3.0)]);
        let err = run_routes(&dataset, RouteSpec::Formula, 1e-6).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn nonpositive_tolerance_is_rejected() {
        let dataset = dataset_from_pairs(&[(1.0, 2.0), (2.0, 4.0)]);
        let err = run_routes(&dataset, RouteSpec::All, 0.0).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn repeated_runs_are_bit_identical() {
        let dataset = dataset_from_pairs(&[
            (230.1, 22.1),
            (44.5, 10.4),
            (17.2, 9.3),
            (151.5, 18.5),
            (180.8, 12.9),
        ]);
        let a = run_routes(&dataset, RouteSpec::All, 1e-6).unwrap();
        let b = run_routes(&dataset, RouteSpec::All, 1e-6).unwrap();

        for (fa, fb) in a.fits.iter().zip(&b.fits) {
            assert_eq!(
                fa.coefficients.intercept.to_bits(),
                fb.coefficients.intercept.to_bits()
            );
            assert_eq!(
                fa.coefficients.slope.to_bits(),
                fb.coefficients.slope.to_bits()
            );
        }
        assert_eq!(
            a.quality.sse.to_bits(),
            b.quality.sse.to_bits()
        );
    }
}
