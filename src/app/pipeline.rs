//! Shared "fit pipeline" logic used by every front-end command.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load dataset -> run routes -> cross-check -> residuals -> rankings
//!
//! The command handlers can then focus on presentation (printing vs files).

use crate::data::{fetch_csv, generate_sample};
use crate::domain::{FitConfig, PointResidual};
use crate::error::AppError;
use crate::fit::RouteComparison;
use crate::io::ingest::{IngestedData, from_dataset, read_dataset, read_dataset_from_path};
use crate::report::Rankings;

/// All computed outputs of a single `ols fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedData,
    pub comparison: RouteComparison,
    pub residuals: Vec<PointResidual>,
    pub rankings: Rankings,
}

/// Execute the full fitting pipeline and return the computed outputs.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    let ingest = load_dataset(config)?;
    run_fit_with_data(config, ingest)
}

/// Resolve the dataset source: synthetic sample > local CSV > remote fetch.
pub fn load_dataset(config: &FitConfig) -> Result<IngestedData, AppError> {
    if config.sample_count.is_some() {
        let dataset = generate_sample(config)?;
        return from_dataset(dataset);
    }

    if let Some(path) = &config.csv_path {
        return read_dataset_from_path(path, &config.x_col, &config.y_col);
    }

    let body = fetch_csv(&config.url)?;
    read_dataset(body.as_bytes(), &config.x_col, &config.y_col)
}

/// Execute the fitting pipeline with already-loaded data.
///
/// This is useful for callers that want to refit without re-fetching.
pub fn run_fit_with_data(config: &FitConfig, ingest: IngestedData) -> Result<RunOutput, AppError> {
    let comparison = crate::fit::run_routes(&ingest.dataset, config.route_spec, config.tol)?;

    let residuals =
        crate::report::compute_residuals(&ingest.dataset, &comparison.consensus.coefficients)?;
    let rankings = crate::report::rank_over_under(&residuals, config.top_n);

    Ok(RunOutput {
        ingest,
        comparison,
        residuals,
        rankings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RouteSpec;

    fn sample_config() -> FitConfig {
        FitConfig {
            url: String::new(),
            csv_path: None,
            sample_count: Some(30),
            sample_seed: 42,
            x_col: "TV".to_string(),
            y_col: "sales".to_string(),
            route_spec: RouteSpec::All,
            tol: 1e-6,
            top_n: 5,
            plot: false,
            plot_width: 72,
            plot_height: 20,
            export_results: None,
            export_model: None,
        }
    }

    #[test]
    fn sample_pipeline_runs_end_to_end() {
        let run = run_fit(&sample_config()).unwrap();

        assert_eq!(run.ingest.rows_used, 30);
        assert_eq!(run.comparison.fits.len(), 3);
        assert!(run.comparison.agreement.as_ref().unwrap().within_tol);
        assert_eq!(run.residuals.len(), 30);
        assert_eq!(run.rankings.over.len(), 5);
        assert_eq!(run.rankings.under.len(), 5);
    }

    #[test]
    fn sample_pipeline_is_deterministic() {
        let a = run_fit(&sample_config()).unwrap();
        let b = run_fit(&sample_config()).unwrap();
        assert_eq!(
            a.comparison.consensus.coefficients.slope.to_bits(),
            b.comparison.consensus.coefficients.slope.to_bits()
        );
    }
}
