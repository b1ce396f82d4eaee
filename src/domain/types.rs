//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which fit route(s) to run.
///
/// `All` runs every route and cross-checks the results; the single-route
/// variants exist for scripting and skip the agreement check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RouteSpec {
    All,
    Formula,
    Lstsq,
    Pinv,
}

impl RouteSpec {
    /// Concrete routes selected by this spec, in reporting order.
    pub fn routes(self) -> Vec<FitRoute> {
        match self {
            RouteSpec::All => FitRoute::ALL.to_vec(),
            RouteSpec::Formula => vec![FitRoute::Formula],
            RouteSpec::Lstsq => vec![FitRoute::Lstsq],
            RouteSpec::Pinv => vec![FitRoute::Pinv],
        }
    }
}

/// A concrete way of computing the straight-line coefficients.
///
/// All three solve the same problem; they differ in mechanism and in what
/// they report when the design matrix loses rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitRoute {
    /// Closed-form simple-regression formula (centered covariance / variance).
    Formula,
    /// SVD least-squares solve; surfaces rank and singular values.
    Lstsq,
    /// Moore-Penrose pseudo-inverse multiply.
    Pinv,
}

impl FitRoute {
    pub const ALL: [FitRoute; 3] = [FitRoute::Formula, FitRoute::Lstsq, FitRoute::Pinv];

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            FitRoute::Formula => "formula",
            FitRoute::Lstsq => "lstsq",
            FitRoute::Pinv => "pinv",
        }
    }
}

/// A single observation: one row of the source table.
#[derive(Debug, Clone)]
pub struct Observation {
    /// Row label (index column when the source has one, row ordinal otherwise).
    pub label: String,
    /// Predictor value.
    pub x: f64,
    /// Outcome value.
    pub y: f64,
}

/// The loaded dataset, immutable once built.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub observations: Vec<Observation>,
    /// Source column name of the predictor (e.g. `TV`).
    pub x_name: String,
    /// Source column name of the outcome (e.g. `sales`).
    pub y_name: String,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Predictor values in row order.
    pub fn xs(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.x).collect()
    }

    /// Outcome values in row order.
    pub fn ys(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.y).collect()
    }
}

/// Summary stats about the observations actually used for fitting.
#[derive(Debug, Clone)]
pub struct DatasetStats {
    pub n_points: usize,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

/// Fitted straight-line coefficients: `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
    pub intercept: f64,
    pub slope: f64,
}

impl Coefficients {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Largest absolute coefficient difference against another fit.
    pub fn max_abs_diff(&self, other: &Coefficients) -> f64 {
        let di = (self.intercept - other.intercept).abs();
        let ds = (self.slope - other.slope).abs();
        di.max(ds)
    }
}

/// Extra outputs of the SVD least-squares route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LstsqDiagnostics {
    /// Numerical rank of the design matrix.
    pub rank: usize,
    /// Singular values in decreasing order.
    pub singular_values: Vec<f64>,
    /// Sum of squared residuals; reported only at full column rank.
    ///
    /// Below full rank the least-squares problem has infinitely many
    /// solutions and a per-solution residual sum would be misleading.
    pub ss_resid: Option<f64>,
}

/// One route's fitted coefficients (plus route-specific diagnostics).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteFit {
    pub route: FitRoute,
    pub coefficients: Coefficients,
    pub diagnostics: Option<LstsqDiagnostics>,
}

/// Cross-route agreement check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agreement {
    /// Largest pairwise |difference| over (intercept, slope) across routes.
    pub max_abs_diff: f64,
    pub tol: f64,
    pub within_tol: bool,
}

/// Fit quality diagnostics for the consensus line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    pub r_squared: f64,
    pub n: usize,
}

/// A per-observation fitted result (used for ranking and exports).
#[derive(Debug, Clone)]
pub struct PointResidual {
    pub observation: Observation,
    pub y_fit: f64,
    pub residual: f64,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    /// Remote CSV location (used when no local file or sample is requested).
    pub url: String,
    /// Local CSV path; overrides the URL when set.
    pub csv_path: Option<PathBuf>,
    /// Generate a synthetic dataset of this size instead of loading one.
    pub sample_count: Option<usize>,
    /// Seed for synthetic data generation.
    pub sample_seed: u64,

    /// Predictor column name.
    pub x_col: String,
    /// Outcome column name.
    pub y_col: String,

    pub route_spec: RouteSpec,
    /// Cross-route agreement tolerance.
    pub tol: f64,

    pub top_n: usize,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_results: Option<PathBuf>,
    pub export_model: Option<PathBuf>,
}

impl FitConfig {
    /// Human-readable description of where the dataset comes from.
    pub fn source_label(&self) -> String {
        if let Some(n) = self.sample_count {
            return format!("synthetic sample (n={n}, seed={})", self.sample_seed);
        }
        if let Some(path) = &self.csv_path {
            return path.display().to_string();
        }
        self.url.clone()
    }
}

/// A saved model file (JSON).
///
/// Deliberately timestamp-free: rerunning the same fit writes byte-identical
/// output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFile {
    pub tool: String,
    pub source: String,
    pub x_col: String,
    pub y_col: String,
    /// Consensus coefficients used for the fitted line grid.
    pub coefficients: Coefficients,
    /// Every route that produced a fit in this run.
    pub routes: Vec<RouteFit>,
    pub agreement: Option<Agreement>,
    pub quality: FitQuality,
    pub grid: LineGrid,
}

/// Precomputed fitted-line samples for quick plotting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineGrid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}
