//! Command-line parsing for the least-squares fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::RouteSpec;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ols", version, about = "Least-squares line fitter with route cross-checks")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit the line, print the route comparison/rankings, and optionally plot/export.
    Fit(FitArgs),
    /// Print the consensus intercept and slope only (useful for scripting).
    Coeffs(FitArgs),
    /// Plot a previously exported model JSON.
    Plot(PlotArgs),
    /// Run the fit and write a markdown debug bundle.
    Debug(FitArgs),
}

/// Common options for fitting.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Predictor column name.
    #[arg(short = 'x', long = "x-col", default_value = "TV")]
    pub x_col: String,

    /// Outcome column name.
    #[arg(short = 'y', long = "y-col", default_value = "sales")]
    pub y_col: String,

    /// Dataset URL (overrides the ADVERTISING_URL env var and the default).
    #[arg(long)]
    pub url: Option<String>,

    /// Read the dataset from a local CSV instead of fetching it.
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,

    /// Generate a synthetic dataset with N points instead of fetching.
    #[arg(long, value_name = "N")]
    pub sample: Option<usize>,

    /// Random seed for synthetic data generation.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Which route(s) to run.
    #[arg(long, value_enum, default_value_t = RouteSpec::All)]
    pub route: RouteSpec,

    /// Maximum allowed coefficient difference between routes.
    #[arg(long, default_value_t = 1e-6)]
    pub tol: f64,

    /// Show top-N over- and under-performers.
    #[arg(long, default_value_t = 5)]
    pub top: usize,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export per-observation results to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export model (coefficients + diagnostics + fitted grid) to JSON.
    #[arg(long = "export-model")]
    pub export_model: Option<PathBuf>,
}

/// Options for plotting a saved model.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Model JSON file produced by `ols fit --export-model`.
    #[arg(long, value_name = "JSON")]
    pub model: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}
