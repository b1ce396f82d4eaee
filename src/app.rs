//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the dataset (fetch, local CSV, or synthetic sample)
//! - runs the fit routes + cross-check
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, FitArgs, PlotArgs};
use crate::domain::FitConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `ols` binary.
pub fn run() -> Result<(), AppError> {
    // We want `ols` and `ols --sample 50` to behave like `ols fit ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Fit(args) => handle_fit(args, OutputMode::Full),
        Command::Coeffs(args) => handle_fit(args, OutputMode::CoeffsOnly),
        Command::Plot(args) => handle_plot(args),
        Command::Debug(args) => handle_debug(args),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Full,
    CoeffsOnly,
}

fn handle_fit(args: FitArgs, mode: OutputMode) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);
    let run = pipeline::run_fit(&config)?;

    // Print terminal output.
    match mode {
        OutputMode::Full => {
            println!(
                "{}",
                crate::report::format_run_summary(&run.ingest, &run.comparison, &config)
            );
            println!(
                "{}",
                crate::report::format_rankings(&run.rankings, &run.ingest.dataset)
            );

            if config.plot {
                let plot = crate::plot::render_ascii_plot(
                    &run.residuals,
                    &run.comparison.consensus.coefficients,
                    &run.ingest.dataset.x_name,
                    &run.ingest.dataset.y_name,
                    config.plot_width,
                    config.plot_height,
                    Some(&run.rankings),
                );
                println!("{plot}");
            }
        }
        OutputMode::CoeffsOnly => {
            print!("{}", crate::report::format_coefficients(&run.comparison));
        }
    }

    // Optional exports.
    if let Some(path) = &config.export_results {
        crate::io::export::write_results_csv(path, &run.residuals, &run.ingest.dataset)?;
    }
    if let Some(path) = &config.export_model {
        crate::io::model::write_model_json(path, &run.comparison, &run.ingest, &config)?;
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let model = crate::io::model::read_model_json(&args.model)?;
    let plot = crate::plot::render_ascii_plot_from_model_file(&model, args.width, args.height);

    println!("{plot}");
    Ok(())
}

fn handle_debug(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);
    let run = pipeline::run_fit(&config)?;

    let path = crate::debug::write_debug_bundle(&run, &config)?;
    println!("Debug bundle written to {}", path.display());
    Ok(())
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    FitConfig {
        url: crate::data::resolve_url(args.url.as_deref()),
        csv_path: args.csv.clone(),
        sample_count: args.sample,
        sample_seed: args.seed,
        x_col: args.x_col.clone(),
        y_col: args.y_col.clone(),
        route_spec: args.route,
        tol: args.tol,
        top_n: args.top,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_results: args.export.clone(),
        export_model: args.export_model.clone(),
    }
}

/// Rewrite argv so `ols` defaults to `ols fit`.
///
/// Rules:
/// - `ols`                      -> `ols fit`
/// - `ols --sample 50 ...`      -> `ols fit --sample 50 ...`
/// - `ols --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("fit".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fit" | "coeffs" | "plot" | "debug");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "fit flags".
    if arg1.starts_with('-') {
        argv.insert(1, "fit".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_becomes_fit() {
        assert_eq!(rewrite_args(argv(&["ols"])), argv(&["ols", "fit"]));
    }

    #[test]
    fn leading_flag_becomes_fit_flags() {
        assert_eq!(
            rewrite_args(argv(&["ols", "--sample", "50"])),
            argv(&["ols", "fit", "--sample", "50"])
        );
    }

    #[test]
    fn help_and_version_pass_through() {
        assert_eq!(rewrite_args(argv(&["ols", "--help"])), argv(&["ols", "--help"]));
        assert_eq!(rewrite_args(argv(&["ols", "-V"])), argv(&["ols", "-V"]));
    }

    #[test]
    fn explicit_subcommands_pass_through() {
        assert_eq!(
            rewrite_args(argv(&["ols", "coeffs", "--tol", "1e-9"])),
            argv(&["ols", "coeffs", "--tol", "1e-9"])
        );
    }
}
