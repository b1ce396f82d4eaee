//! Debug bundle writer for inspecting a fit run offline.
//!
//! Produces a self-contained markdown file with the route comparison, the
//! residual extremes, any ingest row errors, and a fitted-line grid.

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;

use crate::app::pipeline::RunOutput;
use crate::domain::FitConfig;
use crate::error::AppError;

pub fn write_debug_bundle(run: &RunOutput, config: &FitConfig) -> Result<PathBuf, AppError> {
    let dir = PathBuf::from("debug");
    create_dir_all(&dir)
        .map_err(|e| AppError::runtime(format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("ols_debug_{ts}.md"));

    let body = render_bundle(run, config);

    let mut file = File::create(&path)
        .map_err(|e| AppError::runtime(format!("Failed to create debug file: {e}")))?;
    file.write_all(body.as_bytes())
        .map_err(|e| AppError::runtime(format!("Failed to write debug file: {e}")))?;

    Ok(path)
}

fn render_bundle(run: &RunOutput, config: &FitConfig) -> String {
    let mut out = String::new();
    let x_name = &run.ingest.dataset.x_name;
    let y_name = &run.ingest.dataset.y_name;
    let stats = &run.ingest.stats;

    out.push_str("# ols debug bundle\n");
    out.push_str(&format!("- generated: {}\n", Local::now().to_rfc3339()));
    out.push_str(&format!("- source: {}\n", config.source_label()));
    out.push_str(&format!("- columns: {y_name} ~ {x_name}\n"));
    out.push_str(&format!(
        "- rows: read={} used={} skipped={}\n",
        run.ingest.rows_read,
        run.ingest.rows_used,
        run.ingest.row_errors.len()
    ));
    out.push_str(&format!(
        "- {x_name} range: [{:.4}, {:.4}]\n",
        stats.x_min, stats.x_max
    ));
    out.push_str(&format!(
        "- {y_name} range: [{:.4}, {:.4}]\n",
        stats.y_min, stats.y_max
    ));
    out.push_str(&format!("- tol: {:e}\n", config.tol));

    out.push_str("\n## Routes\n");
    out.push_str("| route | intercept | slope | rank | ss_resid | singular_values |\n");
    out.push_str("| - | - | - | - | - | - |\n");
    for fit in &run.comparison.fits {
        let (rank, ss_resid, sv) = match &fit.diagnostics {
            Some(diag) => (
                diag.rank.to_string(),
                fmt_opt(diag.ss_resid),
                fmt_vec(&diag.singular_values),
            ),
            None => ("-".to_string(), "-".to_string(), "-".to_string()),
        };
        out.push_str(&format!(
            "| {} | {:.10} | {:.10} | {} | {} | {} |\n",
            fit.route.display_name(),
            fit.coefficients.intercept,
            fit.coefficients.slope,
            rank,
            ss_resid,
            sv
        ));
    }
    for (route, reason) in &run.comparison.skipped {
        out.push_str(&format!("- skipped {}: {reason}\n", route.display_name()));
    }

    match &run.comparison.agreement {
        Some(agreement) => {
            let verdict = if agreement.within_tol { "ok" } else { "FAIL" };
            out.push_str(&format!(
                "\nAgreement: max|diff|={:.6e} tol={:.1e} -> {verdict}\n",
                agreement.max_abs_diff, agreement.tol
            ));
        }
        None => out.push_str("\nAgreement: single route, nothing to cross-check\n"),
    }
    out.push_str(&format!(
        "Quality: SSE={:.6} RMSE={:.6} R^2={:.6} n={}\n",
        run.comparison.quality.sse,
        run.comparison.quality.rmse,
        run.comparison.quality.r_squared,
        run.comparison.quality.n
    ));

    out.push_str("\n## Residual extremes\n");
    out.push_str("### Top over-performers\n");
    push_residual_table(&mut out, &run.rankings.over, x_name, y_name);
    out.push_str("\n### Top under-performers\n");
    push_residual_table(&mut out, &run.rankings.under, x_name, y_name);

    if !run.ingest.row_errors.is_empty() {
        out.push_str("\n## Row errors\n");
        out.push_str("| line | label | message |\n");
        out.push_str("| - | - | - |\n");
        for err in &run.ingest.row_errors {
            out.push_str(&format!(
                "| {} | {} | {} |\n",
                err.line,
                err.label.as_deref().unwrap_or("-"),
                err.message
            ));
        }
    }

    out.push_str("\n## Fitted line grid\n");
    out.push_str(&format!("| {x_name} | {y_name}_fit |\n"));
    out.push_str("| - | - |\n");
    let c = &run.comparison.consensus.coefficients;
    for i in 0..=20 {
        let u = i as f64 / 20.0;
        let x = stats.x_min + u * (stats.x_max - stats.x_min);
        out.push_str(&format!("| {:.4} | {:.4} |\n", x, c.predict(x)));
    }

    out
}

fn push_residual_table(
    out: &mut String,
    rows: &[crate::domain::PointResidual],
    x_name: &str,
    y_name: &str,
) {
    out.push_str(&format!(
        "| label | {x_name} | {y_name}_obs | {y_name}_fit | residual |\n"
    ));
    out.push_str("| - | - | - | - | - |\n");
    for r in rows {
        out.push_str(&format!(
            "| {} | {:.4} | {:.4} | {:.4} | {:.4} |\n",
            r.observation.label, r.observation.x, r.observation.y, r.y_fit, r.residual
        ));
    }
}

fn fmt_vec(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| format!("{v:.6}")).collect();
    format!("[{}]", parts.join(", "))
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.6}"),
        _ => "-".to_string(),
    }
}
