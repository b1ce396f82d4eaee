//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::domain::{Dataset, FitConfig, PointResidual};
use crate::fit::RouteComparison;
use crate::io::ingest::IngestedData;
use crate::report::Rankings;

/// Format the full run summary (dataset stats + route comparison + consensus).
pub fn format_run_summary(
    ingest: &IngestedData,
    comparison: &RouteComparison,
    config: &FitConfig,
) -> String {
    let mut out = String::new();
    let x_name = &ingest.dataset.x_name;
    let y_name = &ingest.dataset.y_name;

    out.push_str("=== ols - least-squares cross-check ===\n");
    out.push_str(&format!("Source: {}\n", config.source_label()));
    out.push_str(&format!("Columns: {y_name} ~ {x_name}\n"));
    out.push_str(&format!(
        "Points: n={} | {}=[{:.3}, {:.3}] | {}=[{:.2}, {:.2}]\n",
        ingest.stats.n_points,
        x_name,
        ingest.stats.x_min,
        ingest.stats.x_max,
        y_name,
        ingest.stats.y_min,
        ingest.stats.y_max
    ));
    out.push_str(&format!(
        "Rows: read={} used={} skipped={}\n",
        ingest.rows_read,
        ingest.rows_used,
        ingest.row_errors.len()
    ));

    out.push_str("\nRoute comparison:\n");
    for fit in &comparison.fits {
        let marker = if fit.route == comparison.consensus.route {
            "*"
        } else {
            " "
        };
        out.push_str(&format!(
            "{marker} {:<8} intercept={:>12.6} slope={:>12.6}\n",
            fit.route.display_name(),
            fit.coefficients.intercept,
            fit.coefficients.slope
        ));
        if let Some(diag) = &fit.diagnostics {
            out.push_str(&format!(
                "    rank={} ss_resid={} sv={}\n",
                diag.rank,
                fmt_opt(diag.ss_resid),
                fmt_vec(&diag.singular_values)
            ));
        }
    }
    for (route, reason) in &comparison.skipped {
        out.push_str(&format!("  (skipped {}) {reason}\n", route.display_name()));
    }

    match &comparison.agreement {
        Some(agreement) => {
            let verdict = if agreement.within_tol { "ok" } else { "FAIL" };
            out.push_str(&format!(
                "\nAgreement: max|diff|={:.3e} tol={:.1e} -> {verdict}\n",
                agreement.max_abs_diff, agreement.tol
            ));
        }
        None => {
            out.push_str("\nAgreement: single route, nothing to cross-check\n");
        }
    }

    let c = &comparison.consensus.coefficients;
    out.push_str("\nConsensus:\n");
    out.push_str(&format!(
        "- {y_name} = {:.6} + {:.6} * {x_name}   [{}]\n",
        c.intercept,
        c.slope,
        comparison.consensus.route.display_name()
    ));
    out.push_str(&format!(
        "- quality: SSE={:.3} RMSE={:.3} R^2={:.4} n={}\n",
        comparison.quality.sse,
        comparison.quality.rmse,
        comparison.quality.r_squared,
        comparison.quality.n
    ));
    out.push('\n');

    out
}

/// Format the over/under-performer tables.
pub fn format_rankings(rankings: &Rankings, dataset: &Dataset) -> String {
    let mut out = String::new();
    let y_name = &dataset.y_name;

    out.push_str(&format!("Top over-performers ({y_name} above the fitted line):\n"));
    out.push_str(&format_table(&rankings.over, dataset));
    out.push('\n');

    out.push_str(&format!("Top under-performers ({y_name} below the fitted line):\n"));
    out.push_str(&format_table(&rankings.under, dataset));

    out
}

/// Bare `intercept`/`slope` lines with full float precision, meant for
/// piping into scripts.
pub fn format_coefficients(comparison: &RouteComparison) -> String {
    let c = &comparison.consensus.coefficients;
    format!("intercept {}\nslope {}\n", c.intercept, c.slope)
}

fn format_table(rows: &[PointResidual], dataset: &Dataset) -> String {
    let mut out = String::new();

    out.push_str(
        format!(
            "{:<12} {:>12} {:>12} {:>12} {:>12}\n",
            "label",
            truncate(&dataset.x_name, 12),
            truncate(&format!("{}_obs", dataset.y_name), 12),
            truncate(&format!("{}_fit", dataset.y_name), 12),
            "residual"
        )
        .trim_end(),
    );
    out.push('\n');

    out.push_str(
        format!(
            "{:-<12} {:-<12} {:-<12} {:-<12} {:-<12}\n",
            "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for r in rows {
        out.push_str(
            format!(
                "{:<12} {:>12.3} {:>12.3} {:>12.3} {:>12.3}\n",
                truncate(&r.observation.label, 12),
                r.observation.x,
                r.observation.y,
                r.y_fit,
                r.residual,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.6}")).collect();
    format!("[{}]", parts.join(", "))
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{v:.3}"),
        None => "n/a".to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
