//! Export per-observation results to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{Dataset, PointResidual};
use crate::error::AppError;

/// Write per-observation fitted values and residuals to a CSV file.
pub fn write_results_csv(
    path: &Path,
    residuals: &[PointResidual],
    dataset: &Dataset,
) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::usage(format!(
            "Failed to create export CSV '{}': {e}",
            path.display()
        ))
    })?;

    // Header
    writeln!(file, "label,{},{}_obs,{}_fit,residual", dataset.x_name, dataset.y_name, dataset.y_name)
        .map_err(|e| AppError::usage(format!("Failed to write export CSV header: {e}")))?;

    for r in residuals {
        writeln!(
            file,
            "{},{:.4},{:.4},{:.4},{:.4}",
            r.observation.label, r.observation.x, r.observation.y, r.y_fit, r.residual,
        )
        .map_err(|e| AppError::usage(format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}
