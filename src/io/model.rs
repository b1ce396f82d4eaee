//! Read/write model JSON files.
//!
//! Model JSON is the "portable" representation of a fitted line:
//! - per-route coefficients and diagnostics
//! - the agreement verdict and fit quality
//! - a precomputed fitted grid for quick plotting
//!
//! The schema is defined by `domain::ModelFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::{Coefficients, FitConfig, LineGrid, ModelFile};
use crate::error::AppError;
use crate::fit::RouteComparison;
use crate::io::ingest::IngestedData;

/// Write a model JSON file.
pub fn write_model_json(
    path: &Path,
    comparison: &RouteComparison,
    ingest: &IngestedData,
    config: &FitConfig,
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::usage(format!(
            "Failed to create model JSON '{}': {e}",
            path.display()
        ))
    })?;

    let grid = build_grid(
        &comparison.consensus.coefficients,
        ingest.stats.x_min,
        ingest.stats.x_max,
        101,
    );

    let model = ModelFile {
        tool: "ols".to_string(),
        source: config.source_label(),
        x_col: ingest.dataset.x_name.clone(),
        y_col: ingest.dataset.y_name.clone(),
        coefficients: comparison.consensus.coefficients,
        routes: comparison.fits.clone(),
        agreement: comparison.agreement.clone(),
        quality: comparison.quality.clone(),
        grid,
    };

    serde_json::to_writer_pretty(file, &model)
        .map_err(|e| AppError::usage(format!("Failed to write model JSON: {e}")))?;

    Ok(())
}

/// Read a model JSON file.
pub fn read_model_json(path: &Path) -> Result<ModelFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::usage(format!(
            "Failed to open model JSON '{}': {e}",
            path.display()
        ))
    })?;
    let model: ModelFile = serde_json::from_reader(file)
        .map_err(|e| AppError::usage(format!("Invalid model JSON: {e}")))?;
    Ok(model)
}

fn build_grid(coefficients: &Coefficients, x_min: f64, x_max: f64, n: usize) -> LineGrid {
    let n = n.max(2);
    let mut x0 = x_min;
    let mut x1 = x_max;
    if !(x0.is_finite() && x1.is_finite()) || x1 < x0 {
        x0 = 0.0;
        x1 = 1.0;
    }
    if (x1 - x0).abs() < 1e-9 {
        x0 -= 0.5;
        x1 += 0.5;
    }

    let mut x = Vec::with_capacity(n);
    let mut y = Vec::with_capacity(n);

    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        let xi = x0 + u * (x1 - x0);
        x.push(xi);
        y.push(coefficients.predict(xi));
    }

    LineGrid { x, y }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_spans_the_requested_range() {
        let c = Coefficients {
            intercept: 1.0,
            slope: 2.0,
        };
        let grid = build_grid(&c, 0.0, 10.0, 101);
        assert_eq!(grid.x.len(), 101);
        assert!((grid.x[0] - 0.0).abs() < 1e-12);
        assert!((grid.x[100] - 10.0).abs() < 1e-12);
        assert!((grid.y[100] - 21.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_range_is_widened() {
        let c = Coefficients {
            intercept: 0.0,
            slope: 1.0,
        };
        let grid = build_grid(&c, 5.0, 5.0, 11);
        assert!(grid.x[0] < grid.x[10]);
        assert!((grid.x[0] - 4.5).abs() < 1e-12);
        assert!((grid.x[10] - 5.5).abs() < 1e-12);
    }
}
