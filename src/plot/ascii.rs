//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed points: `o`
//! - fitted line: `-`
//! - optional highlights: `+` (over-performer), `x` (under-performer)

use std::collections::HashSet;

use crate::domain::{Coefficients, ModelFile, PointResidual};
use crate::report::Rankings;

/// Render a plot for an in-memory fit.
pub fn render_ascii_plot(
    residuals: &[PointResidual],
    coefficients: &Coefficients,
    x_name: &str,
    y_name: &str,
    width: usize,
    height: usize,
    rankings: Option<&Rankings>,
) -> String {
    let (x_min, x_max) = x_range_from_residuals(residuals).unwrap_or((0.0, 1.0));
    let line = sample_line(coefficients, x_min, x_max, width.max(2));
    render_plot(
        residuals,
        Some(&line),
        (x_min, x_max),
        (x_name, y_name),
        width,
        height,
        rankings,
    )
}

/// Render a plot from a saved model JSON file (line only, no overlay points).
pub fn render_ascii_plot_from_model_file(model: &ModelFile, width: usize, height: usize) -> String {
    let (x_min, x_max) = grid_x_range(model).unwrap_or((0.0, 1.0));
    let line: Vec<(f64, f64)> = model
        .grid
        .x
        .iter()
        .zip(model.grid.y.iter())
        .map(|(&x, &y)| (x, y))
        .collect();

    render_plot(
        &[],
        Some(&line),
        (x_min, x_max),
        (&model.x_col, &model.y_col),
        width,
        height,
        None,
    )
}

fn render_plot(
    residuals: &[PointResidual],
    line_points: Option<&[(f64, f64)]>,
    x_range: (f64, f64),
    axis_names: (&str, &str),
    width: usize,
    height: usize,
    rankings: Option<&Rankings>,
) -> String {
    let (x_min, x_max) = x_range;
    let (x_name, y_name) = axis_names;
    let width = width.max(10);
    let height = height.max(5);

    // Determine y-range from observed points and line points.
    let (y_min, y_max) = y_range(residuals, line_points).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw the line first (so points can overlay).
    if let Some(line) = line_points {
        draw_fitted_line(&mut grid, line, x_min, x_max, y_min, y_max);
    }

    // Highlight sets (labels).
    let (over_labels, under_labels) = rankings
        .map(|r| {
            (
                r.over.iter().map(|x| x.observation.label.clone()).collect(),
                r.under
                    .iter()
                    .map(|x| x.observation.label.clone())
                    .collect(),
            )
        })
        .unwrap_or_else(|| (HashSet::new(), HashSet::new()));

    for r in residuals {
        let x = map_x(r.observation.x, x_min, x_max, width);
        let y = map_y(r.observation.y, y_min, y_max, height);

        let ch = if over_labels.contains(&r.observation.label) {
            '+'
        } else if under_labels.contains(&r.observation.label) {
            'x'
        } else {
            'o'
        };

        grid[y][x] = ch;
    }

    // Build final string. We include a small header with ranges.
    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {x_name}=[{x_min:.3}, {x_max:.3}] | {y_name}=[{y_min:.2}, {y_max:.2}]\n"
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn x_range_from_residuals(residuals: &[PointResidual]) -> Option<(f64, f64)> {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    for r in residuals {
        min_x = min_x.min(r.observation.x);
        max_x = max_x.max(r.observation.x);
    }
    if min_x.is_finite() && max_x.is_finite() && max_x > min_x {
        Some((min_x, max_x))
    } else {
        None
    }
}

fn grid_x_range(model: &ModelFile) -> Option<(f64, f64)> {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    for &x in &model.grid.x {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
    }
    if min_x.is_finite() && max_x.is_finite() && max_x > min_x {
        Some((min_x, max_x))
    } else {
        None
    }
}

fn sample_line(coefficients: &Coefficients, x_min: f64, x_max: f64, n: usize) -> Vec<(f64, f64)> {
    let n = n.max(2);
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        let x = x_min + u * (x_max - x_min);
        out.push((x, coefficients.predict(x)));
    }
    out
}

fn y_range(residuals: &[PointResidual], line: Option<&[(f64, f64)]>) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for r in residuals {
        min_y = min_y.min(r.observation.y);
        max_y = max_y.max(r.observation.y);
    }
    if let Some(line) = line {
        for &(_, y) in line {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_fitted_line(
    grid: &mut [Vec<char>],
    line: &[(f64, f64)],
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
) {
    if line.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in line {
        let xx = map_x(x, x_min, x_max, width);
        let yy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, xx, yy, '-');
        } else {
            grid[yy][xx] = '-';
        }
        prev = Some((xx, yy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
