//! CSV ingest and normalization.
//!
//! Turns a tabular CSV with named numeric columns into a clean `Dataset` of
//! `(label, x, y)` observations that are safe to fit.
//!
//! Design goals:
//! - **Strict schema** for the two requested columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (no hidden randomness)
//! - **Separation of concerns**: no fitting logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{Dataset, DatasetStats, Observation};
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub label: Option<String>,
    pub message: String,
}

/// Ingest output: normalized dataset + stats + row errors.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub dataset: Dataset,
    pub stats: DatasetStats,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Parse CSV text into a `Dataset`, pulling `x_col` and `y_col` by name.
///
/// Column matching is case-insensitive and tolerates a UTF-8 BOM on the
/// first header. An unnamed leading column (common in data-frame exports) is
/// used as the row label when present; otherwise rows are labeled by ordinal.
pub fn read_dataset<R: Read>(reader: R, x_col: &str, y_col: &str) -> Result<IngestedData, AppError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| AppError::usage(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    let x_idx = resolve_column(&header_map, x_col)?;
    let y_idx = resolve_column(&header_map, y_col)?;
    let label_idx = header_map.get("").copied();

    let mut observations = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in csv_reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    label: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let label = label_idx
            .and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| (idx + 1).to_string());

        match parse_point(&record, x_idx, x_col, y_idx, y_col) {
            Ok((x, y)) => observations.push(Observation { label, x, y }),
            Err(message) => row_errors.push(RowError {
                line,
                label: Some(label),
                message,
            }),
        }
    }

    let rows_used = observations.len();
    if rows_used == 0 {
        return Err(AppError::no_data(
            "No valid rows remain after normalization.",
        ));
    }

    let dataset = Dataset {
        observations,
        x_name: x_col.to_string(),
        y_name: y_col.to_string(),
    };

    let stats = compute_stats(&dataset)
        .ok_or_else(|| AppError::no_data("No valid points remain after normalization."))?;

    Ok(IngestedData {
        dataset,
        stats,
        row_errors,
        rows_read,
        rows_used,
    })
}

/// Open a CSV file on disk and ingest it.
pub fn read_dataset_from_path(path: &Path, x_col: &str, y_col: &str) -> Result<IngestedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::usage(format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_dataset(file, x_col, y_col)
}

/// Wrap an already-built dataset (e.g. a synthetic sample) in the ingest
/// envelope so downstream reporting sees a uniform shape.
pub fn from_dataset(dataset: Dataset) -> Result<IngestedData, AppError> {
    let rows = dataset.len();
    if rows == 0 {
        return Err(AppError::no_data("No observations to fit."));
    }
    let stats = compute_stats(&dataset)
        .ok_or_else(|| AppError::no_data("No finite observations to fit."))?;
    Ok(IngestedData {
        dataset,
        stats,
        row_errors: Vec::new(),
        rows_read: rows,
        rows_used: rows,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header (e.g. "﻿TV"). If we don't strip it, column lookup will
    // incorrectly report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn resolve_column(header_map: &HashMap<String, usize>, name: &str) -> Result<usize, AppError> {
    if let Some(idx) = header_map.get(&normalize_header_name(name)) {
        return Ok(*idx);
    }

    let mut available: Vec<&str> = header_map
        .keys()
        .map(String::as_str)
        .filter(|k| !k.is_empty())
        .collect();
    available.sort_unstable();

    Err(AppError::usage(format!(
        "Column '{}' not found in CSV. Available columns: {}",
        name,
        available.join(", ")
    )))
}

fn parse_point(
    record: &StringRecord,
    x_idx: usize,
    x_col: &str,
    y_idx: usize,
    y_col: &str,
) -> Result<(f64, f64), String> {
    let x = parse_f64(get_value(record, x_idx, x_col)?, x_col)?;
    let y = parse_f64(get_value(record, y_idx, y_col)?, y_col)?;
    Ok((x, y))
}

fn get_value<'a>(record: &'a StringRecord, idx: usize, name: &str) -> Result<&'a str, String> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn parse_f64(s: &str, name: &str) -> Result<f64, String> {
    let v = s
        .parse::<f64>()
        .map_err(|_| format!("Invalid number '{s}' in column `{name}`."))?;
    if !v.is_finite() {
        return Err(format!("Non-finite value '{s}' in column `{name}`."));
    }
    Ok(v)
}

/// Compute min/max stats over a dataset; `None` when the fold never saw a
/// finite value.
pub fn compute_stats(dataset: &Dataset) -> Option<DatasetStats> {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;

    for obs in &dataset.observations {
        x_min = x_min.min(obs.x);
        x_max = x_max.max(obs.x);
        y_min = y_min.min(obs.y);
        y_max = y_max.max(obs.y);
    }

    if !x_min.is_finite() || !x_max.is_finite() || !y_min.is_finite() || !y_max.is_finite() {
        return None;
    }

    Some(DatasetStats {
        n_points: dataset.len(),
        x_min,
        x_max,
        y_min,
        y_max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_named_columns_and_index_labels() {
        let csv = "\"\",TV,radio,sales\n1,230.1,37.8,22.1\n2,44.5,39.3,10.4\n";
        let ingested = read_dataset(csv.as_bytes(), "TV", "sales").unwrap();

        assert_eq!(ingested.rows_read, 2);
        assert_eq!(ingested.rows_used, 2);
        assert!(ingested.row_errors.is_empty());

        let ds = &ingested.dataset;
        assert_eq!(ds.x_name, "TV");
        assert_eq!(ds.observations[0].label, "1");
        assert!((ds.observations[0].x - 230.1).abs() < 1e-12);
        assert!((ds.observations[1].y - 10.4).abs() < 1e-12);
        assert!((ingested.stats.x_max - 230.1).abs() < 1e-12);
    }

    #[test]
    fn labels_fall_back_to_row_ordinal() {
        let csv = "TV,sales\n10,1\n20,2\n";
        let ingested = read_dataset(csv.as_bytes(), "TV", "sales").unwrap();
        assert_eq!(ingested.dataset.observations[0].label, "1");
        assert_eq!(ingested.dataset.observations[1].label, "2");
    }

    #[test]
    fn column_match_is_case_insensitive_and_bom_tolerant() {
        let csv = "\u{feff}tv,SALES\n10,1\n";
        let ingested = read_dataset(csv.as_bytes(), "TV", "sales").unwrap();
        assert_eq!(ingested.rows_used, 1);
    }

    #[test]
    fn bad_rows_are_collected_not_fatal() {
        let csv = "TV,sales\n10,1\noops,2\n30,\n40,4\n";
        let ingested = read_dataset(csv.as_bytes(), "TV", "sales").unwrap();

        assert_eq!(ingested.rows_read, 4);
        assert_eq!(ingested.rows_used, 2);
        assert_eq!(ingested.row_errors.len(), 2);
        assert_eq!(ingested.row_errors[0].line, 3);
        assert!(ingested.row_errors[0].message.contains("Invalid number"));
        assert_eq!(ingested.row_errors[1].line, 4);
    }

    #[test]
    fn all_bad_rows_is_no_data() {
        let csv = "TV,sales\nbad,1\nworse,2\n";
        let err = read_dataset(csv.as_bytes(), "TV", "sales").unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn missing_column_lists_available_ones() {
        let csv = "TV,radio,sales\n10,5,1\n";
        let err = read_dataset(csv.as_bytes(), "newspaper", "sales").unwrap_err();
        assert_eq!(err.exit_code(), 2);
        let msg = err.to_string();
        assert!(msg.contains("newspaper"));
        assert!(msg.contains("radio"));
    }
}
