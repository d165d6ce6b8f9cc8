//! CSV ingest of sample values.
//!
//! Reads one numeric column from a CSV with a header row. Rows that fail to
//! parse, or hold values outside `[0, 1]`, are skipped and reported; only a
//! missing file or column is fatal.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::data::compute_stats;
use crate::domain::SampleStats;
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: accepted values + stats + row errors.
#[derive(Debug, Clone)]
pub struct IngestedSamples {
    pub values: Vec<f64>,
    pub column: String,
    pub stats: SampleStats,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl IngestedSamples {
    pub fn rows_used(&self) -> usize {
        self.values.len()
    }
}

/// Load sample values from `path`, taking `column` (case-insensitive) or the
/// first column when `None`.
pub fn load_samples(path: &Path, column: Option<&str>) -> Result<IngestedSamples, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_samples(file, column)
}

/// Same as [`load_samples`], from any reader.
pub fn read_samples<R: Read>(reader: R, column: Option<&str>) -> Result<IngestedSamples, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let (col_idx, col_name) = match column {
        Some(name) => {
            let key = normalize_header_name(name);
            let idx = *header_map
                .get(&key)
                .ok_or_else(|| AppError::new(2, format!("CSV has no column named '{name}'.")))?;
            (idx, key)
        }
        None => {
            let first = headers
                .get(0)
                .ok_or_else(|| AppError::new(2, "CSV has no columns."))?;
            (0, normalize_header_name(first))
        }
    };

    let mut values = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_value(&record, col_idx) {
            Ok(v) => values.push(v),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    let stats = compute_stats(&values)
        .ok_or_else(|| AppError::new(3, format!("No usable values in column '{col_name}'.")))?;

    Ok(IngestedSamples {
        values,
        column: col_name,
        stats,
        row_errors,
        rows_read,
    })
}

fn parse_value(record: &StringRecord, col: usize) -> Result<f64, String> {
    let raw = record
        .get(col)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "missing value".to_string())?;
    let v: f64 = raw
        .parse()
        .map_err(|_| format!("invalid number '{raw}'"))?;
    if !(0.0..=1.0).contains(&v) {
        return Err(format!("value {v} outside [0, 1]"));
    }
    Ok(v)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Strip a UTF-8 BOM on the first header.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_named_column_and_reports_bad_rows() {
        let csv = "id,Value\n1,0.25\n2,abc\n3,\n4,1.5\n5,0.75\n";
        let data = read_samples(csv.as_bytes(), Some("value")).unwrap();
        assert_eq!(data.values, vec![0.25, 0.75]);
        assert_eq!(data.rows_read, 5);
        assert_eq!(data.rows_used(), 2);
        assert_eq!(data.row_errors.len(), 3);
        assert_eq!(data.row_errors[0].line, 3);
        assert!(data.row_errors[2].message.contains("outside"));
        assert_eq!(data.stats.mean, 0.5);
    }

    #[test]
    fn defaults_to_first_column_and_strips_bom() {
        let csv = "\u{feff}Sample,other\n0.1,x\n0.2,y\n";
        let data = read_samples(csv.as_bytes(), None).unwrap();
        assert_eq!(data.column, "sample");
        assert_eq!(data.values, vec![0.1, 0.2]);
    }

    #[test]
    fn missing_column_is_an_input_error() {
        let err = read_samples("a,b\n0.1,0.2\n".as_bytes(), Some("c")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn no_usable_rows_is_not_enough_data() {
        let err = read_samples("v\n2.0\nnan-ish\n".as_bytes(), None).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn loads_from_file() {
        let path = std::env::temp_dir().join(format!("cdf_curves_ingest_{}.csv", std::process::id()));
        std::fs::write(&path, "v\n0.5\n").unwrap();
        let data = load_samples(&path, None).unwrap();
        assert_eq!(data.values, vec![0.5]);
        let _ = std::fs::remove_file(&path);
    }
}
