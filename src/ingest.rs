//! Logged TBM readings from CSV files
//!
//! Expected CSV format (header optional, label optional):
//! `thrust_kn,torque_knm,speed_rpm[,label]`
//!
//! The label is free text, typically a ring number or timestamp.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::types::Reading;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to open CSV file {}: {}", .0.display(), .1)]
    Io(PathBuf, std::io::Error),
}

/// One CSV row that parsed into a reading
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggedReading {
    /// 1-based line number in the source file
    pub line: usize,
    pub label: Option<String>,
    pub reading: Reading,
}

/// Read all parseable rows from a CSV file.
///
/// Malformed rows are logged and skipped; only an unreadable file is an error.
pub fn read_readings_csv(path: &Path) -> Result<Vec<LoggedReading>, IngestError> {
    let file = File::open(path).map_err(|e| IngestError::Io(path.to_path_buf(), e))?;
    let readings = read_readings(BufReader::new(file));
    tracing::info!(count = readings.len(), path = %path.display(), "Loaded TBM readings from CSV");
    Ok(readings)
}

/// Parse readings from any buffered source.
pub fn read_readings<R: BufRead>(reader: R) -> Vec<LoggedReading> {
    let mut readings = Vec::new();
    let mut seen_content = false;

    for (idx, line_result) in reader.lines().enumerate() {
        let line_num = idx + 1;

        let line = match line_result {
            Ok(l) => l,
            Err(e) => {
                tracing::warn!(line = line_num, error = %e, "Error reading CSV line");
                continue;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        // Header: non-numeric leading field on the first content line
        let first_content = !seen_content;
        seen_content = true;
        if first_content && is_header(trimmed) {
            continue;
        }

        match parse_csv_line(trimmed, line_num) {
            Ok(r) => readings.push(r),
            Err(e) => {
                tracing::warn!(line = line_num, error = %e, "Error parsing CSV line");
            }
        }
    }

    readings
}

fn is_header(line: &str) -> bool {
    line.split(',')
        .next()
        .is_some_and(|f| f.trim().parse::<f64>().is_err())
}

/// Parse a single CSV line into a reading
fn parse_csv_line(line: &str, line_num: usize) -> Result<LoggedReading, String> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();

    if fields.len() < 3 {
        return Err(format!(
            "Expected at least 3 fields, got {} on line {}",
            fields.len(),
            line_num
        ));
    }

    let thrust = parse_f64(fields[0], "thrust_kn")?;
    let torque = parse_f64(fields[1], "torque_knm")?;
    let speed = parse_f64(fields[2], "speed_rpm")?;

    let label = fields
        .get(3)
        .filter(|s| !s.is_empty())
        .map(|s| (*s).to_string());

    Ok(LoggedReading {
        line: line_num,
        label,
        reading: Reading::new(thrust, torque, speed),
    })
}

fn parse_f64(s: &str, field: &str) -> Result<f64, String> {
    let v = s
        .parse::<f64>()
        .map_err(|e| format!("Invalid {field} '{s}': {e}"))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("Invalid {field} '{s}': not a finite number"))
    }
}
