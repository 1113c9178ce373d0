//! Raw series cache files.
//!
//! Schema: `date,value` with an empty value cell for missing observations, so
//! a cached series round-trips exactly what FRED returned (the cleaner, not
//! the cache, is responsible for dropping missing values).

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;

use crate::domain::{Observation, RawSeries};
use crate::error::AppError;

/// Write a raw series cache file, creating parent directories as needed.
pub fn write_raw_csv(path: &Path, series: &RawSeries) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)
            .map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", parent.display())))?;
    }

    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create raw CSV '{}': {e}", path.display())))?;

    writeln!(file, "date,value")
        .map_err(|e| AppError::new(2, format!("Failed to write raw CSV header: {e}")))?;
    for obs in &series.observations {
        let value = obs.value.map(|v| v.to_string()).unwrap_or_default();
        writeln!(file, "{},{}", obs.date, value)
            .map_err(|e| AppError::new(2, format!("Failed to write raw CSV row: {e}")))?;
    }

    Ok(())
}

/// Read a raw series cache file back into a `RawSeries`.
pub fn read_raw_csv(path: &Path, series_id: &str) -> Result<RawSeries, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open raw CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut observations = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result
            .map_err(|e| AppError::new(2, format!("Raw CSV parse error at line {line}: {e}")))?;

        let date_field = record
            .get(0)
            .ok_or_else(|| AppError::new(2, format!("Missing date at line {line}")))?;
        let date = NaiveDate::parse_from_str(date_field, "%Y-%m-%d")
            .map_err(|e| AppError::new(2, format!("Invalid date '{date_field}' at line {line}: {e}")))?;

        let value = record.get(1).and_then(parse_optional_value);
        observations.push(Observation { date, value });
    }

    Ok(RawSeries {
        series_id: series_id.to_string(),
        observations,
    })
}

/// Parse a value cell; empty, `"."`, or non-finite means missing.
pub(crate) fn parse_optional_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "." {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
