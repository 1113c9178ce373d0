//! Cleaned per-country files.
//!
//! Schema: `date,cpi`, one row per unique date. These are the merger's inputs;
//! the cleaner rewrites them wholesale, so writes must be deterministic
//! (re-running the cleaner on identical input yields byte-identical files).

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;

use crate::domain::{CleanObservation, CountrySeries};
use crate::error::AppError;

/// Write a cleaned series, creating parent directories as needed.
pub fn write_cleaned_csv(path: &Path, series: &CountrySeries) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)
            .map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", parent.display())))?;
    }

    let mut file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create cleaned CSV '{}': {e}", path.display()))
    })?;

    writeln!(file, "date,cpi")
        .map_err(|e| AppError::new(2, format!("Failed to write cleaned CSV header: {e}")))?;
    for row in &series.rows {
        writeln!(file, "{},{}", row.date, row.cpi)
            .map_err(|e| AppError::new(2, format!("Failed to write cleaned CSV row: {e}")))?;
    }

    Ok(())
}

/// Read a cleaned per-country file.
pub fn read_cleaned_csv(path: &Path) -> Result<Vec<CleanObservation>, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open cleaned CSV '{}': {e}", path.display()))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result
            .map_err(|e| AppError::new(2, format!("Cleaned CSV parse error at line {line}: {e}")))?;

        let date_field = record
            .get(0)
            .ok_or_else(|| AppError::new(2, format!("Missing date at line {line}")))?;
        let date = NaiveDate::parse_from_str(date_field, "%Y-%m-%d")
            .map_err(|e| AppError::new(2, format!("Invalid date '{date_field}' at line {line}: {e}")))?;

        let cpi_field = record
            .get(1)
            .ok_or_else(|| AppError::new(2, format!("Missing cpi value at line {line}")))?;
        let cpi = cpi_field
            .parse::<f64>()
            .map_err(|e| AppError::new(2, format!("Invalid cpi '{cpi_field}' at line {line}: {e}")))?;

        rows.push(CleanObservation { date, cpi });
    }

    Ok(rows)
}
