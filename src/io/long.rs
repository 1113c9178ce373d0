//! Merged long-format tables.
//!
//! Two artifacts live here:
//!
//! - `core_cpi_long.csv` (`date,country,cpi,cpi_yoy`): the canonical analysis
//!   table the dashboard reads; the `cpi_yoy` cell is empty where undefined
//! - `core_macro_long.csv` (`date,value,country,series_type`): the combined
//!   CPI+GDP table written by the full fetch

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;

use crate::domain::{LongRow, LongTable, MacroRow};
use crate::error::AppError;
use crate::io::raw::parse_optional_value;

/// Write the canonical long table, creating parent directories as needed.
pub fn write_long_csv(path: &Path, table: &LongTable) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)
            .map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", parent.display())))?;
    }

    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create long CSV '{}': {e}", path.display())))?;

    writeln!(file, "date,country,cpi,cpi_yoy")
        .map_err(|e| AppError::new(2, format!("Failed to write long CSV header: {e}")))?;
    for row in &table.rows {
        let yoy = row.cpi_yoy.map(|v| v.to_string()).unwrap_or_default();
        writeln!(file, "{},{},{},{}", row.date, escape_field(&row.country), row.cpi, yoy)
            .map_err(|e| AppError::new(2, format!("Failed to write long CSV row: {e}")))?;
    }

    Ok(())
}

/// Read the canonical long table.
///
/// The `cpi_yoy` column is optional so pre-YoY files still load (every row
/// gets `None`).
pub fn read_long_csv(path: &Path) -> Result<LongTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open long CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result
            .map_err(|e| AppError::new(2, format!("Long CSV parse error at line {line}: {e}")))?;

        let date_field = record
            .get(0)
            .ok_or_else(|| AppError::new(2, format!("Missing date at line {line}")))?;
        let date = NaiveDate::parse_from_str(date_field, "%Y-%m-%d")
            .map_err(|e| AppError::new(2, format!("Invalid date '{date_field}' at line {line}: {e}")))?;

        let country = record
            .get(1)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::new(2, format!("Missing country at line {line}")))?
            .to_string();

        let cpi_field = record
            .get(2)
            .ok_or_else(|| AppError::new(2, format!("Missing cpi value at line {line}")))?;
        let cpi = cpi_field
            .parse::<f64>()
            .map_err(|e| AppError::new(2, format!("Invalid cpi '{cpi_field}' at line {line}: {e}")))?;

        let cpi_yoy = record.get(3).and_then(parse_optional_value);

        rows.push(LongRow { date, country, cpi, cpi_yoy });
    }

    Ok(LongTable { rows })
}

/// Write the combined CPI+GDP macro table.
pub fn write_macro_csv(path: &Path, rows: &[MacroRow]) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)
            .map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", parent.display())))?;
    }

    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create macro CSV '{}': {e}", path.display())))?;

    writeln!(file, "date,value,country,series_type")
        .map_err(|e| AppError::new(2, format!("Failed to write macro CSV header: {e}")))?;
    for row in rows {
        let value = row.value.map(|v| v.to_string()).unwrap_or_default();
        writeln!(
            file,
            "{},{},{},{}",
            row.date,
            value,
            escape_field(&row.country),
            row.category.display_name()
        )
        .map_err(|e| AppError::new(2, format!("Failed to write macro CSV row: {e}")))?;
    }

    Ok(())
}

/// Quote a field if it contains CSV metacharacters.
///
/// Country labels in the default catalog never need quoting, but custom
/// catalogs may.
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn long_csv_round_trips_optional_yoy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("core_cpi_long.csv");

        let table = LongTable {
            rows: vec![
                LongRow {
                    date: date(2020, 1),
                    country: "New Zealand".to_string(),
                    cpi: 100.0,
                    cpi_yoy: None,
                },
                LongRow {
                    date: date(2021, 1),
                    country: "New Zealand".to_string(),
                    cpi: 104.0,
                    cpi_yoy: Some(4.0),
                },
            ],
        };

        write_long_csv(&path, &table).unwrap();
        let reloaded = read_long_csv(&path).unwrap();
        assert_eq!(reloaded.rows, table.rows);
    }

    #[test]
    fn escape_field_quotes_commas() {
        assert_eq!(escape_field("New Zealand"), "New Zealand");
        assert_eq!(escape_field("Korea, South"), "\"Korea, South\"");
    }
}
