//! Series Merger.
//!
//! Combines per-country cleaned files into one long-format table with columns
//! `(date, country, cpi)`, sorted by `(date, country)`.
//!
//! Missing files are a soft failure: the country is recorded as skipped and
//! the batch continues. Zero readable files yields an empty table, never an
//! error at this layer (callers decide how to present "no data").

use std::path::{Path, PathBuf};

use crate::domain::{DataPaths, LongRow, LongTable};
use crate::error::AppError;
use crate::io::read_cleaned_csv;

/// A country whose cleaned file was absent at merge time.
#[derive(Debug, Clone)]
pub struct SkippedCountry {
    pub country: String,
    pub path: PathBuf,
}

/// Merge output: the long table plus the countries that had to be skipped.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub table: LongTable,
    pub skipped: Vec<SkippedCountry>,
}

/// Merge cleaned per-country files from `input_dir` into a long table.
///
/// Malformed files (as opposed to absent ones) are a hard error: a partially
/// readable artifact means the cleaner's contract was broken upstream.
pub fn merge_series_long(countries: &[String], input_dir: &Path) -> Result<MergeOutcome, AppError> {
    let mut table = LongTable::default();
    let mut skipped = Vec::new();

    for country in countries {
        let path = DataPaths::country_csv(input_dir, country);
        if !path.exists() {
            skipped.push(SkippedCountry {
                country: country.clone(),
                path,
            });
            continue;
        }

        let rows = read_cleaned_csv(&path)?;
        for row in rows {
            table.rows.push(LongRow {
                date: row.date,
                country: country.clone(),
                cpi: row.cpi,
                cpi_yoy: None,
            });
        }
    }

    table.sort();
    Ok(MergeOutcome { table, skipped })
}
