//! Shared pipeline orchestration used by both the CLI and the TUI.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! cache/fetch -> clean -> merge -> YoY -> (persisted long table) -> trend fit
//!
//! Batch runs never rely on interleaved logging: per-item outcomes are
//! collected into report values so the result of a run is inspectable and
//! testable without capturing output text.

use std::path::{Path, PathBuf};

use crate::data::{get_or_fetch_series, is_cached};
use crate::domain::{
    CountrySeries, LongTable, MacroRow, PipelineConfig, SeriesCategory,
};
use crate::error::AppError;
use crate::io::{read_long_csv, write_long_csv, write_macro_csv};
use crate::transform::{SkippedCountry, add_yoy, clean_and_save_series, merge_series_long};

/// Outcome for one catalog item in a batch run.
#[derive(Debug, Clone)]
pub enum ItemStatus {
    /// Processed successfully; `from_cache` is true when no network call was
    /// needed.
    Done { rows: usize, from_cache: bool },
    /// The per-item error; the batch continued with the next item.
    Failed { message: String },
}

/// One batch item: a `(country, series id)` pair and what happened to it.
#[derive(Debug, Clone)]
pub struct ItemReport {
    pub country: String,
    pub series_id: String,
    pub status: ItemStatus,
}

/// Collected outcomes of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub items: Vec<ItemReport>,
}

impl BatchReport {
    pub fn done_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i.status, ItemStatus::Done { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i.status, ItemStatus::Failed { .. }))
            .count()
    }
}

/// Fetch (or load from cache), clean, and persist a single series.
///
/// Fetch failures propagate to the caller; in single-series mode that aborts
/// the run, while batch runners catch per item.
pub fn clean_one(
    config: &PipelineConfig,
    series_id: &str,
    country: Option<&str>,
    out_dir: Option<&Path>,
) -> Result<(CountrySeries, PathBuf), AppError> {
    let raw = get_or_fetch_series(config, series_id)?;
    let out_dir = out_dir.unwrap_or(&config.paths.processed_dir);
    clean_and_save_series(&raw, country, out_dir)
}

/// Clean every CPI series in the catalog, one item at a time.
pub fn batch_clean(config: &PipelineConfig) -> BatchReport {
    let mut report = BatchReport::default();

    for entry in config.catalog.category(SeriesCategory::Cpi) {
        let from_cache = is_cached(&config.paths.raw_dir, &entry.series_id);
        let status = match clean_one(config, &entry.series_id, Some(&entry.country), None) {
            Ok((cleaned, _)) => ItemStatus::Done {
                rows: cleaned.rows.len(),
                from_cache,
            },
            Err(e) => ItemStatus::Failed {
                message: e.to_string(),
            },
        };
        report.items.push(ItemReport {
            country: entry.country.clone(),
            series_id: entry.series_id.clone(),
            status,
        });
    }

    report
}

/// Merge run output: the YoY-augmented table, soft skips, and where it went.
#[derive(Debug, Clone)]
pub struct MergeRunOutput {
    pub table: LongTable,
    pub skipped: Vec<SkippedCountry>,
    pub out_path: PathBuf,
}

/// Merge the cleaned CPI files into the canonical long table and persist it.
///
/// The table is rebuilt wholesale: every merge run replaces the previous
/// artifact rather than updating it incrementally.
pub fn merge_long(config: &PipelineConfig) -> Result<MergeRunOutput, AppError> {
    let countries = config.catalog.countries(SeriesCategory::Cpi);
    let outcome = merge_series_long(&countries, &config.paths.processed_dir)?;

    let mut table = outcome.table;
    add_yoy(&mut table);

    let out_path = config.paths.long_table();
    write_long_csv(&out_path, &table)?;

    Ok(MergeRunOutput {
        table,
        skipped: outcome.skipped,
        out_path,
    })
}

/// Full-fetch output: per-item report plus the combined macro table location.
#[derive(Debug, Clone)]
pub struct FetchAllOutput {
    pub report: BatchReport,
    pub rows_written: usize,
    pub out_path: PathBuf,
}

/// Fetch every catalog series (CPI and GDP) and write the combined macro
/// table sorted by `(series_type, country, date)`.
pub fn fetch_all(config: &PipelineConfig) -> Result<FetchAllOutput, AppError> {
    let mut report = BatchReport::default();
    let mut rows: Vec<MacroRow> = Vec::new();

    for entry in config.catalog.entries() {
        let from_cache = is_cached(&config.paths.raw_dir, &entry.series_id);
        match get_or_fetch_series(config, &entry.series_id) {
            Ok(series) => {
                let n = series.observations.len();
                for obs in series.observations {
                    rows.push(MacroRow {
                        date: obs.date,
                        value: obs.value,
                        country: entry.country.clone(),
                        category: entry.category,
                    });
                }
                report.items.push(ItemReport {
                    country: entry.country.clone(),
                    series_id: entry.series_id.clone(),
                    status: ItemStatus::Done { rows: n, from_cache },
                });
            }
            Err(e) => {
                report.items.push(ItemReport {
                    country: entry.country.clone(),
                    series_id: entry.series_id.clone(),
                    status: ItemStatus::Failed { message: e.to_string() },
                });
            }
        }
    }

    rows.sort_by(|a, b| {
        a.category
            .cmp(&b.category)
            .then_with(|| a.country.cmp(&b.country))
            .then_with(|| a.date.cmp(&b.date))
    });

    let out_path = config.paths.macro_table();
    write_macro_csv(&out_path, &rows)?;

    Ok(FetchAllOutput {
        report,
        rows_written: rows.len(),
        out_path,
    })
}

/// Load the canonical long table the dashboard and trend command consume.
pub fn load_long_table(config: &PipelineConfig) -> Result<LongTable, AppError> {
    let path = config.paths.long_table();
    if !path.exists() {
        return Err(AppError::new(
            3,
            format!(
                "Merged table not found at '{}'. Run `cpi merge` first.",
                path.display()
            ),
        ));
    }
    read_long_csv(&path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DataPaths, Observation, RawSeries, SeriesCatalog};
    use crate::io::write_raw_csv;
    use chrono::NaiveDate;

    fn quarterly(i: usize) -> NaiveDate {
        let month = 1 + 3 * (i % 4) as u32;
        let year = 2020 + (i / 4) as i32;
        NaiveDate::from_ymd_opt(year, month, 1).unwrap()
    }

    fn config_in(dir: &Path) -> PipelineConfig {
        PipelineConfig {
            catalog: SeriesCatalog::default(),
            paths: DataPaths {
                raw_dir: dir.join("raw"),
                processed_dir: dir.join("processed"),
                merged_dir: dir.join("merged"),
            },
            api_key: None,
        }
    }

    fn seed_raw_cache(config: &PipelineConfig, series_id: &str, values: &[f64]) {
        let series = RawSeries {
            series_id: series_id.to_string(),
            observations: values
                .iter()
                .enumerate()
                .map(|(i, &v)| Observation { date: quarterly(i), value: Some(v) })
                .collect(),
        };
        write_raw_csv(&config.paths.raw_series(series_id), &series).unwrap();
    }

    #[test]
    fn batch_clean_reports_per_item_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        // Cache only two of the ten CPI series; the rest fail (no API key)
        // without aborting the batch.
        seed_raw_cache(&config, "NZLCPICORQINMEI", &[100.0, 101.0]);
        seed_raw_cache(&config, "SWECPICORQINMEI", &[100.0, 100.5]);

        let report = batch_clean(&config);
        assert_eq!(report.items.len(), 10);
        assert_eq!(report.done_count(), 2);
        assert_eq!(report.failed_count(), 8);

        assert!(DataPaths::country_csv(&config.paths.processed_dir, "New Zealand").exists());
        assert!(DataPaths::country_csv(&config.paths.processed_dir, "Sweden").exists());
    }

    #[test]
    fn merge_long_writes_yoy_augmented_table() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        seed_raw_cache(&config, "NZLCPICORQINMEI", &[100.0, 101.0, 102.0, 103.0, 104.0]);

        batch_clean(&config);
        let output = merge_long(&config).unwrap();

        // One cached country, nine soft skips.
        assert_eq!(output.skipped.len(), 9);
        assert_eq!(output.table.len(), 5);
        let last = output.table.rows.last().unwrap();
        assert!((last.cpi_yoy.unwrap() - 4.0).abs() < 1e-12);

        let reloaded = load_long_table(&config).unwrap();
        assert_eq!(reloaded.rows, output.table.rows);
    }

    #[test]
    fn load_long_table_requires_a_merge_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let err = load_long_table(&config).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn fetch_all_continues_past_failures() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        seed_raw_cache(&config, "GDP", &[21000.0, 21500.0]);

        let output = fetch_all(&config).unwrap();
        assert_eq!(output.report.items.len(), 20);
        assert_eq!(output.report.done_count(), 1);
        assert_eq!(output.report.failed_count(), 19);
        assert_eq!(output.rows_written, 2);
        assert!(output.out_path.exists());
    }
}
