//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory by the transform/fit stages
//! - persisted to the flat CSV artifacts the dashboard reads
//! - reloaded later without any custom storage machinery

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Quarterly cadence: periods per year.
///
/// This single constant drives both the YoY lag (compare against the row 4
/// positions earlier) and trend annualization (slope × 4).
pub const PERIODS_PER_YEAR: usize = 4;

/// Series category in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum SeriesCategory {
    Cpi,
    Gdp,
}

impl SeriesCategory {
    /// Human-readable label for terminal output and the macro table.
    pub fn display_name(self) -> &'static str {
        match self {
            SeriesCategory::Cpi => "CPI",
            SeriesCategory::Gdp => "GDP",
        }
    }
}

/// A single dated observation as fetched from FRED or read from the raw cache.
///
/// `value` is `None` when FRED reports a missing observation (`"."`). Missing
/// values survive the raw cache round trip and are only dropped by the cleaner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// An ordered raw series keyed by date, associated with one FRED series id.
#[derive(Debug, Clone)]
pub struct RawSeries {
    pub series_id: String,
    pub observations: Vec<Observation>,
}

/// One cleaned row: unique date, defined value, renamed to `cpi`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CleanObservation {
    pub date: NaiveDate,
    pub cpi: f64,
}

/// A cleaned series tagged with a country label.
///
/// When the cleaner runs without a country label, `label` falls back to the
/// source series id (and so does the output file name).
#[derive(Debug, Clone)]
pub struct CountrySeries {
    pub label: String,
    pub rows: Vec<CleanObservation>,
}

/// One row of the merged long-format table.
#[derive(Debug, Clone, PartialEq)]
pub struct LongRow {
    pub date: NaiveDate,
    pub country: String,
    pub cpi: f64,
    /// Year-over-year percent change; undefined for the first 4 observations
    /// of each country.
    pub cpi_yoy: Option<f64>,
}

/// One row of the combined CPI+GDP macro table written by the full fetch.
///
/// Unlike `LongRow` this carries raw (uncleaned) values, so missing
/// observations are preserved as empty cells.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroRow {
    pub date: NaiveDate,
    pub value: Option<f64>,
    pub country: String,
    pub category: SeriesCategory,
}

/// The merged long-format table: one row per `(date, country)`, sorted by
/// `(date, country)` ascending.
///
/// The table is rebuilt wholesale on every merge run and persisted as the
/// canonical artifact the dashboard reads.
#[derive(Debug, Clone, Default)]
pub struct LongTable {
    pub rows: Vec<LongRow>,
}

impl LongTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Restore the canonical `(date, country)` ordering.
    pub fn sort(&mut self) {
        self.rows
            .sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.country.cmp(&b.country)));
    }

    /// Sorted, de-duplicated list of countries present in the table.
    pub fn countries(&self) -> Vec<String> {
        let mut out: Vec<String> = self.rows.iter().map(|r| r.country.clone()).collect();
        out.sort();
        out.dedup();
        out
    }

    /// Earliest and latest dates present, if any rows exist.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.rows.iter().map(|r| r.date).min()?;
        let max = self.rows.iter().map(|r| r.date).max()?;
        Some((min, max))
    }
}

/// Which metric the dashboard plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Index level (`cpi` column).
    Level,
    /// Year-over-year percent change (`cpi_yoy` column).
    Yoy,
}

impl Metric {
    pub fn display_name(self) -> &'static str {
        match self {
            Metric::Level => "level",
            Metric::Yoy => "yoy %",
        }
    }
}

/// Inclusive date range used to slice the long table before fitting/plotting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Where pipeline artifacts live on disk.
///
/// The layout mirrors the flat-file persistence model:
/// - `raw_dir`: one cache file per FRED series id
/// - `processed_dir`: one cleaned file per country
/// - `merged_dir`: the canonical long-format tables
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub merged_dir: PathBuf,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("data/raw"),
            processed_dir: PathBuf::from("data/processed"),
            merged_dir: PathBuf::from("data/processed/merged"),
        }
    }
}

impl DataPaths {
    /// Raw cache file for a FRED series id.
    pub fn raw_series(&self, series_id: &str) -> PathBuf {
        self.raw_dir.join(format!("{series_id}.csv"))
    }

    /// Cleaned per-country file inside `dir`.
    pub fn cleaned_in(dir: &Path, country: Option<&str>, series_id: &str) -> PathBuf {
        dir.join(cleaned_file_name(country, series_id))
    }

    /// Cleaned file for a known country label inside `dir` (the merger's view,
    /// where no series id is involved).
    pub fn country_csv(dir: &Path, country: &str) -> PathBuf {
        dir.join(format!("{}_core_cpi.csv", country_slug(country)))
    }

    /// The canonical merged CPI long table.
    pub fn long_table(&self) -> PathBuf {
        self.merged_dir.join("core_cpi_long.csv")
    }

    /// The combined CPI+GDP macro table written by the full fetch.
    pub fn macro_table(&self) -> PathBuf {
        self.merged_dir.join("core_macro_long.csv")
    }
}

/// Slug used in per-country file names: lower-cased, spaces to underscores.
pub fn country_slug(label: &str) -> String {
    label.to_lowercase().replace(' ', "_")
}

/// File name for a cleaned series: `<country_slug>_core_cpi.csv`, or
/// `<series_id>.csv` when no country label was supplied.
pub fn cleaned_file_name(country: Option<&str>, series_id: &str) -> String {
    match country {
        Some(c) => format!("{}_core_cpi.csv", country_slug(c)),
        None => format!("{series_id}.csv"),
    }
}

/// Explicit run configuration passed into every pipeline stage.
///
/// Built once at the CLI edge (catalog defaults + `.env` lookup) so that the
/// stages themselves are functions of their inputs plus this value, never of
/// ambient globals or environment state.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub catalog: crate::domain::SeriesCatalog,
    pub paths: DataPaths,
    /// FRED API key; only required on a raw-cache miss.
    pub api_key: Option<String>,
}
