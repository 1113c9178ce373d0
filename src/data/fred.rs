//! FRED API integration for quarterly macro series.
//!
//! The fetch boundary is `get_or_fetch_series`: a cache hit returns the cached
//! rows without any network call; a cache miss performs one remote call, then
//! writes the cache file before returning. There are no retries anywhere —
//! a failed fetch propagates and batch runners decide per item whether to
//! continue.

use std::path::Path;

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::domain::{Observation, PipelineConfig, RawSeries};
use crate::error::AppError;
use crate::io::{read_raw_csv, write_raw_csv};

const BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
const OBS_LIMIT: usize = 10000;

pub struct FredClient {
    client: Client,
    api_key: String,
}

impl FredClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
        }
    }

    /// Build a client from the explicit run configuration.
    ///
    /// The key is optional in `PipelineConfig` because fully cached runs never
    /// need it; constructing a client without one is the error.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, AppError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| AppError::new(2, "Missing FRED_API_KEY in environment (.env)."))?;
        Ok(Self::new(api_key))
    }

    /// Fetch the full history of one series, dates ascending.
    ///
    /// Missing observations (FRED's `"."`) are kept as `None` so the cache
    /// round-trips exactly what the API returned.
    pub fn fetch_series(&self, series_id: &str) -> Result<RawSeries, AppError> {
        let resp = self
            .client
            .get(BASE_URL)
            .query(&[
                ("series_id", series_id),
                ("api_key", &self.api_key),
                ("file_type", "json"),
                ("sort_order", "asc"),
                ("limit", &OBS_LIMIT.to_string()),
            ])
            .send()
            .map_err(|e| AppError::new(4, format!("FRED request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("FRED request for {series_id} failed with status {}.", resp.status()),
            ));
        }

        let body: ObservationsResponse = resp
            .json()
            .map_err(|e| AppError::new(4, format!("Failed to parse FRED response: {e}")))?;

        let mut observations = Vec::with_capacity(body.observations.len());
        for obs in body.observations {
            let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d")
                .map_err(|e| AppError::new(4, format!("Invalid FRED date '{}': {e}", obs.date)))?;
            observations.push(Observation {
                date,
                value: parse_value(&obs.value),
            });
        }

        Ok(RawSeries {
            series_id: series_id.to_string(),
            observations,
        })
    }
}

/// Return a series from the local cache, fetching and caching on miss.
pub fn get_or_fetch_series(config: &PipelineConfig, series_id: &str) -> Result<RawSeries, AppError> {
    let path = config.paths.raw_series(series_id);
    if path.exists() {
        return read_raw_csv(&path, series_id);
    }

    let client = FredClient::from_config(config)?;
    let series = client.fetch_series(series_id)?;
    write_raw_csv(&path, &series)?;
    Ok(series)
}

/// Whether the raw cache already holds this series.
pub fn is_cached(raw_dir: &Path, series_id: &str) -> bool {
    raw_dir.join(format!("{series_id}.csv")).exists()
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<RawObservation>,
}

#[derive(Debug, Deserialize)]
struct RawObservation {
    date: String,
    value: String,
}

fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed == "." || trimmed.is_empty() {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DataPaths, SeriesCatalog};

    #[test]
    fn parse_value_treats_dot_as_missing() {
        assert_eq!(parse_value("1.5"), Some(1.5));
        assert_eq!(parse_value("."), None);
        assert_eq!(parse_value(" . "), None);
        assert_eq!(parse_value(""), None);
        assert_eq!(parse_value("inf"), None);
    }

    #[test]
    fn cache_hit_never_needs_an_api_key() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths {
            raw_dir: dir.path().to_path_buf(),
            processed_dir: dir.path().to_path_buf(),
            merged_dir: dir.path().to_path_buf(),
        };
        let config = PipelineConfig {
            catalog: SeriesCatalog::default(),
            paths,
            api_key: None,
        };

        let series = RawSeries {
            series_id: "CACHED".to_string(),
            observations: vec![Observation {
                date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                value: Some(100.0),
            }],
        };
        write_raw_csv(&config.paths.raw_series("CACHED"), &series).unwrap();

        let loaded = get_or_fetch_series(&config, "CACHED").unwrap();
        assert_eq!(loaded.observations, series.observations);
    }

    #[test]
    fn cache_miss_without_key_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            catalog: SeriesCatalog::default(),
            paths: DataPaths {
                raw_dir: dir.path().to_path_buf(),
                processed_dir: dir.path().to_path_buf(),
                merged_dir: dir.path().to_path_buf(),
            },
            api_key: None,
        };

        let err = get_or_fetch_series(&config, "UNCACHED").unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
