//! Series Cleaner.
//!
//! Turns one raw series into a cleaned `CountrySeries`:
//!
//! - duplicate dates resolved by keeping the first-encountered occurrence
//!   (no averaging)
//! - rows with a missing value dropped entirely
//! - the value column renamed to the fixed semantic name `cpi`
//!
//! The cleaner also persists the result to a deterministic per-country path;
//! re-running it on the same input produces byte-identical output.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::domain::{CleanObservation, CountrySeries, DataPaths, RawSeries};
use crate::error::AppError;
use crate::io::write_cleaned_csv;

/// Clean a raw series in memory.
///
/// The label falls back to the series id when no country is supplied.
pub fn clean_series(raw: &RawSeries, country: Option<&str>) -> CountrySeries {
    let mut seen: HashSet<chrono::NaiveDate> = HashSet::new();
    let mut rows: Vec<CleanObservation> = Vec::with_capacity(raw.observations.len());

    for obs in &raw.observations {
        // First occurrence wins; later duplicates are discarded even when the
        // kept row turns out to be missing.
        if !seen.insert(obs.date) {
            continue;
        }
        if let Some(value) = obs.value {
            rows.push(CleanObservation { date: obs.date, cpi: value });
        }
    }

    // Raw input order is whatever the source produced; the cleaned artifact
    // guarantees strictly increasing dates.
    rows.sort_by_key(|r| r.date);

    CountrySeries {
        label: country.unwrap_or(&raw.series_id).to_string(),
        rows,
    }
}

/// Clean a raw series and persist it under `out_dir`.
///
/// Returns the cleaned series and the path it was written to.
pub fn clean_and_save_series(
    raw: &RawSeries,
    country: Option<&str>,
    out_dir: &Path,
) -> Result<(CountrySeries, PathBuf), AppError> {
    let cleaned = clean_series(raw, country);
    let path = DataPaths::cleaned_in(out_dir, country, &raw.series_id);
    write_cleaned_csv(&path, &cleaned)?;
    Ok((cleaned, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Observation;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn raw(observations: Vec<Observation>) -> RawSeries {
        RawSeries {
            series_id: "TESTSERIES".to_string(),
            observations,
        }
    }

    #[test]
    fn duplicate_dates_keep_first_occurrence() {
        let series = raw(vec![
            Observation { date: date(2020, 1), value: Some(100.0) },
            Observation { date: date(2020, 1), value: Some(999.0) },
            Observation { date: date(2020, 4), value: Some(101.0) },
        ]);

        let cleaned = clean_series(&series, Some("New Zealand"));
        assert_eq!(cleaned.rows.len(), 2);
        assert_eq!(cleaned.rows[0].cpi, 100.0);

        let mut dates: Vec<_> = cleaned.rows.iter().map(|r| r.date).collect();
        dates.dedup();
        assert_eq!(dates.len(), cleaned.rows.len());
    }

    #[test]
    fn missing_values_are_dropped() {
        let series = raw(vec![
            Observation { date: date(2020, 1), value: Some(100.0) },
            Observation { date: date(2020, 4), value: None },
            Observation { date: date(2020, 7), value: Some(102.0) },
        ]);

        let cleaned = clean_series(&series, None);
        assert_eq!(cleaned.rows.len(), 2);
        assert!(cleaned.rows.iter().all(|r| r.cpi.is_finite()));
    }

    #[test]
    fn dates_strictly_increasing_after_cleaning() {
        let series = raw(vec![
            Observation { date: date(2020, 7), value: Some(102.0) },
            Observation { date: date(2020, 1), value: Some(100.0) },
            Observation { date: date(2020, 4), value: Some(101.0) },
        ]);

        let cleaned = clean_series(&series, None);
        assert!(cleaned.rows.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn label_falls_back_to_series_id() {
        let series = raw(vec![]);
        assert_eq!(clean_series(&series, None).label, "TESTSERIES");
        assert_eq!(clean_series(&series, Some("Sweden")).label, "Sweden");
    }

    #[test]
    fn cleaning_twice_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let series = raw(vec![
            Observation { date: date(2020, 1), value: Some(100.0) },
            Observation { date: date(2020, 4), value: Some(101.3) },
        ]);

        let (_, path1) = clean_and_save_series(&series, Some("Sweden"), dir.path()).unwrap();
        let first = std::fs::read(&path1).unwrap();
        let (_, path2) = clean_and_save_series(&series, Some("Sweden"), dir.path()).unwrap();
        let second = std::fs::read(&path2).unwrap();

        assert_eq!(path1, path2);
        assert_eq!(first, second);
    }

    #[test]
    fn output_file_name_uses_country_slug() {
        let dir = tempfile::tempdir().unwrap();
        let series = raw(vec![Observation { date: date(2020, 1), value: Some(1.0) }]);

        let (_, path) = clean_and_save_series(&series, Some("New Zealand"), dir.path()).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "new_zealand_core_cpi.csv"
        );

        let (_, path) = clean_and_save_series(&series, None, dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap().to_str().unwrap(), "TESTSERIES.csv");
    }
}
