//! Per-country OLS trend decomposition.
//!
//! Given the merged long table and an inclusive date window, fit a straight
//! line (`cpi ~ time index`) per country and derive:
//!
//! - a fitted value for every row in the window (the dashed trend line)
//! - latest-point insight metrics: residual, percent deviation, annualized
//!   trend as percent of the fitted value
//!
//! Both outputs come from one fit per `(country, window)` pair so the plotted
//! line and the insight row can never disagree.

use chrono::NaiveDate;

use crate::domain::{DateWindow, LongTable, PERIODS_PER_YEAR};
use crate::math::{LineFit, fit_line};

/// One dated point on a fitted trend line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    /// 0-based position within the date-sorted window slice.
    pub time_index: usize,
    pub actual: f64,
    pub fitted: f64,
}

/// Latest-point metrics derived from the fitted line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendInsight {
    pub date: NaiveDate,
    pub actual: f64,
    pub fitted: f64,
    /// `actual - fitted` at the latest date.
    pub residual: f64,
    /// Residual as percent of the fitted value (0 when fitted is exactly 0).
    pub pct_deviation: f64,
    /// `slope × 4` as percent of the latest fitted value (same zero guard).
    pub annualized_pct: f64,
}

/// Full trend decomposition for one country over one window.
#[derive(Debug, Clone)]
pub struct CountryTrend {
    pub country: String,
    pub fit: LineFit,
    pub points: Vec<TrendPoint>,
    pub insight: TrendInsight,
}

/// Fit trends for each requested country over `window`.
///
/// Countries with fewer than 2 in-window observations produce no entry; the
/// result may be empty without being an error (callers present an explicit
/// "no data" state instead of an empty chart).
pub fn fit_country_trends(
    table: &LongTable,
    countries: &[String],
    window: DateWindow,
) -> Vec<CountryTrend> {
    countries
        .iter()
        .filter_map(|country| fit_one_country(table, country, window))
        .collect()
}

/// Fit a single country's trend, or `None` when the window slice is too short
/// or the solver declines the system.
pub fn fit_one_country(table: &LongTable, country: &str, window: DateWindow) -> Option<CountryTrend> {
    let mut slice: Vec<(NaiveDate, f64)> = table
        .rows
        .iter()
        .filter(|r| r.country == country && window.contains(r.date))
        .map(|r| (r.date, r.cpi))
        .collect();
    slice.sort_by_key(|&(date, _)| date);

    if slice.len() < 2 {
        return None;
    }

    let values: Vec<f64> = slice.iter().map(|&(_, v)| v).collect();
    let fit = fit_line(&values)?;

    let points: Vec<TrendPoint> = slice
        .iter()
        .enumerate()
        .map(|(i, &(date, actual))| TrendPoint {
            date,
            time_index: i,
            actual,
            fitted: fit.predict(i),
        })
        .collect();

    let last = points[points.len() - 1];
    let residual = last.actual - last.fitted;
    let insight = TrendInsight {
        date: last.date,
        actual: last.actual,
        fitted: last.fitted,
        residual,
        pct_deviation: pct_of(residual, last.fitted),
        annualized_pct: pct_of(fit.slope * PERIODS_PER_YEAR as f64, last.fitted),
    };

    Some(CountryTrend {
        country: country.to_string(),
        fit,
        points,
        insight,
    })
}

/// `numer` as a percentage of `denom`, defined as 0 when `denom` is exactly 0.
fn pct_of(numer: f64, denom: f64) -> f64 {
    if denom == 0.0 { 0.0 } else { numer / denom * 100.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LongRow;

    fn quarterly_dates(n: usize) -> Vec<NaiveDate> {
        (0..n)
            .map(|i| {
                let month = 1 + 3 * (i % 4) as u32;
                let year = 2020 + (i / 4) as i32;
                NaiveDate::from_ymd_opt(year, month, 1).unwrap()
            })
            .collect()
    }

    fn table_for(country: &str, values: &[f64]) -> LongTable {
        let dates = quarterly_dates(values.len());
        let rows = dates
            .iter()
            .zip(values)
            .map(|(&date, &cpi)| LongRow {
                date,
                country: country.to_string(),
                cpi,
                cpi_yoy: None,
            })
            .collect();
        LongTable { rows }
    }

    fn full_window(table: &LongTable) -> DateWindow {
        let (start, end) = table.date_bounds().unwrap();
        DateWindow { start, end }
    }

    #[test]
    fn perfectly_linear_series_fits_exactly() {
        let values: Vec<f64> = (0..9).map(|i| 10.0 + 2.0 * i as f64).collect();
        let table = table_for("X", &values);
        let window = full_window(&table);

        let trend = fit_one_country(&table, "X", window).unwrap();
        assert!((trend.fit.intercept - 10.0).abs() < 1e-9);
        assert!((trend.fit.slope - 2.0).abs() < 1e-9);
        for p in &trend.points {
            assert!((p.fitted - p.actual).abs() < 1e-9);
        }
        assert!(trend.insight.residual.abs() < 1e-9);
        assert!(trend.insight.pct_deviation.abs() < 1e-9);
    }

    #[test]
    fn annualized_trend_matches_worked_example() {
        // slope = 2, latest fitted value = 110 -> (2*4)/110*100 ≈ 7.27%
        let values: Vec<f64> = (0..51).map(|i| 10.0 + 2.0 * i as f64).collect();
        let table = table_for("X", &values);
        let trend = fit_one_country(&table, "X", full_window(&table)).unwrap();

        assert!((trend.insight.fitted - 110.0).abs() < 1e-6);
        assert!((trend.insight.annualized_pct - 8.0 / 110.0 * 100.0).abs() < 1e-6);
    }

    #[test]
    fn fewer_than_two_points_skips_country() {
        let table = table_for("X", &[100.0]);
        let window = full_window(&table);
        assert!(fit_one_country(&table, "X", window).is_none());

        let trends = fit_country_trends(&table, &["X".to_string(), "Y".to_string()], window);
        assert!(trends.is_empty());
    }

    #[test]
    fn window_restricts_the_fit_slice() {
        // Flat then steep: fitting only the flat half must give slope 0.
        let values = [100.0, 100.0, 100.0, 100.0, 200.0, 300.0];
        let table = table_for("X", &values);
        let dates = quarterly_dates(values.len());
        let window = DateWindow { start: dates[0], end: dates[3] };

        let trend = fit_one_country(&table, "X", window).unwrap();
        assert_eq!(trend.points.len(), 4);
        assert!(trend.fit.slope.abs() < 1e-9);
        assert_eq!(trend.insight.date, dates[3]);
    }

    #[test]
    fn zero_fitted_value_guards_division() {
        let table = table_for("X", &[0.0, 0.0, 0.0, 0.0]);
        let trend = fit_one_country(&table, "X", full_window(&table)).unwrap();
        assert_eq!(trend.insight.pct_deviation, 0.0);
        assert_eq!(trend.insight.annualized_pct, 0.0);
    }

    #[test]
    fn fit_ignores_other_countries_rows() {
        let mut table = table_for("X", &[10.0, 12.0, 14.0, 16.0]);
        let mut other = table_for("Y", &[1000.0, 1000.0, 1000.0, 1000.0]);
        table.rows.append(&mut other.rows);
        table.sort();

        let trend = fit_one_country(&table, "X", full_window(&table)).unwrap();
        assert!((trend.fit.slope - 2.0).abs() < 1e-9);
        assert!((trend.fit.intercept - 10.0).abs() < 1e-9);
    }
}
