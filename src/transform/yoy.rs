//! YoY Transformer.
//!
//! Appends the `cpi_yoy` column: each row's `cpi` compared to the value
//! exactly `PERIODS_PER_YEAR` positions earlier in the same country's
//! date-ascending sequence. The first 4 observations of each country stay
//! undefined, and the lag never crosses a country boundary.
//!
//! Row count and row order are unchanged; the grouping is computed over an
//! internal index ordering, so callers may pass the table in any row order.

use crate::domain::{LongTable, PERIODS_PER_YEAR};

/// Compute the grouped year-over-year percent change in place.
pub fn add_yoy(table: &mut LongTable) {
    // Per-country date ordering without disturbing the rows themselves.
    let mut order: Vec<usize> = (0..table.rows.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = &table.rows[a];
        let rb = &table.rows[b];
        ra.country.cmp(&rb.country).then_with(|| ra.date.cmp(&rb.date))
    });

    let mut updates: Vec<(usize, Option<f64>)> = Vec::with_capacity(order.len());
    let mut group_start = 0;
    for pos in 0..order.len() {
        let row = &table.rows[order[pos]];
        if table.rows[order[group_start]].country != row.country {
            group_start = pos;
        }

        let yoy = if pos - group_start >= PERIODS_PER_YEAR {
            let prev = &table.rows[order[pos - PERIODS_PER_YEAR]];
            Some((row.cpi / prev.cpi - 1.0) * 100.0)
        } else {
            None
        };
        updates.push((order[pos], yoy));
    }

    for (idx, yoy) in updates {
        table.rows[idx].cpi_yoy = yoy;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LongRow;
    use chrono::NaiveDate;

    fn quarterly(i: usize) -> NaiveDate {
        let month = 1 + 3 * (i % 4) as u32;
        let year = 2020 + (i / 4) as i32;
        NaiveDate::from_ymd_opt(year, month, 1).unwrap()
    }

    fn rows_for(country: &str, values: &[f64]) -> Vec<LongRow> {
        values
            .iter()
            .enumerate()
            .map(|(i, &cpi)| LongRow {
                date: quarterly(i),
                country: country.to_string(),
                cpi,
                cpi_yoy: None,
            })
            .collect()
    }

    #[test]
    fn yoy_defined_from_fifth_observation_with_exact_values() {
        // Worked example: cpi_yoy[4] = (104/100 - 1) * 100 = 4.0.
        let values = [100.0, 101.0, 102.0, 103.0, 104.0, 106.0, 108.0, 110.0, 112.0];
        let mut table = LongTable { rows: rows_for("X", &values) };
        add_yoy(&mut table);

        for i in 0..4 {
            assert_eq!(table.rows[i].cpi_yoy, None);
        }
        for i in 4..values.len() {
            let expected = (values[i] / values[i - 4] - 1.0) * 100.0;
            let got = table.rows[i].cpi_yoy.unwrap();
            assert!((got - expected).abs() < 1e-12);
        }
        assert!((table.rows[4].cpi_yoy.unwrap() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn lag_never_crosses_country_boundaries() {
        let mut rows = rows_for("A", &[100.0, 101.0, 102.0]);
        rows.extend(rows_for("B", &[200.0, 202.0, 204.0, 206.0, 208.0]));
        let mut table = LongTable { rows };
        add_yoy(&mut table);

        // "A" has only 3 observations: all undefined. If the lag leaked across
        // countries, some "B" row would compare against an "A" value.
        assert!(table.rows[..3].iter().all(|r| r.cpi_yoy.is_none()));
        assert!(table.rows[3..7].iter().all(|r| r.cpi_yoy.is_none()));
        let yoy = table.rows[7].cpi_yoy.unwrap();
        assert!((yoy - (208.0 / 200.0 - 1.0) * 100.0).abs() < 1e-12);
    }

    #[test]
    fn row_order_and_count_are_preserved() {
        // Deliberately unsorted input: the transformer must re-derive the
        // grouping internally and leave the physical rows where they are.
        let mut rows = rows_for("B", &[200.0, 202.0, 204.0, 206.0, 208.0]);
        rows.extend(rows_for("A", &[100.0, 101.0, 102.0, 103.0, 104.0]));
        rows.swap(0, 9);
        let before: Vec<(NaiveDate, String)> =
            rows.iter().map(|r| (r.date, r.country.clone())).collect();

        let mut table = LongTable { rows };
        add_yoy(&mut table);

        let after: Vec<(NaiveDate, String)> =
            table.rows.iter().map(|r| (r.date, r.country.clone())).collect();
        assert_eq!(before, after);

        // Each country's 5th quarterly observation gets a defined value.
        let defined: Vec<&LongRow> =
            table.rows.iter().filter(|r| r.cpi_yoy.is_some()).collect();
        assert_eq!(defined.len(), 2);
        for row in defined {
            let expected = match row.country.as_str() {
                "A" => (104.0 / 100.0 - 1.0) * 100.0,
                _ => (208.0 / 200.0 - 1.0) * 100.0,
            };
            assert!((row.cpi_yoy.unwrap() - expected).abs() < 1e-12);
        }
    }
}
