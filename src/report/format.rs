//! Formatted terminal output for batch reports and trend insights.

use crate::app::pipeline::{BatchReport, ItemStatus, MergeRunOutput};
use crate::domain::DateWindow;
use crate::fit::CountryTrend;

/// Format a batch run report: one line per item plus a totals line.
pub fn format_batch_report(title: &str, report: &BatchReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== {title} ===\n"));
    for item in &report.items {
        match &item.status {
            ItemStatus::Done { rows, from_cache } => {
                let source = if *from_cache { "cache" } else { "fred" };
                out.push_str(&format!(
                    "  ok     {:<16} {} ({rows} rows, {source})\n",
                    item.country, item.series_id
                ));
            }
            ItemStatus::Failed { message } => {
                out.push_str(&format!(
                    "  failed {:<16} {}: {message}\n",
                    item.country, item.series_id
                ));
            }
        }
    }
    out.push_str(&format!(
        "{} ok, {} failed\n",
        report.done_count(),
        report.failed_count()
    ));

    out
}

/// Format the merge run summary, including soft-skipped countries.
pub fn format_merge_summary(output: &MergeRunOutput) -> String {
    let mut out = String::new();

    out.push_str("=== Merge to long format ===\n");
    for skip in &output.skipped {
        out.push_str(&format!(
            "  skipped {} (no file at {})\n",
            skip.country,
            skip.path.display()
        ));
    }
    out.push_str(&format!(
        "{} rows, {} countries -> {}\n",
        output.table.len(),
        output.table.countries().len(),
        output.out_path.display()
    ));
    if output.table.is_empty() {
        out.push_str("No data merged. Run `cpi batch` first.\n");
    }

    out
}

/// Format the per-country trend insight table.
pub fn format_trend_table(trends: &[CountryTrend], window: DateWindow) -> String {
    let mut out = String::new();

    out.push_str(&format!("Trend window: {} .. {}\n", window.start, window.end));
    out.push_str(
        format!(
            "{:<16} {:>10} {:>10} {:>10} {:>10} {:>8} {:>8}\n",
            "country", "latest", "cpi", "fitted", "residual", "dev%", "ann%"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<16} {:-<10} {:-<10} {:-<10} {:-<10} {:-<8} {:-<8}\n",
            "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for trend in trends {
        let i = &trend.insight;
        out.push_str(
            format!(
                "{:<16} {:>10} {:>10.2} {:>10.2} {:>10.2} {:>8.2} {:>8.2}\n",
                truncate(&trend.country, 16),
                i.date,
                i.actual,
                i.fitted,
                i.residual,
                i.pct_deviation,
                i.annualized_pct,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
