//! Formatted terminal output.
//!
//! We keep formatting code in one place so output changes are localized
//! (important for the golden tests below).

use crate::domain::{Metric, MetricRow, MetricTable};

/// Format the most recent `rows` rows (within the trailing `window`) and the
/// change of each metric across them.
pub fn format_summary(table: &MetricTable, rows: usize, window: usize) -> String {
    let mut out = String::new();
    out.push_str("=== covid - England cumulative metrics ===\n");

    let span = table.tail(window);
    let (Some(first), Some(last)) = (span.first(), span.last()) else {
        out.push_str("No rows.\n");
        return out;
    };
    out.push_str(&format!(
        "Rows: {} | span: {} .. {}\n\n",
        span.len(),
        first.date,
        last.date
    ));

    let shown = if rows == 0 || rows >= span.len() {
        span
    } else {
        &span[span.len() - rows..]
    };

    out.push_str(&format_table(shown));

    if let (Some(a), Some(b)) = (shown.first(), shown.last()) {
        out.push_str(&format!("\nChange {} -> {}:\n", a.date, b.date));
        for metric in Metric::ALL {
            let delta = b.value(metric) - a.value(metric);
            let sign = if delta > 0.0 { "+" } else { "" };
            out.push_str(&format!(
                "  {:<17} {:>14}\n",
                metric.display_name(),
                format!("{sign}{}", fmt_count(delta))
            ));
        }
    }

    out
}

fn format_table(rows: &[MetricRow]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<10} {:>16} {:>16} {:>16}\n",
        "date", "totalCases", "totalDeaths", "totalAdmissions"
    ));
    out.push_str(&format!("{:-<10} {:-<16} {:-<16} {:-<16}\n", "", "", "", ""));
    for r in rows {
        out.push_str(&format!(
            "{:<10} {:>16} {:>16} {:>16}\n",
            r.date,
            fmt_count(r.total_cases),
            fmt_count(r.total_deaths),
            fmt_count(r.total_admissions),
        ));
    }
    out
}

/// Whole-number formatting with thousands separators: `20249000` -> `20,249,000`.
pub fn fmt_count(v: f64) -> String {
    if !v.is_finite() {
        return "-".to_string();
    }
    let rounded = v.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}
