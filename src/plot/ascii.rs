//! ASCII bar charts for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! One column per bar; when there are more days than columns, each column
//! shows the last day of its bucket (the metrics are cumulative).

use crate::domain::{Metric, MetricTable};

/// Render the selected metric over the trailing `window` days.
pub fn render_ascii_bars(
    table: &MetricTable,
    metric: Metric,
    window: usize,
    width: usize,
    height: usize,
) -> String {
    let series = table.series(metric, window);
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return format!("Plot: {metric} | no data\n");
    };

    let width = width.max(10);
    let height = height.max(5);

    let columns = bucket_last(&series.iter().map(|(_, v)| *v).collect::<Vec<_>>(), width);
    let (y_min, y_max) = value_range(&columns);

    let mut out = format!(
        "Plot: {metric} | {} .. {} ({} days) | y=[{y_min:.0}, {y_max:.0}]\n",
        first.0,
        last.0,
        series.len()
    );

    let levels: Vec<usize> = columns
        .iter()
        .map(|&v| bar_level(v, y_min, y_max, height))
        .collect();

    for row in 0..height {
        let threshold = height - row;
        let line: String = levels
            .iter()
            .map(|&level| if level >= threshold { '#' } else { ' ' })
            .collect();
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

/// Downsample to at most `max_columns` values, keeping the last value of each bucket.
fn bucket_last(values: &[f64], max_columns: usize) -> Vec<f64> {
    let n = values.len();
    let columns = n.min(max_columns.max(1));
    (0..columns)
        .map(|c| values[((c + 1) * n / columns).saturating_sub(1)])
        .collect()
}

fn value_range(values: &[f64]) -> (f64, f64) {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &v in values {
        min_y = min_y.min(v);
        max_y = max_y.max(v);
    }
    if min_y.is_finite() && max_y.is_finite() {
        (min_y, max_y)
    } else {
        (0.0, 0.0)
    }
}

/// Number of filled cells for a bar, in `1..=height`.
fn bar_level(v: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let u = if y_max > y_min {
        ((v - y_min) / (y_max - y_min)).clamp(0.0, 1.0)
    } else {
        1.0
    };
    (u * (height as f64 - 1.0)).round() as usize + 1
}
