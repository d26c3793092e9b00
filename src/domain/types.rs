//! Shared domain types.
//!
//! These types are intentionally small and cheap to share:
//!
//! - `Metric` is the single-selection value driven by the UI
//! - `MetricRow` / `MetricTable` are the normalized, immutable dataset
//!
//! A `MetricTable` is never mutated after construction; a refresh builds a new
//! one and swaps it in whole.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A tracked cumulative metric.
///
/// The serialized names match the field names used in the raw snapshot JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Metric {
    #[serde(rename = "totalCases")]
    #[value(name = "totalCases")]
    TotalCases,
    #[serde(rename = "totalDeaths")]
    #[value(name = "totalDeaths")]
    TotalDeaths,
    #[serde(rename = "totalAdmissions")]
    #[value(name = "totalAdmissions")]
    TotalAdmissions,
}

impl Metric {
    /// All metrics, in selection-cycle order.
    pub const ALL: [Metric; 3] = [Metric::TotalCases, Metric::TotalDeaths, Metric::TotalAdmissions];

    /// Field name in the raw snapshot (and on the wire).
    pub fn key(self) -> &'static str {
        match self {
            Metric::TotalCases => "totalCases",
            Metric::TotalDeaths => "totalDeaths",
            Metric::TotalAdmissions => "totalAdmissions",
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            Metric::TotalCases => "Total cases",
            Metric::TotalDeaths => "Total deaths",
            Metric::TotalAdmissions => "Total admissions",
        }
    }

    /// Next metric in the fixed cycle: cases -> deaths -> admissions -> cases.
    pub fn next(self) -> Self {
        Metric::ALL[(self.index() + 1) % Metric::ALL.len()]
    }

    /// Previous metric in the cycle.
    pub fn prev(self) -> Self {
        Metric::ALL[(self.index() + Metric::ALL.len() - 1) % Metric::ALL.len()]
    }

    /// A member of the set that differs from `self`, used as a redraw decoy.
    ///
    /// Walks the cycle so it keeps working if `ALL` grows or shrinks.
    pub fn other(self) -> Self {
        let mut candidate = self.next();
        while candidate == self && Metric::ALL.len() > 1 {
            candidate = candidate.next();
        }
        candidate
    }

    fn index(self) -> usize {
        Metric::ALL.iter().position(|m| *m == self).unwrap_or(0)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .iter()
            .copied()
            .find(|m| m.key() == s)
            .ok_or_else(|| format!("unknown metric '{s}'"))
    }
}

/// One day's normalized metric values.
///
/// Deserializes straight from a raw snapshot record: a missing, `null` or
/// non-numeric metric reads as `0.0`, numeric strings are parsed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricRow {
    /// Date key as delivered by the source (ISO `YYYY-MM-DD` in practice).
    pub date: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_cases: f64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_deaths: f64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_admissions: f64,
}

fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(value.filter(|v| v.is_finite()).unwrap_or(0.0))
}

impl MetricRow {
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::TotalCases => self.total_cases,
            Metric::TotalDeaths => self.total_deaths,
            Metric::TotalAdmissions => self.total_admissions,
        }
    }
}

/// Normalized, date-ascending table of metric rows.
///
/// Construct it through `crate::data::normalize`; there is no way to mutate
/// rows after construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricTable {
    rows: Vec<MetricRow>,
}

impl MetricTable {
    /// Build a table from rows that are already in ascending date order.
    pub(crate) fn from_sorted_rows(rows: Vec<MetricRow>) -> Self {
        debug_assert!(rows.windows(2).all(|w| w[0].date <= w[1].date));
        Self { rows }
    }

    pub fn rows(&self) -> &[MetricRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<&MetricRow> {
        self.rows.first()
    }

    /// Most recent row.
    pub fn latest(&self) -> Option<&MetricRow> {
        self.rows.last()
    }

    /// The most recent `n` rows, still in ascending order.
    ///
    /// `n == 0` means "everything".
    pub fn tail(&self, n: usize) -> &[MetricRow] {
        if n == 0 || n >= self.rows.len() {
            return &self.rows;
        }
        &self.rows[self.rows.len() - n..]
    }

    /// `(date, value)` pairs for one metric over the trailing window.
    pub fn series(&self, metric: Metric, window: usize) -> Vec<(&str, f64)> {
        self.tail(window)
            .iter()
            .map(|r| (r.date.as_str(), r.value(metric)))
            .collect()
    }
}

/// A run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus environment and defaults).
#[derive(Debug, Clone)]
pub struct DashConfig {
    pub snapshot_path: PathBuf,
    pub api_url: String,
    /// Trailing window in days; `0` shows the full span.
    pub window: usize,
    pub metric: Metric,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date: &str, cases: f64) -> MetricRow {
        MetricRow {
            date: date.to_string(),
            total_cases: cases,
            total_deaths: 0.0,
            total_admissions: 0.0,
        }
    }

    #[test]
    fn metric_cycle_visits_every_member() {
        let mut m = Metric::TotalCases;
        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(m);
            m = m.next();
        }
        assert_eq!(m, Metric::TotalCases);
        assert_eq!(seen, Metric::ALL.to_vec());
    }

    #[test]
    fn prev_undoes_next() {
        for m in Metric::ALL {
            assert_eq!(m.next().prev(), m);
        }
    }

    #[test]
    fn other_is_never_self() {
        for m in Metric::ALL {
            assert_ne!(m.other(), m);
        }
    }

    #[test]
    fn metric_parses_wire_names() {
        assert_eq!("totalDeaths".parse::<Metric>().unwrap(), Metric::TotalDeaths);
        assert!("deaths".parse::<Metric>().is_err());
        assert_eq!(Metric::TotalAdmissions.to_string(), "totalAdmissions");
    }

    #[test]
    fn metric_serializes_as_wire_name() {
        assert_eq!(serde_json::to_string(&Metric::TotalCases).unwrap(), "\"totalCases\"");
        for m in Metric::ALL {
            let json = serde_json::to_value(m).unwrap();
            assert_eq!(json, m.key());
            assert_eq!(serde_json::from_value::<Metric>(json).unwrap(), m);
        }
        assert!(serde_json::from_str::<Metric>("\"cases\"").is_err());
    }

    #[test]
    fn row_deserializes_leniently() {
        let r: MetricRow = serde_json::from_value(serde_json::json!({
            "date": "2022-11-13",
            "totalCases": "20228010",
            "totalDeaths": null,
            "areaName": "England"
        }))
        .unwrap();
        assert_eq!(r, MetricRow {
            date: "2022-11-13".to_string(),
            total_cases: 20228010.0,
            total_deaths: 0.0,
            total_admissions: 0.0,
        });

        let r: MetricRow =
            serde_json::from_value(serde_json::json!({"date": "2022-11-14", "totalAdmissions": true})).unwrap();
        assert_eq!(r.total_admissions, 0.0);

        assert!(serde_json::from_value::<MetricRow>(serde_json::json!({"totalCases": 1})).is_err());
        assert!(serde_json::from_value::<MetricRow>(serde_json::json!({"date": 20221113})).is_err());
    }

    #[test]
    fn tail_keeps_ascending_order() {
        let table = MetricTable::from_sorted_rows(vec![
            row("2022-11-01", 1.0),
            row("2022-11-02", 2.0),
            row("2022-11-03", 3.0),
        ]);

        let tail = table.tail(2);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].date, "2022-11-02");
        assert_eq!(tail[1].date, "2022-11-03");

        assert_eq!(table.tail(0).len(), 3);
        assert_eq!(table.tail(10).len(), 3);
        assert_eq!(table.latest().map(|r| r.total_cases), Some(3.0));
    }

    #[test]
    fn series_selects_metric_column() {
        let table = MetricTable::from_sorted_rows(vec![MetricRow {
            date: "2022-11-18".to_string(),
            total_cases: 20249000.0,
            total_deaths: 172810.0,
            total_admissions: 904200.0,
        }]);
        assert_eq!(table.series(Metric::TotalDeaths, 0), vec![("2022-11-18", 172810.0)]);
    }
}
