//! Raw snapshot -> `MetricTable` normalization.
//!
//! This module owns the payload envelope; each record is read by `MetricRow`'s
//! `Deserialize` impl:
//!
//! ```json
//! { "data": [ { "date": "2022-11-18", "totalCases": 20249000, ... }, ... ] }
//! ```
//!
//! The same function is used for the bundled snapshot and for live fetches, so
//! both paths produce identical tables for identical payloads.

use std::cmp::Ordering;

use serde::Deserialize;

use crate::data::RawSnapshot;
use crate::domain::{MetricRow, MetricTable};
use crate::error::DataError;

const RECORDS_KEY: &str = "data";

/// Flatten a raw snapshot into a date-ascending table.
///
/// - rows are sorted by their date key (the upstream sends newest first)
/// - absent, `null` or non-numeric metric values become `0.0`
/// - a missing records array or a record without a date is `MalformedInput`
pub fn normalize(raw: &RawSnapshot) -> Result<MetricTable, DataError> {
    let root = raw
        .as_value()
        .as_object()
        .ok_or_else(|| DataError::MalformedInput("snapshot is not a JSON object".to_string()))?;

    let records = root
        .get(RECORDS_KEY)
        .ok_or_else(|| DataError::MalformedInput(format!("missing top-level '{RECORDS_KEY}' key")))?
        .as_array()
        .ok_or_else(|| DataError::MalformedInput(format!("'{RECORDS_KEY}' is not an array")))?;

    let mut rows = Vec::with_capacity(records.len());
    for (idx, record) in records.iter().enumerate() {
        if !record.is_object() {
            return Err(DataError::MalformedInput(format!("record {idx} is not an object")));
        }
        let row = MetricRow::deserialize(record)
            .map_err(|e| DataError::MalformedInput(format!("record {idx}: {e}")))?;
        rows.push(row);
    }

    // Duplicate dates are ordered by their values so input order never leaks
    // into the table.
    rows.sort_by(row_order);

    Ok(MetricTable::from_sorted_rows(rows))
}

fn row_order(a: &MetricRow, b: &MetricRow) -> Ordering {
    a.date
        .cmp(&b.date)
        .then_with(|| a.total_cases.total_cmp(&b.total_cases))
        .then_with(|| a.total_deaths.total_cmp(&b.total_deaths))
        .then_with(|| a.total_admissions.total_cmp(&b.total_admissions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::{Map, Value, json};

    fn five_rows_ascending() -> Vec<Value> {
        vec![
            json!({"date": "2022-11-14", "totalCases": 20231000, "totalDeaths": 172500, "totalAdmissions": 903100}),
            json!({"date": "2022-11-15", "totalCases": 20235000, "totalDeaths": 172600, "totalAdmissions": 903400}),
            json!({"date": "2022-11-16", "totalCases": 20240000, "totalDeaths": 172680, "totalAdmissions": 903700}),
            json!({"date": "2022-11-17", "totalCases": 20244000, "totalDeaths": 172750, "totalAdmissions": 904000}),
            json!({"date": "2022-11-18", "totalCases": 20249000, "totalDeaths": 172810, "totalAdmissions": 904200}),
        ]
    }

    fn snapshot(records: Vec<Value>) -> RawSnapshot {
        RawSnapshot::new(json!({ "data": records }))
    }

    #[test]
    fn ascending_and_descending_inputs_agree() {
        let asc = five_rows_ascending();
        let mut desc = asc.clone();
        desc.reverse();

        let a = normalize(&snapshot(asc)).unwrap();
        let d = normalize(&snapshot(desc)).unwrap();

        assert_eq!(a, d);
        let dates: Vec<&str> = a.rows().iter().map(|r| r.date.as_str()).collect();
        assert_eq!(
            dates,
            vec!["2022-11-14", "2022-11-15", "2022-11-16", "2022-11-17", "2022-11-18"]
        );
    }

    #[test]
    fn normalize_is_deterministic() {
        let raw = snapshot(five_rows_ascending());
        assert_eq!(normalize(&raw).unwrap(), normalize(&raw).unwrap());
    }

    #[test]
    fn missing_metrics_default_to_zero() {
        let raw = snapshot(vec![json!({"date": "2022-11-13", "totalCases": 20228010})]);
        let table = normalize(&raw).unwrap();

        assert_eq!(
            table.rows(),
            &[MetricRow {
                date: "2022-11-13".to_string(),
                total_cases: 20228010.0,
                total_deaths: 0.0,
                total_admissions: 0.0,
            }]
        );
    }

    #[test]
    fn null_and_string_values() {
        let raw = snapshot(vec![json!({
            "date": "2022-11-13",
            "totalCases": "42",
            "totalDeaths": null,
            "totalAdmissions": "n/a"
        })]);
        let row = normalize(&raw).unwrap().rows()[0].clone();
        assert_eq!(row.total_cases, 42.0);
        assert_eq!(row.total_deaths, 0.0);
        assert_eq!(row.total_admissions, 0.0);
    }

    #[test]
    fn missing_records_key_is_malformed() {
        let raw = RawSnapshot::new(json!({ "length": 0, "pagination": {} }));
        assert!(matches!(normalize(&raw), Err(DataError::MalformedInput(_))));
    }

    #[test]
    fn records_key_must_be_an_array() {
        let raw = RawSnapshot::new(json!({ "data": { "date": "2022-11-13" } }));
        assert!(matches!(normalize(&raw), Err(DataError::MalformedInput(_))));
    }

    #[test]
    fn row_without_date_is_malformed() {
        let raw = snapshot(vec![
            json!({"date": "2022-11-13", "totalCases": 1}),
            json!({"totalCases": 2}),
        ]);
        let err = normalize(&raw).unwrap_err();
        assert!(err.to_string().contains("record 1"), "unexpected error: {err}");
    }

    #[test]
    fn non_string_date_is_malformed() {
        let raw = snapshot(vec![json!({"date": 20221113, "totalCases": 1})]);
        assert!(matches!(normalize(&raw), Err(DataError::MalformedInput(_))));
    }

    #[test]
    fn duplicate_dates_ignore_input_order() {
        let a = json!({"date": "2022-11-13", "totalCases": 1});
        let b = json!({"date": "2022-11-13", "totalCases": 2});

        let fwd = normalize(&snapshot(vec![a.clone(), b.clone()])).unwrap();
        let rev = normalize(&snapshot(vec![b, a])).unwrap();

        assert_eq!(fwd, rev);
        assert_eq!(fwd.len(), 2);
        assert_eq!(fwd.rows()[0].total_cases, 1.0);
    }

    #[test]
    fn empty_records_yield_empty_table() {
        let table = normalize(&snapshot(Vec::new())).unwrap();
        assert!(table.is_empty());
    }

    fn arb_record() -> impl Strategy<Value = Value> {
        (
            (2020u32..2024, 1u32..13, 1u32..29),
            proptest::option::of(0u32..30_000_000),
            proptest::option::of(0u32..300_000),
            proptest::option::of(0u32..1_000_000),
        )
            .prop_map(|((y, m, d), cases, deaths, admissions)| {
                let mut obj = Map::new();
                obj.insert("date".to_string(), json!(format!("{y:04}-{m:02}-{d:02}")));
                if let Some(v) = cases {
                    obj.insert("totalCases".to_string(), json!(v));
                }
                if let Some(v) = deaths {
                    obj.insert("totalDeaths".to_string(), json!(v));
                }
                if let Some(v) = admissions {
                    obj.insert("totalAdmissions".to_string(), json!(v));
                }
                Value::Object(obj)
            })
    }

    proptest! {
        #[test]
        fn output_is_ascending_and_keeps_every_row(records in proptest::collection::vec(arb_record(), 0..40)) {
            let n = records.len();
            let table = normalize(&snapshot(records)).unwrap();
            prop_assert_eq!(table.len(), n);
            prop_assert!(table.rows().windows(2).all(|w| w[0].date <= w[1].date));
        }

        #[test]
        fn input_order_does_not_change_table(records in proptest::collection::vec(arb_record(), 1..40)) {
            let mut reversed = records.clone();
            reversed.reverse();
            let a = normalize(&snapshot(records)).unwrap();
            let b = normalize(&snapshot(reversed)).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
