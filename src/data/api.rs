//! Remote statistics API integration.
//!
//! A single GET against the public data service, asking for one nation and
//! remapping the provider's field names onto the three tracked metrics.

use reqwest::blocking::Client;
use serde_json::Value;

use crate::data::RawSnapshot;
use crate::domain::Metric;
use crate::error::DataError;

pub const DEFAULT_BASE_URL: &str = "https://api.coronavirus.data.gov.uk/v1/data";

const AREA_TYPE: &str = "nation";
const AREA_NAME: &str = "England";

/// Provider field backing each tracked metric.
const FIELD_MAP: [(Metric, &str); 3] = [
    (Metric::TotalCases, "cumCasesByPublishDate"),
    (Metric::TotalDeaths, "cumDeaths28DaysByPublishDate"),
    (Metric::TotalAdmissions, "cumAdmissions"),
];

/// Result of one fetch attempt. Consumed immediately by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Success(RawSnapshot),
    Failure(DataError),
}

/// Source of fresh raw snapshots.
///
/// Implementations must not panic or return early with an error: every
/// problem is reported as `FetchOutcome::Failure`.
pub trait Fetcher {
    fn fetch(&self) -> FetchOutcome;
}

pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn fetch_snapshot(&self) -> Result<RawSnapshot, DataError> {
        log::debug!("GET {} {:?}", self.base_url, query_params());

        let resp = self
            .client
            .get(&self.base_url)
            .query(&query_params())
            .send()
            .map_err(|e| DataError::NetworkFailure(format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(DataError::NetworkFailure(format!(
                "request failed with status {}",
                resp.status()
            )));
        }

        let body: Value = resp
            .json()
            .map_err(|e| DataError::NetworkFailure(format!("failed to decode response body: {e}")))?;

        Ok(RawSnapshot::new(body))
    }
}

impl Fetcher for ApiClient {
    fn fetch(&self) -> FetchOutcome {
        match self.fetch_snapshot() {
            Ok(snapshot) => {
                log::info!(
                    "fetched snapshot from {} ({} records)",
                    self.base_url,
                    snapshot.record_count().unwrap_or(0)
                );
                FetchOutcome::Success(snapshot)
            }
            Err(err) => {
                log::warn!("fetch from {} failed: {err}", self.base_url);
                FetchOutcome::Failure(err)
            }
        }
    }
}

/// The fixed query: region filter plus the field-name remapping.
pub fn query_params() -> [(&'static str, String); 2] {
    [
        ("filters", format!("areaType={AREA_TYPE};areaName={AREA_NAME}")),
        ("structure", structure_param()),
    ]
}

fn structure_param() -> String {
    let mut structure = serde_json::Map::new();
    structure.insert("date".to_string(), Value::String("date".to_string()));
    for (metric, field) in FIELD_MAP {
        structure.insert(metric.key().to_string(), Value::String(field.to_string()));
    }
    Value::Object(structure).to_string()
}
