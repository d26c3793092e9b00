//! Refresh orchestration: fetch -> normalize -> swap -> redraw.
//!
//! The controller owns the authoritative table as an `Arc<MetricTable>`. A
//! refresh either replaces that `Arc` wholesale or leaves it untouched; there
//! is no partially-applied state.

use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::data::{FetchOutcome, Fetcher, RawSnapshot, normalize};
use crate::domain::MetricTable;
use crate::error::DataError;
use crate::view::{Renderer, ViewBinding};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Fetching,
    Applying,
}

/// Where the current table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Bundled,
    Live { fetched_at: DateTime<Local> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshResult {
    /// The table was replaced and the view redrawn.
    Updated { rows: usize },
    /// Nothing changed; the previous table is still authoritative.
    Failed(DataError),
}

impl RefreshResult {
    pub fn is_updated(&self) -> bool {
        matches!(self, RefreshResult::Updated { .. })
    }
}

pub struct RefreshController<F> {
    fetcher: F,
    table: Arc<MetricTable>,
    source: DataSource,
    state: RefreshState,
}

impl<F: Fetcher> RefreshController<F> {
    /// Start from the bundled snapshot. A snapshot that does not normalize is fatal.
    pub fn from_snapshot(fetcher: F, raw: &RawSnapshot) -> Result<Self, DataError> {
        let table = normalize(raw)?;
        log::info!("baseline table: {} rows", table.len());
        Ok(Self {
            fetcher,
            table: Arc::new(table),
            source: DataSource::Bundled,
            state: RefreshState::Idle,
        })
    }

    /// Shared read-only handle to the current table.
    pub fn table(&self) -> Arc<MetricTable> {
        Arc::clone(&self.table)
    }

    pub fn source(&self) -> DataSource {
        self.source
    }

    pub fn state(&self) -> RefreshState {
        self.state
    }

    /// Try to replace the table with a freshly fetched snapshot.
    ///
    /// On success the view is pointed at the new table and redrawn exactly
    /// once. On any failure the table and the view are left as they were.
    pub fn refresh<R: Renderer>(&mut self, view: &mut ViewBinding<R>) -> RefreshResult {
        self.state = RefreshState::Fetching;
        let outcome = self.fetcher.fetch();

        let result = match self.apply(outcome) {
            Ok(table) => {
                let rows = table.len();
                view.show(table);
                log::info!("refresh applied: {rows} rows");
                RefreshResult::Updated { rows }
            }
            Err(err) => {
                log::warn!("refresh failed ({}), keeping {} rows: {err}", err.kind(), self.table.len());
                RefreshResult::Failed(err)
            }
        };

        self.state = RefreshState::Idle;
        result
    }

    fn apply(&mut self, outcome: FetchOutcome) -> Result<Arc<MetricTable>, DataError> {
        let raw = match outcome {
            FetchOutcome::Success(raw) => raw,
            FetchOutcome::Failure(err) => return Err(err),
        };

        self.state = RefreshState::Applying;
        let table = Arc::new(normalize(&raw)?);

        self.table = Arc::clone(&table);
        self.source = DataSource::Live {
            fetched_at: Local::now(),
        };
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Metric, MetricRow};
    use serde_json::json;
    use std::cell::Cell;

    struct StubFetcher {
        outcome: FetchOutcome,
        calls: Cell<usize>,
    }

    impl StubFetcher {
        fn new(outcome: FetchOutcome) -> Self {
            Self {
                outcome,
                calls: Cell::new(0),
            }
        }
    }

    impl Fetcher for StubFetcher {
        fn fetch(&self) -> FetchOutcome {
            self.calls.set(self.calls.get() + 1);
            self.outcome.clone()
        }
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(Metric, MetricTable)>,
    }

    impl Renderer for Recorder {
        fn render(&mut self, table: &MetricTable, metric: Metric) {
            self.calls.push((metric, table.clone()));
        }
    }

    fn baseline() -> RawSnapshot {
        RawSnapshot::new(json!({
            "data": [
                {"date": "2022-11-17", "totalCases": 20244000, "totalDeaths": 172750, "totalAdmissions": 904000},
                {"date": "2022-11-16", "totalCases": 20240000, "totalDeaths": 172680, "totalAdmissions": 903700}
            ]
        }))
    }

    fn setup(outcome: FetchOutcome) -> (RefreshController<StubFetcher>, ViewBinding<Recorder>) {
        let controller = RefreshController::from_snapshot(StubFetcher::new(outcome), &baseline()).unwrap();
        let mut view = ViewBinding::new(controller.table(), Metric::TotalDeaths, Recorder::default());
        view.renderer_mut().calls.clear();
        (controller, view)
    }

    #[test]
    fn failed_fetch_leaves_table_untouched() {
        let (mut controller, mut view) =
            setup(FetchOutcome::Failure(DataError::NetworkFailure("offline".to_string())));
        let before = (*controller.table()).clone();

        let result = controller.refresh(&mut view);

        assert_eq!(result, RefreshResult::Failed(DataError::NetworkFailure("offline".to_string())));
        assert_eq!(*controller.table(), before);
        assert_eq!(controller.source(), DataSource::Bundled);
        assert_eq!(controller.state(), RefreshState::Idle);
        assert!(view.renderer().calls.is_empty());
    }

    #[test]
    fn malformed_payload_is_a_failure() {
        let payload = RawSnapshot::new(json!({ "length": 1, "pagination": {"current": 1} }));
        let (mut controller, mut view) = setup(FetchOutcome::Success(payload));
        let before = (*controller.table()).clone();

        let result = controller.refresh(&mut view);

        assert!(matches!(result, RefreshResult::Failed(DataError::MalformedInput(_))));
        assert_eq!(*controller.table(), before);
        assert_eq!(view.table().len(), 2);
        assert!(view.renderer().calls.is_empty());
    }

    #[test]
    fn successful_refresh_swaps_table_and_renders_once() {
        let payload = RawSnapshot::new(json!({
            "data": [{"date": "2022-11-18", "totalCases": 20249000, "totalDeaths": 172810, "totalAdmissions": 904200}]
        }));
        let (mut controller, mut view) = setup(FetchOutcome::Success(payload));
        let old = controller.table();

        let result = controller.refresh(&mut view);

        assert_eq!(result, RefreshResult::Updated { rows: 1 });
        let expected = MetricTable::from_sorted_rows(vec![MetricRow {
            date: "2022-11-18".to_string(),
            total_cases: 20249000.0,
            total_deaths: 172810.0,
            total_admissions: 904200.0,
        }]);
        assert_eq!(*controller.table(), expected);
        assert!(matches!(controller.source(), DataSource::Live { .. }));

        // The previous table is still intact for anyone holding it.
        assert_eq!(old.len(), 2);

        let calls = &view.renderer().calls;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, Metric::TotalDeaths);
        assert_eq!(calls[0].1, expected);
        assert_eq!(view.selection(), Metric::TotalDeaths);
    }

    #[test]
    fn each_refresh_fetches_once() {
        let (mut controller, mut view) =
            setup(FetchOutcome::Failure(DataError::NetworkFailure("offline".to_string())));
        controller.refresh(&mut view);
        controller.refresh(&mut view);
        assert_eq!(controller.fetcher.calls.get(), 2);
    }

    #[test]
    fn bundled_snapshot_must_normalize() {
        let bad = RawSnapshot::new(json!({ "rows": [] }));
        let fetcher = StubFetcher::new(FetchOutcome::Failure(DataError::NetworkFailure(String::new())));
        assert!(RefreshController::from_snapshot(fetcher, &bad).is_err());
    }
}
