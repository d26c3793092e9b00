//! Data sources and normalization.
//!
//! - bundled baseline snapshot (`snapshot`)
//! - remote statistics API (`api`)
//! - raw payload -> `MetricTable` (`normalize`)

pub mod api;
pub mod normalize;
pub mod snapshot;

pub use api::{ApiClient, FetchOutcome, Fetcher};
pub use normalize::normalize;
pub use snapshot::{RawSnapshot, load_bundled};
