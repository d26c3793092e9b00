//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the selectable metric enum (`Metric`)
//! - normalized rows and the immutable table (`MetricRow`, `MetricTable`)

pub mod types;

pub use types::*;
