//! `covid-dash` library crate.
//!
//! The binary (`covid`) is a thin wrapper around this library so that:
//!
//! - the refresh pipeline is testable without a terminal
//! - the same controller/view pair drives both the TUI and the one-shot commands

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod logging;
pub mod plot;
pub mod report;
pub mod tui;
pub mod view;
