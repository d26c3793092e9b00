//! Reporting utilities: text summaries for one-shot commands.

pub mod format;

pub use format::{fmt_count, format_summary};
