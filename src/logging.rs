//! Process-wide `log` backend.
//!
//! Lines look like `[2022-11-18T09:00:00+00:00] INFO covid_dash::app::refresh - ...`.
//! The TUI owns stdout, so interactive runs log to a file; one-shot commands
//! log to stderr.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Local};
use log::{LevelFilter, Log, Metadata, Record};

use crate::error::AppError;

/// Default log file name for interactive sessions (placed in the temp dir).
pub const DEFAULT_LOG_FILE: &str = "covid-dash.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    pub fn default_file() -> Self {
        LogTarget::File(std::env::temp_dir().join(DEFAULT_LOG_FILE))
    }
}

enum Sink {
    Stderr,
    File(Mutex<File>),
}

struct DashLogger {
    level: LevelFilter,
    sink: Sink,
}

impl Log for DashLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(Local::now(), record);
        match &self.sink {
            Sink::Stderr => eprintln!("{line}"),
            Sink::File(file) => {
                if let Ok(mut file) = file.lock() {
                    let _ = writeln!(file, "{line}");
                }
            }
        }
    }

    fn flush(&self) {
        if let Sink::File(file) = &self.sink {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
    }
}

fn format_line(now: DateTime<Local>, record: &Record) -> String {
    format!(
        "[{}] {} {} - {}",
        now.to_rfc3339(),
        record.level(),
        record.target(),
        record.args()
    )
}

fn open_log_file(path: &Path) -> Result<File, AppError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| AppError::new(4, format!("Failed to open log file '{}': {e}", path.display())))
}

/// Install the logger. Calling it twice keeps the first logger.
pub fn init(target: &LogTarget, verbose: bool) -> Result<(), AppError> {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    let sink = match target {
        LogTarget::Stderr => Sink::Stderr,
        LogTarget::File(path) => Sink::File(Mutex::new(open_log_file(path)?)),
    };

    let logger = Box::new(DashLogger { level, sink });
    if log::set_boxed_logger(logger).is_ok() {
        log::set_max_level(level);
    }
    Ok(())
}
