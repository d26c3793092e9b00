//! Raw snapshot payloads and the bundled baseline file.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde_json::Value;

use crate::error::DataError;

/// Default location of the bundled snapshot, relative to the working directory.
pub const DEFAULT_SNAPSHOT_PATH: &str = "data/england.json";

/// One full raw payload as returned by the upstream service.
///
/// The payload is kept opaque; only `crate::data::normalize` interprets it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSnapshot(Value);

impl RawSnapshot {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Number of per-day records, if the payload has the expected shape.
    pub fn record_count(&self) -> Option<usize> {
        self.0.get("data").and_then(Value::as_array).map(Vec::len)
    }
}

/// Read the bundled snapshot from disk.
///
/// Absence or an unreadable file is `StartupDataMissing`; a file that is not
/// JSON is `MalformedInput`. Structural checks are left to the normalizer.
pub fn load_bundled(path: &Path) -> Result<RawSnapshot, DataError> {
    let file = File::open(path).map_err(|e| DataError::StartupDataMissing {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let value: Value = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        if e.is_io() {
            DataError::StartupDataMissing {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        } else {
            DataError::MalformedInput(format!("invalid JSON in '{}': {e}", path.display()))
        }
    })?;

    log::info!(
        "loaded bundled snapshot {} ({} records)",
        path.display(),
        value.get("data").and_then(Value::as_array).map_or(0, Vec::len)
    );

    Ok(RawSnapshot::new(value))
}
