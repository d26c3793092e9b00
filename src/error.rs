use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the data pipeline (snapshot loading, fetching, normalizing).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("network failure: {0}")]
    NetworkFailure(String),

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("bundled snapshot '{}' unavailable: {reason}", path.display())]
    StartupDataMissing { path: PathBuf, reason: String },
}

impl DataError {
    /// Short label used in status lines and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            DataError::NetworkFailure(_) => "network",
            DataError::MalformedInput(_) => "malformed",
            DataError::StartupDataMissing { .. } => "startup",
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<DataError> for AppError {
    fn from(err: DataError) -> Self {
        let exit_code = match err {
            DataError::StartupDataMissing { .. } | DataError::MalformedInput(_) => 2,
            DataError::NetworkFailure(_) => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
