//! Shared error type across httpmon crates.

use thiserror::Error;

/// Stable error codes (used in HTTP error bodies and tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Invalid configuration or path template.
    BadConfig,
    /// Measure/view registration rejected by the sink.
    Registration,
    /// Tag set does not fit the registered view.
    TagMismatch,
    /// Application (upstream) call failed.
    Upstream,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::BadConfig => "BAD_CONFIG",
            ErrorCode::Registration => "REGISTRATION",
            ErrorCode::TagMismatch => "TAG_MISMATCH",
            ErrorCode::Upstream => "UPSTREAM",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Unified error type used by core and sidecar.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("invalid path template: {0}")]
    InvalidTemplate(String),
    #[error("measure already registered: {0}")]
    DuplicateMeasure(String),
    #[error("measure not registered: {0}")]
    UnknownMeasure(String),
    #[error("tag `{key}` is not a dimension of {measure}")]
    TagMismatch { measure: String, key: &'static str },
    #[error("upstream: {0}")]
    Upstream(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl MonitorError {
    /// Map an error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            MonitorError::BadConfig(_) | MonitorError::InvalidTemplate(_) => ErrorCode::BadConfig,
            MonitorError::DuplicateMeasure(_) | MonitorError::UnknownMeasure(_) => {
                ErrorCode::Registration
            }
            MonitorError::TagMismatch { .. } => ErrorCode::TagMismatch,
            MonitorError::Upstream(_) => ErrorCode::Upstream,
            MonitorError::Internal(_) => ErrorCode::Internal,
        }
    }
}
