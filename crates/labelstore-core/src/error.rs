//! Shared error type across labelstore crates.

use thiserror::Error;

/// Stable error codes (used in HTTP responses and tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Store settings failed validation.
    InvalidStoreSettings,
    /// Malformed config or payload.
    BadRequest,
    /// Metric name is not registered.
    UnknownMetric,
    /// Metric name registered twice.
    DuplicateMetric,
    /// Observation rejected by metric semantics.
    InvalidObservation,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidStoreSettings => "INVALID_STORE_SETTINGS",
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::UnknownMetric => "UNKNOWN_METRIC",
            ErrorCode::DuplicateMetric => "DUPLICATE_METRIC",
            ErrorCode::InvalidObservation => "INVALID_OBSERVATION",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, LabelStoreError>;

/// Unified error type used by core and collector.
#[derive(Debug, Error)]
pub enum LabelStoreError {
    #[error("invalid store settings: {0}")]
    InvalidStoreSettings(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unknown metric: {0}")]
    UnknownMetric(String),
    #[error("metric already registered: {0}")]
    DuplicateMetric(String),
    #[error("invalid observation: {0}")]
    InvalidObservation(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl LabelStoreError {
    /// Map an error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            LabelStoreError::InvalidStoreSettings(_) => ErrorCode::InvalidStoreSettings,
            LabelStoreError::BadRequest(_) => ErrorCode::BadRequest,
            LabelStoreError::UnknownMetric(_) => ErrorCode::UnknownMetric,
            LabelStoreError::DuplicateMetric(_) => ErrorCode::DuplicateMetric,
            LabelStoreError::InvalidObservation(_) => ErrorCode::InvalidObservation,
            LabelStoreError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            LabelStoreError::Internal(_) => ErrorCode::Internal,
        }
    }
}
