//! Error types for diarization

use thiserror::Error;

/// Diarization error kinds.
///
/// Construction failures are fatal to building the facade; processing
/// failures propagate to the caller unchanged. A cooperative stop is never
/// an error.
#[derive(Debug, Error)]
pub enum DiarizationError {
    /// Unrecognized or invalid engine selection. Raised before any backend
    /// resource is allocated.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The selected factory failed to construct its backend.
    #[error("backend construction failed: {0}")]
    BackendConstruction(String),

    /// The backend failed mid-processing.
    #[error("diarization failed: {0}")]
    Processing(String),
}

/// Result type for diarization operations.
pub type DiarizationOpResult<T> = Result<T, DiarizationError>;
