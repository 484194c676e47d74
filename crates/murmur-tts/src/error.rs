//! Error types for synthesis

use crate::cache::CacheError;
use thiserror::Error;

/// Synthesis error kinds.
///
/// Construction failures are fatal to building the facade; generation and
/// cache failures propagate to the caller unchanged. The facade never
/// retries.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// Unrecognized or invalid engine selection. Raised before any backend
    /// resource is allocated.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The selected factory failed to construct its backend.
    #[error("backend construction failed: {0}")]
    BackendConstruction(String),

    /// The backend failed mid-inference.
    #[error("synthesis failed: {0}")]
    Generation(String),

    /// Result cache storage failure. Distinct from a cache miss.
    #[error("result cache error: {0}")]
    Cache(#[from] CacheError),
}

/// Result type for synthesis operations.
pub type SynthesisResult<T> = Result<T, SynthesisError>;
