//! Offline speaker diarization facade for Murmur
//!
//! Mirrors the synthesis facade's shape without a result cache: a backend
//! contract with factory selection at construction time and a cooperative
//! progress/cancellation protocol. The clustering and embedding math lives
//! in backend crates; this crate ships only the mock backend used for
//! wiring and tests.

pub mod backend;
pub mod backends;
pub mod diarizer;
pub mod error;
pub mod types;

pub use backend::{
    DiarizationBackend, DiarizationBackendFactory, DiarizationBackendRegistry, DiarizationProgress,
};
pub use diarizer::OfflineDiarizer;
pub use error::{DiarizationError, DiarizationOpResult};
pub use types::{DiarizationConfig, DiarizationResult, DiarizationSegment};
