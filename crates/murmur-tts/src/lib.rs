//! Offline text-to-speech facade for Murmur
//!
//! This crate turns a model-driven synthesis backend into a uniform,
//! cancellable, cacheable API: a backend contract with factory selection at
//! construction time, a content-addressable result cache that is transparent
//! to callers, and a cooperative progress/cancellation protocol threaded
//! through both cached and uncached paths.
//!
//! The inference math itself lives in backend crates; this crate ships only
//! the mock and no-op backends used for wiring and tests.

pub mod backend;
pub mod backends;
pub mod cache;
pub mod error;
pub mod synthesizer;
pub mod types;

pub use backend::{
    SynthesisBackend, SynthesisBackendFactory, SynthesisBackendRegistry, SynthesisProgress,
};
pub use cache::{
    fingerprint, fingerprint_with_voice, CacheError, CacheStats, DiskCache, Fingerprint,
    MemoryCache, ResultCache,
};
pub use error::{SynthesisError, SynthesisResult};
pub use synthesizer::OfflineSynthesizer;
pub use types::{CacheConfig, CacheKeyPolicy, GeneratedAudio, SynthesisConfig};
