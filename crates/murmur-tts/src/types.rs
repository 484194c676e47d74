//! Core types for offline speech synthesis

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Decoded audio produced by a synthesis backend.
///
/// Owned exclusively by whichever component produced it last; the cache
/// stores its own copy so entries stay immutable once written.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedAudio {
    /// Decoded samples, one `f32` amplitude per sample.
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl GeneratedAudio {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Synthesis facade configuration.
///
/// Validation of the descriptor happens upstream; the facade only reads the
/// fields it needs for backend dispatch and cache wiring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Engine family to construct (factory dispatch key, e.g. "mock", "noop").
    pub engine: String,
    /// Engine-specific options, opaque to the facade.
    pub engine_options: HashMap<String, String>,
    /// Result cache wiring. `None` disables caching entirely.
    pub cache: Option<CacheConfig>,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            engine: "noop".to_string(),
            engine_options: HashMap::new(),
            cache: None,
        }
    }
}

/// Result cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory for the on-disk store. `None` selects the in-memory store.
    pub dir: Option<PathBuf>,
    /// Total payload budget for the on-disk store; oldest entries are evicted
    /// to stay under it. `None` leaves the store unbounded.
    pub max_bytes: Option<u64>,
    /// Which request fields participate in the cache key.
    pub key_policy: CacheKeyPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: None,
            max_bytes: None,
            key_policy: CacheKeyPolicy::default(),
        }
    }
}

/// Which request fields are folded into the cache fingerprint.
///
/// `TextOnly` keys on the input text alone, so a hit can return audio that
/// was synthesized for a different speaker or speed than requested. That
/// matches the historical behavior this facade wraps; select
/// `TextSpeakerSpeed` to make the key voice-aware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheKeyPolicy {
    TextOnly,
    TextSpeakerSpeed,
}

impl Default for CacheKeyPolicy {
    fn default() -> Self {
        Self::TextOnly
    }
}
