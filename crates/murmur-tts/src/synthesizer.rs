//! Synthesis facade: fingerprint, cache consult, backend dispatch

use crate::backend::{SynthesisBackend, SynthesisBackendRegistry, SynthesisProgress};
use crate::cache::{fingerprint, fingerprint_with_voice, DiskCache, MemoryCache, ResultCache};
use crate::error::SynthesisResult;
use crate::types::{CacheKeyPolicy, GeneratedAudio, SynthesisConfig};
use murmur_foundation::ProgressTracker;
use tracing::{debug, info};

/// Offline text-to-speech facade.
///
/// Owns exactly one backend, selected once at construction, and at most one
/// result cache. `generate` consults the cache before the backend and stores
/// every freshly generated result, partial or complete.
pub struct OfflineSynthesizer {
    backend: Box<dyn SynthesisBackend>,
    cache: Option<Box<dyn ResultCache>>,
    key_policy: CacheKeyPolicy,
}

impl std::fmt::Debug for OfflineSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfflineSynthesizer")
            .field("key_policy", &self.key_policy)
            .finish_non_exhaustive()
    }
}

impl OfflineSynthesizer {
    /// Construct from a configuration descriptor, resolving the engine
    /// through `registry`. Fails with a configuration error for an unknown
    /// engine before any backend resource is allocated.
    pub fn new(
        config: &SynthesisConfig,
        registry: &SynthesisBackendRegistry,
    ) -> SynthesisResult<Self> {
        let backend = registry.create(config)?;

        let (cache, key_policy) = match &config.cache {
            None => (None, CacheKeyPolicy::default()),
            Some(cache_config) => {
                let store: Box<dyn ResultCache> = match &cache_config.dir {
                    Some(dir) => Box::new(DiskCache::new(dir, cache_config.max_bytes)?),
                    None => Box::new(MemoryCache::new()),
                };
                (Some(store), cache_config.key_policy)
            }
        };

        info!(
            engine = %config.engine,
            cached = cache.is_some(),
            "synthesis facade ready"
        );
        Ok(Self {
            backend,
            cache,
            key_policy,
        })
    }

    /// Assemble from explicit parts. Intended for tests and for callers
    /// supplying their own cache implementation.
    pub fn from_parts(
        backend: Box<dyn SynthesisBackend>,
        cache: Option<Box<dyn ResultCache>>,
        key_policy: CacheKeyPolicy,
    ) -> Self {
        Self {
            backend,
            cache,
            key_policy,
        }
    }

    /// Output sample rate of the selected backend, in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.backend.sample_rate()
    }

    /// Number of speakers the selected backend supports.
    pub fn num_speakers(&self) -> u32 {
        self.backend.num_speakers()
    }

    /// Synthesize `text` for the given speaker id and speed factor.
    ///
    /// On a cache hit the callback, if supplied, is invoked exactly once
    /// with the full cached buffer and progress 1.0; its return value is
    /// recorded but the complete cached result is returned regardless — a
    /// stop flag only cancels backend-side generation, never cache replay.
    /// On a miss the backend runs with the caller's callback and the final
    /// result, partial or complete, is stored under the fingerprint.
    pub fn generate(
        &self,
        text: &str,
        speaker: u32,
        speed: f32,
        mut progress: Option<SynthesisProgress<'_>>,
    ) -> SynthesisResult<GeneratedAudio> {
        let key = match self.key_policy {
            CacheKeyPolicy::TextOnly => fingerprint(text),
            CacheKeyPolicy::TextSpeakerSpeed => fingerprint_with_voice(text, speaker, speed),
        };

        let mut tracker = ProgressTracker::new();

        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.lookup(&key)? {
                debug!(key = %key.to_hex(), "cache hit, replaying stored audio");
                tracker.begin();
                let mut stop_requested = false;
                if let Some(callback) = progress.as_mut() {
                    if callback(&cached.samples, 1.0).is_stop() {
                        debug!("callback requested stop during cache replay");
                        stop_requested = true;
                    }
                }
                tracker.finish(stop_requested);
                return Ok(cached);
            }
            debug!(key = %key.to_hex(), "cache miss, invoking backend");
        }

        tracker.begin();
        let mut stopped = false;
        let audio = match progress.as_mut() {
            Some(callback) => {
                let mut observed = |samples: &[f32], fraction: f32| {
                    let control = callback(samples, fraction);
                    if control.is_stop() {
                        stopped = true;
                    }
                    control
                };
                self.backend.generate(text, speaker, speed, Some(&mut observed))?
            }
            None => self.backend.generate(text, speaker, speed, None)?,
        };
        tracker.finish(stopped);
        if tracker.was_stopped() {
            debug!(
                samples = audio.samples.len(),
                "generation stopped cooperatively, keeping partial result"
            );
        }

        if let Some(cache) = &self.cache {
            cache.insert(&key, &audio)?;
        }
        Ok(audio)
    }
}
