//! Diarization facade: backend dispatch with cooperative progress

use crate::backend::{DiarizationBackend, DiarizationBackendRegistry, DiarizationProgress};
use crate::error::DiarizationOpResult;
use crate::types::{DiarizationConfig, DiarizationResult};
use murmur_foundation::ProgressTracker;
use tracing::{debug, info};

/// Offline speaker diarization facade.
///
/// Owns exactly one backend, selected once at construction. Diarization
/// results are not cached: the inputs are raw audio buffers with no cheap
/// stable fingerprint.
pub struct OfflineDiarizer {
    backend: Box<dyn DiarizationBackend>,
}

impl std::fmt::Debug for OfflineDiarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfflineDiarizer").finish_non_exhaustive()
    }
}

impl OfflineDiarizer {
    /// Construct from a configuration descriptor, resolving the engine
    /// through `registry`. Fails with a configuration error for an unknown
    /// engine before any backend resource is allocated.
    pub fn new(
        config: &DiarizationConfig,
        registry: &DiarizationBackendRegistry,
    ) -> DiarizationOpResult<Self> {
        let backend = registry.create(config)?;
        info!(engine = %config.engine, "diarization facade ready");
        Ok(Self { backend })
    }

    /// Assemble from an explicit backend. Intended for tests.
    pub fn from_backend(backend: Box<dyn DiarizationBackend>) -> Self {
        Self { backend }
    }

    /// Input sample rate the selected backend expects, in Hz. Query this
    /// before supplying audio; the facade does not resample.
    pub fn sample_rate(&self) -> u32 {
        self.backend.sample_rate()
    }

    /// Segment `samples` into labeled speaker turns.
    ///
    /// The callback, if supplied, observes progress fractions in `[0, 1]`;
    /// returning a stop flag ends processing cooperatively and yields the
    /// backend's best partial result.
    pub fn process(
        &self,
        samples: &[f32],
        mut progress: Option<DiarizationProgress<'_>>,
    ) -> DiarizationOpResult<DiarizationResult> {
        let mut tracker = ProgressTracker::new();
        tracker.begin();

        let mut stopped = false;
        let result = match progress.as_mut() {
            Some(callback) => {
                let mut observed = |fraction: f32| {
                    let control = callback(fraction);
                    if control.is_stop() {
                        stopped = true;
                    }
                    control
                };
                self.backend.process(samples, Some(&mut observed))?
            }
            None => self.backend.process(samples, None)?,
        };

        tracker.finish(stopped);
        if tracker.was_stopped() {
            debug!(
                segments = result.len(),
                "diarization stopped cooperatively, keeping partial result"
            );
        }
        Ok(result)
    }
}
