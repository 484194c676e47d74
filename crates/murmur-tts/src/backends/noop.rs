//! No-operation synthesis backend for wiring probes and fallback

use crate::backend::{SynthesisBackend, SynthesisBackendFactory, SynthesisProgress};
use crate::error::SynthesisResult;
use crate::types::{GeneratedAudio, SynthesisConfig};

/// A null backend that produces no audio.
///
/// Useful for exercising the facade, cache, and callback plumbing without
/// any model dependency.
#[derive(Debug, Clone, Default)]
pub struct NoopBackend;

impl NoopBackend {
    pub fn new() -> Self {
        Self
    }
}

impl SynthesisBackend for NoopBackend {
    fn sample_rate(&self) -> u32 {
        16_000
    }

    fn num_speakers(&self) -> u32 {
        1
    }

    fn generate(
        &self,
        _text: &str,
        _speaker: u32,
        _speed: f32,
        _progress: Option<SynthesisProgress<'_>>,
    ) -> SynthesisResult<GeneratedAudio> {
        // Never produces samples and never invokes the callback.
        Ok(GeneratedAudio::new(Vec::new(), self.sample_rate()))
    }
}

/// Factory for [`NoopBackend`] instances.
pub struct NoopBackendFactory;

impl SynthesisBackendFactory for NoopBackendFactory {
    fn id(&self) -> &str {
        "noop"
    }

    fn create(&self, _config: &SynthesisConfig) -> SynthesisResult<Box<dyn SynthesisBackend>> {
        Ok(Box::new(NoopBackend::new()))
    }
}
