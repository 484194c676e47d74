//! Mock synthesis backend for testing

use crate::backend::{SynthesisBackend, SynthesisBackendFactory, SynthesisProgress};
use crate::error::{SynthesisError, SynthesisResult};
use crate::types::{GeneratedAudio, SynthesisConfig};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// Configuration for mock synthesis output.
#[derive(Debug, Clone)]
pub struct MockBackendConfig {
    /// Sample rate reported and attached to generated audio.
    pub sample_rate: u32,

    /// Speaker count reported by the backend.
    pub num_speakers: u32,

    /// Sample chunks emitted in order; the progress callback fires once per
    /// chunk with the fraction of chunks delivered so far.
    pub chunks: Vec<Vec<f32>>,

    /// Simulate a mid-inference failure with this message.
    pub fail_with: Option<String>,
}

impl Default for MockBackendConfig {
    fn default() -> Self {
        Self {
            sample_rate: 22_050,
            num_speakers: 1,
            chunks: vec![vec![0.1, 0.2, 0.3]],
            fail_with: None,
        }
    }
}

/// Observable mock state, shared so tests can keep a handle after the
/// backend is boxed.
#[derive(Debug, Default)]
pub struct MockState {
    generate_calls: u32,
}

impl MockState {
    pub fn calls(&self) -> u32 {
        self.generate_calls
    }
}

/// Mock backend producing configurable chunked output.
///
/// Honors cooperative stop between chunks and counts `generate` invocations
/// so tests can assert how often the backend actually ran.
pub struct MockBackend {
    config: MockBackendConfig,
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    pub fn new(config: MockBackendConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    pub fn with_chunks(chunks: Vec<Vec<f32>>) -> Self {
        Self::new(MockBackendConfig {
            chunks,
            ..Default::default()
        })
    }

    /// Number of times `generate` has been invoked.
    pub fn generate_calls(&self) -> u32 {
        self.state.lock().generate_calls
    }

    /// Shared handle to the invocation counter, usable after the backend is
    /// boxed into a facade.
    pub fn calls_handle(&self) -> Arc<Mutex<MockState>> {
        Arc::clone(&self.state)
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new(MockBackendConfig::default())
    }
}

impl SynthesisBackend for MockBackend {
    fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    fn num_speakers(&self) -> u32 {
        self.config.num_speakers
    }

    fn generate(
        &self,
        _text: &str,
        _speaker: u32,
        _speed: f32,
        mut progress: Option<SynthesisProgress<'_>>,
    ) -> SynthesisResult<GeneratedAudio> {
        self.state.lock().generate_calls += 1;

        if let Some(reason) = &self.config.fail_with {
            return Err(SynthesisError::Generation(reason.clone()));
        }

        let total_chunks = self.config.chunks.len().max(1);
        let mut samples = Vec::new();
        for (index, chunk) in self.config.chunks.iter().enumerate() {
            samples.extend_from_slice(chunk);
            let fraction = (index + 1) as f32 / total_chunks as f32;
            if let Some(callback) = progress.as_mut() {
                if callback(chunk, fraction).is_stop() {
                    debug!("mock backend stopping after chunk {}", index + 1);
                    break;
                }
            }
        }

        Ok(GeneratedAudio::new(samples, self.config.sample_rate))
    }
}

/// Factory for [`MockBackend`] instances.
#[derive(Default)]
pub struct MockBackendFactory {
    config: MockBackendConfig,
}

impl MockBackendFactory {
    pub fn new(config: MockBackendConfig) -> Self {
        Self { config }
    }
}

impl SynthesisBackendFactory for MockBackendFactory {
    fn id(&self) -> &str {
        "mock"
    }

    fn create(&self, _config: &SynthesisConfig) -> SynthesisResult<Box<dyn SynthesisBackend>> {
        Ok(Box::new(MockBackend::new(self.config.clone())))
    }
}
