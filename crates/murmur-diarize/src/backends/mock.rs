//! Mock diarization backend for testing

use crate::backend::{DiarizationBackend, DiarizationBackendFactory, DiarizationProgress};
use crate::error::{DiarizationError, DiarizationOpResult};
use crate::types::{DiarizationConfig, DiarizationResult, DiarizationSegment};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// Configuration for mock diarization output.
#[derive(Debug, Clone)]
pub struct MockDiarizerConfig {
    /// Input sample rate reported by the backend.
    pub sample_rate: u32,

    /// Segments emitted in order; the progress callback fires after each
    /// one with the fraction of segments delivered so far.
    pub segments: Vec<DiarizationSegment>,

    /// Simulate a mid-processing failure with this message.
    pub fail_with: Option<String>,
}

impl Default for MockDiarizerConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            segments: vec![
                DiarizationSegment::new(0, 0.0, 1.5),
                DiarizationSegment::new(1, 1.5, 3.0),
            ],
            fail_with: None,
        }
    }
}

/// Observable mock state, shared so tests can keep a handle after the
/// backend is boxed.
#[derive(Debug, Default)]
pub struct MockDiarizerState {
    process_calls: u32,
}

impl MockDiarizerState {
    pub fn calls(&self) -> u32 {
        self.process_calls
    }
}

/// Mock backend emitting configurable segments.
///
/// Honors cooperative stop between segments and counts `process`
/// invocations.
pub struct MockDiarizer {
    config: MockDiarizerConfig,
    state: Arc<Mutex<MockDiarizerState>>,
}

impl MockDiarizer {
    pub fn new(config: MockDiarizerConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(MockDiarizerState::default())),
        }
    }

    pub fn with_segments(segments: Vec<DiarizationSegment>) -> Self {
        Self::new(MockDiarizerConfig {
            segments,
            ..Default::default()
        })
    }

    /// Number of times `process` has been invoked.
    pub fn process_calls(&self) -> u32 {
        self.state.lock().process_calls
    }

    /// Shared handle to the invocation counter.
    pub fn calls_handle(&self) -> Arc<Mutex<MockDiarizerState>> {
        Arc::clone(&self.state)
    }
}

impl Default for MockDiarizer {
    fn default() -> Self {
        Self::new(MockDiarizerConfig::default())
    }
}

impl DiarizationBackend for MockDiarizer {
    fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    fn process(
        &self,
        _samples: &[f32],
        mut progress: Option<DiarizationProgress<'_>>,
    ) -> DiarizationOpResult<DiarizationResult> {
        self.state.lock().process_calls += 1;

        if let Some(reason) = &self.config.fail_with {
            return Err(DiarizationError::Processing(reason.clone()));
        }

        let total = self.config.segments.len().max(1);
        let mut segments = Vec::new();
        for (index, segment) in self.config.segments.iter().enumerate() {
            segments.push(*segment);
            let fraction = (index + 1) as f32 / total as f32;
            if let Some(callback) = progress.as_mut() {
                if callback(fraction).is_stop() {
                    debug!("mock diarizer stopping after segment {}", index + 1);
                    break;
                }
            }
        }

        Ok(DiarizationResult::new(segments))
    }
}

/// Factory for [`MockDiarizer`] instances.
#[derive(Default)]
pub struct MockDiarizerFactory {
    config: MockDiarizerConfig,
}

impl MockDiarizerFactory {
    pub fn new(config: MockDiarizerConfig) -> Self {
        Self { config }
    }
}

impl DiarizationBackendFactory for MockDiarizerFactory {
    fn id(&self) -> &str {
        "mock"
    }

    fn create(
        &self,
        _config: &DiarizationConfig,
    ) -> DiarizationOpResult<Box<dyn DiarizationBackend>> {
        Ok(Box::new(MockDiarizer::new(self.config.clone())))
    }
}
