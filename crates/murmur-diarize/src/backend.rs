//! Diarization backend contract and factory selection

use crate::error::{DiarizationError, DiarizationOpResult};
use crate::types::{DiarizationConfig, DiarizationResult};
use murmur_foundation::ProgressControl;

/// Progress callback for diarization: receives a completion fraction in
/// `[0, 1]` and returns whether the backend should keep going. Invoked
/// synchronously on the calling thread, zero or more times per run.
pub type DiarizationProgress<'a> = &'a mut dyn FnMut(f32) -> ProgressControl;

/// Contract every diarization backend implements.
pub trait DiarizationBackend: Send + Sync {
    /// Input sample rate the backend expects, in Hz. Callers must supply
    /// audio at this rate; the facade does not resample.
    fn sample_rate(&self) -> u32;

    /// Segment `samples` into labeled speaker turns.
    ///
    /// When the callback returns [`ProgressControl::Stop`] the backend must
    /// cease promptly and return its best partial result — a cooperative
    /// stop is a success, not an error.
    fn process(
        &self,
        samples: &[f32],
        progress: Option<DiarizationProgress<'_>>,
    ) -> DiarizationOpResult<DiarizationResult>;
}

/// Factory for one diarization engine family.
pub trait DiarizationBackendFactory: Send + Sync {
    /// Engine family this factory constructs (the dispatch key matched
    /// against `DiarizationConfig::engine`).
    fn id(&self) -> &str;

    /// Construct the backend for `config`.
    fn create(&self, config: &DiarizationConfig)
        -> DiarizationOpResult<Box<dyn DiarizationBackend>>;
}

/// Registry of diarization backend factories.
///
/// Selection is a pure function of `config.engine`: exactly one factory
/// matches or construction fails, before any inference resource is
/// allocated.
#[derive(Default)]
pub struct DiarizationBackendRegistry {
    factories: Vec<Box<dyn DiarizationBackendFactory>>,
}

impl DiarizationBackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in mock backend.
    pub fn with_builtin_backends() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(crate::backends::MockDiarizerFactory::default()));
        registry
    }

    pub fn register(&mut self, factory: Box<dyn DiarizationBackendFactory>) {
        self.factories.push(factory);
    }

    /// Engine families this registry can construct.
    pub fn engine_ids(&self) -> Vec<&str> {
        self.factories.iter().map(|f| f.id()).collect()
    }

    /// Resolve `config.engine` to its factory and construct the backend.
    pub fn create(
        &self,
        config: &DiarizationConfig,
    ) -> DiarizationOpResult<Box<dyn DiarizationBackend>> {
        let factory = self
            .factories
            .iter()
            .find(|f| f.id() == config.engine)
            .ok_or_else(|| {
                DiarizationError::Configuration(format!(
                    "unknown diarization engine '{}'",
                    config.engine
                ))
            })?;

        tracing::debug!(engine = %config.engine, "constructing diarization backend");
        factory.create(config)
    }
}
