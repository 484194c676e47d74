//! Synthesis backend contract and factory selection

use crate::error::{SynthesisError, SynthesisResult};
use crate::types::{GeneratedAudio, SynthesisConfig};
use murmur_foundation::ProgressControl;

/// Progress callback for synthesis: receives the newly produced partial
/// sample buffer and a completion fraction in `[0, 1]`, and returns whether
/// the backend should keep going.
///
/// Invoked synchronously on the calling thread, zero or more times per
/// generation.
pub type SynthesisProgress<'a> = &'a mut dyn FnMut(&[f32], f32) -> ProgressControl;

/// Contract every synthesis backend implements.
///
/// Concrete model-backed engines live in their own crates; this crate ships
/// only the mock and no-op backends used for wiring and tests.
pub trait SynthesisBackend: Send + Sync {
    /// Output sample rate in Hz.
    fn sample_rate(&self) -> u32;

    /// Number of speakers the loaded model supports.
    fn num_speakers(&self) -> u32;

    /// Synthesize `text` for the given speaker id and speed factor.
    ///
    /// The backend may invoke `progress` with partial buffers and increasing
    /// fractions. When the callback returns [`ProgressControl::Stop`] the
    /// backend must cease promptly and return whatever it has produced —
    /// a cooperative stop is a success, not an error.
    fn generate(
        &self,
        text: &str,
        speaker: u32,
        speed: f32,
        progress: Option<SynthesisProgress<'_>>,
    ) -> SynthesisResult<GeneratedAudio>;
}

/// Factory for one synthesis engine family.
pub trait SynthesisBackendFactory: Send + Sync {
    /// Engine family this factory constructs (the dispatch key matched
    /// against `SynthesisConfig::engine`).
    fn id(&self) -> &str;

    /// Construct the backend for `config`.
    fn create(&self, config: &SynthesisConfig) -> SynthesisResult<Box<dyn SynthesisBackend>>;
}

/// Registry of synthesis backend factories.
///
/// Selection is a pure function of `config.engine`: exactly one factory
/// matches or construction fails, before any inference resource is
/// allocated.
#[derive(Default)]
pub struct SynthesisBackendRegistry {
    factories: Vec<Box<dyn SynthesisBackendFactory>>,
}

impl SynthesisBackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in mock and no-op backends.
    pub fn with_builtin_backends() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(crate::backends::MockBackendFactory::default()));
        registry.register(Box::new(crate::backends::NoopBackendFactory));
        registry
    }

    pub fn register(&mut self, factory: Box<dyn SynthesisBackendFactory>) {
        self.factories.push(factory);
    }

    /// Engine families this registry can construct.
    pub fn engine_ids(&self) -> Vec<&str> {
        self.factories.iter().map(|f| f.id()).collect()
    }

    /// Resolve `config.engine` to its factory and construct the backend.
    pub fn create(&self, config: &SynthesisConfig) -> SynthesisResult<Box<dyn SynthesisBackend>> {
        let factory = self
            .factories
            .iter()
            .find(|f| f.id() == config.engine)
            .ok_or_else(|| {
                SynthesisError::Configuration(format!(
                    "unknown synthesis engine '{}'",
                    config.engine
                ))
            })?;

        tracing::debug!(engine = %config.engine, "constructing synthesis backend");
        factory.create(config)
    }
}
