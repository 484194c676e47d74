//! Built-in diarization backends

pub mod mock;

pub use mock::{MockDiarizer, MockDiarizerConfig, MockDiarizerFactory};
