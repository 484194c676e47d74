//! Foundation types for Murmur
//!
//! This crate holds the cooperative progress/cancellation protocol shared by
//! the synthesis and diarization facades: the continuation flag returned by
//! progress callbacks and the phase tracking for a single generation job.

pub mod progress;

pub use progress::{JobPhase, PhaseTransitionError, ProgressControl, ProgressTracker};
