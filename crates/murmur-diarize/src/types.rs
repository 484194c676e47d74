//! Core types for speaker diarization

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One labeled stretch of speech.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiarizationSegment {
    /// Speaker label assigned by the backend's clustering.
    pub speaker: u32,
    /// Segment start, seconds from the beginning of the input.
    pub start: f32,
    /// Segment end, seconds from the beginning of the input.
    pub end: f32,
}

impl DiarizationSegment {
    pub fn new(speaker: u32, start: f32, end: f32) -> Self {
        Self {
            speaker,
            start,
            end,
        }
    }

    pub fn duration(&self) -> f32 {
        (self.end - self.start).max(0.0)
    }
}

/// Ordered collection of diarization segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiarizationResult {
    pub segments: Vec<DiarizationSegment>,
}

impl DiarizationResult {
    pub fn new(segments: Vec<DiarizationSegment>) -> Self {
        Self { segments }
    }

    pub fn sort_by_start_time(&mut self) {
        self.segments
            .sort_by(|a, b| a.start.total_cmp(&b.start).then(a.speaker.cmp(&b.speaker)));
    }

    /// Number of distinct speaker labels present.
    pub fn num_speakers(&self) -> usize {
        let mut labels: Vec<u32> = self.segments.iter().map(|s| s.speaker).collect();
        labels.sort_unstable();
        labels.dedup();
        labels.len()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Diarization facade configuration.
///
/// Validation happens upstream; the facade reads only what it needs for
/// backend dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiarizationConfig {
    /// Engine family to construct (factory dispatch key).
    pub engine: String,
    /// Engine-specific options, opaque to the facade.
    pub engine_options: HashMap<String, String>,
}

impl Default for DiarizationConfig {
    fn default() -> Self {
        Self {
            engine: "mock".to_string(),
            engine_options: HashMap::new(),
        }
    }
}
