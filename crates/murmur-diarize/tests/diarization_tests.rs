//! Diarization facade tests
//!
//! Tests cover:
//! - Factory selection and configuration failures
//! - Progress reporting (monotonic fractions, cooperative stop partiality)
//! - Result ordering and speaker counting
//! - Sample rate exposure for caller-side audio matching

use murmur_diarize::backends::{MockDiarizer, MockDiarizerConfig};
use murmur_diarize::{
    DiarizationBackend, DiarizationBackendRegistry, DiarizationConfig, DiarizationError,
    DiarizationResult, DiarizationSegment, OfflineDiarizer,
};
use murmur_foundation::ProgressControl;

fn segments(n: u32) -> Vec<DiarizationSegment> {
    (0..n)
        .map(|i| DiarizationSegment::new(i % 2, i as f32, i as f32 + 1.0))
        .collect()
}

// ─── Facade / Factory ────────────────────────────────────────────────

#[test]
fn facade_processes_through_selected_backend() {
    let registry = DiarizationBackendRegistry::with_builtin_backends();
    let config = DiarizationConfig::default();

    let diarizer = OfflineDiarizer::new(&config, &registry).unwrap();
    let result = diarizer.process(&[0.0; 16_000], None).unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result.num_speakers(), 2);
}

#[test]
fn unknown_engine_fails_at_construction() {
    let registry = DiarizationBackendRegistry::with_builtin_backends();
    let config = DiarizationConfig {
        engine: "does-not-exist".to_string(),
        ..Default::default()
    };

    let err = OfflineDiarizer::new(&config, &registry).unwrap_err();
    assert!(matches!(err, DiarizationError::Configuration(_)));
}

#[test]
fn factory_selection_is_deterministic() {
    let registry = DiarizationBackendRegistry::with_builtin_backends();
    let config = DiarizationConfig::default();

    let first = registry.create(&config).unwrap();
    let second = registry.create(&config).unwrap();
    assert_eq!(first.sample_rate(), second.sample_rate());
}

#[test]
fn facade_exposes_backend_sample_rate() {
    let backend = MockDiarizer::new(MockDiarizerConfig {
        sample_rate: 8_000,
        ..Default::default()
    });
    let diarizer = OfflineDiarizer::from_backend(Box::new(backend));
    assert_eq!(diarizer.sample_rate(), 8_000);
}

// ─── Progress / Cooperative Stop ─────────────────────────────────────

#[test]
fn progress_fractions_are_monotonic_and_reach_one() {
    let diarizer = OfflineDiarizer::from_backend(Box::new(MockDiarizer::with_segments(segments(5))));

    let mut fractions = Vec::new();
    let mut record = |fraction: f32| {
        fractions.push(fraction);
        ProgressControl::Continue
    };
    diarizer.process(&[0.0; 100], Some(&mut record)).unwrap();

    assert_eq!(fractions.len(), 5);
    assert!(
        fractions.windows(2).all(|w| w[0] <= w[1]),
        "fractions must be non-decreasing: {fractions:?}"
    );
    assert_eq!(*fractions.last().unwrap(), 1.0);
}

#[test]
fn stop_yields_partial_segments() {
    let diarizer = OfflineDiarizer::from_backend(Box::new(MockDiarizer::with_segments(segments(6))));

    let mut seen = 0;
    let mut stop_after_two = |_fraction: f32| {
        seen += 1;
        if seen >= 2 {
            ProgressControl::Stop
        } else {
            ProgressControl::Continue
        }
    };
    let partial = diarizer.process(&[0.0; 100], Some(&mut stop_after_two)).unwrap();

    assert_eq!(partial.len(), 2, "two segments delivered before stop");

    let full = diarizer.process(&[0.0; 100], None).unwrap();
    assert!(partial.len() <= full.len());
}

#[test]
fn stop_is_not_an_error() {
    let diarizer = OfflineDiarizer::from_backend(Box::new(MockDiarizer::default()));
    let mut stop = |_: f32| ProgressControl::Stop;
    let result = diarizer.process(&[0.0; 10], Some(&mut stop));
    assert!(result.is_ok(), "cooperative stop must yield a valid result");
}

#[test]
fn processing_failure_propagates() {
    let backend = MockDiarizer::new(MockDiarizerConfig {
        fail_with: Some("clustering diverged".to_string()),
        ..Default::default()
    });
    let diarizer = OfflineDiarizer::from_backend(Box::new(backend));

    let err = diarizer.process(&[0.0; 10], None).unwrap_err();
    assert!(matches!(err, DiarizationError::Processing(_)));
}

#[test]
fn backend_invoked_once_per_process_call() {
    let backend = MockDiarizer::default();
    let calls = backend.calls_handle();
    let diarizer = OfflineDiarizer::from_backend(Box::new(backend));

    diarizer.process(&[0.0; 10], None).unwrap();
    diarizer.process(&[0.0; 10], None).unwrap();
    assert_eq!(calls.lock().calls(), 2, "no caching layer for diarization");
}

// ─── Result Helpers ──────────────────────────────────────────────────

#[test]
fn result_sorts_by_start_time() {
    let mut result = DiarizationResult::new(vec![
        DiarizationSegment::new(1, 2.0, 3.0),
        DiarizationSegment::new(0, 0.0, 1.0),
        DiarizationSegment::new(0, 1.0, 2.0),
    ]);
    result.sort_by_start_time();

    let starts: Vec<f32> = result.segments.iter().map(|s| s.start).collect();
    assert_eq!(starts, vec![0.0, 1.0, 2.0]);
}

#[test]
fn result_counts_distinct_speakers() {
    let result = DiarizationResult::new(vec![
        DiarizationSegment::new(0, 0.0, 1.0),
        DiarizationSegment::new(1, 1.0, 2.0),
        DiarizationSegment::new(0, 2.0, 3.0),
    ]);
    assert_eq!(result.num_speakers(), 2);
    assert!(!result.is_empty());
}

#[test]
fn segment_duration_never_negative() {
    let segment = DiarizationSegment::new(0, 2.0, 1.0);
    assert_eq!(segment.duration(), 0.0);
    assert_eq!(DiarizationSegment::new(0, 1.0, 2.5).duration(), 1.5);
}
