//! Cooperative progress and cancellation protocol
//!
//! Backends report progress through a caller-supplied callback and honor a
//! stop request at their own pace. A stop is a valid outcome, never an error:
//! the backend returns whatever it has produced so far.

use thiserror::Error;

/// Continuation flag returned by a progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressControl {
    /// Keep going.
    Continue,
    /// Stop cooperatively and return the partial result.
    Stop,
}

impl ProgressControl {
    /// Maps the wire-level integer convention (nonzero = continue, zero = stop).
    pub fn from_flag(flag: i32) -> Self {
        if flag == 0 {
            Self::Stop
        } else {
            Self::Continue
        }
    }

    pub fn as_flag(self) -> i32 {
        match self {
            Self::Continue => 1,
            Self::Stop => 0,
        }
    }

    pub fn is_stop(self) -> bool {
        matches!(self, Self::Stop)
    }
}

/// Phase of a single generation/processing job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    NotStarted,
    Running,
    Completed,
    /// The callback asked to stop; the job still produced a valid, possibly
    /// incomplete, result.
    StoppedByCallback,
}

#[derive(Debug, Error)]
#[error("invalid phase transition: {from:?} -> {to:?}")]
pub struct PhaseTransitionError {
    pub from: JobPhase,
    pub to: JobPhase,
}

/// Tracks the phase of one job. Single-use: one tracker per invocation.
#[derive(Debug)]
pub struct ProgressTracker {
    phase: JobPhase,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            phase: JobPhase::NotStarted,
        }
    }

    /// Validated phase transition.
    pub fn transition(&mut self, next: JobPhase) -> Result<(), PhaseTransitionError> {
        let valid = matches!(
            (self.phase, next),
            (JobPhase::NotStarted, JobPhase::Running)
                | (JobPhase::Running, JobPhase::Completed)
                | (JobPhase::Running, JobPhase::StoppedByCallback)
        );

        if !valid {
            return Err(PhaseTransitionError {
                from: self.phase,
                to: next,
            });
        }

        tracing::debug!("job phase: {:?} -> {:?}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    /// Enter `Running`. Logs and ignores a repeat call.
    pub fn begin(&mut self) {
        if let Err(e) = self.transition(JobPhase::Running) {
            tracing::warn!("progress tracker misuse: {e}");
        }
    }

    /// Enter the terminal phase: `StoppedByCallback` if the callback asked to
    /// stop, `Completed` otherwise.
    pub fn finish(&mut self, stopped_by_callback: bool) {
        let terminal = if stopped_by_callback {
            JobPhase::StoppedByCallback
        } else {
            JobPhase::Completed
        };
        if let Err(e) = self.transition(terminal) {
            tracing::warn!("progress tracker misuse: {e}");
        }
    }

    pub fn phase(&self) -> JobPhase {
        self.phase
    }

    pub fn was_stopped(&self) -> bool {
        self.phase == JobPhase::StoppedByCallback
    }

    pub fn is_finished(&self) -> bool {
        matches!(
            self.phase,
            JobPhase::Completed | JobPhase::StoppedByCallback
        )
    }
}
