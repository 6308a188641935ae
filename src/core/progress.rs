use crate::error::{DedupError, Result};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub enum DedupPhase {
    Extracting,
    Analyzing,
    Assembling,
    Complete,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DedupProgress {
    pub phase: DedupPhase,
    pub completed: usize,
    pub total: usize,
}

pub type ProgressCallback = Box<dyn Fn(DedupProgress) + Send + Sync>;

/// Per-run state threaded through every pipeline stage: where progress goes
/// and whether the caller has asked to stop.
#[derive(Clone, Copy)]
pub struct RunContext<'a> {
    progress: Option<&'a ProgressCallback>,
    cancellation_token: &'a AtomicBool,
}

impl<'a> RunContext<'a> {
    pub fn new(progress: Option<&'a ProgressCallback>, cancellation_token: &'a AtomicBool) -> Self {
        Self {
            progress,
            cancellation_token,
        }
    }

    pub fn report(&self, phase: DedupPhase, completed: usize, total: usize) {
        if let Some(callback) = self.progress {
            callback(DedupProgress {
                phase,
                completed,
                total,
            });
        }
    }

    pub fn check_cancelled(&self) -> Result<()> {
        if self.cancellation_token.load(Ordering::Relaxed) {
            return Err(DedupError::Cancelled);
        }
        Ok(())
    }
}
