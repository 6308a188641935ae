// Duplicate page detection pipeline:
// fingerprints -> candidate pairs -> deletion set

use crate::config::DedupConfig;
use crate::core::extract::extract;
use crate::core::fingerprint::Fingerprint;
use crate::core::progress::{DedupPhase, ProgressCallback, RunContext};
use crate::core::resolve::{resolve, DeletionSet};
use crate::core::similarity::{compare_detailed, CandidatePair};
use crate::core::source::SourcePage;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", content = "delete", rename_all = "snake_case")]
pub enum DedupOutcome {
    NoDuplicates,
    Duplicates(DeletionSet),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub page_count: usize,
    pub candidates: Vec<CandidatePair>,
    /// Text matched but the images did not; reported, never deleted.
    pub rejected: Vec<CandidatePair>,
    /// Per-page sum of character code points, for reports.
    pub text_checksums: Vec<u64>,
    pub outcome: DedupOutcome,
}

impl Analysis {
    pub fn deletion_set(&self) -> Option<&DeletionSet> {
        match &self.outcome {
            DedupOutcome::NoDuplicates => None,
            DedupOutcome::Duplicates(deletion) => Some(deletion),
        }
    }

    pub fn kept_pages(&self) -> usize {
        self.page_count - self.deletion_set().map_or(0, DeletionSet::len)
    }
}

pub struct DuplicateDetector {
    config: DedupConfig,
    progress_callback: Option<ProgressCallback>,
    cancellation_token: Arc<AtomicBool>,
}

impl DuplicateDetector {
    pub fn new(config: DedupConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            progress_callback: None,
            cancellation_token: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn config(&self) -> &DedupConfig {
        &self.config
    }

    pub fn get_cancellation_token(&self) -> Arc<AtomicBool> {
        self.cancellation_token.clone()
    }

    pub fn cancel(&self) {
        self.cancellation_token.store(true, Ordering::Relaxed);
    }

    /// Progress context for stages run outside the detector, such as assembly.
    pub fn context(&self) -> RunContext<'_> {
        RunContext::new(self.progress_callback.as_ref(), &self.cancellation_token)
    }

    /// Fingerprint every page, then compare and resolve.
    pub fn analyze<P: SourcePage>(&self, pages: &[P]) -> Result<Analysis> {
        let fingerprints = extract(pages, self.config.on_extraction_error, &self.context())?;
        self.analyze_fingerprints(&fingerprints)
    }

    pub fn analyze_fingerprints(&self, fingerprints: &[Fingerprint]) -> Result<Analysis> {
        let ctx = self.context();
        let page_count = fingerprints.len();

        let comparison = compare_detailed(fingerprints, &self.config, &ctx)?;
        let deletion = resolve(&comparison.candidates, page_count)?;

        log::info!(
            "Analyzed {} page(s): {} duplicate pair(s), {} rejected by images, {} page(s) to delete",
            page_count,
            comparison.candidates.len(),
            comparison.rejected.len(),
            deletion.len()
        );

        let outcome = if deletion.is_empty() {
            DedupOutcome::NoDuplicates
        } else {
            DedupOutcome::Duplicates(deletion)
        };

        Ok(Analysis {
            page_count,
            candidates: comparison.candidates,
            rejected: comparison.rejected,
            text_checksums: fingerprints.iter().map(Fingerprint::text_checksum).collect(),
            outcome,
        })
    }

    /// Signal that the run has finished, for progress consumers.
    pub fn finish(&self, total: usize) {
        self.context().report(DedupPhase::Complete, total, total);
    }
}
