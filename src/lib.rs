//! Detect and remove duplicate pages inside a single PDF.
//!
//! Pages are fingerprinted (text plus image digests), every pair is scored
//! with a multiset Jaccard similarity, and the later page of each matching
//! pair is dropped. Pages whose text matches but whose images differ are kept.
//!
//! Known false positives: pages that differ only in text colour or
//! highlighting, or in the position of a drawn shape, look identical.

pub mod config;
pub mod core;
pub mod error;
pub mod services;

pub use config::{DedupConfig, ExtractionFailurePolicy, Tokenizer};
pub use crate::core::{Analysis, DedupOutcome, DeletionSet, DuplicateDetector};
pub use error::{DedupError, SourceError};
