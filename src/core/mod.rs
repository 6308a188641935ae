pub mod duplicate;
pub mod extract;
pub mod fingerprint;
pub mod progress;
pub mod resolve;
pub mod similarity;
pub mod source;

pub use duplicate::{Analysis, DedupOutcome, DuplicateDetector};
pub use fingerprint::{Fingerprint, ImageDigest, PageIndex};
pub use progress::{DedupPhase, DedupProgress, ProgressCallback, RunContext};
pub use resolve::{resolve, DeletionSet};
pub use similarity::{compare, similarity, unordered_pairs, CandidatePair, Comparison};
pub use source::{ImageId, MemoryImage, MemoryPage, SourceImage, SourcePage};
