use crate::core::fingerprint::PageIndex;
use crate::core::similarity::CandidatePair;
use crate::error::{DedupError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Pages to drop from the output, kept in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeletionSet(BTreeSet<PageIndex>);

impl DeletionSet {
    pub fn contains(&self, page: PageIndex) -> bool {
        self.0.contains(&page)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = PageIndex> + '_ {
        self.0.iter().copied()
    }

    /// 1-based page numbers, as PDF tooling and users count them.
    pub fn page_numbers(&self) -> Vec<u32> {
        self.0
            .iter()
            .map(|&i| u32::try_from(i).map_or(u32::MAX, |n| n.saturating_add(1)))
            .collect()
    }
}

impl FromIterator<PageIndex> for DeletionSet {
    fn from_iter<I: IntoIterator<Item = PageIndex>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Collapse candidate pairs into the set of pages to delete.
///
/// The earlier page of every pair is canonical and the later one is marked.
/// Within any group of mutually similar pages only the lowest index
/// survives. A pair outside `a < b < page_count` means the pair generator is
/// broken and is reported as `InvalidPairIndex`.
pub fn resolve(pairs: &[CandidatePair], page_count: usize) -> Result<DeletionSet> {
    let mut deleted = BTreeSet::new();
    for pair in pairs {
        if pair.a >= pair.b || pair.b >= page_count {
            return Err(DedupError::InvalidPairIndex {
                a: pair.a,
                b: pair.b,
                page_count,
            });
        }
        deleted.insert(pair.b);
    }
    Ok(DeletionSet(deleted))
}
