//! All-pairs page comparison.
//!
//! Every unordered pair of pages is scored, so the cost grows with the square
//! of the page count. That is fine for the tens to low hundreds of pages a
//! typical document has; larger inputs should enable `parallel`.

use crate::config::{DedupConfig, Tokenizer};
use crate::core::fingerprint::{Fingerprint, PageIndex};
use crate::core::progress::{DedupPhase, RunContext};
use crate::error::Result;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

/// Two pages whose text similarity exceeded the threshold. `a < b` always.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidatePair {
    pub a: PageIndex,
    pub b: PageIndex,
    pub similarity: f64,
}

/// Outcome of comparing a whole fingerprint set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// Pairs accepted as duplicates, in lexicographic `(a, b)` order.
    pub candidates: Vec<CandidatePair>,
    /// Pairs with matching text whose images disagree.
    pub rejected: Vec<CandidatePair>,
}

type TokenCounts<'a> = HashMap<&'a str, usize>;

fn tokenize(text: &str, tokenizer: Tokenizer) -> TokenCounts<'_> {
    let mut counts = HashMap::new();
    match tokenizer {
        Tokenizer::Chars => {
            for (start, c) in text.char_indices() {
                *counts.entry(&text[start..start + c.len_utf8()]).or_insert(0) += 1;
            }
        }
        Tokenizer::Words => {
            for word in text.split_whitespace() {
                *counts.entry(word).or_insert(0) += 1;
            }
        }
    }
    counts
}

fn jaccard(a: &TokenCounts<'_>, b: &TokenCounts<'_>) -> f64 {
    let total_a: usize = a.values().sum();
    let total_b: usize = b.values().sum();
    let intersection: usize = a
        .iter()
        .map(|(token, &count)| count.min(b.get(token).copied().unwrap_or(0)))
        .sum();
    let union = total_a + total_b - intersection;

    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

/// No visible characters. PDF text extraction terminates every page with a
/// newline, so an empty page rarely comes back as `""`.
fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Multiset Jaccard similarity of two texts in `[0, 1]`.
///
/// Two blank texts (empty or whitespace only) score 0.0.
pub fn similarity(a: &str, b: &str, tokenizer: Tokenizer) -> f64 {
    if is_blank(a) && is_blank(b) {
        return 0.0;
    }
    jaccard(&tokenize(a, tokenizer), &tokenize(b, tokenizer))
}

/// Every `(i, k)` with `i < k < n`, in lexicographic order.
pub fn unordered_pairs(n: usize) -> impl Iterator<Item = (PageIndex, PageIndex)> {
    (0..n).flat_map(move |i| (i + 1..n).map(move |k| (i, k)))
}

/// When both pages carry images their digests must agree; otherwise there is
/// nothing to corroborate and the text decides alone.
fn images_corroborate(a: &Fingerprint, b: &Fingerprint) -> bool {
    if a.has_images() && b.has_images() {
        a.image_hashes() == b.image_hashes()
    } else {
        true
    }
}

struct PairJudge<'a> {
    fingerprints: &'a [Fingerprint],
    tokens: Vec<TokenCounts<'a>>,
    config: &'a DedupConfig,
}

/// `None` when the text is not similar enough; otherwise the pair and
/// whether the images agreed.
type Verdict = Option<(CandidatePair, bool)>;

impl<'a> PairJudge<'a> {
    fn new(fingerprints: &'a [Fingerprint], config: &'a DedupConfig) -> Self {
        let tokens = fingerprints
            .iter()
            .map(|f| tokenize(f.text(), config.tokenizer))
            .collect();
        Self {
            fingerprints,
            tokens,
            config,
        }
    }

    fn score(&self, i: PageIndex, k: PageIndex) -> f64 {
        let (a, b) = (&self.fingerprints[i], &self.fingerprints[k]);
        if is_blank(a.text()) && is_blank(b.text()) {
            return if self.config.blank_pages_match { 1.0 } else { 0.0 };
        }
        jaccard(&self.tokens[i], &self.tokens[k])
    }

    fn judge(&self, i: PageIndex, k: PageIndex) -> Verdict {
        let similarity = self.score(i, k);
        if similarity <= self.config.threshold {
            return None;
        }
        let pair = CandidatePair {
            a: i,
            b: k,
            similarity,
        };
        let corroborated = images_corroborate(&self.fingerprints[i], &self.fingerprints[k]);
        if !corroborated {
            log::debug!(
                "Pages {} and {} share text ({:.4}) but not images",
                i + 1,
                k + 1,
                similarity
            );
        }
        Some((pair, corroborated))
    }

    fn row(&self, i: PageIndex) -> Vec<(CandidatePair, bool)> {
        (i + 1..self.fingerprints.len())
            .filter_map(|k| self.judge(i, k))
            .collect()
    }
}

fn split(verdicts: impl IntoIterator<Item = (CandidatePair, bool)>) -> Comparison {
    let mut comparison = Comparison::default();
    for (pair, corroborated) in verdicts {
        if corroborated {
            comparison.candidates.push(pair);
        } else {
            comparison.rejected.push(pair);
        }
    }
    comparison
}

/// Score every unordered page pair and keep those that pass both the text
/// threshold and image corroboration.
pub fn compare_detailed(
    fingerprints: &[Fingerprint],
    config: &DedupConfig,
    ctx: &RunContext<'_>,
) -> Result<Comparison> {
    let judge = PairJudge::new(fingerprints, config);
    let n = fingerprints.len();

    if config.parallel {
        // Reported under the lock so ticks reach the callback in order.
        let finished = Mutex::new(0);
        let rows = (0..n)
            .into_par_iter()
            .map(|i| -> Result<Vec<(CandidatePair, bool)>> {
                ctx.check_cancelled()?;
                let row = judge.row(i);
                let mut done = finished.lock().unwrap_or_else(|e| e.into_inner());
                *done += 1;
                ctx.report(DedupPhase::Analyzing, *done, n);
                Ok(row)
            })
            .collect::<Result<Vec<_>>>()?;
        return Ok(split(rows.into_iter().flatten()));
    }

    let mut verdicts = Vec::new();
    let mut finished = 0;
    for (i, k) in unordered_pairs(n) {
        ctx.check_cancelled()?;
        while finished < i {
            finished += 1;
            ctx.report(DedupPhase::Analyzing, finished, n);
        }
        if let Some(verdict) = judge.judge(i, k) {
            verdicts.push(verdict);
        }
    }
    while finished < n {
        finished += 1;
        ctx.report(DedupPhase::Analyzing, finished, n);
    }

    Ok(split(verdicts))
}

pub fn compare(
    fingerprints: &[Fingerprint],
    config: &DedupConfig,
    ctx: &RunContext<'_>,
) -> Result<Vec<CandidatePair>> {
    Ok(compare_detailed(fingerprints, config, ctx)?.candidates)
}
