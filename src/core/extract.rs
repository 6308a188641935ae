use crate::config::ExtractionFailurePolicy;
use crate::core::fingerprint::{Fingerprint, ImageDigest};
use crate::core::progress::{DedupPhase, RunContext};
use crate::core::source::{SourceImage, SourcePage};
use crate::error::{DedupError, Result, SourceError};
use std::collections::HashSet;

/// Fingerprint a single page: its text plus one digest per distinct image.
pub fn fingerprint_page<P: SourcePage>(page: &P) -> Result<Fingerprint, SourceError> {
    let text = page.extract_text()?;

    let mut seen = HashSet::new();
    let mut hashes = Vec::new();
    for image in page.list_images()? {
        if !seen.insert(image.id()) {
            continue;
        }
        let pixels = image.read_pixels()?;
        hashes.push(ImageDigest::of_pixels(&pixels));
    }

    Ok(Fingerprint::new(text, hashes))
}

/// Fingerprint every page in document order.
///
/// A page that fails to decode aborts the run, unless the policy says to
/// carry on with an empty fingerprint in its place.
pub fn extract<P: SourcePage>(
    pages: &[P],
    policy: ExtractionFailurePolicy,
    ctx: &RunContext<'_>,
) -> Result<Vec<Fingerprint>> {
    let total = pages.len();
    let mut fingerprints = Vec::with_capacity(total);

    for (index, page) in pages.iter().enumerate() {
        ctx.check_cancelled()?;

        let fingerprint = match fingerprint_page(page) {
            Ok(fingerprint) => fingerprint,
            Err(source) => match policy {
                ExtractionFailurePolicy::Abort => {
                    return Err(DedupError::ContentExtraction {
                        page: index,
                        source,
                    });
                }
                ExtractionFailurePolicy::TreatAsEmpty => {
                    log::warn!(
                        "Page {} could not be read ({}); treating it as empty",
                        index + 1,
                        source
                    );
                    Fingerprint::empty()
                }
            },
        };

        log::debug!(
            "Page {}: {} chars, {} image(s)",
            index + 1,
            fingerprint.text().chars().count(),
            fingerprint.image_hashes().len()
        );
        fingerprints.push(fingerprint);
        ctx.report(DedupPhase::Extracting, index + 1, total);
    }

    Ok(fingerprints)
}
