use crate::core::progress::{DedupPhase, RunContext};
use crate::core::resolve::DeletionSet;
use crate::error::Result;
use crate::services::pdf_reader::PdfDocument;
use std::path::{Path, PathBuf};

pub const DEFAULT_OUTPUT_NAME: &str = "outfile.pdf";

/// Write a copy of `source` without the pages in `deletion`, keeping the
/// remaining pages in their original order. Returns the number of pages kept.
pub fn assemble(
    source: &PdfDocument,
    deletion: &DeletionSet,
    output: &Path,
    ctx: &RunContext<'_>,
) -> Result<usize> {
    ctx.check_cancelled()?;

    let mut document = source.document().clone();
    document.delete_pages(&deletion.page_numbers());
    document.prune_objects();
    document.save(output)?;

    let kept = source.page_count() - deletion.len();
    log::info!(
        "Wrote {} page(s) to {} ({} removed)",
        kept,
        output.display(),
        deletion.len()
    );
    ctx.report(DedupPhase::Assembling, kept, kept);
    Ok(kept)
}

/// Where the deduplicated copy of `input` goes.
///
/// The output always sits next to the input. `.pdf` is appended when the
/// requested name lacks it, and an existing file is never overwritten:
/// `name(2).pdf`, `name(3).pdf`, ... are tried in turn.
pub fn resolve_output_path(input: &Path, requested: Option<&str>) -> PathBuf {
    resolve_output_path_with(input, requested, |p| p.exists())
}

fn resolve_output_path_with(
    input: &Path,
    requested: Option<&str>,
    exists: impl Fn(&Path) -> bool,
) -> PathBuf {
    let mut name = requested.unwrap_or(DEFAULT_OUTPUT_NAME).to_string();
    if !name.ends_with(".pdf") {
        name.push_str(".pdf");
    }
    let dir = input.parent().unwrap_or_else(|| Path::new(""));

    let candidate = dir.join(&name);
    if !exists(&candidate) {
        return candidate;
    }

    let stem = name.strip_suffix(".pdf").unwrap_or(&name);
    (2..)
        .map(|index| dir.join(format!("{}({}).pdf", stem, index)))
        .find(|path| !exists(path))
        .unwrap_or(candidate)
}
