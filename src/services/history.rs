use crate::error::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

pub const HISTORY_FILE: &str = ".pdfdedup-history.jsonl";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DedupRecord {
    pub timestamp: String,
    pub input: String,
    pub output: String,
    /// 1-based page numbers that were dropped.
    pub removed_pages: Vec<u32>,
    pub kept_pages: usize,
}

impl DedupRecord {
    pub fn now(input: &Path, output: &Path, removed_pages: Vec<u32>, kept_pages: usize) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            input: input.to_string_lossy().into_owned(),
            output: output.to_string_lossy().into_owned(),
            removed_pages,
            kept_pages,
        }
    }
}

/// Append-only JSON-lines log of deduplication runs in one directory.
pub struct HistoryService {
    history_file: PathBuf,
}

impl HistoryService {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            history_file: dir.as_ref().join(HISTORY_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.history_file
    }

    pub fn append(&self, record: &DedupRecord) -> Result<()> {
        let mut out = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.history_file)?;
        writeln!(out, "{}", serde_json::to_string(record).map_err(std::io::Error::from)?)?;
        Ok(())
    }

    /// All records in file order. Lines that fail to parse are skipped with
    /// a warning.
    pub fn records(&self) -> Result<Vec<DedupRecord>> {
        let reader = BufReader::new(File::open(&self.history_file)?);
        let mut records = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            match serde_json::from_str::<DedupRecord>(&line) {
                Ok(record) => records.push(record),
                Err(err) => log::warn!("Skipping malformed history entry {}: {}", i, err),
            }
        }
        Ok(records)
    }
}
