use crate::error::{DedupError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_THRESHOLD: f64 = 0.99;

/// What to do with a page whose content stream cannot be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionFailurePolicy {
    #[default]
    Abort,
    /// Keep going with an empty fingerprint. Blank fingerprints can produce
    /// false positives when `blank_pages_match` is on.
    TreatAsEmpty,
}

/// How page text is split before the Jaccard comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tokenizer {
    #[default]
    Chars,
    Words,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Pairs must score strictly above this to be considered duplicates.
    pub threshold: f64,
    pub on_extraction_error: ExtractionFailurePolicy,
    pub tokenizer: Tokenizer,
    /// Score two empty pages as 1.0 instead of 0.0.
    pub blank_pages_match: bool,
    pub parallel: bool,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            on_extraction_error: ExtractionFailurePolicy::Abort,
            tokenizer: Tokenizer::Chars,
            blank_pages_match: false,
            parallel: false,
        }
    }
}

impl DedupConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        let config: DedupConfig =
            serde_json::from_str(&raw).map_err(|e| DedupError::InvalidConfig {
                reason: format!("{}: {}", path.as_ref().display(), e),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(DedupError::InvalidConfig {
                reason: format!("threshold must be within [0, 1], got {}", self.threshold),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = DedupConfig::default();
        assert_eq!(config.threshold, 0.99);
        assert_eq!(config.on_extraction_error, ExtractionFailurePolicy::Abort);
        assert!(!config.blank_pages_match);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        for threshold in [-0.1, 1.5, f64::NAN] {
            let config = DedupConfig {
                threshold,
                ..DedupConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(DedupError::InvalidConfig { .. })
            ));
        }
    }

    #[test]
    fn test_load_partial_json_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("dedup.json");
        std::fs::write(
            &path,
            r#"{ "threshold": 0.9, "on_extraction_error": "treat_as_empty", "tokenizer": "words" }"#,
        )
        .unwrap();

        let config = DedupConfig::from_json_file(&path).unwrap();
        assert_eq!(config.threshold, 0.9);
        assert_eq!(
            config.on_extraction_error,
            ExtractionFailurePolicy::TreatAsEmpty
        );
        assert_eq!(config.tokenizer, Tokenizer::Words);
        assert!(!config.parallel);
    }

    #[test]
    fn test_load_invalid_json_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("dedup.json");
        std::fs::write(&path, "{ threshold: }").unwrap();

        assert!(matches!(
            DedupConfig::from_json_file(&path),
            Err(DedupError::InvalidConfig { .. })
        ));
    }
}
