use serde::{Deserialize, Serialize};
use std::fmt;

/// 0-based position of a page in the source document.
pub type PageIndex = usize;

/// Content digest of one embedded image's pixel bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ImageDigest(pub [u8; 32]);

impl ImageDigest {
    pub fn of_pixels(pixels: &[u8]) -> Self {
        Self(*blake3::hash(pixels).as_bytes())
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Display for ImageDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Comparable summary of a page: its text and the digests of its images.
///
/// Digests are kept sorted so that equality ignores image order while still
/// distinguishing how many times each digest occurs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    text: String,
    image_hashes: Vec<ImageDigest>,
}

impl Fingerprint {
    pub fn new(text: String, mut image_hashes: Vec<ImageDigest>) -> Self {
        image_hashes.sort_unstable();
        Self { text, image_hashes }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn image_hashes(&self) -> &[ImageDigest] {
        &self.image_hashes
    }

    pub fn has_images(&self) -> bool {
        !self.image_hashes.is_empty()
    }

    /// Sum of the Unicode scalar values of the text, a cheap diagnostic
    /// for telling near-identical pages apart in reports.
    pub fn text_checksum(&self) -> u64 {
        self.text.chars().map(|c| c as u64).sum()
    }
}
