use thiserror::Error;

/// Failure reported by a page or image collaborator while reading content.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Image decoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Unsupported image: {reason}")]
    UnsupportedImage { reason: String },

    #[error("Missing object: {what}")]
    MissingObject { what: String },
}

#[derive(Debug, Error)]
pub enum DedupError {
    #[error("Could not extract content of page {page}: {source}")]
    ContentExtraction {
        page: usize,
        #[source]
        source: SourceError,
    },

    #[error("Invalid pair ({a}, {b}) for a document of {page_count} pages")]
    InvalidPairIndex {
        a: usize,
        b: usize,
        page_count: usize,
    },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = DedupError> = std::result::Result<T, E>;
