use crate::error::SourceError;

/// Cross-reference identity of an image inside a document (object number, generation).
pub type ImageId = (u32, u16);

/// An embedded raster image referenced by a page.
pub trait SourceImage {
    fn id(&self) -> ImageId;

    fn read_pixels(&self) -> Result<Vec<u8>, SourceError>;
}

/// One page of a loaded document, as seen by the feature extractor.
pub trait SourcePage {
    type Image: SourceImage;

    fn extract_text(&self) -> Result<String, SourceError>;

    fn list_images(&self) -> Result<Vec<Self::Image>, SourceError>;
}

/// Page held entirely in memory. Useful for callers that already have the
/// text and pixel data, and for tests.
#[derive(Debug, Clone)]
pub struct MemoryPage {
    text: Option<String>,
    images: Vec<MemoryImage>,
}

#[derive(Debug, Clone)]
pub struct MemoryImage {
    id: ImageId,
    pixels: Option<Vec<u8>>,
}

impl MemoryPage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            images: Vec::new(),
        }
    }

    /// A page whose content stream cannot be decoded.
    pub fn unreadable() -> Self {
        Self {
            text: None,
            images: Vec::new(),
        }
    }

    pub fn with_image(mut self, id: ImageId, pixels: impl Into<Vec<u8>>) -> Self {
        self.images.push(MemoryImage {
            id,
            pixels: Some(pixels.into()),
        });
        self
    }

    pub fn with_broken_image(mut self, id: ImageId) -> Self {
        self.images.push(MemoryImage { id, pixels: None });
        self
    }
}

impl SourcePage for MemoryPage {
    type Image = MemoryImage;

    fn extract_text(&self) -> Result<String, SourceError> {
        self.text.clone().ok_or_else(|| SourceError::MissingObject {
            what: "content stream".to_string(),
        })
    }

    fn list_images(&self) -> Result<Vec<MemoryImage>, SourceError> {
        Ok(self.images.clone())
    }
}

impl SourceImage for MemoryImage {
    fn id(&self) -> ImageId {
        self.id
    }

    fn read_pixels(&self) -> Result<Vec<u8>, SourceError> {
        self.pixels
            .clone()
            .ok_or_else(|| SourceError::UnsupportedImage {
                reason: format!("image {} {} R has no pixel data", self.id.0, self.id.1),
            })
    }
}
