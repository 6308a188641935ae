use crate::core::source::{ImageId, SourceImage, SourcePage};
use crate::error::{Result, SourceError};
use image::ImageFormat;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashSet;
use std::path::Path;

/// A loaded PDF exposing its pages to the feature extractor.
pub struct PdfDocument {
    document: Document,
}

impl PdfDocument {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let document = Document::load(path.as_ref())?;
        Ok(Self { document })
    }

    pub fn load_mem(bytes: &[u8]) -> Result<Self> {
        let document = Document::load_mem(bytes)?;
        Ok(Self { document })
    }

    pub fn from_document(document: Document) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Pages in page-tree order.
    pub fn pages(&self) -> Vec<PdfPage<'_>> {
        self.document
            .get_pages()
            .into_iter()
            .map(|(number, id)| PdfPage {
                document: &self.document,
                number,
                id,
            })
            .collect()
    }
}

pub struct PdfPage<'a> {
    document: &'a Document,
    number: u32,
    id: ObjectId,
}

impl PdfPage<'_> {
    /// 1-based page number.
    pub fn number(&self) -> u32 {
        self.number
    }
}

pub struct PdfImage<'a> {
    document: &'a Document,
    id: ObjectId,
}

impl<'a> SourcePage for PdfPage<'a> {
    type Image = PdfImage<'a>;

    fn extract_text(&self) -> Result<String, SourceError> {
        Ok(self.document.extract_text(&[self.number])?)
    }

    fn list_images(&self) -> Result<Vec<PdfImage<'a>>, SourceError> {
        let page = self.document.get_object(self.id)?.as_dict()?;
        let mut images = Vec::new();
        let mut seen = HashSet::new();

        if let Some(resources) = page_resources(self.document, page) {
            for id in xobject_ids(self.document, resources) {
                collect_images(self.document, id, &mut images, &mut seen);
            }
        }

        Ok(images
            .into_iter()
            .map(|id| PdfImage {
                document: self.document,
                id,
            })
            .collect())
    }
}

impl SourceImage for PdfImage<'_> {
    fn id(&self) -> ImageId {
        self.id
    }

    fn read_pixels(&self) -> Result<Vec<u8>, SourceError> {
        let stream = self.document.get_object(self.id)?.as_stream()?;
        let filters = stream_filters(&stream.dict);
        let filters: Vec<&str> = filters.iter().map(String::as_str).collect();

        match filters.as_slice() {
            [] => Ok(stream.content.clone()),
            ["DCTDecode"] => {
                let decoded =
                    image::load_from_memory_with_format(&stream.content, ImageFormat::Jpeg)?;
                Ok(decoded.into_bytes())
            }
            // No decoder available; identical encodings still mean identical pixels.
            ["JPXDecode"] | ["JBIG2Decode"] | ["CCITTFaxDecode"] => Ok(stream.content.clone()),
            _ => Ok(stream.decompressed_content()?),
        }
    }
}

fn deref<'a>(document: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => document.get_object(*id).ok(),
        other => Some(other),
    }
}

fn deref_dict<'a>(document: &'a Document, object: &'a Object) -> Option<&'a Dictionary> {
    deref(document, object).and_then(|o| o.as_dict().ok())
}

/// `/Resources` of a page, inherited from the nearest ancestor when absent.
fn page_resources<'a>(document: &'a Document, page: &'a Dictionary) -> Option<&'a Dictionary> {
    let mut node = page;
    let mut visited = HashSet::new();
    loop {
        if let Ok(resources) = node.get(b"Resources") {
            return deref_dict(document, resources);
        }
        let parent_id = node.get(b"Parent").ok()?.as_reference().ok()?;
        if !visited.insert(parent_id) {
            return None;
        }
        node = document.get_object(parent_id).ok()?.as_dict().ok()?;
    }
}

fn xobject_ids(document: &Document, resources: &Dictionary) -> Vec<ObjectId> {
    resources
        .get(b"XObject")
        .ok()
        .and_then(|x| deref_dict(document, x))
        .map(|xobjects| {
            xobjects
                .iter()
                .filter_map(|(_, value)| value.as_reference().ok())
                .collect()
        })
        .unwrap_or_default()
}

/// Image XObjects reachable from `id`, descending into Form XObjects.
fn collect_images(
    document: &Document,
    id: ObjectId,
    images: &mut Vec<ObjectId>,
    seen: &mut HashSet<ObjectId>,
) {
    if !seen.insert(id) {
        return;
    }
    let Ok(stream) = document.get_object(id).and_then(Object::as_stream) else {
        return;
    };

    match stream.dict.get(b"Subtype").and_then(Object::as_name) {
        Ok(b"Image") => images.push(id),
        Ok(b"Form") => {
            if let Some(resources) = stream
                .dict
                .get(b"Resources")
                .ok()
                .and_then(|r| deref_dict(document, r))
            {
                for child in xobject_ids(document, resources) {
                    collect_images(document, child, images, seen);
                }
            }
        }
        _ => {}
    }
}

fn stream_filters(dict: &Dictionary) -> Vec<String> {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![String::from_utf8_lossy(name).into_owned()],
        Ok(Object::Array(names)) => names
            .iter()
            .filter_map(|n| n.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).into_owned())
            .collect(),
        _ => Vec::new(),
    }
}
