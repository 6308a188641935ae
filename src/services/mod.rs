pub mod assembler;
pub mod history;
pub mod pdf_reader;

pub use assembler::{assemble, resolve_output_path};
pub use history::{DedupRecord, HistoryService};
pub use pdf_reader::{PdfDocument, PdfImage, PdfPage};
