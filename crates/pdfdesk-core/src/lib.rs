//! Page-level PDF transformations
//!
//! Everything here works on in-memory byte buffers using lopdf, so callers
//! decide where files come from and where results go:
//! - `merge_documents`: concatenate documents
//! - `split_document`: keep a selection of pages in the requested order
//! - `edit_pages`: delete, reorder and rotate in one pass
//! - `images_to_pdf`: one page per PNG/JPEG image
//! - `extract_pages_text` / `render_text_document`: text out, new PDF back in

pub mod command;
pub mod edit;
pub mod error;
pub mod images;
pub mod merge;
mod page_tree;
pub mod ranges;
pub mod split;
pub mod text;

#[cfg(test)]
mod fixtures;

pub use command::{PdfCommand, ProcessMetrics, ProcessResult};
pub use edit::{edit_pages, edit_pages_with_policy, PageEdits};
pub use error::PdfDeskError;
pub use images::{images_to_pdf, ImageInput};
pub use merge::merge_documents;
pub use ranges::{parse_pages, OutOfRangePolicy};
pub use split::{split_document, split_document_with_policy};
pub use text::{extract_pages_text, join_pages, render_text_document, TextLayout};

/// Parse PDF bytes and return page count
pub fn get_page_count(bytes: &[u8]) -> Result<u32, PdfDeskError> {
    let doc = page_tree::load(bytes)?;
    Ok(doc.get_pages().len() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::tagged_pdf;

    #[test]
    fn test_get_page_count() {
        assert_eq!(get_page_count(&tagged_pdf(7, 1)).unwrap(), 7);
    }

    #[test]
    fn test_get_page_count_rejects_garbage() {
        assert!(matches!(
            get_page_count(b"%PDF-"),
            Err(PdfDeskError::ParseError(_))
        ));
    }
}
