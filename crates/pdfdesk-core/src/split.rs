//! PDF Split algorithm
//!
//! Extracts pages from a PDF in the exact order they were asked for.

use crate::error::PdfDeskError;
use crate::page_tree;
use crate::ranges::OutOfRangePolicy;
use std::collections::HashSet;

/// Split a PDF, keeping only the listed pages (1-indexed) in list order.
/// Out-of-range numbers are dropped.
pub fn split_document(bytes: &[u8], pages: &[u32]) -> Result<Vec<u8>, PdfDeskError> {
    split_document_with_policy(bytes, pages, OutOfRangePolicy::Ignore)
}

/// Split a PDF with an explicit out-of-range policy.
///
/// 1. Resolve the selection against the page count
/// 2. Copy inherited attributes onto each selected page
/// 3. Clone page nodes that are selected more than once
/// 4. Rebuild a flat page tree in selection order and prune the rest
pub fn split_document_with_policy(
    bytes: &[u8],
    pages: &[u32],
    policy: OutOfRangePolicy,
) -> Result<Vec<u8>, PdfDeskError> {
    if pages.is_empty() {
        return Err(PdfDeskError::InvalidRange("No pages specified".into()));
    }

    let mut doc = page_tree::load(bytes)?;
    let source_pages = page_tree::page_ids(&doc);
    let page_count = source_pages.len() as u32;

    let selection = policy.apply(pages, page_count)?;
    if selection.is_empty() {
        return Err(PdfDeskError::EmptySelection(format!(
            "none of the requested pages exist (document has {} pages)",
            page_count
        )));
    }

    let mut used = HashSet::new();
    let mut page_refs = Vec::with_capacity(selection.len());
    for page in selection {
        let page_id = source_pages[(page - 1) as usize];
        page_tree::flatten_inherited(&mut doc, page_id)?;
        if used.insert(page_id) {
            page_refs.push(page_id);
        } else {
            page_refs.push(page_tree::duplicate_page(&mut doc, page_id)?);
        }
    }

    page_tree::rebuild_and_save(doc, page_refs)
}
