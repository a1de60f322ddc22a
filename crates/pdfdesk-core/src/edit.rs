//! Page editor: delete, reorder and rotate in one pass.

use crate::error::PdfDeskError;
use crate::page_tree;
use crate::ranges::OutOfRangePolicy;
use std::collections::{HashMap, HashSet};

/// The four independent page lists of an edit request, each 1-indexed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageEdits {
    /// Pages to drop. Wins over `order`.
    pub delete: Vec<u32>,
    /// Output order; empty means natural order.
    pub order: Vec<u32>,
    /// Pages to turn +90°.
    pub rotate_right: Vec<u32>,
    /// Pages to turn -90°.
    pub rotate_left: Vec<u32>,
}

impl PageEdits {
    pub fn is_noop(&self) -> bool {
        self.delete.is_empty()
            && self.order.is_empty()
            && self.rotate_right.is_empty()
            && self.rotate_left.is_empty()
    }

    /// Net rotation delta for `page`, in degrees.
    fn rotation_delta(&self, page: u32) -> i64 {
        let mut delta = 0;
        if self.rotate_right.contains(&page) {
            delta += 90;
        }
        if self.rotate_left.contains(&page) {
            delta -= 90;
        }
        delta
    }
}

/// Apply `edits` to a PDF, dropping out-of-range page numbers.
pub fn edit_pages(bytes: &[u8], edits: &PageEdits) -> Result<Vec<u8>, PdfDeskError> {
    edit_pages_with_policy(bytes, edits, OutOfRangePolicy::Ignore)
}

/// Apply `edits` to a PDF with an explicit out-of-range policy.
///
/// Walks `order` (or 1..=N), skips deleted pages, rotates each survivor
/// relative to its current `/Rotate`, and rebuilds the page tree in walk
/// order. A page listed twice in `order` appears twice in the output.
pub fn edit_pages_with_policy(
    bytes: &[u8],
    edits: &PageEdits,
    policy: OutOfRangePolicy,
) -> Result<Vec<u8>, PdfDeskError> {
    let mut doc = page_tree::load(bytes)?;
    let source_pages = page_tree::page_ids(&doc);
    let total = source_pages.len() as u32;

    if policy == OutOfRangePolicy::Reject {
        for list in [&edits.delete, &edits.rotate_right, &edits.rotate_left] {
            policy.apply(list, total)?;
        }
    }

    let walk = if edits.order.is_empty() {
        (1..=total).collect()
    } else {
        policy.apply(&edits.order, total)?
    };

    let deleted: HashSet<u32> = edits.delete.iter().copied().collect();
    let mut base_rotation = HashMap::new();
    let mut used = HashSet::new();
    let mut page_refs = Vec::with_capacity(walk.len());

    for page in walk {
        if deleted.contains(&page) {
            continue;
        }

        let source_id = source_pages[(page - 1) as usize];
        let base = match base_rotation.get(&source_id) {
            Some(&angle) => angle,
            None => {
                page_tree::flatten_inherited(&mut doc, source_id)?;
                let angle = page_tree::rotation(&doc, source_id);
                base_rotation.insert(source_id, angle);
                angle
            }
        };

        let page_id = if used.insert(source_id) {
            source_id
        } else {
            page_tree::duplicate_page(&mut doc, source_id)?
        };

        let delta = edits.rotation_delta(page);
        if delta != 0 || base != 0 {
            page_tree::set_rotation(&mut doc, page_id, base + delta)?;
        }
        page_refs.push(page_id);
    }

    if page_refs.is_empty() {
        return Err(PdfDeskError::EmptySelection(
            "the edit removed every page".into(),
        ));
    }

    tracing::debug!(
        pages_in = total,
        pages_out = page_refs.len(),
        "Applied page edits"
    );

    page_tree::rebuild_and_save(doc, page_refs)
}
