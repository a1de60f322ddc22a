//! Page tree plumbing shared by every transformation
//!
//! All page-level operations end the same way: pick page objects in some
//! order, hang them directly under the root `/Pages` node, and drop
//! everything that is no longer reachable. Because the rebuilt tree is flat,
//! attributes a page used to inherit from intermediate nodes are copied onto
//! the page first.

use crate::error::PdfDeskError;
use lopdf::{Dictionary, Document, Object, ObjectId};

/// Attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Bound on the parent chain walk; guards against cyclic page trees.
const MAX_TREE_DEPTH: usize = 64;

pub(crate) fn load(bytes: &[u8]) -> Result<Document, PdfDeskError> {
    Document::load_mem(bytes).map_err(|e| PdfDeskError::ParseError(e.to_string()))
}

/// Page object ids in document order, 1-indexed page `n` at position `n - 1`.
pub(crate) fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

/// Copy inherited attributes onto the page dictionary itself.
pub(crate) fn flatten_inherited(doc: &mut Document, page_id: ObjectId) -> Result<(), PdfDeskError> {
    let mut inherited = Vec::new();
    {
        let page = doc
            .get_dictionary(page_id)
            .map_err(|e| PdfDeskError::OperationError(format!("Invalid page object: {}", e)))?;

        let mut missing: Vec<&[u8]> = INHERITABLE
            .iter()
            .copied()
            .filter(|key| !page.has(key))
            .collect();
        let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
        let mut depth = 0;

        while let Some(parent_id) = parent {
            if missing.is_empty() || depth >= MAX_TREE_DEPTH {
                break;
            }
            let Ok(node) = doc.get_dictionary(parent_id) else {
                break;
            };
            missing.retain(|key| match node.get(key) {
                Ok(value) => {
                    inherited.push((key.to_vec(), value.clone()));
                    false
                }
                Err(_) => true,
            });
            parent = node.get(b"Parent").and_then(Object::as_reference).ok();
            depth += 1;
        }
    }

    if inherited.is_empty() {
        return Ok(());
    }

    let page = doc
        .get_dictionary_mut(page_id)
        .map_err(|e| PdfDeskError::OperationError(format!("Invalid page object: {}", e)))?;
    for (key, value) in inherited {
        page.set(key, value);
    }
    Ok(())
}

/// Clone a page dictionary into a fresh object. Content streams and
/// resources stay shared; only the page node itself is copied.
pub(crate) fn duplicate_page(doc: &mut Document, page_id: ObjectId) -> Result<ObjectId, PdfDeskError> {
    let page = doc
        .get_dictionary(page_id)
        .map_err(|e| PdfDeskError::OperationError(format!("Invalid page object: {}", e)))?
        .clone();
    Ok(doc.add_object(Object::Dictionary(page)))
}

/// Effective `/Rotate` of a page, normalized to 0, 90, 180 or 270.
/// Call after [`flatten_inherited`] so inherited values are visible.
pub(crate) fn rotation(doc: &Document, page_id: ObjectId) -> i64 {
    doc.get_dictionary(page_id)
        .ok()
        .and_then(|page| page.get(b"Rotate").ok())
        .and_then(|rotate| rotate.as_i64().ok())
        .map(normalize_rotation)
        .unwrap_or(0)
}

pub(crate) fn set_rotation(doc: &mut Document, page_id: ObjectId, angle: i64) -> Result<(), PdfDeskError> {
    let page = doc
        .get_dictionary_mut(page_id)
        .map_err(|e| PdfDeskError::OperationError(format!("Invalid page object: {}", e)))?;
    page.set("Rotate", Object::Integer(normalize_rotation(angle)));
    Ok(())
}

/// Normalize rotation to 0, 90, 180, or 270
pub(crate) fn normalize_rotation(angle: i64) -> i64 {
    angle.rem_euclid(360)
}

/// Replace the page tree with a single flat `/Pages` node holding `page_refs`
/// in order, then drop unreachable objects and serialize.
pub(crate) fn rebuild_and_save(
    mut doc: Document,
    page_refs: Vec<ObjectId>,
) -> Result<Vec<u8>, PdfDeskError> {
    let pages_id = root_pages_id(&doc)?;

    for &page_id in &page_refs {
        if let Ok(page) = doc.get_dictionary_mut(page_id) {
            page.set("Parent", Object::Reference(pages_id));
        }
    }

    if let Some(Object::Dictionary(ref mut pages_dict)) = doc.objects.get_mut(&pages_id) {
        let kids = page_refs
            .iter()
            .map(|&id| Object::Reference(id))
            .collect::<Vec<_>>();
        pages_dict.set("Kids", Object::Array(kids));
        pages_dict.set("Count", Object::Integer(page_refs.len() as i64));
        // The root no longer passes anything down; every page carries its own.
        for key in INHERITABLE {
            pages_dict.remove(key);
        }
        pages_dict.remove(b"Parent");
    } else {
        return Err(PdfDeskError::OperationError(
            "Invalid pages dictionary".into(),
        ));
    }

    doc.prune_objects();
    doc.compress();
    save(&mut doc)
}

pub(crate) fn save(doc: &mut Document) -> Result<Vec<u8>, PdfDeskError> {
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| PdfDeskError::OperationError(format!("Save failed: {}", e)))?;
    Ok(buffer)
}

fn root_pages_id(doc: &Document) -> Result<ObjectId, PdfDeskError> {
    let catalog_id = doc
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| PdfDeskError::OperationError("No Root in trailer".into()))?;

    doc.get_dictionary(catalog_id)
        .map_err(|_| PdfDeskError::OperationError("Catalog not found".into()))?
        .get(b"Pages")
        .and_then(Object::as_reference)
        .map_err(|_| PdfDeskError::OperationError("No Pages in catalog".into()))
}

/// Builds a document from scratch, one page at a time.
pub(crate) struct PageWriter {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
}

impl PageWriter {
    pub(crate) fn new() -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            kids: Vec::new(),
        }
    }

    pub(crate) fn add_object<T: Into<Object>>(&mut self, object: T) -> ObjectId {
        self.doc.add_object(object)
    }

    pub(crate) fn add_page(&mut self, width: f32, height: f32, content: Vec<u8>, resources: Dictionary) {
        let content_id = self
            .doc
            .add_object(lopdf::Stream::new(Dictionary::new(), content));
        let page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(self.pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(width),
                    Object::Real(height),
                ]),
            ),
            ("Resources", Object::Dictionary(resources)),
            ("Contents", Object::Reference(content_id)),
        ]);
        let page_id = self.doc.add_object(page);
        self.kids.push(page_id);
    }

    pub(crate) fn page_count(&self) -> usize {
        self.kids.len()
    }

    pub(crate) fn finish(mut self) -> Result<Vec<u8>, PdfDeskError> {
        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(self.kids.len() as i64)),
            (
                "Kids",
                Object::Array(self.kids.iter().map(|id| Object::Reference(*id)).collect()),
            ),
        ]);
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages));

        let catalog = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_id)),
        ]);
        let catalog_id = self.doc.add_object(catalog);
        self.doc.trailer.set("Root", Object::Reference(catalog_id));

        save(&mut self.doc)
    }
}
