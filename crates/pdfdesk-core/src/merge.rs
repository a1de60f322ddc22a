//! PDF Merge algorithm
//!
//! Combines multiple PDFs into a single document.

use crate::error::PdfDeskError;
use crate::page_tree;
use lopdf::{Object, ObjectId};
use std::collections::BTreeMap;

/// Merge multiple PDFs into one
///
/// The algorithm:
/// 1. If empty, return error
/// 2. Load every document up front so a bad input aborts before any work
/// 3. Use the first document as the destination
/// 4. For each remaining source document:
///    a. Copy inherited attributes onto its pages
///    b. Calculate ID offset to avoid conflicts
///    c. Import all objects with remapped IDs
///    d. Append its pages to the destination page list
/// 5. Rebuild a flat page tree, prune the imported catalogs and serialize
pub fn merge_documents(documents: Vec<Vec<u8>>) -> Result<Vec<u8>, PdfDeskError> {
    if documents.is_empty() {
        return Err(PdfDeskError::NoInput("No documents to merge".into()));
    }

    let mut loaded_docs = Vec::with_capacity(documents.len());
    for (i, doc_bytes) in documents.iter().enumerate() {
        let doc = page_tree::load(doc_bytes).map_err(|e| match e {
            PdfDeskError::ParseError(msg) => {
                PdfDeskError::ParseError(format!("Failed to load document {}: {}", i + 1, msg))
            }
            other => other,
        })?;
        loaded_docs.push(doc);
    }

    // Single document - return as-is once it is known to parse
    if loaded_docs.len() == 1 {
        return documents
            .into_iter()
            .next()
            .ok_or_else(|| PdfDeskError::NoInput("No documents to merge".into()));
    }

    let mut dest = loaded_docs.remove(0);
    let mut dest_page_refs = page_tree::page_ids(&dest);
    for &page_id in &dest_page_refs {
        page_tree::flatten_inherited(&mut dest, page_id)?;
    }
    let mut dest_max_id = dest.max_id;

    for mut source in loaded_docs.into_iter() {
        let source_pages = page_tree::page_ids(&source);
        for &page_id in &source_pages {
            page_tree::flatten_inherited(&mut source, page_id)?;
        }

        let id_offset = dest_max_id;

        let mut remapped_objects = BTreeMap::new();
        for (old_id, object) in source.objects.into_iter() {
            let new_id = (old_id.0 + id_offset, old_id.1);
            remapped_objects.insert(new_id, remap_object_refs(object, id_offset));
        }
        dest.objects.extend(remapped_objects);

        dest_page_refs.extend(
            source_pages
                .into_iter()
                .map(|old_page_ref| (old_page_ref.0 + id_offset, old_page_ref.1)),
        );

        dest_max_id = (source.max_id + id_offset).max(dest_max_id);
    }

    dest.max_id = dest_max_id;

    page_tree::rebuild_and_save(dest, dest_page_refs)
}

/// Recursively remap object references in an object
fn remap_object_refs(obj: Object, offset: u32) -> Object {
    match obj {
        Object::Reference(id) => Object::Reference(shift(id, offset)),
        Object::Array(arr) => Object::Array(
            arr.into_iter()
                .map(|o| remap_object_refs(o, offset))
                .collect(),
        ),
        Object::Dictionary(mut dict) => {
            for (_, value) in dict.iter_mut() {
                *value = remap_object_refs(std::mem::replace(value, Object::Null), offset);
            }
            Object::Dictionary(dict)
        }
        Object::Stream(mut stream) => {
            for (_, value) in stream.dict.iter_mut() {
                *value = remap_object_refs(std::mem::replace(value, Object::Null), offset);
            }
            Object::Stream(stream)
        }
        other => other,
    }
}

fn shift(id: ObjectId, offset: u32) -> ObjectId {
    (id.0 + offset, id.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{page_widths, pdf_with_inherited_box, tagged_pdf};
    use lopdf::Document;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_merge_empty_fails() {
        let result = merge_documents(vec![]);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("No documents to merge"));
    }

    #[test]
    fn test_merge_single_document_returns_same() {
        let pdf = tagged_pdf(2, 1);
        let result = merge_documents(vec![pdf.clone()]).unwrap();
        assert_eq!(result, pdf);
    }

    #[test]
    fn test_merge_single_garbage_document_fails() {
        let result = merge_documents(vec![b"garbage".to_vec()]);
        assert!(matches!(result, Err(PdfDeskError::ParseError(_))));
    }

    #[test]
    fn test_merge_two_documents_concatenates_in_order() {
        let doc_a = tagged_pdf(2, 1);
        let doc_b = tagged_pdf(3, 2);

        let merged = merge_documents(vec![doc_a, doc_b]).unwrap();

        assert_eq!(page_widths(&merged), vec![101, 102, 201, 202, 203]);
    }

    #[test]
    fn test_merge_handles_different_sizes() {
        let doc1 = tagged_pdf(10, 1);
        let doc2 = tagged_pdf(1, 2);
        let doc3 = tagged_pdf(5, 3);

        let merged = merge_documents(vec![doc1, doc2, doc3]).unwrap();

        let doc = Document::load_mem(&merged).unwrap();
        assert_eq!(doc.get_pages().len(), 16, "Merged document should have 16 pages");
    }

    #[test]
    fn test_merge_keeps_inherited_attributes_of_later_inputs() {
        let merged = merge_documents(vec![tagged_pdf(1, 1), pdf_with_inherited_box(2)]).unwrap();
        assert_eq!(page_widths(&merged), vec![101, 999, 999]);
    }

    #[test]
    fn test_merge_aborts_on_corrupt_input() {
        let result = merge_documents(vec![tagged_pdf(2, 1), b"%PDF-1.7 broken".to_vec()]);
        let err = result.unwrap_err().to_string();
        assert!(err.starts_with("Failed to parse PDF: Failed to load document 2: "));
        assert_eq!(err.matches("Failed to parse PDF").count(), 1);
    }
}
