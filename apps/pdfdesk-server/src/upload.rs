//! Multipart form reading and upload filtering

use std::collections::HashMap;
use std::path::PathBuf;

use axum::extract::Multipart;

use crate::error::AppError;

pub const ALLOWED_PDF: &[&str] = &["pdf"];
pub const ALLOWED_IMAGES: &[&str] = &["png", "jpg", "jpeg"];

/// A file part exactly as the browser sent it.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// A file that passed the allow-list and was written to scratch storage.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub original_name: String,
    pub safe_name: String,
    pub extension: String,
    pub bytes: Vec<u8>,
    pub path: PathBuf,
}

/// A fully buffered multipart submission.
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    files: Vec<FilePart>,
}

impl UploadForm {
    /// Trimmed text value of a field, empty when absent.
    pub fn text(&self, name: &str) -> &str {
        self.fields.get(name).map(|v| v.trim()).unwrap_or("")
    }

    /// File parts for `field` that actually carry a file. Browsers send an
    /// empty, nameless part for an untouched file input.
    pub fn files(&self, field: &str) -> Vec<&FilePart> {
        self.files
            .iter()
            .filter(|part| part.field == field && !part.file_name.is_empty())
            .collect()
    }
}

/// Buffer every part of a multipart request.
pub async fn read_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Malformed upload: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Malformed upload: {}", e)))?;
                form.files.push(FilePart {
                    field: name,
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            None => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Malformed upload: {}", e)))?;
                form.fields.insert(name, value);
            }
        }
    }

    Ok(form)
}

/// Lower-cased extension of a file name, if it has one.
pub fn extension(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Case-insensitive extension check against an allow-list.
pub fn allowed(file_name: &str, allow: &[&str]) -> bool {
    extension(file_name).is_some_and(|ext| allow.contains(&ext.as_str()))
}

/// Reduce a client-supplied name to a safe single path component.
///
/// Directory parts are dropped, whitespace becomes `_`, and anything outside
/// `[A-Za-z0-9._-]` is removed. Leading dots are stripped so the result can
/// never be `..` or a hidden file. Returns `None` when nothing survives.
pub fn secure_filename(file_name: &str) -> Option<String> {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = base
        .chars()
        .filter_map(|c| match c {
            c if c.is_whitespace() => Some('_'),
            'A'..='Z' | 'a'..='z' | '0'..='9' | '.' | '_' | '-' => Some(c),
            _ => None,
        })
        .collect();

    let trimmed = cleaned.trim_start_matches(['.', '_']);
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
