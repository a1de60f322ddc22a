//! Request-scoped scratch storage
//!
//! Every request gets `<uploads>/req-<uuid>/` for its inputs and output.
//! The directory is removed when the guard drops, on success and failure
//! alike. Inside a runtime the removal runs on the blocking pool.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::AppError;
use crate::upload::{self, FilePart, UploadedFile};

pub struct ScratchDir {
    request_id: Uuid,
    path: PathBuf,
}

impl ScratchDir {
    pub async fn create(upload_root: &Path) -> Result<Self, AppError> {
        let request_id = Uuid::new_v4();
        let path = upload_root.join(format!("req-{}", request_id));
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|e| AppError::backend("Error preparing upload", e))?;
        tracing::debug!(%request_id, "Created scratch directory");
        Ok(Self { request_id, path })
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the parts whose extension is on `allow` into the directory,
    /// in submission order. Disallowed parts are skipped.
    pub async fn store_allowed(
        &self,
        parts: &[&FilePart],
        allow: &[&str],
    ) -> Result<Vec<UploadedFile>, AppError> {
        let mut stored = Vec::with_capacity(parts.len());

        for (index, part) in parts.iter().enumerate() {
            let Some(extension) = upload::extension(&part.file_name)
                .filter(|ext| allow.contains(&ext.as_str()))
            else {
                tracing::debug!(file = %part.file_name, "Skipping file with disallowed extension");
                continue;
            };

            let safe_name = upload::secure_filename(&part.file_name)
                .unwrap_or_else(|| format!("upload.{}", extension));
            // Prefixed so two uploads with the same name stay distinct.
            let path = self.path.join(format!("{:03}_{}", index, safe_name));

            tokio::fs::write(&path, &part.bytes)
                .await
                .map_err(|e| AppError::backend("Error saving upload", e))?;

            stored.push(UploadedFile {
                original_name: part.file_name.clone(),
                safe_name,
                extension,
                bytes: part.bytes.clone(),
                path,
            });
        }

        Ok(stored)
    }

    /// Persist a generated document as `<operation>_<request-id>.pdf`.
    pub async fn write_output(&self, operation: &str, data: &[u8]) -> Result<PathBuf, AppError> {
        let path = self
            .path
            .join(format!("{}_{}.pdf", operation, self.request_id));
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::backend("Error saving output", e))?;
        Ok(path)
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let path = std::mem::take(&mut self.path);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || remove_scratch(&path));
            }
            Err(_) => remove_scratch(&path),
        }
    }
}

fn remove_scratch(path: &Path) {
    if let Err(e) = std::fs::remove_dir_all(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove scratch directory");
        }
    }
}
