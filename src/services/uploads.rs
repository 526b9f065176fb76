//! Cover image upload collaborator.
//!
//! Stores the raw payload under a generated filename and returns the opaque
//! name for the book record. Image content is not validated here.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct UploadService {
    dir: PathBuf,
}

impl UploadService {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Persist an uploaded image, returning the generated filename
    pub async fn store_image(&self, original_name: &str, payload: &[u8]) -> AppResult<String> {
        let extension = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin");
        let filename = format!("{}.{}", Uuid::new_v4(), extension);

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create upload dir: {}", e)))?;
        tokio::fs::write(self.dir.join(&filename), payload)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store upload: {}", e)))?;

        Ok(filename)
    }
}
