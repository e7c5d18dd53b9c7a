//! # Blob storage
//!
//! Attachments (photos, voice recordings) are written under a single root
//! directory and served back over HTTP from `{public_base_url}/files/`.
//!
//! - `FileStore::write()`: stores bytes at a relative path
//! - `FileStore::public_url()`: the URL a client uses to fetch the blob

use super::BackendError;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    public_base_url: String,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Writes `bytes` to `path` relative to the store root, creating parent
    /// directories as needed. Existing files are overwritten.
    pub async fn write(&self, path: &str, bytes: &[u8]) -> Result<(), BackendError> {
        let full_path = self.resolve(path)?;
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&full_path, bytes).await?;
        Ok(())
    }

    pub fn public_url(&self, path: &str) -> String {
        format!("{}/files/{}", self.public_base_url, path.trim_start_matches('/'))
    }

    /// Only plain relative paths are accepted; `..`, absolute paths and
    /// drive prefixes are rejected so a blob can never land outside the root.
    fn resolve(&self, path: &str) -> Result<PathBuf, BackendError> {
        let relative = Path::new(path);
        let is_plain = !path.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !is_plain {
            return Err(BackendError::Rejected(format!("Invalid storage path: {}", path)));
        }
        Ok(self.root.join(relative))
    }
}
