//! # Attachments
//!
//! Photos and voice recordings are uploaded as blobs to the backend; the
//! note only stores the resulting public URL.
//!
//! - Photo: `{random}.{ext}`, the extension taken from the client file name
//! - Voice: `voice-{random}.webm`

use crate::{backend::Backend, error::AppError};
use rand_core::{OsRng, RngCore};
use std::{path::Path, str::FromStr};

const NAME_LEN: usize = 13;
const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const DEFAULT_EXTENSION: &str = "bin";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Photo,
    Voice,
}

impl FromStr for AttachmentKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "photo" => Ok(AttachmentKind::Photo),
            "voice" => Ok(AttachmentKind::Voice),
            other => Err(AppError::Validation(format!(
                "Unknown attachment kind '{}'",
                other
            ))),
        }
    }
}

impl AttachmentKind {
    /// Storage path for a new blob of this kind.
    pub fn blob_name(self, filename: Option<&str>) -> String {
        let random = random_name();
        match self {
            AttachmentKind::Voice => format!("voice-{}.webm", random),
            AttachmentKind::Photo => format!("{}.{}", random, extension_of(filename)),
        }
    }
}

/// 13 lowercase alphanumerics from the OS random source.
pub fn random_name() -> String {
    let mut name = String::with_capacity(NAME_LEN);
    let mut buf = [0u8; 32];
    while name.len() < NAME_LEN {
        OsRng.fill_bytes(&mut buf);
        // Bytes at or above 252 (7 * 36) are skipped to avoid modulo bias.
        for byte in buf.iter().filter(|b| **b < 252) {
            if name.len() == NAME_LEN {
                break;
            }
            name.push(ALPHABET[(*byte as usize) % ALPHABET.len()] as char);
        }
    }
    name
}

fn extension_of(filename: Option<&str>) -> String {
    let ext = filename
        .and_then(|f| Path::new(f).extension())
        .and_then(|e| e.to_str())
        .map(slug::slugify)
        .unwrap_or_default();

    if ext.is_empty() {
        DEFAULT_EXTENSION.to_string()
    } else {
        ext
    }
}

/// Stores `bytes` and returns the public URL of the new blob.
pub async fn upload_attachment(
    backend: &dyn Backend,
    kind: AttachmentKind,
    filename: Option<&str>,
    bytes: &[u8],
) -> Result<String, AppError> {
    backend
        .get_session()
        .await?
        .ok_or(AppError::NotAuthenticated)?;

    let path = kind.blob_name(filename);
    backend.upload(&path, bytes).await?;
    tracing::info!(?kind, path = %path, size = bytes.len(), "attachment uploaded");

    Ok(backend.public_url(&path))
}
