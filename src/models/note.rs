//! # Note model
//!
//! A note row carries up to three credential columns (`password`,
//! `password_hash`, `password_salt`). They are folded into [`Credential`] as
//! soon as a row leaves the database, so the rest of the crate never sees a
//! half-filled scheme.
//!
//! ## Types
//! - `Note`: a stored note with its credential
//! - `NoteRow`: the raw `notes` table row
//! - `NoteResponse`: what the API shows; it has no credential fields
//! - `NoteFormData`: a resolved save request handed to the repository
//! - `NoteEditorRequest`: the editor form as sent by the client
//! - `NoteFilter`: list filters

use serde::{Deserialize, Serialize};
use sqlx::types::Json;

/// How a note is protected.
///
/// Exactly one scheme or none. The legacy plaintext scheme is only ever read
/// back from old rows; new writes produce [`Credential::Hashed`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Credential {
    #[default]
    Unprotected,
    LegacyPlaintext(String),
    Hashed { hash: String, salt: String },
}

impl Credential {
    /// Folds the three nullable columns into a single scheme.
    ///
    /// Hash and salt win when both are present. A lone hash or salt is not a
    /// usable credential and is ignored.
    pub fn from_columns(
        password: Option<String>,
        password_hash: Option<String>,
        password_salt: Option<String>,
    ) -> Self {
        match (password_hash, password_salt) {
            (Some(hash), Some(salt)) if !hash.is_empty() && !salt.is_empty() => {
                Credential::Hashed { hash, salt }
            }
            _ => match password {
                Some(p) if !p.is_empty() => Credential::LegacyPlaintext(p),
                _ => Credential::Unprotected,
            },
        }
    }

    /// Column values in `(password, password_hash, password_salt)` order.
    pub fn columns(&self) -> (Option<&str>, Option<&str>, Option<&str>) {
        match self {
            Credential::Unprotected => (None, None, None),
            Credential::LegacyPlaintext(p) => (Some(p.as_str()), None, None),
            Credential::Hashed { hash, salt } => (None, Some(hash.as_str()), Some(salt.as_str())),
        }
    }

    pub fn is_protected(&self) -> bool {
        !matches!(self, Credential::Unprotected)
    }
}

#[derive(Debug, Clone)]
pub struct Note {
    pub id: String,
    pub user_id: String,
    pub folder_id: Option<String>,
    pub title: String,
    pub content: Option<String>,
    pub photo_url: Option<String>,
    pub voice_url: Option<String>,
    pub tags: Vec<String>,
    pub credential: Credential,
    pub created_at: String,
    pub updated_at: String,
}

impl Note {
    pub fn is_password_protected(&self) -> bool {
        self.credential.is_protected()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Case-insensitive substring match against title or content.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.title.to_lowercase().contains(&term)
            || self
                .content
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(&term))
    }
}

/// One row of the `notes` table.
#[derive(Debug, sqlx::FromRow)]
pub struct NoteRow {
    pub id: String,
    pub user_id: String,
    pub folder_id: Option<String>,
    pub title: String,
    pub content: Option<String>,
    pub photo_url: Option<String>,
    pub voice_url: Option<String>,
    pub tags: Option<Json<Vec<String>>>,
    pub password: Option<String>,
    pub password_hash: Option<String>,
    pub password_salt: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<NoteRow> for Note {
    fn from(row: NoteRow) -> Self {
        Self {
            credential: Credential::from_columns(row.password, row.password_hash, row.password_salt),
            id: row.id,
            user_id: row.user_id,
            folder_id: row.folder_id,
            title: row.title,
            content: row.content,
            photo_url: row.photo_url,
            voice_url: row.voice_url,
            tags: row.tags.map(|Json(tags)| tags).unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// API view of a note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteResponse {
    pub id: String,
    pub title: String,
    pub content: Option<String>,
    pub photo_url: Option<String>,
    pub voice_url: Option<String>,
    pub folder_id: Option<String>,
    pub tags: Vec<String>,
    pub is_password_protected: bool,
    pub created_at: String,
    pub updated_at: String,
    pub user_id: String,
}

impl NoteResponse {
    /// List view: protected content stays hidden until the note is unlocked.
    pub fn listed(note: &Note) -> Self {
        let mut response = Self::unlocked(note);
        if note.is_password_protected() {
            response.content = None;
        }
        response
    }

    pub fn unlocked(note: &Note) -> Self {
        Self {
            id: note.id.clone(),
            title: note.title.clone(),
            content: note.content.clone(),
            photo_url: note.photo_url.clone(),
            voice_url: note.voice_url.clone(),
            folder_id: note.folder_id.clone(),
            tags: note.tags.clone(),
            is_password_protected: note.is_password_protected(),
            created_at: note.created_at.clone(),
            updated_at: note.updated_at.clone(),
            user_id: note.user_id.clone(),
        }
    }
}

/// A save request after the editor has validated it and resolved the
/// credential. `id == None` inserts.
#[derive(Debug, Clone, Default)]
pub struct NoteFormData {
    pub id: Option<String>,
    pub title: String,
    pub content: Option<String>,
    pub photo_url: Option<String>,
    pub voice_url: Option<String>,
    pub folder_id: Option<String>,
    pub tags: Vec<String>,
    pub credential: Credential,
}

/// The editor form, `POST /notes` and `PUT /notes/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteEditorRequest {
    pub title: String,
    pub content: Option<String>,
    pub photo_url: Option<String>,
    pub voice_url: Option<String>,
    pub folder_id: Option<String>,
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub is_password_protected: bool,
    /// New password. `None` keeps the existing one when protection stays on.
    pub password: Option<String>,
    /// Required when editing a note that is already protected.
    pub current_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UnlockNoteRequest {
    pub password: Option<String>,
}

/// `GET /notes` query string. Blank values are treated as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteFilter {
    pub folder_id: Option<String>,
    pub tag: Option<String>,
    pub search: Option<String>,
}

impl NoteFilter {
    /// `search` also looks inside the content of protected notes, so a
    /// locked note can be found by words it contains even though its content
    /// is hidden in the listing.
    pub fn matches(&self, note: &Note) -> bool {
        if let Some(folder_id) = non_blank(&self.folder_id) {
            if note.folder_id.as_deref() != Some(folder_id) {
                return false;
            }
        }
        if let Some(tag) = non_blank(&self.tag) {
            if !note.has_tag(tag) {
                return false;
            }
        }
        if let Some(term) = non_blank(&self.search) {
            if !note.matches_search(term) {
                return false;
            }
        }
        true
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Trims tags, drops blanks and removes case-insensitive duplicates.
/// The first spelling of a tag is the one kept.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if tag.is_empty() {
            continue;
        }
        if seen.insert(tag.to_lowercase()) {
            out.push(tag.to_string());
        }
    }
    out
}
