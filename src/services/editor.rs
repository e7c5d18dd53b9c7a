//! # Note editor
//!
//! Turns an editor form into a [`NoteFormData`] the repository can persist.
//! This is where the title is checked, where edits of a protected note are
//! challenged, and where every new password is hashed before it reaches the
//! backend.

use crate::{
    error::AppError,
    models::{normalize_tags, Credential, Note, NoteEditorRequest, NoteFormData},
    services::credential::{self, check_access, Notifier, SuppliedPassword},
};

pub const TITLE_REQUIRED: &str = "Note title is required";
pub const PASSWORD_REQUIRED: &str = "Password is required when password protection is enabled";
pub const INCORRECT_PASSWORD: &str = "Incorrect password for this note";

/// Validates `request` and resolves its credential.
///
/// `existing` is the stored note when editing, `None` when creating.
///
/// Credential rules:
/// - protection off: the note becomes unprotected
/// - protection on with a new password: the password must pass the strength
///   policy and is stored hashed
/// - protection on without a new password: the existing credential is kept
///   (an error when there is none)
pub async fn prepare_save<N>(
    request: NoteEditorRequest,
    existing: Option<&Note>,
    notifier: &N,
) -> Result<NoteFormData, AppError>
where
    N: Notifier + ?Sized,
{
    let title = request.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation(TITLE_REQUIRED.to_string()));
    }

    if let Some(note) = existing {
        let prompt = SuppliedPassword(request.current_password.clone());
        if !check_access(note, &prompt, notifier).await {
            return Err(AppError::AccessDenied(INCORRECT_PASSWORD.to_string()));
        }
    }

    let new_password = request.password.as_deref().filter(|p| !p.is_empty());
    let credential = match (request.is_password_protected, new_password) {
        (false, _) => Credential::Unprotected,
        (true, Some(password)) => {
            let report = credential::validate_strength(password);
            if !report.valid {
                return Err(AppError::Validation(report.message));
            }
            credential::prepare(password).into()
        }
        (true, None) => match existing {
            Some(note) if note.is_password_protected() => note.credential.clone(),
            _ => return Err(AppError::Validation(PASSWORD_REQUIRED.to_string())),
        },
    };

    Ok(NoteFormData {
        id: existing.map(|note| note.id.clone()),
        title: title.to_string(),
        content: request.content,
        photo_url: request.photo_url,
        voice_url: request.voice_url,
        folder_id: request.folder_id.filter(|f| !f.is_empty()),
        tags: normalize_tags(request.tags.unwrap_or_default()),
        credential,
    })
}
