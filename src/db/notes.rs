//! # Note queries
//!
//! CRUD queries for the `notes` table. Every query is scoped by `user_id`;
//! a note that belongs to someone else behaves exactly like a missing one.
//!
//! Credential columns are written from [`Credential::columns`], so a row
//! never ends up holding both the legacy password and a hash.

use crate::models::*;
use sqlx::{types::Json, SqlitePool};

const NOTE_COLUMNS: &str = r#"
    id, user_id, folder_id, title, content, photo_url, voice_url, tags,
    password, password_hash, password_salt, created_at, updated_at
"#;

/// Lists a user's notes, newest first.
///
/// `id DESC` breaks ties between notes created in the same millisecond;
/// UUIDv7 ids grow with creation time.
pub async fn list_notes(
    pool: &SqlitePool,
    user_id: &str,
    folder_id: Option<&str>,
) -> Result<Vec<Note>, sqlx::Error> {
    let rows = if let Some(fid) = folder_id {
        sqlx::query_as::<_, NoteRow>(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE user_id = ? AND folder_id = ? ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .bind(fid)
        .fetch_all(pool)
        .await?
    } else {
        sqlx::query_as::<_, NoteRow>(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE user_id = ? ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await?
    };

    Ok(rows.into_iter().map(Note::from).collect())
}

pub async fn get_note(
    pool: &SqlitePool,
    user_id: &str,
    id: &str,
) -> Result<Option<Note>, sqlx::Error> {
    let row = sqlx::query_as::<_, NoteRow>(&format!(
        "SELECT {NOTE_COLUMNS} FROM notes WHERE id = ? AND user_id = ?"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(Note::from))
}

/// Inserts a note. `now` is used for both `created_at` and `updated_at`.
pub async fn insert_note(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
    note: &NoteFormData,
    now: &str,
) -> Result<(), sqlx::Error> {
    let (password, password_hash, password_salt) = note.credential.columns();

    sqlx::query(
        r#"
        INSERT INTO notes (id, user_id, folder_id, title, content, photo_url, voice_url, tags,
                           password, password_hash, password_salt, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(&note.folder_id)
    .bind(&note.title)
    .bind(&note.content)
    .bind(&note.photo_url)
    .bind(&note.voice_url)
    .bind(Json(&note.tags))
    .bind(password)
    .bind(password_hash)
    .bind(password_salt)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(())
}

/// Overwrites every mutable field of a note and stamps `updated_at`.
///
/// Returns `false` when no row matched (missing or owned by another user).
pub async fn update_note(
    pool: &SqlitePool,
    user_id: &str,
    id: &str,
    note: &NoteFormData,
    now: &str,
) -> Result<bool, sqlx::Error> {
    let (password, password_hash, password_salt) = note.credential.columns();

    let result = sqlx::query(
        r#"
        UPDATE notes
        SET folder_id = ?, title = ?, content = ?, photo_url = ?, voice_url = ?, tags = ?,
            password = ?, password_hash = ?, password_salt = ?, updated_at = ?
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(&note.folder_id)
    .bind(&note.title)
    .bind(&note.content)
    .bind(&note.photo_url)
    .bind(&note.voice_url)
    .bind(Json(&note.tags))
    .bind(password)
    .bind(password_hash)
    .bind(password_salt)
    .bind(now)
    .bind(id)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete_note(pool: &SqlitePool, user_id: &str, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM notes WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
