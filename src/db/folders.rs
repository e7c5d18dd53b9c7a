use crate::models::Folder;
use sqlx::SqlitePool;

/// Lists a user's folders in name order.
pub async fn list_folders(pool: &SqlitePool, user_id: &str) -> Result<Vec<Folder>, sqlx::Error> {
    sqlx::query_as::<_, Folder>(
        r#"
        SELECT id, name, user_id, created_at
        FROM folders
        WHERE user_id = ?
        ORDER BY name ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn get_folder(
    pool: &SqlitePool,
    user_id: &str,
    id: &str,
) -> Result<Option<Folder>, sqlx::Error> {
    sqlx::query_as::<_, Folder>(
        r#"
        SELECT id, name, user_id, created_at
        FROM folders
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn create_folder(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
    name: &str,
) -> Result<Option<Folder>, sqlx::Error> {
    sqlx::query("INSERT INTO folders (id, user_id, name) VALUES (?, ?, ?)")
        .bind(id)
        .bind(user_id)
        .bind(name)
        .execute(pool)
        .await?;

    get_folder(pool, user_id, id).await
}
