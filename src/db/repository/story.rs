use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::db::models::*;
use crate::db::UserRepository;
use crate::error::{AppError, AppResult};

// ============================================================================
// Story Repository
// ============================================================================

pub struct StoryRepository;

impl StoryRepository {
    pub async fn list_all(pool: &SqlitePool) -> AppResult<Vec<Story>> {
        sqlx::query_as::<_, Story>(
            r#"
            SELECT id, name, owner_id, description, type, created_at, updated_at
            FROM stories
            ORDER BY id ASC
            "#,
        )
        .fetch_all(pool)
        .await
        .map_err(AppError::Database)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> AppResult<Option<Story>> {
        sqlx::query_as::<_, Story>(
            r#"
            SELECT id, name, owner_id, description, type, created_at, updated_at
            FROM stories
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::Database)
    }

    pub async fn create(pool: &SqlitePool, story: CreateStory) -> AppResult<Story> {
        // The owner must exist before a story can reference it.
        UserRepository::find_by_id(pool, story.owner_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let now = Utc::now().naive_utc();

        sqlx::query_as::<_, Story>(
            r#"
            INSERT INTO stories (name, owner_id, description, type, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, name, owner_id, description, type, created_at, updated_at
            "#,
        )
        .bind(&story.name)
        .bind(story.owner_id)
        .bind(&story.description)
        .bind(&story.story_type)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
        .map_err(AppError::Database)
    }

    pub async fn update(pool: &SqlitePool, id: i64, story: UpdateStory) -> AppResult<Story> {
        Self::find_by_id(pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Story not found".to_string()))?;
        UserRepository::find_by_id(pool, story.owner_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let now = Utc::now().naive_utc();

        sqlx::query_as::<_, Story>(
            r#"
            UPDATE stories
            SET name = ?, owner_id = ?, description = ?, type = ?, updated_at = ?
            WHERE id = ?
            RETURNING id, name, owner_id, description, type, created_at, updated_at
            "#,
        )
        .bind(&story.name)
        .bind(story.owner_id)
        .bind(&story.description)
        .bind(&story.story_type)
        .bind(now)
        .bind(id)
        .fetch_one(pool)
        .await
        .map_err(AppError::Database)
    }

    /// Delete a story. Its group and individual links go with it.
    pub async fn delete(pool: &SqlitePool, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM stories WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await
            .map_err(AppError::Database)?;

        Ok(result.rows_affected() > 0)
    }
}

/// Columns of `stories s` aliased with a `story_` prefix, for joins.
pub(crate) const STORY_JOIN_COLUMNS: &str = r#"
    s.id AS story_id,
    s.name AS story_name,
    s.owner_id AS story_owner_id,
    s.description AS story_description,
    s.type AS story_type,
    s.created_at AS story_created_at,
    s.updated_at AS story_updated_at
"#;

pub(crate) fn story_from_joined_row(r: &SqliteRow) -> Result<Story, sqlx::Error> {
    Ok(Story {
        id: r.try_get("story_id")?,
        name: r.try_get("story_name")?,
        owner_id: r.try_get("story_owner_id")?,
        description: r.try_get("story_description")?,
        story_type: r.try_get("story_type")?,
        created_at: r.try_get("story_created_at")?,
        updated_at: r.try_get("story_updated_at")?,
    })
}
