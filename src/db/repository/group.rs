use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::db::models::*;
use crate::db::UserRepository;
use crate::error::{AppError, AppResult};

// ============================================================================
// Group Repository
// ============================================================================

pub struct GroupRepository;

impl GroupRepository {
    pub async fn list_all(pool: &SqlitePool) -> AppResult<Vec<Group>> {
        sqlx::query_as::<_, Group>(
            r#"
            SELECT id, name, owner_id, description, status, created_at, updated_at
            FROM groups
            ORDER BY id ASC
            "#,
        )
        .fetch_all(pool)
        .await
        .map_err(AppError::Database)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> AppResult<Option<Group>> {
        sqlx::query_as::<_, Group>(
            r#"
            SELECT id, name, owner_id, description, status, created_at, updated_at
            FROM groups
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::Database)
    }

    pub async fn create(pool: &SqlitePool, group: CreateGroup) -> AppResult<Group> {
        UserRepository::find_by_id(pool, group.owner_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let now = Utc::now().naive_utc();

        sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO groups (name, owner_id, description, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, name, owner_id, description, status, created_at, updated_at
            "#,
        )
        .bind(&group.name)
        .bind(group.owner_id)
        .bind(&group.description)
        .bind(&group.status)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
        .map_err(AppError::Database)
    }

    pub async fn update(pool: &SqlitePool, id: i64, group: UpdateGroup) -> AppResult<Group> {
        Self::find_by_id(pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Group not found".to_string()))?;
        UserRepository::find_by_id(pool, group.owner_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let now = Utc::now().naive_utc();

        sqlx::query_as::<_, Group>(
            r#"
            UPDATE groups
            SET name = ?, owner_id = ?, description = ?, status = ?, updated_at = ?
            WHERE id = ?
            RETURNING id, name, owner_id, description, status, created_at, updated_at
            "#,
        )
        .bind(&group.name)
        .bind(group.owner_id)
        .bind(&group.description)
        .bind(&group.status)
        .bind(now)
        .bind(id)
        .fetch_one(pool)
        .await
        .map_err(AppError::Database)
    }

    pub async fn delete(pool: &SqlitePool, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM groups WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await
            .map_err(AppError::Database)?;

        Ok(result.rows_affected() > 0)
    }
}

pub(crate) const GROUP_JOIN_COLUMNS: &str = r#"
    m.id AS group_id,
    m.name AS group_name,
    m.owner_id AS group_owner_id,
    m.description AS group_description,
    m.status AS group_status,
    m.created_at AS group_created_at,
    m.updated_at AS group_updated_at
"#;

pub(crate) fn group_from_joined_row(r: &SqliteRow) -> Result<Group, sqlx::Error> {
    Ok(Group {
        id: r.try_get("group_id")?,
        name: r.try_get("group_name")?,
        owner_id: r.try_get("group_owner_id")?,
        description: r.try_get("group_description")?,
        status: r.try_get("group_status")?,
        created_at: r.try_get("group_created_at")?,
        updated_at: r.try_get("group_updated_at")?,
    })
}
