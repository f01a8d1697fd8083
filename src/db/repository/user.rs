use chrono::Utc;
use sqlx::SqlitePool;

use crate::db::models::*;
use crate::error::{AppError, AppResult};

// ============================================================================
// User Repository
// ============================================================================

pub struct UserRepository;

impl UserRepository {
    pub async fn list_all(pool: &SqlitePool) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, uid, bio, created_at, updated_at
            FROM users
            ORDER BY id ASC
            "#,
        )
        .fetch_all(pool)
        .await
        .map_err(AppError::Database)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, uid, bio, created_at, updated_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::Database)
    }

    pub async fn create(pool: &SqlitePool, user: CreateUser) -> AppResult<User> {
        let now = Utc::now().naive_utc();

        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, uid, bio, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, name, uid, bio, created_at, updated_at
            "#,
        )
        .bind(&user.name)
        .bind(&user.uid)
        .bind(&user.bio)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
        .map_err(AppError::Database)
    }

    /// Overwrite every editable field. Returns `None` when the user does not exist.
    pub async fn update(pool: &SqlitePool, id: i64, user: UpdateUser) -> AppResult<Option<User>> {
        let now = Utc::now().naive_utc();

        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = ?, uid = ?, bio = ?, updated_at = ?
            WHERE id = ?
            RETURNING id, name, uid, bio, created_at, updated_at
            "#,
        )
        .bind(&user.name)
        .bind(&user.uid)
        .bind(&user.bio)
        .bind(now)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::Database)
    }

    /// Delete a user together with everything it owns (cascade).
    /// Returns `false` when there was nothing to delete.
    pub async fn delete(pool: &SqlitePool, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await
            .map_err(AppError::Database)?;

        Ok(result.rows_affected() > 0)
    }
}
