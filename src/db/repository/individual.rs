use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::db::models::*;
use crate::db::UserRepository;
use crate::error::{AppError, AppResult};

// ============================================================================
// Individual Repository
// ============================================================================

pub struct IndividualRepository;

impl IndividualRepository {
    pub async fn list_all(pool: &SqlitePool) -> AppResult<Vec<Individual>> {
        sqlx::query_as::<_, Individual>(
            r#"
            SELECT id, name, owner_id, description, status, created_at, updated_at
            FROM individuals
            ORDER BY id ASC
            "#,
        )
        .fetch_all(pool)
        .await
        .map_err(AppError::Database)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> AppResult<Option<Individual>> {
        sqlx::query_as::<_, Individual>(
            r#"
            SELECT id, name, owner_id, description, status, created_at, updated_at
            FROM individuals
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::Database)
    }

    pub async fn create(pool: &SqlitePool, individual: CreateIndividual) -> AppResult<Individual> {
        UserRepository::find_by_id(pool, individual.owner_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let now = Utc::now().naive_utc();

        sqlx::query_as::<_, Individual>(
            r#"
            INSERT INTO individuals (name, owner_id, description, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, name, owner_id, description, status, created_at, updated_at
            "#,
        )
        .bind(&individual.name)
        .bind(individual.owner_id)
        .bind(&individual.description)
        .bind(&individual.status)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
        .map_err(AppError::Database)
    }

    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        individual: UpdateIndividual,
    ) -> AppResult<Individual> {
        Self::find_by_id(pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Individual not found".to_string()))?;
        UserRepository::find_by_id(pool, individual.owner_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let now = Utc::now().naive_utc();

        sqlx::query_as::<_, Individual>(
            r#"
            UPDATE individuals
            SET name = ?, owner_id = ?, description = ?, status = ?, updated_at = ?
            WHERE id = ?
            RETURNING id, name, owner_id, description, status, created_at, updated_at
            "#,
        )
        .bind(&individual.name)
        .bind(individual.owner_id)
        .bind(&individual.description)
        .bind(&individual.status)
        .bind(now)
        .bind(id)
        .fetch_one(pool)
        .await
        .map_err(AppError::Database)
    }

    pub async fn delete(pool: &SqlitePool, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM individuals WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await
            .map_err(AppError::Database)?;

        Ok(result.rows_affected() > 0)
    }
}

pub(crate) const INDIVIDUAL_JOIN_COLUMNS: &str = r#"
    m.id AS individual_id,
    m.name AS individual_name,
    m.owner_id AS individual_owner_id,
    m.description AS individual_description,
    m.status AS individual_status,
    m.created_at AS individual_created_at,
    m.updated_at AS individual_updated_at
"#;

pub(crate) fn individual_from_joined_row(r: &SqliteRow) -> Result<Individual, sqlx::Error> {
    Ok(Individual {
        id: r.try_get("individual_id")?,
        name: r.try_get("individual_name")?,
        owner_id: r.try_get("individual_owner_id")?,
        description: r.try_get("individual_description")?,
        status: r.try_get("individual_status")?,
        created_at: r.try_get("individual_created_at")?,
        updated_at: r.try_get("individual_updated_at")?,
    })
}
