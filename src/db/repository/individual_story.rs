use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::db::models::IndividualStory;
use crate::db::repository::individual::{individual_from_joined_row, INDIVIDUAL_JOIN_COLUMNS};
use crate::db::repository::story::{story_from_joined_row, STORY_JOIN_COLUMNS};
use crate::error::{AppError, AppResult};

// ============================================================================
// IndividualStory Repository
// ============================================================================

/// Read side of `individual_stories`. Writes go through `LinkRepository`.
pub struct IndividualStoryRepository;

impl IndividualStoryRepository {
    fn select_sql(filter: &str) -> String {
        format!(
            r#"
            SELECT
                l.id AS link_id,
                {},
                {}
            FROM individual_stories l
            JOIN individuals m ON m.id = l.individual_id
            JOIN stories s ON s.id = l.story_id
            {}
            ORDER BY l.id ASC
            "#,
            INDIVIDUAL_JOIN_COLUMNS, STORY_JOIN_COLUMNS, filter
        )
    }

    fn from_row(r: &SqliteRow) -> Result<IndividualStory, sqlx::Error> {
        Ok(IndividualStory {
            id: r.try_get("link_id")?,
            individual: individual_from_joined_row(r)?,
            story: story_from_joined_row(r)?,
        })
    }

    pub async fn list_all(pool: &SqlitePool) -> AppResult<Vec<IndividualStory>> {
        let rows = sqlx::query(&Self::select_sql(""))
            .fetch_all(pool)
            .await
            .map_err(AppError::Database)?;

        rows.iter()
            .map(Self::from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(AppError::Database)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> AppResult<Option<IndividualStory>> {
        let row = sqlx::query(&Self::select_sql("WHERE l.id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(AppError::Database)?;

        row.as_ref()
            .map(Self::from_row)
            .transpose()
            .map_err(AppError::Database)
    }

    pub async fn list_by_story(
        pool: &SqlitePool,
        story_id: i64,
    ) -> AppResult<Vec<IndividualStory>> {
        let rows = sqlx::query(&Self::select_sql("WHERE l.story_id = ?"))
            .bind(story_id)
            .fetch_all(pool)
            .await
            .map_err(AppError::Database)?;

        rows.iter()
            .map(Self::from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(AppError::Database)
    }

    pub async fn list_by_individual(
        pool: &SqlitePool,
        individual_id: i64,
    ) -> AppResult<Vec<IndividualStory>> {
        let rows = sqlx::query(&Self::select_sql("WHERE l.individual_id = ?"))
            .bind(individual_id)
            .fetch_all(pool)
            .await
            .map_err(AppError::Database)?;

        rows.iter()
            .map(Self::from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(AppError::Database)
    }
}
