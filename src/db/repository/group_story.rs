use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::db::models::GroupStory;
use crate::db::repository::group::{group_from_joined_row, GROUP_JOIN_COLUMNS};
use crate::db::repository::story::{story_from_joined_row, STORY_JOIN_COLUMNS};
use crate::error::{AppError, AppResult};

// ============================================================================
// GroupStory Repository
// ============================================================================

/// Read side of `group_stories`. Writes go through `LinkRepository`.
pub struct GroupStoryRepository;

impl GroupStoryRepository {
    fn select_sql(filter: &str) -> String {
        format!(
            r#"
            SELECT
                l.id AS link_id,
                {},
                {}
            FROM group_stories l
            JOIN groups m ON m.id = l.group_id
            JOIN stories s ON s.id = l.story_id
            {}
            ORDER BY l.id ASC
            "#,
            GROUP_JOIN_COLUMNS, STORY_JOIN_COLUMNS, filter
        )
    }

    fn from_row(r: &SqliteRow) -> Result<GroupStory, sqlx::Error> {
        Ok(GroupStory {
            id: r.try_get("link_id")?,
            group: group_from_joined_row(r)?,
            story: story_from_joined_row(r)?,
        })
    }

    pub async fn list_all(pool: &SqlitePool) -> AppResult<Vec<GroupStory>> {
        let rows = sqlx::query(&Self::select_sql(""))
            .fetch_all(pool)
            .await
            .map_err(AppError::Database)?;

        rows.iter()
            .map(Self::from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(AppError::Database)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> AppResult<Option<GroupStory>> {
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

    pub async fn list_by_story(pool: &SqlitePool, story_id: i64) -> AppResult<Vec<GroupStory>> {
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

    pub async fn list_by_group(pool: &SqlitePool, group_id: i64) -> AppResult<Vec<GroupStory>> {
        let rows = sqlx::query(&Self::select_sql("WHERE l.group_id = ?"))
            .bind(group_id)
            .fetch_all(pool)
            .await
            .map_err(AppError::Database)?;

        rows.iter()
            .map(Self::from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(AppError::Database)
    }
}
