//! Low-level access to the story join tables (`group_stories`,
//! `individual_stories`).
//!
//! Both tables have the same shape: `(id, <member>_id, story_id, created_at)`
//! with `UNIQUE(story_id, <member>_id)`, so one descriptor-driven set of
//! queries serves both. Every function takes a `&mut SqliteConnection` so it
//! can run either on a pooled connection or inside a transaction.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::error::{AppError, AppResult};

/// SQLite caps bound parameters per statement; stay well under it.
const RESOLVE_CHUNK_SIZE: usize = 500;

/// Describes a join table between `stories` and one member table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinTable {
    pub table: &'static str,
    pub member_column: &'static str,
    pub member_table: &'static str,
    /// Human-readable member name used in error messages.
    pub member_label: &'static str,
}

pub const GROUP_STORIES: JoinTable = JoinTable {
    table: "group_stories",
    member_column: "group_id",
    member_table: "groups",
    member_label: "Group",
};

pub const INDIVIDUAL_STORIES: JoinTable = JoinTable {
    table: "individual_stories",
    member_column: "individual_id",
    member_table: "individuals",
    member_label: "Individual",
};

/// Which side of the join table a link request is anchored on.
///
/// `Story` means the path carries a story id and the body carries member ids
/// (`add_group_to_story`); `Member` is the reverse (`add_story_to_group`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkSide {
    Story,
    Member,
}

impl JoinTable {
    pub fn anchor_table(&self, side: LinkSide) -> &'static str {
        match side {
            LinkSide::Story => "stories",
            LinkSide::Member => self.member_table,
        }
    }

    pub fn target_table(&self, side: LinkSide) -> &'static str {
        match side {
            LinkSide::Story => self.member_table,
            LinkSide::Member => "stories",
        }
    }

    pub fn anchor_label(&self, side: LinkSide) -> &'static str {
        match side {
            LinkSide::Story => "Story",
            LinkSide::Member => self.member_label,
        }
    }

    /// Rejection message for a link request with no target ids.
    pub fn empty_ids_message(&self, side: LinkSide) -> &'static str {
        match side {
            LinkSide::Story => "No ids provided.",
            LinkSide::Member => "No story IDs provided.",
        }
    }

    /// Orders an (anchor, target) id pair as (story_id, member_id).
    pub fn pair(&self, side: LinkSide, anchor_id: i64, target_id: i64) -> (i64, i64) {
        match side {
            LinkSide::Story => (anchor_id, target_id),
            LinkSide::Member => (target_id, anchor_id),
        }
    }
}

// ============================================================================
// Link Repository
// ============================================================================

pub struct LinkRepository;

impl LinkRepository {
    pub async fn entity_exists(
        conn: &mut SqliteConnection,
        table: &'static str,
        id: i64,
    ) -> AppResult<bool> {
        let sql = format!("SELECT 1 FROM {} WHERE id = ?", table);

        let row: Option<(i64,)> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(AppError::Database)?;

        Ok(row.is_some())
    }

    /// Return the subset of `ids` present in `table`, ascending.
    pub async fn resolve_ids(
        conn: &mut SqliteConnection,
        table: &'static str,
        ids: &[i64],
    ) -> AppResult<Vec<i64>> {
        let mut found = Vec::with_capacity(ids.len());

        for chunk in ids.chunks(RESOLVE_CHUNK_SIZE) {
            let mut builder: QueryBuilder<Sqlite> =
                QueryBuilder::new(format!("SELECT id FROM {} WHERE id IN (", table));
            {
                let mut separated = builder.separated(", ");
                for id in chunk {
                    separated.push_bind(*id);
                }
                separated.push_unseparated(")");
            }

            let rows: Vec<(i64,)> = builder
                .build_query_as()
                .fetch_all(&mut *conn)
                .await
                .map_err(AppError::Database)?;

            found.extend(rows.into_iter().map(|(id,)| id));
        }

        found.sort_unstable();
        Ok(found)
    }

    /// Insert the (story, member) pair unless it is already linked.
    /// Returns `true` when a new row was written.
    pub async fn insert_if_absent(
        conn: &mut SqliteConnection,
        join: JoinTable,
        story_id: i64,
        member_id: i64,
    ) -> AppResult<bool> {
        let now = Utc::now().naive_utc();
        let sql = format!(
            "INSERT INTO {} (story_id, {}, created_at) VALUES (?, ?, ?) \
             ON CONFLICT(story_id, {}) DO NOTHING",
            join.table, join.member_column, join.member_column
        );

        let result = sqlx::query(&sql)
            .bind(story_id)
            .bind(member_id)
            .bind(now)
            .execute(conn)
            .await
            .map_err(AppError::Database)?;

        Ok(result.rows_affected() == 1)
    }

    /// Delete exactly the (story, member) row. Returns `false` if it did not exist.
    pub async fn delete_pair(
        conn: &mut SqliteConnection,
        join: JoinTable,
        story_id: i64,
        member_id: i64,
    ) -> AppResult<bool> {
        let sql = format!(
            "DELETE FROM {} WHERE story_id = ? AND {} = ?",
            join.table, join.member_column
        );

        let result = sqlx::query(&sql)
            .bind(story_id)
            .bind(member_id)
            .execute(conn)
            .await
            .map_err(AppError::Database)?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{self, Fixture};

    #[test]
    fn story_side_keeps_anchor_first() {
        assert_eq!(GROUP_STORIES.pair(LinkSide::Story, 7, 3), (7, 3));
        assert_eq!(GROUP_STORIES.anchor_table(LinkSide::Story), "stories");
        assert_eq!(GROUP_STORIES.target_table(LinkSide::Story), "groups");
    }

    #[test]
    fn empty_message_names_the_missing_side() {
        assert_eq!(GROUP_STORIES.empty_ids_message(LinkSide::Story), "No ids provided.");
        assert_eq!(
            INDIVIDUAL_STORIES.empty_ids_message(LinkSide::Member),
            "No story IDs provided."
        );
    }

    #[tokio::test]
    async fn insert_if_absent_reports_duplicates_via_constraint() {
        let pool = test_support::pool().await;
        let fx = Fixture::seed(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let group_id = fx.groups[0].id;

        assert!(
            LinkRepository::insert_if_absent(&mut conn, GROUP_STORIES, fx.story.id, group_id)
                .await
                .unwrap()
        );
        assert!(
            !LinkRepository::insert_if_absent(&mut conn, GROUP_STORIES, fx.story.id, group_id)
                .await
                .unwrap()
        );

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM group_stories")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn member_side_swaps_pair() {
        assert_eq!(INDIVIDUAL_STORIES.pair(LinkSide::Member, 7, 3), (3, 7));
        assert_eq!(
            INDIVIDUAL_STORIES.anchor_table(LinkSide::Member),
            "individuals"
        );
        assert_eq!(INDIVIDUAL_STORIES.anchor_label(LinkSide::Member), "Individual");
        assert_eq!(INDIVIDUAL_STORIES.target_table(LinkSide::Member), "stories");
    }
}
