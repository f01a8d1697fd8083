//! Linking stories to groups and individuals.
//!
//! Bulk links run in a single transaction: the anchor check, target
//! resolution and every insert either all commit or all roll back. The
//! `UNIQUE(story_id, member_id)` constraint plus `ON CONFLICT DO NOTHING`
//! keeps concurrent requests from creating duplicate pairs.

use serde::Serialize;
use sqlx::SqlitePool;

use crate::db::{
    GroupStory, GroupStoryRepository, IndividualStory, IndividualStoryRepository, JoinTable,
    LinkRepository, LinkSide,
};
use crate::error::{AppError, AppResult};

/// Result of a bulk link: which targets were newly linked and which were
/// linked already. Unknown target ids appear in neither list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkOutcome {
    pub added: Vec<i64>,
    pub existing: Vec<i64>,
}

pub struct AssociationService;

impl AssociationService {
    pub async fn bulk_link(
        pool: &SqlitePool,
        join: JoinTable,
        side: LinkSide,
        anchor_id: i64,
        target_ids: &[i64],
    ) -> AppResult<LinkOutcome> {
        if target_ids.is_empty() {
            return Err(AppError::Validation(
                join.empty_ids_message(side).to_string(),
            ));
        }

        let mut requested = target_ids.to_vec();
        requested.sort_unstable();
        requested.dedup();

        let mut tx = pool.begin().await.map_err(AppError::Database)?;

        if !LinkRepository::entity_exists(&mut tx, join.anchor_table(side), anchor_id).await? {
            return Err(AppError::NotFound(format!(
                "{} not found",
                join.anchor_label(side)
            )));
        }

        let resolved =
            LinkRepository::resolve_ids(&mut tx, join.target_table(side), &requested).await?;
        if resolved.len() < requested.len() {
            tracing::debug!(
                "Skipping {} unknown {} ids while linking {} {}",
                requested.len() - resolved.len(),
                join.target_table(side),
                join.anchor_table(side),
                anchor_id
            );
        }

        let mut outcome = LinkOutcome::default();
        for target_id in resolved {
            let (story_id, member_id) = join.pair(side, anchor_id, target_id);
            if LinkRepository::insert_if_absent(&mut tx, join, story_id, member_id).await? {
                outcome.added.push(target_id);
            } else {
                outcome.existing.push(target_id);
            }
        }

        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!(
            "Linked {} {}: {} added, {} already linked",
            join.anchor_table(side),
            anchor_id,
            outcome.added.len(),
            outcome.existing.len()
        );

        Ok(outcome)
    }

    /// Remove one link. A missing anchor and a missing link are both
    /// `NotFound`, with different messages.
    pub async fn unlink(
        pool: &SqlitePool,
        join: JoinTable,
        side: LinkSide,
        anchor_id: i64,
        target_id: i64,
    ) -> AppResult<()> {
        let mut conn = pool.acquire().await.map_err(AppError::Database)?;

        if !LinkRepository::entity_exists(&mut conn, join.anchor_table(side), anchor_id).await? {
            return Err(AppError::NotFound(format!(
                "{} not found",
                join.anchor_label(side)
            )));
        }

        let (story_id, member_id) = join.pair(side, anchor_id, target_id);
        if !LinkRepository::delete_pair(&mut conn, join, story_id, member_id).await? {
            return Err(AppError::NotFound(
                "Relationship does not exist".to_string(),
            ));
        }

        tracing::info!(
            "Unlinked story {} from {} {}",
            story_id,
            join.member_label.to_lowercase(),
            member_id
        );

        Ok(())
    }

    pub async fn groups_for_story(
        pool: &SqlitePool,
        story_id: Option<i64>,
    ) -> AppResult<Vec<GroupStory>> {
        let story_id = require_param(story_id, "story_id")?;
        let rows = GroupStoryRepository::list_by_story(pool, story_id).await?;
        non_empty(rows, "No groups found for the given story ID.")
    }

    pub async fn stories_for_group(
        pool: &SqlitePool,
        group_id: Option<i64>,
    ) -> AppResult<Vec<GroupStory>> {
        let group_id = require_param(group_id, "group_id")?;
        let rows = GroupStoryRepository::list_by_group(pool, group_id).await?;
        non_empty(rows, "No stories found for the given group ID.")
    }

    pub async fn individuals_for_story(
        pool: &SqlitePool,
        story_id: Option<i64>,
    ) -> AppResult<Vec<IndividualStory>> {
        let story_id = require_param(story_id, "story_id")?;
        let rows = IndividualStoryRepository::list_by_story(pool, story_id).await?;
        non_empty(rows, "No individuals found for the given story ID.")
    }

    pub async fn stories_for_individual(
        pool: &SqlitePool,
        individual_id: Option<i64>,
    ) -> AppResult<Vec<IndividualStory>> {
        let individual_id = require_param(individual_id, "individual_id")?;
        let rows = IndividualStoryRepository::list_by_individual(pool, individual_id).await?;
        non_empty(rows, "No stories found for the given individual ID.")
    }
}

fn require_param(value: Option<i64>, name: &str) -> AppResult<i64> {
    value.ok_or_else(|| AppError::BadRequest(format!("{} query parameter is required.", name)))
}

// Lookups by key treat "no links yet" as 404 rather than an empty list.
fn non_empty<T>(rows: Vec<T>, message: &str) -> AppResult<Vec<T>> {
    if rows.is_empty() {
        return Err(AppError::NotFound(message.to_string()));
    }
    Ok(rows)
}
