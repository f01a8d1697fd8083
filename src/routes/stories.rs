use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use serde_json::json;

use crate::db::{
    CreateStory, LinkSide, Story, StoryRepository, GROUP_STORIES, INDIVIDUAL_STORIES,
};
use crate::error::{AppError, AppResult};
use crate::routes::required;
use crate::services::associations::AssociationService;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_stories).post(create_story))
        .route(
            "/:id",
            get(get_story).put(update_story).delete(delete_story),
        )
        .route("/:id/add_group_to_story", post(add_groups_to_story))
        .route("/:id/remove_group_from_story", delete(remove_group_from_story))
        .route("/:id/add_individual_to_story", post(add_individuals_to_story))
        .route(
            "/:id/remove_individual_from_story",
            delete(remove_individual_from_story),
        )
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StoryRequest {
    pub name: Option<String>,
    /// Owner id. Older clients send it as `user_id`.
    #[serde(alias = "user_id")]
    pub uid: Option<i64>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub story_type: Option<String>,
}

impl StoryRequest {
    fn into_payload(self) -> AppResult<CreateStory> {
        Ok(CreateStory {
            name: required(self.name, "name")?,
            owner_id: required(self.uid, "uid")?,
            description: self.description.unwrap_or_default(),
            story_type: self.story_type.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct AddGroupsRequest {
    #[serde(rename = "groupIds", default)]
    pub group_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RemoveGroupRequest {
    #[serde(rename = "groupId")]
    pub group_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AddIndividualsRequest {
    #[serde(rename = "individualIds", default)]
    pub individual_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RemoveIndividualRequest {
    #[serde(rename = "individualId")]
    pub individual_id: Option<i64>,
}

// ============================================================================
// Handlers
// ============================================================================

async fn list_stories(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Story>>> {
    Ok(Json(StoryRepository::list_all(&state.db).await?))
}

async fn get_story(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Json<Story>> {
    StoryRepository::find_by_id(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Story not found".to_string()))
}

async fn create_story(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(request), _): WithRejection<Json<StoryRequest>, AppError>,
) -> AppResult<(StatusCode, Json<Story>)> {
    let story = StoryRepository::create(&state.db, request.into_payload()?).await?;
    tracing::info!("Created story {} for user {}", story.id, story.owner_id);
    Ok((StatusCode::CREATED, Json(story)))
}

async fn update_story(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(request), _): WithRejection<Json<StoryRequest>, AppError>,
) -> AppResult<Json<Story>> {
    let story = StoryRepository::update(&state.db, id, request.into_payload()?).await?;
    Ok(Json(story))
}

async fn delete_story(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<StatusCode> {
    if !StoryRepository::delete(&state.db, id).await? {
        return Err(AppError::NotFound("Story not found".to_string()));
    }
    tracing::info!("Deleted story {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Link several groups to a story. Unknown group ids are ignored.
async fn add_groups_to_story(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(request), _): WithRejection<Json<AddGroupsRequest>, AppError>,
) -> AppResult<Json<serde_json::Value>> {
    let outcome = AssociationService::bulk_link(
        &state.db,
        GROUP_STORIES,
        LinkSide::Story,
        id,
        &request.group_ids,
    )
    .await?;

    Ok(Json(json!({
        "added_groups": outcome.added,
        "existing_groups": outcome.existing,
    })))
}

async fn remove_group_from_story(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(request), _): WithRejection<Json<RemoveGroupRequest>, AppError>,
) -> AppResult<StatusCode> {
    let group_id = required(request.group_id, "groupId")?;
    AssociationService::unlink(&state.db, GROUP_STORIES, LinkSide::Story, id, group_id).await?;
    Ok(StatusCode::OK)
}

/// Link several individuals to a story. Unknown individual ids are ignored.
async fn add_individuals_to_story(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(request), _): WithRejection<Json<AddIndividualsRequest>, AppError>,
) -> AppResult<Json<serde_json::Value>> {
    let outcome = AssociationService::bulk_link(
        &state.db,
        INDIVIDUAL_STORIES,
        LinkSide::Story,
        id,
        &request.individual_ids,
    )
    .await?;

    Ok(Json(json!({
        "added_individuals": outcome.added,
        "existing_individuals": outcome.existing,
    })))
}

async fn remove_individual_from_story(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(request), _): WithRejection<Json<RemoveIndividualRequest>, AppError>,
) -> AppResult<StatusCode> {
    let individual_id = required(request.individual_id, "individualId")?;
    AssociationService::unlink(
        &state.db,
        INDIVIDUAL_STORIES,
        LinkSide::Story,
        id,
        individual_id,
    )
    .await?;
    Ok(StatusCode::OK)
}
