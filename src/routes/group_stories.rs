use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;

use crate::db::{GroupStory, GroupStoryRepository};
use crate::error::{AppError, AppResult};
use crate::services::associations::AssociationService;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_group_stories))
        .route("/stories_by_group", get(stories_by_group))
        .route("/groups_by_stories", get(groups_by_stories))
        .route("/:id", get(get_group_story))
}

#[derive(Debug, Deserialize)]
pub struct GroupIdQuery {
    pub group_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct StoryIdQuery {
    pub story_id: Option<i64>,
}

async fn list_group_stories(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<GroupStory>>> {
    Ok(Json(GroupStoryRepository::list_all(&state.db).await?))
}

async fn get_group_story(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Json<GroupStory>> {
    GroupStoryRepository::find_by_id(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Group story link not found".to_string()))
}

async fn stories_by_group(
    State(state): State<Arc<AppState>>,
    WithRejection(Query(query), _): WithRejection<Query<GroupIdQuery>, AppError>,
) -> AppResult<Json<Vec<GroupStory>>> {
    Ok(Json(
        AssociationService::stories_for_group(&state.db, query.group_id).await?,
    ))
}

async fn groups_by_stories(
    State(state): State<Arc<AppState>>,
    WithRejection(Query(query), _): WithRejection<Query<StoryIdQuery>, AppError>,
) -> AppResult<Json<Vec<GroupStory>>> {
    Ok(Json(
        AssociationService::groups_for_story(&state.db, query.story_id).await?,
    ))
}
