use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;

use crate::db::{IndividualStory, IndividualStoryRepository};
use crate::error::{AppError, AppResult};
use crate::services::associations::AssociationService;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_individual_stories))
        .route("/stories_by_individual", get(stories_by_individual))
        .route("/individuals_by_stories", get(individuals_by_stories))
        .route("/:id", get(get_individual_story))
}

#[derive(Debug, Deserialize)]
pub struct IndividualIdQuery {
    pub individual_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct StoryIdQuery {
    pub story_id: Option<i64>,
}

async fn list_individual_stories(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<IndividualStory>>> {
    Ok(Json(IndividualStoryRepository::list_all(&state.db).await?))
}

async fn get_individual_story(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Json<IndividualStory>> {
    IndividualStoryRepository::find_by_id(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Individual story link not found".to_string()))
}

async fn stories_by_individual(
    State(state): State<Arc<AppState>>,
    WithRejection(Query(query), _): WithRejection<Query<IndividualIdQuery>, AppError>,
) -> AppResult<Json<Vec<IndividualStory>>> {
    Ok(Json(
        AssociationService::stories_for_individual(&state.db, query.individual_id).await?,
    ))
}

async fn individuals_by_stories(
    State(state): State<Arc<AppState>>,
    WithRejection(Query(query), _): WithRejection<Query<StoryIdQuery>, AppError>,
) -> AppResult<Json<Vec<IndividualStory>>> {
    Ok(Json(
        AssociationService::individuals_for_story(&state.db, query.story_id).await?,
    ))
}
