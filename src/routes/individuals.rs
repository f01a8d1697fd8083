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

use crate::db::{CreateIndividual, Individual, IndividualRepository, LinkSide, INDIVIDUAL_STORIES};
use crate::error::{AppError, AppResult};
use crate::routes::required;
use crate::services::associations::AssociationService;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_individuals).post(create_individual))
        .route("/:id", get(get_individual).put(update_individual).delete(delete_individual))
        .route("/:id/add_story_to_individual", post(add_story_to_individual))
        .route("/:id/remove_story_from_individual", delete(remove_story_from_individual))
}

#[derive(Debug, Deserialize)]
pub struct IndividualRequest {
    pub name: Option<String>,
    pub uid: Option<i64>,
    pub description: Option<String>,
    #[serde(alias = "type")]
    pub status: Option<String>,
}

impl IndividualRequest {
    fn into_payload(self) -> AppResult<CreateIndividual> {
        Ok(CreateIndividual {
            name: required(self.name, "name")?,
            owner_id: required(self.uid, "uid")?,
            description: self.description.unwrap_or_default(),
            status: self.status.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct AddStoriesRequest {
    #[serde(rename = "storyIds", default)]
    pub story_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RemoveStoryRequest {
    #[serde(rename = "storyId")]
    pub story_id: Option<i64>,
}

async fn list_individuals(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Individual>>> {
    Ok(Json(IndividualRepository::list_all(&state.db).await?))
}

async fn get_individual(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Json<Individual>> {
    IndividualRepository::find_by_id(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Individual not found".to_string()))
}

async fn create_individual(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(request), _): WithRejection<Json<IndividualRequest>, AppError>,
) -> AppResult<(StatusCode, Json<Individual>)> {
    let individual = IndividualRepository::create(&state.db, request.into_payload()?).await?;
    Ok((StatusCode::CREATED, Json(individual)))
}

async fn update_individual(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(request), _): WithRejection<Json<IndividualRequest>, AppError>,
) -> AppResult<Json<Individual>> {
    Ok(Json(
        IndividualRepository::update(&state.db, id, request.into_payload()?).await?,
    ))
}

async fn delete_individual(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<StatusCode> {
    if !IndividualRepository::delete(&state.db, id).await? {
        return Err(AppError::NotFound("Individual not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn add_story_to_individual(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(request), _): WithRejection<Json<AddStoriesRequest>, AppError>,
) -> AppResult<Json<serde_json::Value>> {
    let outcome = AssociationService::bulk_link(
        &state.db,
        INDIVIDUAL_STORIES,
        LinkSide::Member,
        id,
        &request.story_ids,
    )
    .await?;

    Ok(Json(json!({
        "added_stories": outcome.added,
        "existing_stories": outcome.existing,
    })))
}

async fn remove_story_from_individual(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(request), _): WithRejection<Json<RemoveStoryRequest>, AppError>,
) -> AppResult<StatusCode> {
    let story_id = required(request.story_id, "storyId")?;
    AssociationService::unlink(&state.db, INDIVIDUAL_STORIES, LinkSide::Member, id, story_id)
        .await?;
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::{router, testing::send};
    use crate::test_support::{self, Fixture};

    #[tokio::test]
    async fn update_and_delete() {
        let pool = test_support::pool().await;
        let fx = Fixture::seed(&pool).await;
        let app = router(test_support::state(pool));
        let uri = format!("/individuals/{}", fx.individuals[0].id);

        let (status, body) = send(
            &app,
            Method::PUT,
            &uri,
            Some(json!({
                "name": "Grandma Rose",
                "uid": fx.owner.id,
                "description": "matriarch",
                "status": "deceased"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "deceased");
        assert_eq!(body["description"], "matriarch");

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, list) = send(&app, Method::GET, "/individuals", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_with_unknown_owner_is_not_found() {
        let pool = test_support::pool().await;
        let fx = Fixture::seed(&pool).await;
        let app = router(test_support::state(pool));

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/individuals/{}", fx.individuals[1].id),
            Some(json!({ "name": "Uncle Tom", "uid": 999 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "User not found");
    }

    #[tokio::test]
    async fn add_story_to_individual_skips_unknown_stories() {
        let pool = test_support::pool().await;
        let fx = Fixture::seed(&pool).await;
        let app = router(test_support::state(pool));

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/individuals/{}/add_story_to_individual", fx.individuals[0].id),
            Some(json!({ "storyIds": [fx.story.id, 8080] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["added_stories"], json!([fx.story.id]));
        assert_eq!(body["existing_stories"], json!([]));
    }
}
