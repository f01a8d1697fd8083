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

use crate::db::{CreateGroup, Group, GroupRepository, LinkSide, GROUP_STORIES};
use crate::error::{AppError, AppResult};
use crate::routes::required;
use crate::services::associations::AssociationService;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_groups).post(create_group))
        .route("/:id", get(get_group).put(update_group).delete(delete_group))
        .route("/:id/add_story_to_group", post(add_story_to_group))
        .route("/:id/remove_story_from_group", delete(remove_story_from_group))
}

#[derive(Debug, Deserialize)]
pub struct GroupRequest {
    pub name: Option<String>,
    pub uid: Option<i64>,
    pub description: Option<String>,
    #[serde(alias = "type")]
    pub status: Option<String>,
}

impl GroupRequest {
    fn into_payload(self) -> AppResult<CreateGroup> {
        Ok(CreateGroup {
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

async fn list_groups(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Group>>> {
    Ok(Json(GroupRepository::list_all(&state.db).await?))
}

async fn get_group(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Json<Group>> {
    GroupRepository::find_by_id(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Group not found".to_string()))
}

async fn create_group(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(request), _): WithRejection<Json<GroupRequest>, AppError>,
) -> AppResult<(StatusCode, Json<Group>)> {
    let group = GroupRepository::create(&state.db, request.into_payload()?).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

async fn update_group(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(request), _): WithRejection<Json<GroupRequest>, AppError>,
) -> AppResult<Json<Group>> {
    Ok(Json(
        GroupRepository::update(&state.db, id, request.into_payload()?).await?,
    ))
}

async fn delete_group(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<StatusCode> {
    if !GroupRepository::delete(&state.db, id).await? {
        return Err(AppError::NotFound("Group not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn add_story_to_group(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(request), _): WithRejection<Json<AddStoriesRequest>, AppError>,
) -> AppResult<Json<serde_json::Value>> {
    let outcome = AssociationService::bulk_link(
        &state.db,
        GROUP_STORIES,
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

async fn remove_story_from_group(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(request), _): WithRejection<Json<RemoveStoryRequest>, AppError>,
) -> AppResult<StatusCode> {
    let story_id = required(request.story_id, "storyId")?;
    AssociationService::unlink(&state.db, GROUP_STORIES, LinkSide::Member, id, story_id).await?;
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::{router, testing::send};
    use crate::test_support::{self, Fixture};

    #[tokio::test]
    async fn create_accepts_type_as_status() {
        let pool = test_support::pool().await;
        let fx = Fixture::seed(&pool).await;
        let app = router(test_support::state(pool));

        let (status, body) = send(
            &app,
            Method::POST,
            "/groups",
            Some(json!({
                "name": "Choir",
                "uid": fx.owner.id,
                "description": "Sunday singers",
                "type": "inactive"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "inactive");
        assert_eq!(body["uid"], fx.owner.id);
    }

    #[tokio::test]
    async fn add_story_to_group_is_idempotent() {
        let pool = test_support::pool().await;
        let fx = Fixture::seed(&pool).await;
        let app = router(test_support::state(pool));
        let uri = format!("/groups/{}/add_story_to_group", fx.groups[1].id);

        let (status, body) =
            send(&app, Method::POST, &uri, Some(json!({ "storyIds": [fx.story.id] }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["added_stories"], json!([fx.story.id]));

        let (_, body) =
            send(&app, Method::POST, &uri, Some(json!({ "storyIds": [fx.story.id] }))).await;
        assert_eq!(body["added_stories"], json!([]));
        assert_eq!(body["existing_stories"], json!([fx.story.id]));

        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/groupstorys/stories_by_group?group_id={}", fx.groups[1].id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["story"]["name"], "The Long Winter");
    }

    #[tokio::test]
    async fn remove_story_from_group_round_trip() {
        let pool = test_support::pool().await;
        let fx = Fixture::seed(&pool).await;
        let app = router(test_support::state(pool));
        let group_id = fx.groups[0].id;

        send(
            &app,
            Method::POST,
            &format!("/groups/{}/add_story_to_group", group_id),
            Some(json!({ "storyIds": [fx.story.id] })),
        )
        .await;

        let remove = format!("/groups/{}/remove_story_from_group", group_id);
        let (status, _) =
            send(&app, Method::DELETE, &remove, Some(json!({ "storyId": fx.story.id }))).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) =
            send(&app, Method::DELETE, &remove, Some(json!({ "storyId": fx.story.id }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_group_is_not_found() {
        let app = router(test_support::state(test_support::pool().await));
        let (status, body) = send(&app, Method::GET, "/groups/404", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Group not found");
    }

    #[tokio::test]
    async fn empty_story_ids_are_rejected() {
        let pool = test_support::pool().await;
        let fx = Fixture::seed(&pool).await;
        let app = router(test_support::state(pool));
        let uri = format!("/groups/{}/add_story_to_group", fx.groups[0].id);

        let (status, body) = send(&app, Method::POST, &uri, Some(json!({ "storyIds": [] }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "No story IDs provided.");
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }
}
