use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;

use crate::db::{CreateUser, User, UserRepository};
use crate::error::{AppError, AppResult};
use crate::routes::required;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
}

#[derive(Debug, Deserialize)]
pub struct UserRequest {
    pub name: Option<String>,
    pub uid: Option<String>,
    pub bio: Option<String>,
}

impl UserRequest {
    fn into_payload(self) -> AppResult<CreateUser> {
        Ok(CreateUser {
            name: required(self.name, "name")?,
            uid: required(self.uid, "uid")?,
            bio: self.bio.unwrap_or_default(),
        })
    }
}

async fn list_users(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<User>>> {
    Ok(Json(UserRepository::list_all(&state.db).await?))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Json<User>> {
    UserRepository::find_by_id(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

async fn create_user(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(request), _): WithRejection<Json<UserRequest>, AppError>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = UserRepository::create(&state.db, request.into_payload()?).await?;
    tracing::info!("Created user {}", user.id);
    Ok((StatusCode::CREATED, Json(user)))
}

async fn update_user(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(request), _): WithRejection<Json<UserRequest>, AppError>,
) -> AppResult<Json<User>> {
    let payload = request.into_payload()?;
    UserRepository::update(&state.db, id, payload)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<StatusCode> {
    if !UserRepository::delete(&state.db, id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    tracing::info!("Deleted user {}", id);
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::{router, testing::send};
    use crate::test_support::{self, Fixture};

    #[tokio::test]
    async fn create_then_fetch() {
        let app = router(test_support::state(test_support::pool().await));

        let (status, created) = send(
            &app,
            Method::POST,
            "/users",
            Some(json!({"name": "Grace", "uid": "fb-grace", "bio": "Admiral"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["uid"], "fb-grace");

        let id = created["id"].as_i64().unwrap();
        let (status, fetched) = send(&app, Method::GET, &format!("/users/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["name"], "Grace");
        assert_eq!(fetched["bio"], "Admiral");
    }

    #[tokio::test]
    async fn missing_name_is_bad_request() {
        let app = router(test_support::state(test_support::pool().await));
        let (status, body) = send(&app, Method::POST, "/users", Some(json!({"uid": "x"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "name is required");
    }

    #[tokio::test]
    async fn deleting_owner_cascades_to_stories() {
        let pool = test_support::pool().await;
        let fx = Fixture::seed(&pool).await;
        let app = router(test_support::state(pool));

        let (status, body) =
            send(&app, Method::DELETE, &format!("/users/{}", fx.owner.id), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_null());

        let (status, _) = send(&app, Method::GET, &format!("/storys/{}", fx.story.id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) =
            send(&app, Method::DELETE, &format!("/users/{}", fx.owner.id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn non_numeric_id_is_bad_request() {
        let app = router(test_support::state(test_support::pool().await));
        let (status, body) = send(&app, Method::GET, "/users/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());
    }
}
