use std::sync::Arc;

use axum::{routing::get, Router};

use crate::error::{AppError, AppResult};
use crate::AppState;

pub mod group_stories;
pub mod groups;
pub mod health;
pub mod individual_stories;
pub mod individuals;
pub mod stories;
pub mod users;

/// All API routes with shared state attached. Middleware is layered on in `main`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/users", users::router())
        .nest("/storys", stories::router())
        .nest("/groups", groups::router())
        .nest("/individuals", individuals::router())
        .nest("/groupstorys", group_stories::router())
        .nest("/individualstorys", individual_stories::router())
        .with_state(state)
}

/// Unwrap a required request field or fail with 400.
pub(crate) fn required<T>(value: Option<T>, field: &str) -> AppResult<T> {
    value.ok_or_else(|| AppError::BadRequest(format!("{} is required", field)))
}

#[cfg(test)]
pub(crate) mod testing {
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use axum::Router;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    /// Send one request through the router and decode the JSON body
    /// (`Value::Null` for an empty body).
    pub async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, json)
    }
}
