use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use governor::middleware::NoOpMiddleware;
use http::{HeaderValue, StatusCode};
use tower_governor::governor::{GovernorConfig, GovernorConfigBuilder};
use tower_governor::key_extractor::SmartIpKeyExtractor;
use tower_governor::GovernorError;

use crate::config::RateLimitConfig;

pub type IpGovernorConfig = GovernorConfig<SmartIpKeyExtractor, NoOpMiddleware>;

/// Time to replenish one request slot when `per_second` requests are allowed
/// each second. Zero is treated as one.
pub fn replenish_interval(per_second: u32) -> Duration {
    Duration::from_nanos(1_000_000_000 / u64::from(per_second.max(1)))
}

/// Per-IP limiter keyed on forwarding headers, falling back to the peer address.
pub fn governor_config(rate: &RateLimitConfig) -> anyhow::Result<Arc<IpGovernorConfig>> {
    let mut builder = GovernorConfigBuilder::default().key_extractor(SmartIpKeyExtractor);
    builder
        .period(replenish_interval(rate.per_second))
        .burst_size(rate.burst)
        .error_handler(rejection_response);

    builder
        .finish()
        .map(Arc::new)
        .ok_or_else(|| anyhow::anyhow!("Failed to build rate limiter config"))
}

// Rejections use the same `{message, code}` shape as AppError.
fn rejection_response(error: GovernorError) -> http::Response<Body> {
    match error {
        GovernorError::TooManyRequests { wait_time, headers } => {
            let body = serde_json::json!({
                "message": "Rate limit exceeded",
                "code": "RATE_LIMITED",
                "retry_after_seconds": wait_time,
            });

            let mut resp = json_response(StatusCode::TOO_MANY_REQUESTS, body);
            if let Some(hmap) = headers {
                for (name, value) in hmap.iter() {
                    resp.headers_mut().append(name.clone(), value.clone());
                }
            }
            if let Ok(retry_after) = HeaderValue::from_str(&wait_time.to_string()) {
                resp.headers_mut()
                    .insert(http::header::RETRY_AFTER, retry_after);
            }
            resp
        }
        GovernorError::UnableToExtractKey => json_response(
            StatusCode::BAD_REQUEST,
            serde_json::json!({
                "message": "Unable to determine client IP for rate limiting",
                "code": "BAD_REQUEST",
            }),
        ),
        GovernorError::Other { code, msg, headers } => {
            let status = StatusCode::from_u16(code.as_u16())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let mut resp = json_response(
                status,
                serde_json::json!({
                    "message": msg.unwrap_or_else(|| "Rate limiting error".to_string()),
                    "code": "INTERNAL_ERROR",
                }),
            );
            if let Some(hmap) = headers {
                for (name, value) in hmap.iter() {
                    resp.headers_mut().append(name.clone(), value.clone());
                }
            }
            resp
        }
    }
}

fn json_response(status: StatusCode, body: serde_json::Value) -> http::Response<Body> {
    let mut resp = http::Response::new(Body::from(body.to_string()));
    *resp.status_mut() = status;
    resp.headers_mut().insert(
        http::header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    resp
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::Request, routing::get, Router};
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use tower_governor::GovernorLayer;

    async fn hit(app: &Router) -> (StatusCode, Vec<u8>) {
        let req = Request::builder()
            .uri("/")
            .header("x-forwarded-for", "203.0.113.7")
            .body(Body::empty())
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    #[test]
    fn interval_is_a_fraction_of_a_second() {
        assert_eq!(replenish_interval(20), Duration::from_millis(50));
        assert_eq!(replenish_interval(1), Duration::from_secs(1));
        assert_eq!(replenish_interval(0), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn limit_replenishes_at_requests_per_second() {
        let config = governor_config(&RateLimitConfig {
            per_second: 2,
            burst: 1,
        })
        .unwrap();
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(GovernorLayer { config });

        let (status, _) = hit(&app).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = hit(&app).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["code"], "RATE_LIMITED");

        // Two per second means a fresh slot within ~500ms, not after two seconds.
        tokio::time::sleep(Duration::from_millis(700)).await;
        let (status, _) = hit(&app).await;
        assert_eq!(status, StatusCode::OK);
    }
}
