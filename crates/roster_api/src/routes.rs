use crate::error::{json_error, ApiError};
use crate::handlers::{health, members};
use crate::middleware::log_requests;
use crate::state::AppState;
use axum::{
    error_handling::HandleErrorLayer,
    http::StatusCode,
    middleware::from_fn,
    response::{IntoResponse, Response},
    routing::get,
    BoxError, Router,
};
use std::time::Duration;
use tower::timeout::{error::Elapsed, TimeoutLayer};
use tower::ServiceBuilder;

pub fn create_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.settings().server.request_timeout_secs);

    let routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/members", get(members::list_members))
        .route("/members/:id", get(members::find_member))
        .route("/members2/:id", get(members::find_member_by_id_lookup));

    with_middleware(routes, timeout).with_state(state)
}

/// Request logging plus a timeout whose failures render as JSON errors.
fn with_middleware<S>(router: Router<S>, timeout: Duration) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(
        ServiceBuilder::new()
            .layer(from_fn(log_requests))
            .layer(HandleErrorLayer::new(handle_middleware_error))
            .layer(TimeoutLayer::new(timeout)),
    )
}

async fn handle_middleware_error(err: BoxError) -> Response {
    if err.is::<Elapsed>() {
        return json_error(StatusCode::REQUEST_TIMEOUT, "timeout", "request timed out");
    }
    ApiError::Internal(err.to_string()).into_response()
}

#[cfg(test)]
mod tests {
    use super::with_middleware;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::{routing::get, Router};
    use serde_json::Value;
    use std::time::Duration;
    use tower::ServiceExt;

    #[tokio::test]
    async fn slow_request_times_out_with_json_body() {
        let app = with_middleware(
            Router::<()>::new().route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "late"
                }),
            ),
            Duration::from_millis(20),
        );

        let response = app
            .oneshot(Request::builder().uri("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("application/json"));
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "timeout");
    }

    #[tokio::test]
    async fn fast_request_passes_through() {
        let app = with_middleware(
            Router::<()>::new().route("/fast", get(|| async { "done" })),
            Duration::from_secs(5),
        );

        let response = app
            .oneshot(Request::builder().uri("/fast").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
