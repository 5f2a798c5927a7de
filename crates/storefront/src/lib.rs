//! Boutique Storefront library.
//!
//! Server-rendered storefront in front of the upstream REST API. This crate
//! provides the storefront as a library so the binary, the CLI and the
//! integration tests share one router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
mod filters;
pub mod forms;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;

#[cfg(test)]
mod test_support;

use axum::body::Body;
use axum::http::Request;
use axum::{Router, routing::get};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};

use state::AppState;

/// Header carrying the request id across proxies.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the storefront application.
///
/// The caller picks the session store; everything else comes from `state`.
pub fn app<S>(state: AppState, session_layer: SessionManagerLayer<S>) -> Router
where
    S: SessionStore + Clone,
{
    Router::new()
        .route("/health", get(health))
        .merge(routes::routes(state.config()))
        .nest_service("/static", ServeDir::new("crates/storefront/static"))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Span for one request, tagged with the proxy's request id or a fresh one.
fn request_span(request: &Request<Body>) -> tracing::Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), ToString::to_string);

    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the upstream.
async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use tower::ServiceExt;
    use tower_sessions::MemoryStore;
    use url::Url;

    use super::*;
    use crate::middleware::create_session_layer;

    fn test_app() -> Router {
        let config = test_support::config(Url::parse("http://127.0.0.1:9").unwrap());
        let session_layer = create_session_layer(MemoryStore::default(), &config);
        app(AppState::new(config).unwrap(), session_layer)
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "ok");
    }

    #[tokio::test]
    async fn test_anonymous_navbar_offers_login() {
        let response = test_app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains(r#"data-testid="login""#));
        assert!(!html.contains(r#"data-testid="logout""#));
    }

    #[tokio::test]
    async fn test_invalid_login_renders_field_errors() {
        let response = test_app()
            .oneshot(
                Request::post("/auth/login")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from("email=nope&password=123"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = body_text(response).await;
        assert!(html.contains("Invalid email address"));
        assert!(html.contains("Password must be at least 6 characters"));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_shows_generic_error() {
        let response = test_app()
            .oneshot(
                Request::post("/auth/login")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from("email=a%40b.com&password=secret1"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains("Something went wrong."));
    }
}
