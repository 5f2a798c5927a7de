//! Helpers shared by unit tests.

#![allow(clippy::unwrap_used)]

use axum::Router;
use url::Url;

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn_upstream(router: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    Url::parse(&format!("http://{addr}")).unwrap()
}

/// Storefront configuration pointing at `api_url`, rate limiting off.
pub fn config(api_url: Url) -> crate::config::StorefrontConfig {
    crate::config::StorefrontConfig {
        database_url: None,
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        api: crate::config::ApiConfig::new(api_url),
        currency: boutique_core::CurrencyCode::default(),
        auth_rate_limit: false,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}
