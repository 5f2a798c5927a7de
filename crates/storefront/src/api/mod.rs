//! Client for the upstream REST API.
//!
//! # Endpoints
//!
//! ```text
//! POST /auth/login        {email, password}          -> {token, ...}
//! POST /auth/signup       {firstName, ..., isActive} -> created account
//! GET  /products/{handle}                            -> product
//! ```
//!
//! Every failure is reported as an [`ApiError`], a closed set the auth
//! service matches on to decide what the visitor gets to see. Products are
//! cached in memory via `moka` (5 minute TTL); auth calls are never cached.

mod types;

use std::sync::Arc;
use std::time::Duration;

use boutique_core::{Credentials, Product, RegistrationInput};
use moka::future::Cache;
use reqwest::StatusCode;
use secrecy::SecretString;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::ApiConfig;
use crate::session::{TokenStore, TokenStoreError};

use types::{LoginRequest, LoginResponse, NewAccount, server_message};

/// Errors that can occur when talking to the upstream API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connect, timeout, TLS...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream answered with a non-2xx status.
    #[error("upstream returned {status}: {}", .message.as_deref().unwrap_or("(no message)"))]
    Rejected {
        status: StatusCode,
        /// Message supplied by the server in the error body, if any.
        message: Option<String>,
    },

    /// A 2xx login response without a usable token.
    #[error("login response did not include a token")]
    MissingToken,

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The token could not be written to the visitor's session.
    #[error("token store error: {0}")]
    TokenStore(#[from] TokenStoreError),
}

impl ApiError {
    /// The message the server put in its error body, if it sent one.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the upstream REST API.
///
/// Cheap to clone; clones share the connection pool and product cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    products: Cache<String, Product>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("boutique-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let products = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                products,
            }),
        })
    }

    /// Build an endpoint URL by appending path segments to the base URL.
    ///
    /// Segments are percent-encoded, so handles can't escape the path.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.inner.base_url.clone();
        // Base URLs are validated as http(s) at config time, which can always carry a path.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// POST a JSON body and return the response body of a 2xx answer.
    async fn post_json<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<String, ApiError> {
        let url = self.endpoint(segments);
        let response = self.inner.client.post(url).json(body).send().await?;
        Self::read_success(response).await
    }

    /// Read the body of a response, turning non-2xx statuses into `Rejected`.
    async fn read_success(response: reqwest::Response) -> Result<String, ApiError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = server_message(&body);
            tracing::warn!(
                status = %status,
                body = %body.chars().take(200).collect::<String>(),
                "Upstream API returned non-success status"
            );
            return Err(ApiError::Rejected { status, message });
        }

        Ok(body)
    }

    // =========================================================================
    // Session Methods
    // =========================================================================

    /// Exchange credentials for a session token and hand it to `store`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` on a non-2xx answer, `ApiError::MissingToken`
    /// if the body carries no token, and transport/parse/store errors as such.
    #[instrument(skip_all)]
    pub async fn login<S: TokenStore>(
        &self,
        credentials: &Credentials,
        store: &S,
    ) -> Result<(), ApiError> {
        let request = LoginRequest::from(credentials);
        let body = self.post_json(&["auth", "login"], &request).await?;

        let response: LoginResponse = serde_json::from_str(&body)?;
        let token = response
            .token
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::MissingToken)?;

        store.set(SecretString::from(token)).await?;
        debug!("Session token stored");
        Ok(())
    }

    /// Create an account. Returns the upstream's account representation as-is.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` on a non-2xx answer.
    #[instrument(skip_all)]
    pub async fn register(
        &self,
        input: &RegistrationInput,
    ) -> Result<serde_json::Value, ApiError> {
        let body = self
            .post_json(&["auth", "signup"], &NewAccount::new(input))
            .await?;

        if body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get a product by its handle.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown handles, otherwise the
    /// underlying request error.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_product(&self, handle: &str) -> Result<Product, ApiError> {
        if let Some(product) = self.inner.products.get(handle).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let url = self.endpoint(&["products", handle]);
        let response = self.inner.client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(format!("Product not found: {handle}")));
        }

        let body = Self::read_success(response).await?;
        let product: Product = serde_json::from_str(&body)?;

        self.inner
            .products
            .insert(handle.to_string(), product.clone())
            .await;

        Ok(product)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::{
        Json, Router,
        extract::State,
        http::StatusCode as AxumStatus,
        routing::{get, post},
    };
    use secrecy::ExposeSecret;
    use serde_json::{Value, json};

    use super::*;
    use crate::session::MemoryTokenStore;
    use crate::test_support::spawn_upstream;

    async fn client_for(router: Router) -> ApiClient {
        let base_url = spawn_upstream(router).await;
        ApiClient::new(&ApiConfig::new(base_url)).unwrap()
    }

    #[tokio::test]
    async fn test_login_stores_token() {
        let router = Router::new().route(
            "/auth/login",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body, json!({"email": "a@b.com", "password": "secret1"}));
                Json(json!({"token": "T", "user": {"id": 1}}))
            }),
        );
        let client = client_for(router).await;
        let store = MemoryTokenStore::default();

        client
            .login(&Credentials::new("a@b.com", "secret1"), &store)
            .await
            .unwrap();

        let token = store.get().await.unwrap().unwrap();
        assert_eq!(token.expose_secret(), "T");
    }

    #[tokio::test]
    async fn test_login_rejected_keeps_server_message() {
        let router = Router::new().route(
            "/auth/login",
            post(|| async {
                (
                    AxumStatus::UNAUTHORIZED,
                    Json(json!({"message": "Invalid credentials", "statusCode": 401})),
                )
            }),
        );
        let client = client_for(router).await;
        let store = MemoryTokenStore::default();

        let err = client
            .login(&Credentials::new("a@b.com", "wrong-pass"), &store)
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Rejected { status, .. } if status == StatusCode::UNAUTHORIZED));
        assert_eq!(err.server_message(), Some("Invalid credentials"));
        assert!(store.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_without_token_fails() {
        let router = Router::new().route(
            "/auth/login",
            post(|| async { Json(json!({"user": {"id": 1}})) }),
        );
        let client = client_for(router).await;
        let store = MemoryTokenStore::default();

        let err = client
            .login(&Credentials::new("a@b.com", "secret1"), &store)
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::MissingToken));
        assert!(store.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_register_sends_flags_and_returns_account_verbatim() {
        let router = Router::new().route(
            "/auth/signup",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["emailVerified"], false);
                assert_eq!(body["isStaff"], false);
                assert_eq!(body["isActive"], true);
                (
                    AxumStatus::CREATED,
                    Json(json!({"id": 42, "email": body["email"], "extra": [1, 2]})),
                )
            }),
        );
        let client = client_for(router).await;
        let input = RegistrationInput {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "5550100".to_string(),
            password: "engine1".into(),
        };

        let account = client.register(&input).await.unwrap();

        assert_eq!(
            account,
            json!({"id": 42, "email": "ada@example.com", "extra": [1, 2]})
        );
    }

    #[tokio::test]
    async fn test_endpoint_keeps_base_path() {
        let client = ApiClient::new(&ApiConfig::new(
            Url::parse("https://api.example.com/v1/").unwrap(),
        ))
        .unwrap();

        assert_eq!(
            client.endpoint(&["auth", "login"]).as_str(),
            "https://api.example.com/v1/auth/login"
        );
        assert_eq!(
            client.endpoint(&["products", "a/b c"]).as_str(),
            "https://api.example.com/v1/products/a%2Fb%20c"
        );
    }

    #[tokio::test]
    async fn test_get_product_is_cached() {
        let hits = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route(
                "/products/{handle}",
                get(|State(hits): State<Arc<AtomicUsize>>| async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Json(json!({
                        "title": "Linen Kurta",
                        "code": "LK-01",
                        "isAvailable": true,
                        "variants": [{"size": "M", "price": 49.99, "quantity": 5, "isAvailable": true}]
                    }))
                }),
            )
            .with_state(Arc::clone(&hits));
        let client = client_for(router).await;

        let first = client.get_product("linen-kurta").await.unwrap();
        let second = client.get_product("linen-kurta").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.code, "LK-01");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_product_not_found() {
        let client = client_for(Router::new()).await;
        let err = client.get_product("missing").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
