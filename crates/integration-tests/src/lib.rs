//! Integration tests for the Boutique storefront.
//!
//! Each test starts its own mocked upstream API and a real storefront
//! router (in-memory sessions, no rate limiting) on ephemeral local ports,
//! then drives the storefront over HTTP with a cookie-keeping client.
//! [`TestContext::start_with_store`] swaps in another session store, such
//! as [`SlowTokenSaveStore`].
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p boutique-integration-tests
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use boutique_core::CurrencyCode;
use boutique_storefront::config::{ApiConfig, StorefrontConfig};
use boutique_storefront::middleware::create_session_layer;
use boutique_storefront::session::keys;
use boutique_storefront::state::AppState;
use serde_json::{Value, json};
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store;
use tower_sessions::{MemoryStore, SessionStore};
use url::Url;

// =============================================================================
// Mock upstream API
// =============================================================================

#[derive(Default)]
struct MockState {
    accounts: Mutex<HashMap<String, String>>,
    calls: Mutex<Vec<String>>,
    login_delay: Mutex<Duration>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process stand-in for the upstream REST API.
#[derive(Clone)]
pub struct MockUpstream {
    url: Url,
    state: Arc<MockState>,
}

impl MockUpstream {
    async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let router = Router::new()
            .route("/auth/login", post(mock_login))
            .route("/auth/signup", post(mock_signup))
            .route("/products/{handle}", get(mock_product))
            .with_state(Arc::clone(&state));

        let addr = serve(router).await;
        let url = Url::parse(&format!("http://{addr}")).expect("valid mock URL");
        Self { url, state }
    }

    /// Register an account the login endpoint will accept.
    pub fn add_account(&self, email: &str, password: &str) {
        lock(&self.state.accounts).insert(email.to_string(), password.to_string());
    }

    /// Make the login endpoint answer after `delay`.
    pub fn set_login_delay(&self, delay: Duration) {
        *lock(&self.state.login_delay) = delay;
    }

    /// Endpoints hit so far, in order (`"login"`, `"signup"`, `"product"`).
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        lock(&self.state.calls).clone()
    }
}

async fn mock_login(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    lock(&state.calls).push("login".to_string());
    let delay = *lock(&state.login_delay);
    tokio::time::sleep(delay).await;

    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let known = lock(&state.accounts).get(email).is_some_and(|p| p == password);

    if known {
        Json(json!({"token": format!("token-for-{email}"), "user": {"email": email}}))
            .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid credentials", "statusCode": 401})),
        )
            .into_response()
    }
}

async fn mock_signup(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    lock(&state.calls).push("signup".to_string());

    let flags_ok = body["emailVerified"] == false && body["isStaff"] == false && body["isActive"] == true;
    if !flags_ok {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": ["account flags are invalid"]})),
        )
            .into_response();
    }

    let email = body["email"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default().to_string();
    let mut accounts = lock(&state.accounts);
    if accounts.contains_key(&email) {
        return (
            StatusCode::CONFLICT,
            Json(json!({"message": "User already exists"})),
        )
            .into_response();
    }
    accounts.insert(email.clone(), password);

    (
        StatusCode::CREATED,
        Json(json!({"id": accounts.len(), "email": email, "firstName": body["firstName"]})),
    )
        .into_response()
}

async fn mock_product(State(state): State<Arc<MockState>>, Path(handle): Path<String>) -> Response {
    lock(&state.calls).push("product".to_string());

    let product = match handle.as_str() {
        "linen-kurta" => json!({
            "title": "Linen Kurta",
            "description": "<p>Hand-stitched <em>linen</em>.</p>",
            "code": "LK-01",
            "isAvailable": true,
            "variants": [
                {"size": "S", "price": 49.5, "quantity": 0, "isAvailable": true},
                {"size": "M", "price": 49.5, "quantity": 5, "isAvailable": true},
                {"size": "Custom", "price": 79, "quantity": 2, "isAvailable": true}
            ]
        }),
        "archive-shawl" => json!({
            "title": "Archive Shawl",
            "description": "",
            "code": "AS-09",
            "isAvailable": false,
            "variants": [
                {"size": "One Size", "price": 120, "quantity": 3, "isAvailable": true}
            ]
        }),
        _ => {
            return (StatusCode::NOT_FOUND, Json(json!({"message": "Product not found"})))
                .into_response();
        }
    };
    Json(product).into_response()
}

// =============================================================================
// Session stores
// =============================================================================

/// In-memory session store whose writes of signed-in records are slow,
/// like a loaded database.
#[derive(Debug, Clone)]
pub struct SlowTokenSaveStore {
    inner: MemoryStore,
    delay: Duration,
}

impl SlowTokenSaveStore {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MemoryStore::default(),
            delay,
        }
    }
}

#[async_trait::async_trait]
impl SessionStore for SlowTokenSaveStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        self.inner.create(record).await
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        if record.data.contains_key(keys::ACCESS_TOKEN) {
            tokio::time::sleep(self.delay).await;
        }
        self.inner.save(record).await
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        self.inner.load(session_id).await
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.inner.delete(session_id).await
    }
}

// =============================================================================
// Storefront under test
// =============================================================================

/// A running storefront wired to a [`MockUpstream`].
pub struct TestContext {
    pub upstream: MockUpstream,
    pub base_url: Url,
    pub client: reqwest::Client,
}

impl TestContext {
    /// Start the mock upstream and a storefront in front of it, with
    /// in-memory sessions.
    ///
    /// # Panics
    ///
    /// Panics if either server cannot be started.
    pub async fn start() -> Self {
        Self::start_with_store(MemoryStore::default()).await
    }

    /// Like [`Self::start`], keeping sessions in `store`.
    ///
    /// # Panics
    ///
    /// Panics if either server cannot be started.
    pub async fn start_with_store<S>(store: S) -> Self
    where
        S: SessionStore + Clone,
    {
        let upstream = MockUpstream::start().await;

        let config = StorefrontConfig {
            database_url: None,
            host: "127.0.0.1".parse().expect("valid IP"),
            port: 0,
            base_url: "http://localhost".to_string(),
            api: ApiConfig::new(upstream.url.clone()),
            currency: CurrencyCode::USD,
            auth_rate_limit: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };
        let session_layer = create_session_layer(store, &config);
        let state = AppState::new(config).expect("Failed to initialize application state");

        let addr = serve(boutique_storefront::app(state, session_layer)).await;
        let base_url = Url::parse(&format!("http://{addr}")).expect("valid storefront URL");

        Self {
            upstream,
            base_url,
            client: browser(),
        }
    }

    /// A second, independent visitor.
    #[must_use]
    pub fn other_browser(&self) -> reqwest::Client {
        browser()
    }

    /// Absolute URL of `path` on the storefront.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid relative URL.
    #[must_use]
    pub fn url(&self, path: &str) -> Url {
        self.base_url.join(path).expect("valid path")
    }

    /// GET `path` with the default client.
    ///
    /// # Panics
    ///
    /// Panics if the request fails.
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// POST a url-encoded form to `path` with the default client.
    ///
    /// # Panics
    ///
    /// Panics if the request fails.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST request failed")
    }

    /// Whether the navbar on the home page offers logout.
    ///
    /// # Panics
    ///
    /// Panics if the page cannot be fetched.
    pub async fn navbar_signed_in(&self) -> bool {
        let html = self.get("/").await.text().await.expect("home page body");
        html.contains(r#"data-testid="logout""#)
    }
}

fn browser() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("test server failed");
    });
    addr
}
