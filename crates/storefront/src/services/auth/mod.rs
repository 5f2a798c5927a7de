//! Authentication service.
//!
//! Sequences validation and the upstream calls for sign-in and sign-up, and
//! turns every failure into an [`AuthError`] the forms can show as-is.

mod error;
mod phase;

pub use error::{AuthError, GENERIC_FAILURE, SignupError};
pub use phase::{PhaseError, PhaseEvent, Submission, SubmissionPhase};

use boutique_core::{Credentials, RegistrationInput};
use tracing::instrument;

use crate::api::ApiClient;
use crate::session::TokenStore;

impl From<PhaseError> for AuthError {
    fn from(err: PhaseError) -> Self {
        tracing::error!(error = %err, "Submission lifecycle violated");
        Self::Failed(GENERIC_FAILURE.to_string())
    }
}

/// Authentication service.
///
/// Borrowed per request; holds no state of its own.
pub struct AuthService<'a> {
    api: &'a ApiClient,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Validate `credentials`, then sign in and store the session token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Invalid` without any network call when the
    /// credentials fail validation, `AuthError::Failed` when the sign-in fails.
    #[instrument(skip_all)]
    pub async fn authenticate<S: TokenStore>(
        &self,
        credentials: Credentials,
        store: &S,
    ) -> Result<(), AuthError> {
        let mut submission = Submission::new();

        submission.advance(PhaseEvent::Validate)?;
        let credentials = settle(&mut submission, credentials.validate())?;

        submission.advance(PhaseEvent::Submit)?;
        let result = self.api.login(&credentials, store).await;
        settle(&mut submission, result)?;

        submission.advance(PhaseEvent::Succeed)?;
        tracing::info!("Visitor signed in");
        Ok(())
    }

    /// Create an account, then sign in with the same email and password.
    ///
    /// Returns the account as created by the upstream. There is no rollback:
    /// if signing in fails the account still exists.
    ///
    /// # Errors
    ///
    /// Returns `SignupError::Registration` if the account could not be
    /// created, `SignupError::SignIn` carrying the sign-in failure otherwise.
    #[instrument(skip_all)]
    pub async fn register_and_sign_in<S: TokenStore>(
        &self,
        input: RegistrationInput,
        store: &S,
    ) -> Result<serde_json::Value, SignupError> {
        let account = self.register(&input).await.map_err(SignupError::Registration)?;
        tracing::info!("Account registered");

        self.authenticate(input.credentials(), store)
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "Registered but sign-in failed");
                SignupError::SignIn(err)
            })?;

        Ok(account)
    }

    async fn register(&self, input: &RegistrationInput) -> Result<serde_json::Value, AuthError> {
        let mut submission = Submission::new();
        // RegistrationInput is only built by a successful form validation.
        submission.advance(PhaseEvent::Validate)?;
        submission.advance(PhaseEvent::Submit)?;

        let account = settle(&mut submission, self.api.register(input).await)?;
        submission.advance(PhaseEvent::Succeed)?;
        Ok(account)
    }
}

/// Move `submission` to `Failed` when `result` is an error.
fn settle<T, E: Into<AuthError>>(
    submission: &mut Submission,
    result: Result<T, E>,
) -> Result<T, AuthError> {
    match result {
        Ok(value) => Ok(value),
        Err(err) => {
            submission.advance(PhaseEvent::Fail)?;
            Err(err.into())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Json, Router,
        extract::State,
        http::StatusCode,
        response::IntoResponse,
        routing::post,
    };
    use boutique_core::Field;
    use secrecy::ExposeSecret;
    use serde_json::{Value, json};
    use url::Url;

    use super::*;
    use crate::config::ApiConfig;
    use crate::session::MemoryTokenStore;
    use crate::test_support::spawn_upstream;

    type Calls = Arc<Mutex<Vec<&'static str>>>;

    /// Mock upstream: login answers with `login`, signup with 201.
    async fn upstream(login: (StatusCode, Value)) -> (ApiClient, Calls) {
        let calls = Calls::default();
        let router = Router::new()
            .route(
                "/auth/login",
                post(move |State(calls): State<Calls>| async move {
                    calls.lock().unwrap().push("login");
                    (login.0, Json(login.1)).into_response()
                }),
            )
            .route(
                "/auth/signup",
                post(|State(calls): State<Calls>, Json(body): Json<Value>| async move {
                    calls.lock().unwrap().push("signup");
                    if body["email"] == "taken@example.com" {
                        return (
                            StatusCode::CONFLICT,
                            Json(json!({"message": "User already exists"})),
                        )
                            .into_response();
                    }
                    (StatusCode::CREATED, Json(json!({"id": 7, "email": body["email"]})))
                        .into_response()
                }),
            )
            .with_state(Arc::clone(&calls));

        let base_url = spawn_upstream(router).await;
        (ApiClient::new(&ApiConfig::new(base_url)).unwrap(), calls)
    }

    fn input(email: &str) -> RegistrationInput {
        RegistrationInput {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: email.to_string(),
            phone: "5550100".to_string(),
            password: "secret1".into(),
        }
    }

    #[tokio::test]
    async fn test_authenticate_stores_token() {
        let (api, calls) = upstream((StatusCode::OK, json!({"token": "T"}))).await;
        let store = MemoryTokenStore::default();

        AuthService::new(&api)
            .authenticate(Credentials::new("a@b.com", "secret1"), &store)
            .await
            .unwrap();

        assert_eq!(store.get().await.unwrap().unwrap().expose_secret(), "T");
        assert_eq!(*calls.lock().unwrap(), ["login"]);
    }

    #[tokio::test]
    async fn test_invalid_credentials_never_reach_the_network() {
        let (api, calls) = upstream((StatusCode::OK, json!({"token": "T"}))).await;
        let store = MemoryTokenStore::default();

        let err = AuthService::new(&api)
            .authenticate(Credentials::new("not-an-email", "123"), &store)
            .await
            .unwrap_err();

        let AuthError::Invalid(errors) = &err else {
            panic!("expected validation error, got {err:?}");
        };
        assert!(errors.has(Field::Email));
        assert!(errors.message_for(Field::Password).unwrap().contains('6'));
        assert!(calls.lock().unwrap().is_empty());
        assert!(store.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_server_message_is_surfaced() {
        let (api, _) = upstream((
            StatusCode::UNAUTHORIZED,
            json!({"message": "Invalid credentials"}),
        ))
        .await;

        let err = AuthService::new(&api)
            .authenticate(
                Credentials::new("a@b.com", "secret1"),
                &MemoryTokenStore::default(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.message(), "Invalid credentials");
    }

    #[tokio::test]
    async fn test_server_error_without_message_is_generic() {
        let (api, _) = upstream((StatusCode::INTERNAL_SERVER_ERROR, json!({}))).await;

        let err = AuthService::new(&api)
            .authenticate(
                Credentials::new("a@b.com", "secret1"),
                &MemoryTokenStore::default(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.message(), GENERIC_FAILURE);
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_generic() {
        // Nothing listens on the discard port.
        let api = ApiClient::new(&ApiConfig::new(Url::parse("http://127.0.0.1:9").unwrap())).unwrap();

        let err = AuthService::new(&api)
            .authenticate(
                Credentials::new("a@b.com", "secret1"),
                &MemoryTokenStore::default(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.message(), "Something went wrong.");
    }

    #[tokio::test]
    async fn test_register_then_sign_in_in_order() {
        let (api, calls) = upstream((StatusCode::OK, json!({"token": "T"}))).await;
        let store = MemoryTokenStore::default();

        let account = AuthService::new(&api)
            .register_and_sign_in(input("ada@example.com"), &store)
            .await
            .unwrap();

        assert_eq!(account["id"], 7);
        assert_eq!(*calls.lock().unwrap(), ["signup", "login"]);
        assert!(store.get().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sign_in_failure_after_registration_is_returned() {
        let (api, calls) = upstream((
            StatusCode::UNAUTHORIZED,
            json!({"message": "Account not active"}),
        ))
        .await;

        let err = AuthService::new(&api)
            .register_and_sign_in(input("ada@example.com"), &MemoryTokenStore::default())
            .await
            .unwrap_err();

        assert!(matches!(err, SignupError::SignIn(_)));
        assert_eq!(err.auth_error().message(), "Account not active");
        assert_eq!(*calls.lock().unwrap(), ["signup", "login"]);
    }

    #[tokio::test]
    async fn test_registration_failure_skips_sign_in() {
        let (api, calls) = upstream((StatusCode::OK, json!({"token": "T"}))).await;

        let err = AuthService::new(&api)
            .register_and_sign_in(input("taken@example.com"), &MemoryTokenStore::default())
            .await
            .unwrap_err();

        assert!(matches!(err, SignupError::Registration(_)));
        assert_eq!(err.to_string(), "User already exists");
        assert_eq!(*calls.lock().unwrap(), ["signup"]);
    }

    #[test]
    fn test_phase_error_is_generic_failure() {
        let mut submission = Submission::new();
        let err: AuthError = submission.advance(PhaseEvent::Succeed).unwrap_err().into();
        assert_eq!(err.message(), GENERIC_FAILURE);
        assert!(matches!(
            settle::<(), AuthError>(&mut Submission::new(), Err(AuthError::Failed("x".into())))
                .unwrap_err(),
            AuthError::Failed(m) if m == GENERIC_FAILURE
        ));
    }
}
