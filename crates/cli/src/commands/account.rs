//! Account commands run against the upstream API.
//!
//! Both commands go through the same auth service the storefront uses, with
//! an in-memory token store. The token itself is never printed.

use boutique_core::{Credentials, SignupForm, ValidationError};
use boutique_storefront::api::{ApiClient, ApiError};
use boutique_storefront::config::ApiConfig;
use boutique_storefront::services::auth::{AuthError, AuthService, SignupError};
use boutique_storefront::session::{MemoryTokenStore, TokenStore, TokenStoreError};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Invalid input: {0}")]
    Invalid(#[from] ValidationError),

    #[error("{0}")]
    Auth(#[from] AuthError),

    #[error("Account created, but signing in failed: {0}")]
    SignIn(AuthError),

    #[error("Could not create API client: {0}")]
    Client(#[from] ApiError),

    #[error("Token store error: {0}")]
    TokenStore(#[from] TokenStoreError),

    #[error("Sign-in reported success but no token was stored")]
    NoToken,
}

/// Sign in and report whether a session token was issued.
///
/// # Errors
///
/// Returns `AccountError` if validation or the sign-in fails.
pub async fn login(api_url: &Url, email: String, password: String) -> Result<(), AccountError> {
    let api = ApiClient::new(&ApiConfig::new(api_url.clone()))?;
    let store = MemoryTokenStore::default();

    AuthService::new(&api)
        .authenticate(Credentials::new(email, password), &store)
        .await?;

    ensure_token(&store).await?;
    tracing::info!("Sign-in succeeded, session token issued");
    Ok(())
}

/// Validate the signup form, create the account and sign in with it.
///
/// # Errors
///
/// Returns `AccountError` if validation, registration or the sign-in fails.
pub async fn signup(api_url: &Url, form: SignupForm) -> Result<(), AccountError> {
    let input = form.validate()?;
    let api = ApiClient::new(&ApiConfig::new(api_url.clone()))?;
    let store = MemoryTokenStore::default();

    let account = AuthService::new(&api)
        .register_and_sign_in(input, &store)
        .await
        .map_err(|err| match err {
            SignupError::Registration(e) => AccountError::Auth(e),
            SignupError::SignIn(e) => AccountError::SignIn(e),
        })?;

    ensure_token(&store).await?;
    tracing::info!(%account, "Account created and signed in");
    Ok(())
}

async fn ensure_token(store: &MemoryTokenStore) -> Result<(), AccountError> {
    store.get().await?.map(drop).ok_or(AccountError::NoToken)
}
