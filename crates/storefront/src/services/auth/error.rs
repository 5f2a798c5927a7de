//! Authentication error types.

use boutique_core::ValidationError;
use thiserror::Error;

use crate::api::ApiError;

/// Shown whenever the upstream gives no usable explanation.
pub const GENERIC_FAILURE: &str = "Something went wrong.";

/// Errors that can occur while signing a visitor in.
///
/// Every failure collapses into one of two user-facing shapes: field errors
/// from local validation, or a single sentence about the submission.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The input failed local validation; nothing was sent.
    #[error("{0}")]
    Invalid(ValidationError),

    /// The submission failed; the message is safe to show.
    #[error("{0}")]
    Failed(String),
}

impl AuthError {
    /// User-facing message.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl From<ValidationError> for AuthError {
    fn from(err: ValidationError) -> Self {
        Self::Invalid(err)
    }
}

impl From<ApiError> for AuthError {
    fn from(err: ApiError) -> Self {
        match err.server_message() {
            Some(message) => Self::Failed(message.to_string()),
            None => {
                tracing::warn!(error = %err, "Auth request failed without a server message");
                Self::Failed(GENERIC_FAILURE.to_string())
            }
        }
    }
}

/// Errors from the register-then-sign-in sequence.
#[derive(Debug, Error)]
pub enum SignupError {
    /// The account was not created.
    #[error("{0}")]
    Registration(AuthError),

    /// The account exists, but signing in with it failed.
    #[error("{0}")]
    SignIn(AuthError),
}

impl SignupError {
    /// The underlying auth error, whichever step failed.
    #[must_use]
    pub const fn auth_error(&self) -> &AuthError {
        match self {
            Self::Registration(err) | Self::SignIn(err) => err,
        }
    }
}
