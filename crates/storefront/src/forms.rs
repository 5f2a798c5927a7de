//! Login and signup form containers.
//!
//! A container binds one visitor session to the validators and the auth
//! service, and reduces every submission to what the page should show next.

use axum::http::StatusCode;
use boutique_core::{Credentials, SignupForm, ValidationError};
use tower_sessions::Session;
use tower_sessions::session::Id;

use crate::error::{AppError, add_breadcrumb};
use crate::services::auth::{AuthError, AuthService, SignupError};
use crate::session::{
    FormKind, SessionEvent, SessionTokenStore, SubmissionTicket, TokenStore, keys,
};
use crate::state::AppState;

/// What a form page shows. Exactly one at a time.
#[derive(Debug, Default)]
pub enum FormView {
    #[default]
    Idle,
    /// An earlier submission of this form is still running.
    Pending,
    FieldErrors(ValidationError),
    SubmissionError(String),
}

impl FormView {
    /// Inline error for the input named `field`.
    #[must_use]
    pub fn error_for(&self, field: &str) -> Option<&str> {
        match self {
            Self::FieldErrors(errors) => errors
                .errors()
                .iter()
                .find(|e| e.field.name() == field)
                .map(|e| e.message.as_str()),
            _ => None,
        }
    }

    /// Message shown above the form.
    #[must_use]
    pub fn banner(&self) -> Option<&str> {
        match self {
            Self::Pending => Some("Your previous submission is still being processed."),
            Self::SubmissionError(message) => Some(message),
            Self::Idle | Self::FieldErrors(_) => None,
        }
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Status code the page is served with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Idle => StatusCode::OK,
            Self::Pending => StatusCode::CONFLICT,
            Self::FieldErrors(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::SubmissionError(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<AuthError> for FormView {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Invalid(errors) => Self::FieldErrors(errors),
            AuthError::Failed(message) => Self::SubmissionError(message),
        }
    }
}

/// Result of a submission.
#[derive(Debug)]
pub enum SubmitOutcome {
    SignedIn,
    /// The account exists but signing in with it failed.
    Registered,
    Render(FormView),
}

/// A form bound to the visitor's session.
pub struct FormContainer<'a> {
    state: &'a AppState,
    session: Session,
    id: Id,
}

impl<'a> FormContainer<'a> {
    /// Bind to `session`, starting and persisting it first if the visitor
    /// has none, so submissions can be keyed by its id.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` if the session cannot be saved.
    pub async fn bind(state: &'a AppState, session: Session) -> Result<Self, AppError> {
        if session.id().is_none() {
            session
                .insert(keys::STARTED_AT, chrono::Utc::now().timestamp())
                .await?;
            session.save().await?;
        }
        let id = session
            .id()
            .ok_or_else(|| AppError::Internal("session has no id after save".to_string()))?;

        Ok(Self { state, session, id })
    }

    /// Run a login submission.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` if the session store fails while the
    /// outcome is being recorded.
    pub async fn login(&self, credentials: Credentials) -> Result<SubmitOutcome, AppError> {
        let credentials = match credentials.validate() {
            Ok(credentials) => credentials,
            Err(errors) => return Ok(SubmitOutcome::Render(FormView::FieldErrors(errors))),
        };
        let Some(ticket) = self.begin(FormKind::Login) else {
            return Ok(SubmitOutcome::Render(FormView::Pending));
        };

        let result = AuthService::new(self.state.api())
            .authenticate(credentials, &self.token_store(&ticket))
            .await;

        match result {
            _ if !ticket.is_current() => self.discard().await,
            Ok(()) => self.signed_in().await,
            Err(err) => {
                tracing::warn!(error = %err, "Login failed");
                Ok(SubmitOutcome::Render(err.into()))
            }
        }
    }

    /// Run a signup submission: register, then sign in.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` if the session store fails while the
    /// outcome is being recorded.
    pub async fn signup(&self, form: SignupForm) -> Result<SubmitOutcome, AppError> {
        let input = match form.validate() {
            Ok(input) => input,
            Err(errors) => return Ok(SubmitOutcome::Render(FormView::FieldErrors(errors))),
        };
        let Some(ticket) = self.begin(FormKind::Signup) else {
            return Ok(SubmitOutcome::Render(FormView::Pending));
        };

        let result = AuthService::new(self.state.api())
            .register_and_sign_in(input, &self.token_store(&ticket))
            .await;

        match result {
            _ if !ticket.is_current() => self.discard().await,
            Ok(_) => self.signed_in().await,
            Err(SignupError::SignIn(err)) => {
                tracing::warn!(error = %err, "Signed up but could not sign in");
                Ok(SubmitOutcome::Registered)
            }
            Err(SignupError::Registration(err)) => {
                tracing::warn!(error = %err, "Signup failed");
                Ok(SubmitOutcome::Render(err.into()))
            }
        }
    }

    fn begin(&self, kind: FormKind) -> Option<SubmissionTicket> {
        let ticket = self.state.submissions().begin(self.id, kind);
        if ticket.is_none() {
            tracing::debug!(?kind, "Submission already in flight");
        }
        ticket
    }

    fn token_store(&self, ticket: &SubmissionTicket) -> SessionTokenStore {
        SessionTokenStore::new(self.session.clone()).guarded_by(ticket)
    }

    /// Persist the token, then tell the status cache. The stored record
    /// must hold the token before `SignedIn` goes out.
    async fn signed_in(&self) -> Result<SubmitOutcome, AppError> {
        self.session.save().await?;
        self.state.events().publish(SessionEvent::SignedIn(self.id));
        add_breadcrumb("auth", "Visitor signed in", None);
        Ok(SubmitOutcome::SignedIn)
    }

    async fn discard(&self) -> Result<SubmitOutcome, AppError> {
        tracing::info!("Session ended during submission, discarding result");
        // The token may have landed before the revocation was seen.
        SessionTokenStore::new(self.session.clone()).clear().await?;
        Ok(SubmitOutcome::Render(FormView::Idle))
    }
}
