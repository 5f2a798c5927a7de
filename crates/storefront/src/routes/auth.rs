//! Authentication route handlers.
//!
//! Handles login, signup and logout against the upstream API. The upstream
//! session token never reaches the browser; it lives in the visitor's session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use boutique_core::{Credentials, SignupForm};
use serde::Deserialize;
use tower_sessions::{Expiry, Session};

use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::forms::{FormContainer, FormView, SubmitOutcome};
use crate::routes::nav::Nav;
use crate::session::{SessionEvent, SessionTokenStore, TokenStore};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// Checkbox; absent when unticked.
    pub remember: Option<String>,
}

// =============================================================================
// Query Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    /// Set after a signup whose automatic sign-in failed.
    pub registered: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub nav: Nav,
    pub view: FormView,
    pub notice: Option<&'static str>,
    pub email: String,
    pub remember: bool,
}

/// Values echoed back into the signup form. Passwords are never echoed.
#[derive(Default)]
pub struct SignupValues {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl From<&SignupForm> for SignupValues {
    fn from(form: &SignupForm) -> Self {
        Self {
            first_name: form.first_name.clone(),
            last_name: form.last_name.clone(),
            email: form.email.clone(),
            phone: form.phone.clone(),
        }
    }
}

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub nav: Nav,
    pub view: FormView,
    pub values: SignupValues,
}

const REGISTERED_NOTICE: &str = "Your account was created. Please sign in.";

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(nav: Nav, Query(query): Query<LoginQuery>) -> impl IntoResponse {
    LoginTemplate {
        nav,
        view: FormView::Idle,
        notice: query.registered.map(|_| REGISTERED_NOTICE),
        email: String::new(),
        remember: true,
    }
}

/// Handle login form submission.
///
/// # Errors
///
/// Returns `AppError::Session` if the visitor's session cannot be saved.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    nav: Nav,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let remember = form.remember.is_some();
    let container = FormContainer::bind(&state, session.clone()).await?;

    let outcome = container
        .login(Credentials::new(form.email.clone(), form.password))
        .await?;

    Ok(match outcome {
        SubmitOutcome::SignedIn => {
            if !remember {
                session.set_expiry(Some(Expiry::OnSessionEnd));
            }
            Redirect::to("/").into_response()
        }
        SubmitOutcome::Registered => Redirect::to("/auth/login?registered=1").into_response(),
        SubmitOutcome::Render(view) => (
            view.status(),
            LoginTemplate {
                nav,
                view,
                notice: None,
                email: form.email,
                remember,
            },
        )
            .into_response(),
    })
}

// =============================================================================
// Signup Routes
// =============================================================================

/// Display the signup page.
pub async fn signup_page(nav: Nav) -> impl IntoResponse {
    SignupTemplate {
        nav,
        view: FormView::Idle,
        values: SignupValues::default(),
    }
}

/// Handle signup form submission.
///
/// Creates the account, then signs the visitor in with the same credentials.
///
/// # Errors
///
/// Returns `AppError::Session` if the visitor's session cannot be saved.
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    nav: Nav,
    Form(form): Form<SignupForm>,
) -> Result<Response, AppError> {
    let values = SignupValues::from(&form);
    let container = FormContainer::bind(&state, session).await?;

    Ok(match container.signup(form).await? {
        SubmitOutcome::SignedIn => Redirect::to("/").into_response(),
        SubmitOutcome::Registered => Redirect::to("/auth/login?registered=1").into_response(),
        SubmitOutcome::Render(view) => {
            (view.status(), SignupTemplate { nav, view, values }).into_response()
        }
    })
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout.
///
/// Revokes in-flight submissions, drops the token and the session, and
/// invalidates everything cached for it.
///
/// # Errors
///
/// Returns `AppError::Session` if the session store fails.
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
) -> Result<Redirect, AppError> {
    let id = session.id();
    if let Some(id) = id {
        state.submissions().revoke(id);
    }

    SessionTokenStore::new(session.clone()).clear().await?;
    session.flush().await?;

    if let Some(id) = id {
        state.events().publish(SessionEvent::SignedOut(id));
    }
    add_breadcrumb("auth", "Visitor signed out", None);

    Ok(Redirect::to("/"))
}
