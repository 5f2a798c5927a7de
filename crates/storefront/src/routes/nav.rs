//! Navigation chrome shared by every page.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::session::SessionTokenStore;
use crate::state::AppState;

/// Navbar state, extracted per request.
///
/// Reads the session status through the state's query cache, so a page
/// render costs at most one token-store read per session.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(nav: Nav) -> impl IntoResponse {
///     PageTemplate { nav }
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Nav {
    pub is_authenticated: bool,
}

impl FromRequestParts<AppState> for Nav {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Without the session layer nobody can be signed in.
        let Some(session) = parts.extensions.get::<Session>().cloned() else {
            return Ok(Self::default());
        };

        let id = session.id();
        let store = SessionTokenStore::new(session);
        let is_authenticated = state.status().is_authenticated(id, &store).await;

        Ok(Self { is_authenticated })
    }
}
