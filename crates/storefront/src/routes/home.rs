//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use crate::filters;
use crate::routes::nav::Nav;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub nav: Nav,
}

/// Display the home page.
pub async fn home(nav: Nav) -> impl IntoResponse {
    HomeTemplate { nav }
}
