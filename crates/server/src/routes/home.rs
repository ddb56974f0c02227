//! Landing page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::{IntoResponse, Redirect, Response};

use crate::error::{LOGIN_PATH, Result};
use crate::filters;
use crate::models::DashboardSession;

/// Sign-in page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub login_path: &'static str,
}

/// Show the sign-in page, or go straight to the dashboard when signed in.
///
/// # Route
///
/// `GET /`
pub async fn home(session: DashboardSession) -> Result<Response> {
    if session.is_signed_in().await? {
        return Ok(Redirect::to("/dashboard").into_response());
    }

    Ok(LoginTemplate {
        login_path: LOGIN_PATH,
    }
    .into_response())
}
