//! Authentication extractors.
//!
//! Both extractors require Google tokens in the session and refresh them when
//! they expire within five minutes. A failed refresh flushes the session.
//! They differ only in how they reject: pages redirect to the consent flow,
//! JSON endpoints answer `401` with a `redirectTo` hint.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};

use crate::error::{ApiError, AppError, LOGIN_PATH};
use crate::google::GoogleTokens;
use crate::models::DashboardSession;
use crate::state::AppState;

/// Extractor that requires a signed-in Google user on page routes.
///
/// # Example
///
/// ```rust,ignore
/// async fn dashboard(RequireGoogleAuth(tokens): RequireGoogleAuth) -> impl IntoResponse {
///     format!("token obtained at {}", tokens.obtained_at)
/// }
/// ```
pub struct RequireGoogleAuth(pub GoogleTokens);

/// Extractor that requires a signed-in Google user on `/api/*` routes.
pub struct RequireGoogleApiAuth(pub GoogleTokens);

/// Rejection for page routes.
pub enum AuthRejection {
    /// No usable tokens; go through the consent flow again.
    RedirectToLogin,
    /// The session itself failed.
    Failed(AppError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::Failed(err) => err.into_response(),
        }
    }
}

/// Why no valid tokens could be produced.
enum AuthFailure {
    SignedOut,
    RefreshFailed,
    Session(AppError),
}

impl From<AppError> for AuthFailure {
    fn from(err: AppError) -> Self {
        Self::Session(err)
    }
}

impl From<tower_sessions::session::Error> for AuthFailure {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self::Session(err.into())
    }
}

/// Load the session tokens, refreshing them when they are about to expire.
async fn authenticate(parts: &mut Parts, state: &AppState) -> Result<GoogleTokens, AuthFailure> {
    let session = DashboardSession::from_request_parts(parts, state).await?;
    let tokens = session.tokens().await?.ok_or(AuthFailure::SignedOut)?;

    if !tokens.is_expiring() {
        return Ok(tokens);
    }

    match state.oauth().refresh(&tokens).await {
        Ok(refreshed) => {
            session.set_tokens(&refreshed).await?;
            tracing::info!("Access token refreshed");
            Ok(refreshed)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Token refresh failed; signing out");
            session.destroy().await?;
            Err(AuthFailure::RefreshFailed)
        }
    }
}

impl FromRequestParts<AppState> for RequireGoogleAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match authenticate(parts, state).await {
            Ok(tokens) => Ok(Self(tokens)),
            Err(AuthFailure::SignedOut | AuthFailure::RefreshFailed) => {
                Err(AuthRejection::RedirectToLogin)
            }
            Err(AuthFailure::Session(err)) => Err(AuthRejection::Failed(err)),
        }
    }
}

impl FromRequestParts<AppState> for RequireGoogleApiAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match authenticate(parts, state).await {
            Ok(tokens) => Ok(Self(tokens)),
            Err(AuthFailure::SignedOut) => Err(ApiError(AppError::Unauthorized(
                "Not authenticated".to_string(),
            ))),
            Err(AuthFailure::RefreshFailed) => Err(ApiError(AppError::Unauthorized(
                "Authentication expired. Please sign in again.".to_string(),
            ))),
            Err(AuthFailure::Session(err)) => Err(ApiError(err)),
        }
    }
}
