//! Unified error handling with Sentry integration.
//!
//! Page handlers return `Result<T, AppError>`, which renders the HTML error
//! page. JSON handlers return `Result<T, ApiError>`, which renders
//! `{"error": ..., "message": ...}` with the same status mapping. Server-side
//! failures are captured to Sentry before responding.

use askama::Template;
use axum::{
    Json,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::filters;
use crate::google::GoogleError;

/// Where signed-out users are sent to authenticate.
pub const LOGIN_PATH: &str = "/auth/google";

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Google API operation failed.
    #[error("Google API error: {0}")]
    Google(#[from] GoogleError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    ///
    /// Upstream 401/403 means the user's grant is no longer valid and maps to
    /// 401; any other upstream failure is a 500.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Google(err) if err.is_unauthorized() => StatusCode::UNAUTHORIZED,
            Self::Google(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Short label shown as the page heading or the JSON `error` field.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Google(err) if err.is_unauthorized() => "Session expired",
            Self::Google(_) => "Upstream service error",
            Self::Session(_) | Self::Internal(_) => "Internal server error",
            Self::NotFound(_) => "Not found",
            Self::Unauthorized(_) => "Not authenticated",
            Self::BadRequest(_) => "Bad request",
        }
    }

    /// Client-facing message. Internal details stay in the logs.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Google(err) if err.is_unauthorized() => {
                "Your Google session has expired. Please sign in again.".to_string()
            }
            Self::Google(GoogleError::Api { message, .. }) => message.clone(),
            Self::Google(_) => "Google services could not be reached.".to_string(),
            Self::Session(_) | Self::Internal(_) => "Something went wrong on our side.".to_string(),
            Self::NotFound(msg) | Self::Unauthorized(msg) | Self::BadRequest(msg) => msg.clone(),
        }
    }

    /// Capture server errors to Sentry and log them.
    fn report(&self) {
        if self.status().is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }
    }
}

/// Error page template.
#[derive(Template)]
#[template(path = "error.html")]
struct ErrorPage<'a> {
    status: u16,
    title: &'a str,
    message: &'a str,
    /// Offer a sign-in link instead of "back to home".
    show_login: bool,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.report();

        let status = self.status();
        let message = self.public_message();
        let page = ErrorPage {
            status: status.as_u16(),
            title: self.title(),
            message: &message,
            show_login: status == StatusCode::UNAUTHORIZED,
        };

        match page.render() {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                tracing::error!("Failed to render error page: {e}");
                (status, message).into_response()
            }
        }
    }
}

/// JSON-rendering wrapper around [`AppError`] for `/api/*` handlers.
#[derive(Debug)]
pub struct ApiError(pub AppError);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect_to: Option<&'static str>,
}

impl<E> From<E> for ApiError
where
    E: Into<AppError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let Self(err) = self;
        err.report();

        let status = err.status();
        let body = ApiErrorBody {
            error: err.title(),
            message: err.public_message(),
            redirect_to: (status == StatusCode::UNAUTHORIZED).then_some(LOGIN_PATH),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for page handlers.
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias for JSON handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Set the Sentry user context after sign-in.
pub fn set_sentry_user(email: Option<&str>, name: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            email: email.map(String::from),
            username: name.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16) -> AppError {
        AppError::Google(GoogleError::Api {
            status,
            message: "upstream says no".to_string(),
        })
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("account snapshot".to_string());
        assert_eq!(err.to_string(), "Not found: account snapshot");

        let err = AppError::BadRequest("merchantId is required".to_string());
        assert_eq!(err.to_string(), "Bad request: merchantId is required");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upstream_auth_failures_map_to_unauthorized() {
        assert_eq!(api(401).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(api(403).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(api(500).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api(404).public_message(), "upstream says no");
    }

    #[test]
    fn test_api_error_uses_same_status() {
        let response = ApiError::from(AppError::BadRequest("x".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ApiError::from(api(403)).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = AppError::Internal("disk on fire at /var/lib".to_string());
        assert!(!err.public_message().contains("/var/lib"));
    }
}
