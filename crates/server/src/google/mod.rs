//! Google REST API clients.
//!
//! # Architecture
//!
//! - Plain `reqwest` calls with a bearer token, no SDK
//! - One [`GoogleClient`] covers the four upstream APIs used by Beacon:
//!   user profile, Analytics Admin, Analytics Data and Content (Merchant Center)
//! - [`OAuthClient`] handles the authorization-code flow and token refresh
//! - Every base URL lives in [`GoogleEndpoints`] so tests can point the
//!   clients at a mock server
//!
//! # Example
//!
//! ```rust,ignore
//! use beacon_server::google::{GoogleClient, GoogleEndpoints};
//!
//! let client = GoogleClient::new(http, GoogleEndpoints::default());
//!
//! let accounts = client.list_accounts(&tokens.access_token).await?;
//! let products = client.list_all_products(&tokens.access_token, &merchant_id).await?;
//! ```

mod analytics;
mod merchant;
pub mod oauth;
mod profile;

pub use analytics::{AnalyticsAccount, AnalyticsProperty};
pub use merchant::{AccountIdentifier, FlexibleId, MerchantAccountDetail, ProductsPage};
pub use oauth::{GoogleTokens, OAuthClient};
pub use profile::UserProfile;

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

/// User agent sent with every upstream request.
const USER_AGENT: &str = concat!("beacon/", env!("CARGO_PKG_VERSION"));

/// Errors that can occur when talking to Google APIs.
#[derive(Debug, Error)]
pub enum GoogleError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// OAuth code exchange or refresh failed.
    #[error("OAuth error: {0}")]
    OAuth(String),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl GoogleError {
    /// Whether upstream rejected the access token (401 or 403).
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401 | 403, .. })
    }
}

/// Base URLs of the Google services Beacon talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleEndpoints {
    /// OAuth consent page
    pub authorize: String,
    /// OAuth token endpoint
    pub token: String,
    /// Host serving `/oauth2/v1/userinfo`
    pub userinfo: String,
    pub analytics_admin: String,
    pub analytics_data: String,
    /// Host serving `/content/v2.1`
    pub content: String,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            authorize: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token: "https://oauth2.googleapis.com/token".to_string(),
            userinfo: "https://www.googleapis.com".to_string(),
            analytics_admin: "https://analyticsadmin.googleapis.com".to_string(),
            analytics_data: "https://analyticsdata.googleapis.com".to_string(),
            content: "https://content.googleapis.com".to_string(),
        }
    }
}

impl GoogleEndpoints {
    /// Route every service to one host (a mock server in tests).
    #[must_use]
    pub fn single_host(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            authorize: format!("{base}/o/oauth2/v2/auth"),
            token: format!("{base}/token"),
            userinfo: base.to_string(),
            analytics_admin: base.to_string(),
            analytics_data: base.to_string(),
            content: base.to_string(),
        }
    }
}

/// Build the shared HTTP client used for every upstream call.
///
/// # Errors
///
/// Returns [`GoogleError::Http`] if the TLS backend cannot be initialised.
pub fn http_client() -> Result<reqwest::Client, GoogleError> {
    Ok(reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(60))
        .build()?)
}

// ─────────────────────────────────────────────────────────────────────────────
// Google API Client
// ─────────────────────────────────────────────────────────────────────────────

/// Client for the profile, analytics and merchant APIs.
///
/// Cheap to clone. Every call takes the caller's access token; the client
/// itself holds no user state.
#[derive(Clone)]
pub struct GoogleClient {
    inner: Arc<GoogleClientInner>,
}

struct GoogleClientInner {
    http: reqwest::Client,
    endpoints: GoogleEndpoints,
}

impl GoogleClient {
    #[must_use]
    pub fn new(http: reqwest::Client, endpoints: GoogleEndpoints) -> Self {
        Self {
            inner: Arc::new(GoogleClientInner { http, endpoints }),
        }
    }

    #[must_use]
    pub fn endpoints(&self) -> &GoogleEndpoints {
        &self.inner.endpoints
    }

    /// GET a JSON resource with a bearer token.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        access_token: &str,
        query: &[(&str, &str)],
    ) -> Result<T, GoogleError> {
        let response = self
            .inner
            .http
            .get(url)
            .bearer_auth(access_token)
            .query(query)
            .send()
            .await?;

        parse_response(response).await
    }

    /// POST a JSON body with a bearer token.
    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        url: &str,
        access_token: &str,
        body: &B,
    ) -> Result<T, GoogleError> {
        let response = self
            .inner
            .http
            .post(url)
            .bearer_auth(access_token)
            .json(body)
            .send()
            .await?;

        parse_response(response).await
    }
}

/// Turn a response into `T`, mapping non-2xx statuses to [`GoogleError::Api`].
async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, GoogleError> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(GoogleError::Api {
            status: status.as_u16(),
            message: error_message(status, &text),
        });
    }

    Ok(serde_json::from_str(&text)?)
}

/// Pull `error.message` out of a Google error body, falling back to the raw text.
fn error_message(status: StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            let error = value.get("error")?;
            error
                .get("message")
                .or_else(|| error.get("error_description"))
                .or_else(|| value.get("error_description"))
                .and_then(serde_json::Value::as_str)
                .or_else(|| error.as_str())
                .map(str::to_string)
        });

    from_json.unwrap_or_else(|| {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        } else {
            trimmed.chars().take(200).collect()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_from_google_envelope() {
        let body = r#"{"error":{"code":403,"message":"Insufficient permissions","status":"PERMISSION_DENIED"}}"#;
        assert_eq!(
            error_message(StatusCode::FORBIDDEN, body),
            "Insufficient permissions"
        );
    }

    #[test]
    fn test_error_message_from_oauth_body() {
        let body = r#"{"error":"invalid_grant","error_description":"Token has been expired or revoked."}"#;
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, body),
            "Token has been expired or revoked."
        );
    }

    #[test]
    fn test_error_message_falls_back_to_status() {
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, ""), "Bad Gateway");
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, "upstream down"), "upstream down");
    }

    #[test]
    fn test_is_unauthorized() {
        let forbidden = GoogleError::Api {
            status: 403,
            message: String::new(),
        };
        let missing = GoogleError::Api {
            status: 404,
            message: String::new(),
        };
        assert!(forbidden.is_unauthorized());
        assert!(!missing.is_unauthorized());
        assert!(!GoogleError::OAuth("nope".to_string()).is_unauthorized());
    }

    #[test]
    fn test_single_host_endpoints() {
        let endpoints = GoogleEndpoints::single_host("http://127.0.0.1:9999/");
        assert_eq!(endpoints.content, "http://127.0.0.1:9999");
        assert_eq!(endpoints.token, "http://127.0.0.1:9999/token");
    }
}
