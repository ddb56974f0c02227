//! Google OAuth 2.0 authorization-code flow.
//!
//! # Flow
//!
//! 1. Generate the consent URL with [`OAuthClient::authorization_url`]
//! 2. Redirect the user to Google's consent page
//! 3. Google redirects back with an authorization code
//! 4. Exchange the code for tokens with [`OAuthClient::exchange_code`]
//! 5. Refresh near-expiry tokens with [`OAuthClient::refresh`]

use std::sync::Arc;

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use url::Url;

use super::{GoogleEndpoints, GoogleError};
use crate::config::OAuthConfig;

/// Scopes requested at consent.
pub const OAUTH_SCOPES: [&str; 5] = [
    "https://www.googleapis.com/auth/analytics.readonly",
    "https://www.googleapis.com/auth/analytics.manage.users.readonly",
    "https://www.googleapis.com/auth/userinfo.profile",
    "https://www.googleapis.com/auth/userinfo.email",
    "https://www.googleapis.com/auth/content",
];

/// Tokens are refreshed once they expire within this many seconds.
pub const REFRESH_THRESHOLD_SECS: i64 = 5 * 60;

// ─────────────────────────────────────────────────────────────────────────────
// Token Types
// ─────────────────────────────────────────────────────────────────────────────

/// Tokens obtained via OAuth, stored in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoogleTokens {
    /// The access token for API requests.
    pub access_token: String,
    /// The refresh token for obtaining new access tokens.
    pub refresh_token: Option<String>,
    /// The ID token (`OpenID` Connect).
    pub id_token: Option<String>,
    /// Space-separated scopes actually granted.
    pub scope: Option<String>,
    /// Token lifetime in seconds.
    pub expires_in: Option<i64>,
    /// Unix timestamp when the token was obtained.
    pub obtained_at: i64,
}

impl GoogleTokens {
    /// Whether the access token expires within [`REFRESH_THRESHOLD_SECS`] of `now`.
    ///
    /// Tokens without a known lifetime never count as expiring.
    #[must_use]
    pub fn is_expiring_at(&self, now: i64) -> bool {
        self.expires_in.is_some_and(|expires_in| {
            let expires_at = self.obtained_at + expires_in;
            expires_at - now <= REFRESH_THRESHOLD_SECS
        })
    }

    #[must_use]
    pub fn is_expiring(&self) -> bool {
        self.is_expiring_at(Utc::now().timestamp())
    }
}

/// Raw token response from Google's token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    id_token: Option<String>,
    scope: Option<String>,
    expires_in: Option<i64>,
}

impl TokenResponse {
    fn into_tokens(self, previous_refresh_token: Option<&str>) -> GoogleTokens {
        GoogleTokens {
            access_token: self.access_token,
            refresh_token: self
                .refresh_token
                .or_else(|| previous_refresh_token.map(str::to_string)),
            id_token: self.id_token,
            scope: self.scope,
            expires_in: self.expires_in,
            obtained_at: Utc::now().timestamp(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// OAuth Client
// ─────────────────────────────────────────────────────────────────────────────

/// Client for Google's OAuth endpoints.
#[derive(Clone)]
pub struct OAuthClient {
    inner: Arc<OAuthClientInner>,
}

struct OAuthClientInner {
    http: reqwest::Client,
    client_id: String,
    client_secret: SecretString,
    redirect_uri: String,
    authorize_url: String,
    token_url: String,
}

impl OAuthClient {
    #[must_use]
    pub fn new(http: reqwest::Client, config: &OAuthConfig, endpoints: &GoogleEndpoints) -> Self {
        Self {
            inner: Arc::new(OAuthClientInner {
                http,
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
                redirect_uri: config.redirect_uri.clone(),
                authorize_url: endpoints.authorize.clone(),
                token_url: endpoints.token.clone(),
            }),
        }
    }

    /// Consent URL for the configured client, carrying the CSRF `state`.
    ///
    /// # Errors
    ///
    /// Returns [`GoogleError::OAuth`] if the configured authorize endpoint is
    /// not a valid URL.
    pub fn authorization_url(&self, state: &str) -> Result<String, GoogleError> {
        let scope = OAUTH_SCOPES.join(" ");
        let url = Url::parse_with_params(
            &self.inner.authorize_url,
            &[
                ("client_id", self.inner.client_id.as_str()),
                ("redirect_uri", self.inner.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", scope.as_str()),
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("state", state),
            ],
        )
        .map_err(|e| GoogleError::OAuth(format!("invalid authorize endpoint: {e}")))?;

        Ok(url.into())
    }

    /// Exchange an authorization code for tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the token exchange fails.
    #[instrument(skip_all)]
    pub async fn exchange_code(&self, code: &str) -> Result<GoogleTokens, GoogleError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.inner.client_id.as_str()),
            ("client_secret", self.inner.client_secret.expose_secret()),
            ("redirect_uri", self.inner.redirect_uri.as_str()),
        ];

        let token_response = self.token_request(&params, "Token exchange failed").await?;
        Ok(token_response.into_tokens(None))
    }

    /// Refresh an access token.
    ///
    /// Google usually omits the refresh token on refresh; the previous one is
    /// kept in that case.
    ///
    /// # Errors
    ///
    /// Returns [`GoogleError::OAuth`] if there is no refresh token or the
    /// refresh is rejected.
    #[instrument(skip_all)]
    pub async fn refresh(&self, tokens: &GoogleTokens) -> Result<GoogleTokens, GoogleError> {
        let refresh_token = tokens
            .refresh_token
            .as_deref()
            .ok_or_else(|| GoogleError::OAuth("no refresh token in session".to_string()))?;

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.inner.client_id.as_str()),
            ("client_secret", self.inner.client_secret.expose_secret()),
        ];

        let token_response = self.token_request(&params, "Token refresh failed").await?;
        Ok(token_response.into_tokens(Some(refresh_token)))
    }

    async fn token_request(
        &self,
        params: &[(&str, &str)],
        failure: &str,
    ) -> Result<TokenResponse, GoogleError> {
        let response = self
            .inner
            .http
            .post(&self.inner.token_url)
            .form(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(GoogleError::OAuth(format!(
                "{failure} ({status}): {}",
                super::error_message(status, &text)
            )));
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn client() -> OAuthClient {
        let config = OAuthConfig {
            client_id: "client-123.apps.googleusercontent.com".to_string(),
            client_secret: SecretString::from("hidden"),
            redirect_uri: "http://localhost:3000/auth/google/callback".to_string(),
        };
        OAuthClient::new(reqwest::Client::new(), &config, &GoogleEndpoints::default())
    }

    fn tokens(expires_in: Option<i64>) -> GoogleTokens {
        GoogleTokens {
            access_token: "ya29.token".to_string(),
            refresh_token: Some("1//refresh".to_string()),
            id_token: None,
            scope: None,
            expires_in,
            obtained_at: 1_000,
        }
    }

    #[test]
    fn test_authorization_url_carries_offline_consent_and_scopes() {
        let url = Url::parse(&client().authorization_url("state-abc").unwrap()).unwrap();
        let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();

        assert_eq!(url.host_str(), Some("accounts.google.com"));
        assert_eq!(params["access_type"], "offline");
        assert_eq!(params["prompt"], "consent");
        assert_eq!(params["state"], "state-abc");
        assert_eq!(params["response_type"], "code");
        assert_eq!(
            params["redirect_uri"],
            "http://localhost:3000/auth/google/callback"
        );
        let scopes: Vec<&str> = params["scope"].split(' ').collect();
        assert_eq!(scopes, OAUTH_SCOPES);
    }

    #[test]
    fn test_token_expiry_threshold() {
        let token = tokens(Some(3600));
        // expires at 4600
        assert!(!token.is_expiring_at(4_000));
        assert!(token.is_expiring_at(4_300));
        assert!(token.is_expiring_at(5_000));
        assert!(!tokens(None).is_expiring_at(1_000_000));
    }

    #[test]
    fn test_refresh_keeps_previous_refresh_token() {
        let response = TokenResponse {
            access_token: "new".to_string(),
            refresh_token: None,
            id_token: None,
            scope: None,
            expires_in: Some(3599),
        };
        let refreshed = response.into_tokens(Some("1//old"));
        assert_eq!(refreshed.access_token, "new");
        assert_eq!(refreshed.refresh_token.as_deref(), Some("1//old"));
    }
}
