//! Session-backed request context.
//!
//! Handlers never touch raw session keys. They take a [`DashboardSession`]
//! and use its typed accessors for tokens, selections and the cached
//! account snapshot.

use std::path::PathBuf;

use axum::{extract::FromRequestParts, http::request::Parts};
use beacon_core::snapshot::AccountSnapshot;
use beacon_core::{AccountId, MerchantId, PropertyId};
use tower_sessions::Session;

use crate::error::AppError;
use crate::google::GoogleTokens;

/// Session keys for dashboard state.
pub mod keys {
    /// OAuth tokens of the signed-in user.
    pub const TOKENS: &str = "google_tokens";

    /// CSRF state for the OAuth round trip.
    pub const OAUTH_STATE: &str = "google_oauth_state";

    /// Selected analytics account.
    pub const SELECTED_ACCOUNT: &str = "selected_account_id";

    /// Selected analytics property.
    pub const SELECTED_PROPERTY: &str = "selected_property_id";

    /// Selected Merchant Center account.
    pub const SELECTED_MERCHANT: &str = "selected_merchant_id";

    /// Cached aggregate account snapshot.
    pub const ACCOUNT_SNAPSHOT: &str = "account_snapshot";

    /// Path of the last persisted snapshot file.
    pub const SNAPSHOT_PATH: &str = "account_snapshot_path";
}

type SessionResult<T> = Result<T, tower_sessions::session::Error>;

/// Typed view over the user's session.
#[derive(Clone, Debug)]
pub struct DashboardSession {
    session: Session,
}

impl DashboardSession {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    // ── Tokens ───────────────────────────────────────────────────────────────

    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn tokens(&self) -> SessionResult<Option<GoogleTokens>> {
        self.session.get(keys::TOKENS).await
    }

    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn set_tokens(&self, tokens: &GoogleTokens) -> SessionResult<()> {
        self.session.insert(keys::TOKENS, tokens).await
    }

    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn is_signed_in(&self) -> SessionResult<bool> {
        Ok(self.tokens().await?.is_some())
    }

    // ── OAuth state ──────────────────────────────────────────────────────────

    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn set_oauth_state(&self, state: &str) -> SessionResult<()> {
        self.session.insert(keys::OAUTH_STATE, state).await
    }

    /// Remove and return the stored CSRF state (one-time use).
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn take_oauth_state(&self) -> SessionResult<Option<String>> {
        self.session.remove(keys::OAUTH_STATE).await
    }

    // ── Selections ───────────────────────────────────────────────────────────

    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn selected_account(&self) -> SessionResult<Option<AccountId>> {
        self.session.get(keys::SELECTED_ACCOUNT).await
    }

    /// Select an account. Any property chosen under the previous account is
    /// cleared.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn select_account(&self, account_id: &AccountId) -> SessionResult<()> {
        let previous = self.selected_account().await?;
        if previous.as_ref() != Some(account_id) {
            self.session
                .remove::<PropertyId>(keys::SELECTED_PROPERTY)
                .await?;
        }
        self.session.insert(keys::SELECTED_ACCOUNT, account_id).await
    }

    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn selected_property(&self) -> SessionResult<Option<PropertyId>> {
        self.session.get(keys::SELECTED_PROPERTY).await
    }

    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn select_property(&self, property_id: &PropertyId) -> SessionResult<()> {
        self.session
            .insert(keys::SELECTED_PROPERTY, property_id)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn selected_merchant(&self) -> SessionResult<Option<MerchantId>> {
        self.session.get(keys::SELECTED_MERCHANT).await
    }

    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn select_merchant(&self, merchant_id: &MerchantId) -> SessionResult<()> {
        self.session
            .insert(keys::SELECTED_MERCHANT, merchant_id)
            .await
    }

    // ── Snapshot ─────────────────────────────────────────────────────────────

    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn snapshot(&self) -> SessionResult<Option<AccountSnapshot>> {
        self.session.get(keys::ACCOUNT_SNAPSHOT).await
    }

    /// Cache a freshly collected snapshot and where it was written, if anywhere.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn store_snapshot(
        &self,
        snapshot: &AccountSnapshot,
        path: Option<PathBuf>,
    ) -> SessionResult<()> {
        self.session.insert(keys::ACCOUNT_SNAPSHOT, snapshot).await?;
        match path {
            Some(path) => self.session.insert(keys::SNAPSHOT_PATH, path).await,
            None => self
                .session
                .remove::<PathBuf>(keys::SNAPSHOT_PATH)
                .await
                .map(|_| ()),
        }
    }

    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn snapshot_path(&self) -> SessionResult<Option<PathBuf>> {
        self.session.get(keys::SNAPSHOT_PATH).await
    }

    // ── Lifetime ─────────────────────────────────────────────────────────────

    /// Destroy the session and its cookie.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn destroy(&self) -> SessionResult<()> {
        self.session.flush().await
    }
}

impl<S> FromRequestParts<S> for DashboardSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(Self::new)
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))
    }
}
