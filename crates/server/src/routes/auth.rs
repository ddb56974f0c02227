//! Google OAuth route handlers.
//!
//! - Login: stores a CSRF state and redirects to Google's consent page
//! - Callback: exchanges the code, collects the account snapshot and routes
//!   the user to account or property selection
//! - Logout: destroys the session

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use beacon_core::AccountId;
use rand::Rng;
use serde::Deserialize;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::google::AnalyticsAccount;
use crate::models::DashboardSession;
use crate::services::refresh_account_snapshot;
use crate::state::AppState;

/// Query parameters from the Google OAuth callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange for tokens.
    pub code: Option<String>,
    /// State parameter for CSRF protection.
    pub state: Option<String>,
    /// Error code if the user declined consent.
    pub error: Option<String>,
}

const STATE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a random alphanumeric string for the CSRF state.
fn generate_random_string(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .filter_map(|_| {
            STATE_CHARSET
                .get(rng.random_range(0..STATE_CHARSET.len()))
                .copied()
                .map(char::from)
        })
        .collect()
}

/// Start the Google consent flow.
///
/// # Route
///
/// `GET /auth/google`
pub async fn login(State(state): State<AppState>, session: DashboardSession) -> Result<Response> {
    let oauth_state = generate_random_string(32);
    session.set_oauth_state(&oauth_state).await?;

    let auth_url = state.oauth().authorization_url(&oauth_state)?;
    Ok(Redirect::to(&auth_url).into_response())
}

/// Handle the Google OAuth callback.
///
/// After the token exchange the account snapshot is collected and persisted;
/// a failure there is logged and does not block sign-in. The user then lands
/// on property selection when exactly one analytics account exists, or on
/// account selection otherwise.
///
/// # Route
///
/// `GET /auth/google/callback`
pub async fn callback(
    State(state): State<AppState>,
    session: DashboardSession,
    Query(query): Query<CallbackQuery>,
) -> Result<Response> {
    if let Some(error) = query.error {
        tracing::warn!(%error, "Google OAuth consent denied");
        return Err(AppError::Unauthorized(
            "Google sign-in was cancelled or denied.".to_string(),
        ));
    }

    let code = query
        .code
        .ok_or_else(|| AppError::BadRequest("Missing authorization code.".to_string()))?;

    let expected = session.take_oauth_state().await?;
    if expected.is_none() || expected != query.state {
        tracing::warn!("Google OAuth state mismatch");
        return Err(AppError::BadRequest(
            "Invalid sign-in state. Please try again.".to_string(),
        ));
    }

    let tokens = state.oauth().exchange_code(&code).await?;
    session.set_tokens(&tokens).await?;
    tracing::info!("Google user authenticated");

    let collected: Vec<AccountId> = match refresh_account_snapshot(&state, &session, &tokens).await
    {
        Ok(snapshot) => {
            set_sentry_user(Some(&snapshot.user.email), Some(&snapshot.user.name));
            snapshot
                .accounts
                .into_iter()
                .map(|account| account.account_id)
                .collect()
        }
        Err(e) => {
            tracing::error!(error = %e, "Account snapshot collection failed");
            Vec::new()
        }
    };

    // Collection swallows listing errors, so an empty list is checked upstream
    // again to tell "no accounts" from a failed call.
    let account_ids = if collected.is_empty() {
        state
            .google()
            .list_accounts(&tokens.access_token)
            .await?
            .iter()
            .map(AnalyticsAccount::id)
            .collect()
    } else {
        collected
    };

    match account_ids.as_slice() {
        [] => Err(AppError::Internal(
            "No Google Analytics accounts found for this user".to_string(),
        )),
        [only] => {
            session.select_account(only).await?;
            Ok(Redirect::to("/select-property").into_response())
        }
        _ => Ok(Redirect::to("/select-account").into_response()),
    }
}

/// Sign out.
///
/// # Route
///
/// `GET /auth/logout`
pub async fn logout(session: DashboardSession) -> Result<Response> {
    session.destroy().await?;
    clear_sentry_user();
    Ok(Redirect::to("/").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_random_string() {
        let s1 = generate_random_string(32);
        let s2 = generate_random_string(32);

        assert_eq!(s1.len(), 32);
        assert_ne!(s1, s2);
        assert!(s1.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
