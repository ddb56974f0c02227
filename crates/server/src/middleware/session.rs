//! Session middleware configuration.
//!
//! Sets up in-memory sessions with a signed cookie using tower-sessions.

use secrecy::ExposeSecret;
use tower_sessions::cookie::{Key, KeyError, SameSite, time::Duration};
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::BeaconConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "beacon_session";

/// Session expiry time in seconds (24 hours of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Create the session layer with an in-memory store.
///
/// The cookie is signed with a key derived from `SESSION_SECRET` and marked
/// `Secure` in production.
///
/// # Errors
///
/// Returns an error if the secret is too short to derive a signing key.
pub fn create_session_layer(
    config: &BeaconConfig,
) -> Result<SessionManagerLayer<MemoryStore, SignedCookie>, KeyError> {
    let key = Key::try_from(config.session_secret.expose_secret().as_bytes())?;

    Ok(SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(SESSION_EXPIRY_SECONDS)))
        .with_secure(config.app_env.is_production())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key))
}
