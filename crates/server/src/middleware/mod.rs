//! HTTP middleware stack for the dashboard.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request tracing)
//! 3. CORS (frontend origin with credentials)
//! 4. Session layer (tower-sessions with in-memory store)
//!
//! Authentication is enforced per handler with the extractors in [`auth`].

pub mod auth;
pub mod session;

pub use auth::{RequireGoogleApiAuth, RequireGoogleAuth};
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
