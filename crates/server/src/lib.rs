//! Beacon dashboard server library.
//!
//! This crate provides the dashboard functionality as a library,
//! allowing it to be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod filters;
pub mod google;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::http::{HeaderValue, Method, header, header::InvalidHeaderValue};
use axum::{Router, routing::get};
use thiserror::Error;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Errors that prevent the router from being assembled.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid session signing key: {0}")]
    SessionKey(#[from] tower_sessions::cookie::KeyError),

    #[error("invalid FRONTEND_URL origin: {0}")]
    Origin(#[from] InvalidHeaderValue),
}

/// Assemble the application router: routes, static assets, sessions, CORS
/// and request tracing.
///
/// # Errors
///
/// Returns an error if the session key or the CORS origin is invalid.
pub fn app(state: AppState) -> Result<Router, StartupError> {
    let config = state.config();
    let session_layer = middleware::create_session_layer(config)?;

    let origin = HeaderValue::from_str(config.frontend_url.trim_end_matches('/'))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    let static_dir = config.static_dir.clone();

    Ok(Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(session_layer)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        ))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check upstream APIs.
async fn health() -> &'static str {
    "ok"
}
