//! HTTP route handlers for the dashboard.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                  - Sign-in page (redirects to /dashboard when signed in)
//! GET  /health                            - Health check
//!
//! # Google OAuth
//! GET  /auth/google                       - Redirect to Google consent
//! GET  /auth/google/callback              - Handle OAuth callback, collect snapshot
//! GET  /auth/logout                       - Destroy session
//!
//! # Analytics selection
//! GET  /select-account                    - Account picker
//! GET  /select-account/{account_id}       - Store account selection
//! GET  /select-property                   - Property picker for the selected account
//! GET  /select-property/{property_id}     - Store property selection
//!
//! # Dashboard
//! GET  /dashboard                         - Dashboard page
//! GET  /api/dashboard-data                - Report rows for the selected property
//!
//! # Account snapshot
//! GET  /account-data                      - Snapshot summary page
//! GET  /account-data/refresh              - Recollect snapshot
//! GET  /download-account-data             - Snapshot as JSON attachment
//! GET  /api/account-data                  - Snapshot as JSON
//!
//! # Merchant Center
//! GET  /merchant-dashboard                - Merchant dashboard page
//! GET  /api/merchant-center/accounts      - Accessible merchant accounts
//! POST /api/merchant-center/select-account - Store merchant selection
//! GET  /api/merchant-center/products      - All products of the selected merchant
//! ```

pub mod account_data;
pub mod auth;
pub mod dashboard;
pub mod home;
pub mod merchant;
pub mod selection;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the Google OAuth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/google", get(auth::login))
        .route("/google/callback", get(auth::callback))
        .route("/logout", get(auth::logout))
}

/// Create the Merchant Center API routes router.
pub fn merchant_api_routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(merchant::accounts))
        .route("/select-account", post(merchant::select_account))
        .route("/products", get(merchant::products))
}

/// Create all routes for the dashboard.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/auth", auth_routes())
        // Analytics selection
        .route("/select-account", get(selection::select_account_page))
        .route(
            "/select-account/{account_id}",
            get(selection::select_account),
        )
        .route("/select-property", get(selection::select_property_page))
        .route(
            "/select-property/{property_id}",
            get(selection::select_property),
        )
        // Dashboard
        .route("/dashboard", get(dashboard::dashboard))
        .route("/api/dashboard-data", get(dashboard::dashboard_data))
        // Account snapshot
        .route("/account-data", get(account_data::account_data_page))
        .route(
            "/account-data/refresh",
            get(account_data::refresh_account_data),
        )
        .route(
            "/download-account-data",
            get(account_data::download_account_data),
        )
        .route("/api/account-data", get(account_data::account_data_api))
        // Merchant Center
        .route("/merchant-dashboard", get(merchant::merchant_dashboard))
        .nest("/api/merchant-center", merchant_api_routes())
}
