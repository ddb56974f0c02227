//! Aggregate account snapshot: view, download, refresh and JSON API.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use beacon_core::consolidate::OverallTotals;
use beacon_core::snapshot::{AccountSnapshot, SnapshotUser};
use chrono::Utc;

use crate::error::{ApiResult, AppError, Result};
use crate::filters;
use crate::middleware::{RequireGoogleApiAuth, RequireGoogleAuth};
use crate::models::DashboardSession;
use crate::services::refresh_account_snapshot;
use crate::state::AppState;

const SNAPSHOT_MISSING: &str = "Account data has not been collected yet.";

#[derive(Template, WebTemplate)]
#[template(path = "account_data.html")]
pub struct AccountDataTemplate {
    pub collected_at: String,
    pub user: SnapshotUser,
    pub property_count: usize,
    pub totals: OverallTotals,
    pub conversion_rate: String,
    pub snapshot_json: String,
    pub saved_to: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "account_data_missing.html")]
pub struct AccountDataMissingTemplate;

/// Snapshot summary with the full document.
///
/// # Route
///
/// `GET /account-data`
pub async fn account_data_page(
    RequireGoogleAuth(_): RequireGoogleAuth,
    session: DashboardSession,
) -> Result<Response> {
    let Some(snapshot) = session.snapshot().await? else {
        return Ok((StatusCode::NOT_FOUND, AccountDataMissingTemplate).into_response());
    };

    let snapshot_json = serde_json::to_string_pretty(&snapshot)
        .map_err(|e| AppError::Internal(format!("failed to serialize snapshot: {e}")))?;
    let saved_to = session
        .snapshot_path()
        .await?
        .map(|path| path.display().to_string());

    let AccountSnapshot {
        metadata,
        overview,
        user,
        ..
    } = snapshot;

    Ok(AccountDataTemplate {
        collected_at: metadata.data_collected_at.to_rfc3339(),
        user,
        property_count: overview.property_count,
        totals: overview.totals,
        conversion_rate: overview.overall_conversion_rate,
        snapshot_json,
        saved_to,
    }
    .into_response())
}

/// The snapshot as a JSON attachment.
///
/// # Route
///
/// `GET /download-account-data`
pub async fn download_account_data(
    RequireGoogleAuth(_): RequireGoogleAuth,
    session: DashboardSession,
) -> ApiResult<Response> {
    let snapshot = session
        .snapshot()
        .await?
        .ok_or_else(|| AppError::NotFound(SNAPSHOT_MISSING.to_string()))?;

    let body = serde_json::to_string_pretty(&snapshot)
        .map_err(|e| AppError::Internal(format!("failed to serialize snapshot: {e}")))?;
    let file_name = snapshot.download_file_name(Utc::now().date_naive());

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
        .into_response())
}

/// Recollect the snapshot and show it.
///
/// The auth extractor has already refreshed an expiring token; when that
/// refresh fails the user is sent back through the consent flow.
///
/// # Route
///
/// `GET /account-data/refresh`
pub async fn refresh_account_data(
    State(state): State<AppState>,
    RequireGoogleAuth(tokens): RequireGoogleAuth,
    session: DashboardSession,
) -> Result<Redirect> {
    tracing::info!("Refreshing account data");
    refresh_account_snapshot(&state, &session, &tokens).await?;
    Ok(Redirect::to("/account-data"))
}

/// The snapshot as plain JSON.
///
/// # Route
///
/// `GET /api/account-data`
pub async fn account_data_api(
    RequireGoogleApiAuth(_): RequireGoogleApiAuth,
    session: DashboardSession,
) -> ApiResult<Json<AccountSnapshot>> {
    let snapshot = session
        .snapshot()
        .await?
        .ok_or_else(|| AppError::NotFound(SNAPSHOT_MISSING.to_string()))?;

    Ok(Json(snapshot))
}
