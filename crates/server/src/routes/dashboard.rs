//! Property dashboard page and its data endpoint.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use beacon_core::PropertyId;
use beacon_core::dashboard::DashboardReport;
use beacon_core::report::RunReportRequest;
use tracing::instrument;

use crate::error::{ApiResult, AppError, Result};
use crate::filters;
use crate::middleware::{RequireGoogleApiAuth, RequireGoogleAuth};
use crate::models::DashboardSession;
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub property_id: PropertyId,
}

/// Dashboard shell. The charts load `/api/dashboard-data` client-side.
///
/// # Route
///
/// `GET /dashboard`
pub async fn dashboard(
    RequireGoogleAuth(_): RequireGoogleAuth,
    session: DashboardSession,
) -> Result<Response> {
    let Some(property_id) = session.selected_property().await? else {
        return Ok(Redirect::to("/select-property").into_response());
    };

    Ok(DashboardTemplate { property_id }.into_response())
}

/// Last 30 days of the selected property, one entry per report row.
///
/// # Route
///
/// `GET /api/dashboard-data`
#[instrument(skip_all)]
pub async fn dashboard_data(
    State(state): State<AppState>,
    RequireGoogleApiAuth(tokens): RequireGoogleApiAuth,
    session: DashboardSession,
) -> ApiResult<Json<DashboardReport>> {
    let property_id = session
        .selected_property()
        .await?
        .ok_or_else(|| AppError::BadRequest("No property selected.".to_string()))?;

    let response = state
        .google()
        .run_report(
            &tokens.access_token,
            &property_id,
            &RunReportRequest::dashboard(),
        )
        .await?;

    let report = DashboardReport::from_rows(&response.rows);
    if report.is_empty() {
        return Err(AppError::NotFound(
            "No data is available for the selected period.".to_string(),
        )
        .into());
    }

    Ok(Json(report))
}
