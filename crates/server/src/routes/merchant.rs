//! Merchant Center dashboard and JSON API.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use beacon_core::MerchantId;
use beacon_core::snapshot::MerchantAccount;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{ApiResult, AppError, LOGIN_PATH, Result};
use crate::filters;
use crate::google::FlexibleId;
use crate::middleware::{RequireGoogleApiAuth, RequireGoogleAuth};
use crate::models::DashboardSession;
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "merchant_dashboard.html")]
pub struct MerchantDashboardTemplate {
    pub merchant_id: MerchantId,
}

#[derive(Template, WebTemplate)]
#[template(path = "merchant_not_selected.html")]
pub struct MerchantNotSelectedTemplate {
    pub login_path: &'static str,
}

/// Response of `GET /api/merchant-center/accounts`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantAccountsResponse {
    pub accounts: Vec<MerchantAccount>,
    pub selected_merchant_id: Option<MerchantId>,
}

/// Body of `POST /api/merchant-center/select-account`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectMerchantBody {
    /// Accepted as a JSON string or number.
    pub merchant_id: Option<FlexibleId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectMerchantResponse {
    pub success: bool,
    pub selected_merchant_id: MerchantId,
}

/// Response of `GET /api/merchant-center/products`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductsResponse {
    pub merchant_id: MerchantId,
    pub account_name: String,
    pub products: Vec<serde_json::Value>,
    pub total_products: usize,
}

/// Merchant dashboard shell. Products load client-side.
///
/// # Route
///
/// `GET /merchant-dashboard`
pub async fn merchant_dashboard(
    RequireGoogleAuth(_): RequireGoogleAuth,
    session: DashboardSession,
) -> Result<Response> {
    let Some(merchant_id) = session.selected_merchant().await? else {
        tracing::debug!("Merchant dashboard requested without a selected merchant");
        return Ok((
            StatusCode::BAD_REQUEST,
            MerchantNotSelectedTemplate {
                login_path: LOGIN_PATH,
            },
        )
            .into_response());
    };

    Ok(MerchantDashboardTemplate { merchant_id }.into_response())
}

/// Merchant accounts the user can access, plus the current selection.
///
/// # Route
///
/// `GET /api/merchant-center/accounts`
#[instrument(skip_all)]
pub async fn accounts(
    State(state): State<AppState>,
    RequireGoogleApiAuth(tokens): RequireGoogleApiAuth,
    session: DashboardSession,
) -> ApiResult<Json<MerchantAccountsResponse>> {
    let accounts = state
        .google()
        .list_merchant_accounts(&tokens.access_token)
        .await?;

    Ok(Json(MerchantAccountsResponse {
        accounts,
        selected_merchant_id: session.selected_merchant().await?,
    }))
}

/// Remember the chosen merchant account.
///
/// # Route
///
/// `POST /api/merchant-center/select-account`
pub async fn select_account(
    RequireGoogleApiAuth(_): RequireGoogleApiAuth,
    session: DashboardSession,
    body: std::result::Result<Json<SelectMerchantBody>, JsonRejection>,
) -> ApiResult<Json<SelectMerchantResponse>> {
    // A missing or malformed body is treated like one without `merchantId`.
    let body = body
        .map_err(|rejection| tracing::debug!(%rejection, "Unreadable select-account body"))
        .ok();
    let merchant_id = body
        .and_then(|Json(body)| body.merchant_id)
        .and_then(FlexibleId::into_non_empty)
        .map(MerchantId::new)
        .ok_or_else(|| {
            AppError::BadRequest("merchantId is required in the request body.".to_string())
        })?;

    session.select_merchant(&merchant_id).await?;
    tracing::info!(merchant_id = %merchant_id, "Merchant account selected");

    Ok(Json(SelectMerchantResponse {
        success: true,
        selected_merchant_id: merchant_id,
    }))
}

/// Every product of the selected merchant account.
///
/// # Route
///
/// `GET /api/merchant-center/products`
#[instrument(skip_all)]
pub async fn products(
    State(state): State<AppState>,
    RequireGoogleApiAuth(tokens): RequireGoogleApiAuth,
    session: DashboardSession,
) -> ApiResult<Json<ProductsResponse>> {
    let merchant_id = session.selected_merchant().await?.ok_or_else(|| {
        AppError::BadRequest(
            "No Merchant ID selected. Please select a Merchant Account first.".to_string(),
        )
    })?;

    let google = state.google();
    let account_name = match google
        .get_merchant_account(&tokens.access_token, &merchant_id)
        .await
    {
        Ok(detail) => detail.name.filter(|name| !name.is_empty()),
        Err(e) => {
            tracing::warn!(merchant_id = %merchant_id, error = %e, "Merchant account name unavailable");
            None
        }
    }
    .unwrap_or_else(|| format!("Account {merchant_id}"));

    let products = google
        .list_all_products(&tokens.access_token, &merchant_id)
        .await?;

    Ok(Json(ProductsResponse {
        total_products: products.len(),
        merchant_id,
        account_name,
        products,
    }))
}
