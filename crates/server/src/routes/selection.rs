//! Analytics account and property selection.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use beacon_core::snapshot::UNKNOWN_FIELD;
use beacon_core::{AccountId, PropertyId};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireGoogleAuth;
use crate::models::DashboardSession;
use crate::state::AppState;

/// An account as shown in the picker.
pub struct AccountOption {
    pub id: AccountId,
    pub display_name: String,
}

/// A property as shown in the picker.
pub struct PropertyOption {
    pub id: PropertyId,
    pub display_name: String,
    pub time_zone: String,
    pub currency_code: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "select_account.html")]
pub struct SelectAccountTemplate {
    pub accounts: Vec<AccountOption>,
}

#[derive(Template, WebTemplate)]
#[template(path = "select_property.html")]
pub struct SelectPropertyTemplate {
    pub account_id: AccountId,
    pub properties: Vec<PropertyOption>,
}

#[derive(Template, WebTemplate)]
#[template(path = "no_properties.html")]
pub struct NoPropertiesTemplate {
    pub account_id: AccountId,
}

/// Account picker.
///
/// # Route
///
/// `GET /select-account`
#[instrument(skip_all)]
pub async fn select_account_page(
    State(state): State<AppState>,
    RequireGoogleAuth(tokens): RequireGoogleAuth,
) -> Result<SelectAccountTemplate> {
    let accounts = state
        .google()
        .list_accounts(&tokens.access_token)
        .await?
        .into_iter()
        .map(|account| AccountOption {
            id: account.id(),
            display_name: account.display_name,
        })
        .collect();

    Ok(SelectAccountTemplate { accounts })
}

/// Store the chosen account and continue to property selection.
///
/// # Route
///
/// `GET /select-account/{account_id}`
pub async fn select_account(
    RequireGoogleAuth(_): RequireGoogleAuth,
    session: DashboardSession,
    Path(account_id): Path<String>,
) -> Result<Redirect> {
    let account_id = AccountId::new(account_id);
    if account_id.is_empty() {
        return Err(AppError::BadRequest("Account ID is required.".to_string()));
    }

    session.select_account(&account_id).await?;
    tracing::info!(account_id = %account_id, "Analytics account selected");
    Ok(Redirect::to("/select-property"))
}

/// Property picker for the selected account.
///
/// # Route
///
/// `GET /select-property`
#[instrument(skip_all)]
pub async fn select_property_page(
    State(state): State<AppState>,
    RequireGoogleAuth(tokens): RequireGoogleAuth,
    session: DashboardSession,
) -> Result<Response> {
    let Some(account_id) = session.selected_account().await? else {
        return Ok(Redirect::to("/select-account").into_response());
    };

    let properties: Vec<PropertyOption> = state
        .google()
        .list_properties(&tokens.access_token, &account_id)
        .await?
        .into_iter()
        .map(|property| PropertyOption {
            id: property.id(),
            display_name: property.display_name,
            time_zone: property
                .time_zone
                .unwrap_or_else(|| UNKNOWN_FIELD.to_string()),
            currency_code: property
                .currency_code
                .unwrap_or_else(|| UNKNOWN_FIELD.to_string()),
        })
        .collect();

    if properties.is_empty() {
        return Ok(NoPropertiesTemplate { account_id }.into_response());
    }

    Ok(SelectPropertyTemplate {
        account_id,
        properties,
    }
    .into_response())
}

/// Store the chosen property and open the dashboard.
///
/// # Route
///
/// `GET /select-property/{property_id}`
pub async fn select_property(
    RequireGoogleAuth(_): RequireGoogleAuth,
    session: DashboardSession,
    Path(property_id): Path<String>,
) -> Result<Redirect> {
    let property_id = PropertyId::new(property_id);
    if property_id.is_empty() {
        return Err(AppError::BadRequest("Property ID is required.".to_string()));
    }

    session.select_property(&property_id).await?;
    tracing::info!(property_id = %property_id, "Analytics property selected");
    Ok(Redirect::to("/dashboard"))
}
