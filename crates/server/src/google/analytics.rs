//! Google Analytics Admin and Data API calls.

use beacon_core::report::{RunReportRequest, RunReportResponse};
use beacon_core::{AccountId, PropertyId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{GoogleClient, GoogleError};

/// An analytics account (`accounts/{id}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsAccount {
    /// Resource name, `accounts/{id}`.
    pub name: String,
    #[serde(default)]
    pub display_name: String,
}

impl AnalyticsAccount {
    #[must_use]
    pub fn id(&self) -> AccountId {
        AccountId::from_resource_name(&self.name)
    }
}

/// A GA4 property (`properties/{id}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsProperty {
    /// Resource name, `properties/{id}`.
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    pub create_time: Option<String>,
    pub update_time: Option<String>,
    pub time_zone: Option<String>,
    pub currency_code: Option<String>,
    pub industry_category: Option<String>,
    pub service_level: Option<String>,
}

impl AnalyticsProperty {
    #[must_use]
    pub fn id(&self) -> PropertyId {
        PropertyId::from_resource_name(&self.name)
    }
}

#[derive(Debug, Deserialize)]
struct AccountsResponse {
    #[serde(default)]
    accounts: Vec<AnalyticsAccount>,
}

#[derive(Debug, Deserialize)]
struct PropertiesResponse {
    #[serde(default)]
    properties: Vec<AnalyticsProperty>,
}

impl GoogleClient {
    /// List the analytics accounts the token can read.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or upstream rejects the token.
    #[instrument(skip_all)]
    pub async fn list_accounts(
        &self,
        access_token: &str,
    ) -> Result<Vec<AnalyticsAccount>, GoogleError> {
        let url = format!("{}/v1beta/accounts", self.endpoints().analytics_admin);
        let response: AccountsResponse = self.get_json(&url, access_token, &[]).await?;
        tracing::debug!(count = response.accounts.len(), "Listed analytics accounts");
        Ok(response.accounts)
    }

    /// List the properties under one account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or upstream rejects the token.
    #[instrument(skip(self, access_token), fields(account_id = %account_id))]
    pub async fn list_properties(
        &self,
        access_token: &str,
        account_id: &AccountId,
    ) -> Result<Vec<AnalyticsProperty>, GoogleError> {
        let url = format!("{}/v1beta/properties", self.endpoints().analytics_admin);
        let filter = format!("parent:accounts/{account_id}");
        let response: PropertiesResponse = self
            .get_json(&url, access_token, &[("filter", filter.as_str())])
            .await?;
        tracing::debug!(count = response.properties.len(), "Listed properties");
        Ok(response.properties)
    }

    /// Run a report against one property.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or upstream rejects the token.
    #[instrument(skip(self, access_token, request), fields(property_id = %property_id))]
    pub async fn run_report(
        &self,
        access_token: &str,
        property_id: &PropertyId,
        request: &RunReportRequest,
    ) -> Result<RunReportResponse, GoogleError> {
        let url = format!(
            "{}/v1beta/properties/{}:runReport",
            self.endpoints().analytics_data,
            urlencoding::encode(property_id.as_str())
        );
        let response: RunReportResponse = self.post_json(&url, access_token, request).await?;
        tracing::debug!(rows = response.rows.len(), "Report returned");
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_names_reduce_to_ids() {
        let account = AnalyticsAccount {
            name: "accounts/123".to_string(),
            display_name: "Main".to_string(),
        };
        let property = AnalyticsProperty {
            name: "properties/456".to_string(),
            ..AnalyticsProperty::default()
        };
        assert_eq!(account.id().as_str(), "123");
        assert_eq!(property.id().as_str(), "456");
    }

    #[test]
    fn test_property_deserializes_camel_case() {
        let property: AnalyticsProperty = serde_json::from_str(
            r#"{"name":"properties/9","displayName":"Shop","timeZone":"America/Recife","currencyCode":"BRL"}"#,
        )
        .unwrap_or_default();
        assert_eq!(property.display_name, "Shop");
        assert_eq!(property.time_zone.as_deref(), Some("America/Recife"));
        assert!(property.service_level.is_none());
    }
}
