//! Content API for Shopping (Merchant Center) calls.

use beacon_core::MerchantId;
use beacon_core::snapshot::MerchantAccount;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{GoogleClient, GoogleError};

/// Products requested per page (the API maximum).
pub const PRODUCTS_PAGE_SIZE: u32 = 250;

/// Account detail lookups in flight at once.
const MAX_CONCURRENT_LOOKUPS: usize = 8;

/// A 64-bit identifier that arrives either as a JSON string or a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlexibleId {
    Text(String),
    Number(u64),
}

impl FlexibleId {
    /// The identifier as a string, `None` when blank.
    #[must_use]
    pub fn into_non_empty(self) -> Option<String> {
        let value = match self {
            Self::Text(text) => text.trim().to_string(),
            Self::Number(number) => number.to_string(),
        };
        (!value.is_empty()).then_some(value)
    }
}

/// One entry of `accounts/authinfo`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountIdentifier {
    pub merchant_id: Option<FlexibleId>,
    pub aggregator_id: Option<FlexibleId>,
}

impl AccountIdentifier {
    /// The ID to look up: the aggregator when present, else the merchant.
    fn lookup_id(&self) -> Option<String> {
        self.aggregator_id
            .clone()
            .and_then(FlexibleId::into_non_empty)
            .or_else(|| self.merchant_id.clone().and_then(FlexibleId::into_non_empty))
    }

    fn is_aggregator(&self) -> bool {
        self.aggregator_id
            .clone()
            .and_then(FlexibleId::into_non_empty)
            .is_some()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthInfoResponse {
    #[serde(default)]
    account_identifiers: Vec<AccountIdentifier>,
}

/// `accounts/{id}` resource, fields Beacon reads.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantAccountDetail {
    pub id: Option<FlexibleId>,
    pub name: Option<String>,
    pub website_url: Option<String>,
    pub business_information: Option<serde_json::Value>,
    #[serde(default)]
    pub subaccounts: Vec<serde_json::Value>,
}

/// One page of `products`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductsPage {
    #[serde(default)]
    pub resources: Vec<serde_json::Value>,
    pub next_page_token: Option<String>,
}

impl GoogleClient {
    /// List the merchant accounts the token can access, with details.
    ///
    /// A failed detail lookup does not fail the listing: the account is
    /// returned with a placeholder name instead.
    ///
    /// # Errors
    ///
    /// Returns an error if the `authinfo` call fails.
    #[instrument(skip_all)]
    pub async fn list_merchant_accounts(
        &self,
        access_token: &str,
    ) -> Result<Vec<MerchantAccount>, GoogleError> {
        let url = format!("{}/content/v2.1/accounts/authinfo", self.endpoints().content);
        let auth_info: AuthInfoResponse = self.get_json(&url, access_token, &[]).await?;

        let lookups = auth_info
            .account_identifiers
            .into_iter()
            .filter_map(|identifier| {
                let id = identifier.lookup_id()?;
                Some(self.describe_merchant_account(access_token, id, identifier.is_aggregator()))
            });

        let accounts: Vec<MerchantAccount> = stream::iter(lookups)
            .buffered(MAX_CONCURRENT_LOOKUPS)
            .collect()
            .await;
        tracing::debug!(count = accounts.len(), "Listed merchant accounts");
        Ok(accounts)
    }

    async fn describe_merchant_account(
        &self,
        access_token: &str,
        id: String,
        is_aggregator: bool,
    ) -> MerchantAccount {
        match self
            .get_merchant_account(access_token, &MerchantId::new(id.clone()))
            .await
        {
            Ok(detail) => {
                let detail_id = detail
                    .id
                    .and_then(FlexibleId::into_non_empty)
                    .unwrap_or(id);
                MerchantAccount {
                    name: detail
                        .name
                        .filter(|name| !name.is_empty())
                        .unwrap_or_else(|| format!("Account {detail_id}")),
                    id: detail_id,
                    is_mca: is_aggregator || !detail.subaccounts.is_empty(),
                    website_url: detail.website_url,
                    business_information: detail.business_information,
                }
            }
            Err(e) => {
                tracing::warn!(merchant_id = %id, error = %e, "Merchant account details unavailable");
                MerchantAccount {
                    name: format!("Account {id} (details unavailable)"),
                    id,
                    is_mca: is_aggregator,
                    website_url: None,
                    business_information: None,
                }
            }
        }
    }

    /// Fetch one merchant account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or upstream rejects the token.
    #[instrument(skip(self, access_token), fields(merchant_id = %merchant_id))]
    pub async fn get_merchant_account(
        &self,
        access_token: &str,
        merchant_id: &MerchantId,
    ) -> Result<MerchantAccountDetail, GoogleError> {
        let url = format!(
            "{}/content/v2.1/accounts/{}",
            self.endpoints().content,
            urlencoding::encode(merchant_id.as_str())
        );
        self.get_json(&url, access_token, &[]).await
    }

    /// Fetch one page of a merchant's products.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or upstream rejects the token.
    pub async fn list_products_page(
        &self,
        access_token: &str,
        merchant_id: &MerchantId,
        page_token: Option<&str>,
    ) -> Result<ProductsPage, GoogleError> {
        let url = format!("{}/content/v2.1/products", self.endpoints().content);
        let page_size = PRODUCTS_PAGE_SIZE.to_string();
        let mut query = vec![
            ("merchantId", merchant_id.as_str()),
            ("maxResults", page_size.as_str()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        self.get_json(&url, access_token, &query).await
    }

    /// Fetch every product of a merchant, following `nextPageToken`.
    ///
    /// # Errors
    ///
    /// Returns the first page error; products from earlier pages are dropped.
    #[instrument(skip(self, access_token), fields(merchant_id = %merchant_id))]
    pub async fn list_all_products(
        &self,
        access_token: &str,
        merchant_id: &MerchantId,
    ) -> Result<Vec<serde_json::Value>, GoogleError> {
        let mut products = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0_u32;

        loop {
            let page = self
                .list_products_page(access_token, merchant_id, page_token.as_deref())
                .await?;
            pages += 1;
            products.extend(page.resources);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::info!(pages, total = products.len(), "Fetched merchant products");
        Ok(products)
    }
}
