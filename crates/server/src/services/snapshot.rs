//! Account snapshot collection.
//!
//! Fans out to the profile, analytics and merchant APIs and assembles an
//! [`AccountSnapshot`]. Collection is fail-soft: every sub-fetch that fails
//! is logged and replaced by an empty or `null` result, so a snapshot is
//! always produced.

use beacon_core::marketing::summarize_property;
use beacon_core::report::RunReportRequest;
use beacon_core::snapshot::{AccountSnapshot, AccountSummary, PropertySnapshot, SnapshotUser};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::instrument;

use crate::google::{AnalyticsAccount, AnalyticsProperty, GoogleClient};

/// Property reports of one account fetched at once.
const MAX_CONCURRENT_REPORTS: usize = 8;

/// Collect the aggregate snapshot for the token's owner.
///
/// The profile, the analytics account list and the merchant account list are
/// fetched concurrently. Accounts are then walked one after another, with
/// the marketing reports of one account's properties fetched concurrently
/// (in property order).
#[instrument(skip_all)]
pub async fn collect_snapshot(google: &GoogleClient, access_token: &str) -> AccountSnapshot {
    let (profile, accounts, merchant_accounts) = tokio::join!(
        google.user_profile(access_token),
        google.list_accounts(access_token),
        google.list_merchant_accounts(access_token),
    );

    let user = match profile {
        Ok(profile) => SnapshotUser::new(profile.name.as_deref(), profile.email.as_deref()),
        Err(e) => {
            tracing::warn!(error = %e, "User profile unavailable");
            SnapshotUser::unknown()
        }
    };

    let accounts = accounts.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Analytics accounts unavailable");
        Vec::new()
    });

    let merchant_accounts = merchant_accounts.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Merchant accounts unavailable");
        Vec::new()
    });

    let mut summaries = Vec::with_capacity(accounts.len());
    for account in accounts {
        summaries.push(collect_account(google, access_token, account).await);
    }

    let snapshot = AccountSnapshot::assemble(Utc::now(), user, summaries, merchant_accounts);
    tracing::info!(
        accounts = snapshot.accounts.len(),
        properties = snapshot.overview.property_count,
        summarized = snapshot.summarized_property_count(),
        merchant_accounts = snapshot.merchant_accounts.len(),
        "Account snapshot collected"
    );
    snapshot
}

async fn collect_account(
    google: &GoogleClient,
    access_token: &str,
    account: AnalyticsAccount,
) -> AccountSummary {
    let account_id = account.id();

    let properties = match google.list_properties(access_token, &account_id).await {
        Ok(properties) => properties,
        Err(e) => {
            tracing::warn!(account_id = %account_id, error = %e, "Properties unavailable");
            Vec::new()
        }
    };

    let properties: Vec<PropertySnapshot> = stream::iter(properties)
        .map(|property| collect_property(google, access_token, property))
        .buffered(MAX_CONCURRENT_REPORTS)
        .collect()
        .await;

    AccountSummary {
        account_id,
        account_name: account.display_name,
        properties,
    }
}

async fn collect_property(
    google: &GoogleClient,
    access_token: &str,
    property: AnalyticsProperty,
) -> PropertySnapshot {
    let id = property.id();
    let request = RunReportRequest::marketing();

    let marketing_data = match google.run_report(access_token, &id, &request).await {
        Ok(report) => Some(summarize_property(&report.rows)),
        Err(e) => {
            tracing::warn!(property_id = %id, error = %e, "Marketing report unavailable");
            None
        }
    };

    PropertySnapshot {
        id,
        display_name: property.display_name,
        create_time: property.create_time,
        update_time: property.update_time,
        time_zone: property.time_zone,
        currency_code: property.currency_code,
        industry_category: property.industry_category,
        service_level: property.service_level,
        marketing_data,
    }
}
