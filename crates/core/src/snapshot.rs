//! Aggregate account snapshot.
//!
//! The snapshot is the full nested document produced after login: who the
//! user is, every analytics account with its properties and their marketing
//! summaries, the merchant accounts, and the cross-property consolidation.
//! It is cached in the session, persisted as pretty-printed JSON, and offered
//! as a download.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::consolidate::{
    OverallTotals, consolidate_countries, consolidate_traffic_sources, overall_totals,
};
use crate::marketing::{CountrySessions, PropertyMarketing, TrafficSource};
use crate::types::{AccountId, PropertyId};

/// Period label written into the snapshot metadata.
pub const SNAPSHOT_PERIOD: &str = "Last 30 days";

/// Description written into the snapshot metadata.
pub const SNAPSHOT_DESCRIPTION: &str = "Marketing and performance data - Google Analytics";

/// Stand-in for unknown profile fields.
pub const UNKNOWN_FIELD: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSnapshot {
    pub metadata: SnapshotMetadata,
    pub overview: SnapshotOverview,
    pub user: SnapshotUser,
    pub accounts: Vec<AccountSummary>,
    #[serde(default)]
    pub merchant_accounts: Vec<MerchantAccount>,
    pub consolidated: ConsolidatedData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetadata {
    pub data_collected_at: DateTime<Utc>,
    pub period: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotOverview {
    #[serde(flatten)]
    pub totals: OverallTotals,
    pub property_count: usize,
    pub overall_conversion_rate: String,
}

/// Profile of the signed-in user. Unknown fields read `"N/A"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotUser {
    pub name: String,
    pub email: String,
}

impl SnapshotUser {
    #[must_use]
    pub fn new(name: Option<&str>, email: Option<&str>) -> Self {
        let or_unknown = |value: Option<&str>| {
            value
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(UNKNOWN_FIELD)
                .to_string()
        };
        Self {
            name: or_unknown(name),
            email: or_unknown(email),
        }
    }

    /// A user whose profile could not be fetched.
    #[must_use]
    pub fn unknown() -> Self {
        Self::new(None, None)
    }

    fn known_name(&self) -> Option<&str> {
        known(&self.name)
    }

    fn known_email(&self) -> Option<&str> {
        known(&self.email)
    }
}

fn known(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty() && value != UNKNOWN_FIELD).then_some(value)
}

/// One analytics account and its properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub account_id: AccountId,
    pub account_name: String,
    pub properties: Vec<PropertySnapshot>,
}

/// One analytics property with its marketing summary.
///
/// `marketing_data` is `None` when the property's report could not be fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySnapshot {
    pub id: PropertyId,
    pub display_name: String,
    pub create_time: Option<String>,
    pub update_time: Option<String>,
    pub time_zone: Option<String>,
    pub currency_code: Option<String>,
    pub industry_category: Option<String>,
    pub service_level: Option<String>,
    pub marketing_data: Option<PropertyMarketing>,
}

/// A merchant-catalog account as listed for the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantAccount {
    pub id: String,
    pub name: String,
    /// Multi-client (aggregator) account.
    #[serde(rename = "isMCA")]
    pub is_mca: bool,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default)]
    pub business_information: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedData {
    pub top_countries: Vec<CountrySessions>,
    pub traffic_sources: Vec<TrafficSource>,
}

impl AccountSnapshot {
    /// Build the snapshot, computing the overview and the consolidated lists
    /// from every property that carries marketing data.
    #[must_use]
    pub fn assemble(
        collected_at: DateTime<Utc>,
        user: SnapshotUser,
        accounts: Vec<AccountSummary>,
        merchant_accounts: Vec<MerchantAccount>,
    ) -> Self {
        let summarized: Vec<&PropertyMarketing> = accounts
            .iter()
            .flat_map(|account| &account.properties)
            .filter_map(|property| property.marketing_data.as_ref())
            .collect();

        let totals = overall_totals(summarized.iter().copied());
        let consolidated = ConsolidatedData {
            top_countries: consolidate_countries(summarized.iter().copied()),
            traffic_sources: consolidate_traffic_sources(summarized.iter().copied()),
        };
        let property_count = accounts.iter().map(|a| a.properties.len()).sum();

        Self {
            metadata: SnapshotMetadata {
                data_collected_at: collected_at,
                period: SNAPSHOT_PERIOD.to_string(),
                description: SNAPSHOT_DESCRIPTION.to_string(),
            },
            overview: SnapshotOverview {
                totals,
                property_count,
                overall_conversion_rate: totals.conversion_rate(),
            },
            user,
            accounts,
            merchant_accounts,
            consolidated,
        }
    }

    /// File-name-safe identifier for the snapshot's user.
    ///
    /// The profile name with whitespace runs replaced by `_`, else the local
    /// part of the e-mail address, else `unknown`.
    #[must_use]
    pub fn user_slug(&self) -> String {
        let raw = if let Some(name) = self.user.known_name() {
            name.split_whitespace().collect::<Vec<_>>().join("_")
        } else if let Some(local) = self
            .user
            .known_email()
            .and_then(|email| email.split('@').next())
            .filter(|local| !local.is_empty())
        {
            local.to_string()
        } else {
            return "unknown".to_string();
        };

        raw.chars()
            .map(|c| {
                if c.is_alphanumeric() || matches!(c, '_' | '-' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }

    /// Name of the persisted snapshot file, `account_{user}_{timestamp}.json`.
    #[must_use]
    pub fn file_name(&self, at: DateTime<Utc>) -> String {
        let timestamp = at
            .to_rfc3339_opts(SecondsFormat::Millis, true)
            .replace([':', '.'], "-");
        format!("account_{}_{timestamp}.json", self.user_slug())
    }

    /// Name offered for the download, `account_data_{user}_{YYYY-MM-DD}.json`.
    #[must_use]
    pub fn download_file_name(&self, date: NaiveDate) -> String {
        format!(
            "account_data_{}_{}.json",
            self.user_slug(),
            date.format("%Y-%m-%d")
        )
    }

    /// Number of properties whose marketing report was collected.
    #[must_use]
    pub fn summarized_property_count(&self) -> usize {
        self.accounts
            .iter()
            .flat_map(|a| &a.properties)
            .filter(|p| p.marketing_data.is_some())
            .count()
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::marketing::MarketingSummary;

    fn property(id: &str, marketing: Option<PropertyMarketing>) -> PropertySnapshot {
        PropertySnapshot {
            id: PropertyId::new(id),
            display_name: format!("Property {id}"),
            create_time: None,
            update_time: None,
            time_zone: Some("America/Recife".to_string()),
            currency_code: Some("BRL".to_string()),
            industry_category: None,
            service_level: None,
            marketing_data: marketing,
        }
    }

    fn marketing(sessions: u64, conversions: f64) -> PropertyMarketing {
        PropertyMarketing {
            summary: MarketingSummary {
                total_users: sessions / 2,
                total_sessions: sessions,
                total_conversions: conversions,
                ..MarketingSummary::default()
            },
            top_countries: vec![CountrySessions {
                country: "Brazil".to_string(),
                sessions,
            }],
            ..PropertyMarketing::default()
        }
    }

    fn snapshot(user: SnapshotUser) -> AccountSnapshot {
        let accounts = vec![AccountSummary {
            account_id: AccountId::new("1"),
            account_name: "Main".to_string(),
            properties: vec![
                property("10", Some(marketing(100, 4.0))),
                property("11", None),
                property("12", Some(marketing(300, 4.0))),
            ],
        }];
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).single().unwrap_or_default();
        AccountSnapshot::assemble(at, user, accounts, Vec::new())
    }

    #[test]
    fn assemble_skips_failed_properties_in_totals() {
        let snapshot = snapshot(SnapshotUser::unknown());
        assert_eq!(snapshot.overview.property_count, 3);
        assert_eq!(snapshot.summarized_property_count(), 2);
        assert_eq!(snapshot.overview.totals.total_sessions, 400);
        assert_eq!(snapshot.overview.overall_conversion_rate, "2.00%");
        assert_eq!(snapshot.consolidated.top_countries[0].sessions, 400);
        assert_eq!(snapshot.user.email, "N/A");
    }

    #[test]
    fn overview_flattens_totals() {
        let json = serde_json::to_value(snapshot(SnapshotUser::unknown())).unwrap_or_default();
        assert_eq!(json["overview"]["totalSessions"], 400);
        assert_eq!(json["overview"]["propertyCount"], 3);
        assert!(json["accounts"][0]["properties"][1]["marketingData"].is_null());
        assert_eq!(json["metadata"]["period"], SNAPSHOT_PERIOD);
    }

    #[test]
    fn slug_prefers_name_then_email() {
        let named = snapshot(SnapshotUser::new(Some("Ana  Maria Souza"), Some("ana@x.io")));
        assert_eq!(named.user_slug(), "Ana_Maria_Souza");

        let email_only = snapshot(SnapshotUser::new(None, Some("ana.souza@x.io")));
        assert_eq!(email_only.user_slug(), "ana.souza");

        assert_eq!(snapshot(SnapshotUser::unknown()).user_slug(), "unknown");
    }

    #[test]
    fn slug_replaces_path_characters() {
        let sneaky = snapshot(SnapshotUser::new(Some("../etc/passwd"), None));
        assert!(!sneaky.user_slug().contains('/'));
    }

    #[test]
    fn file_names_embed_slug_and_time() {
        let snap = snapshot(SnapshotUser::new(Some("Ana Souza"), None));
        let at = Utc
            .with_ymd_and_hms(2024, 3, 5, 14, 7, 9)
            .single()
            .unwrap_or_default();
        assert_eq!(
            snap.file_name(at),
            "account_Ana_Souza_2024-03-05T14-07-09-000Z.json"
        );

        let day = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap_or_default();
        assert_eq!(
            snap.download_file_name(day),
            "account_data_Ana_Souza_2024-03-05.json"
        );
    }
}
