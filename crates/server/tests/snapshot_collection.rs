//! Integration tests for `collect_snapshot`.
//!
//! Every upstream is a `wiremock` server. The collection must always produce
//! a snapshot: failed sub-fetches degrade to unknown, empty or `null`.

#![allow(clippy::indexing_slicing)]

use beacon_core::snapshot::UNKNOWN_FIELD;
use beacon_server::google::{GoogleClient, GoogleEndpoints};
use beacon_server::services::collect_snapshot;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "ya29.test-token";

fn test_client(server: &MockServer) -> GoogleClient {
    let http = beacon_server::google::http_client().expect("failed to build HTTP client");
    GoogleClient::new(http, GoogleEndpoints::single_host(&server.uri()))
}

/// One marketing report row in request order: 8 dimensions, 10 metrics.
fn marketing_row(country: &str, city: &str, sessions: u64, revenue: f64) -> serde_json::Value {
    let dims = [
        "20240501", country, city, "desktop", "google", "organic", "/", "Home",
    ];
    let metrics = [
        "10".to_string(),
        "4".to_string(),
        sessions.to_string(),
        "30".to_string(),
        "62.5".to_string(),
        "0.4".to_string(),
        "2".to_string(),
        revenue.to_string(),
        "0.6".to_string(),
        "100".to_string(),
    ];
    json!({
        "dimensionValues": dims.iter().map(|v| json!({ "value": v })).collect::<Vec<_>>(),
        "metricValues": metrics.iter().map(|v| json!({ "value": v })).collect::<Vec<_>>(),
    })
}

async fn mount_error(server: &MockServer, http_method: &str, route: &str, status: u16) {
    Mock::given(method(http_method))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({
            "error": { "code": status, "message": "upstream failure" }
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn collect_snapshot_degrades_failed_fetches() {
    let server = MockServer::start().await;

    // Profile and merchant listing fail.
    mount_error(&server, "GET", "/oauth2/v1/userinfo", 500).await;
    mount_error(&server, "GET", "/content/v2.1/accounts/authinfo", 403).await;

    Mock::given(method("GET"))
        .and(path("/v1beta/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accounts": [{ "name": "accounts/100", "displayName": "Main" }]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1beta/properties"))
        .and(query_param("filter", "parent:accounts/100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "properties": [
                { "name": "properties/200", "displayName": "Web Shop", "currencyCode": "BRL" },
                { "name": "properties/300", "displayName": "Blog" }
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1beta/properties/200:runReport"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rows": [
                marketing_row("Brazil", "Sao Paulo", 40, 100.0),
                marketing_row("Brazil", "(not set)", 20, 50.5),
                marketing_row("Portugal", "Lisbon", 10, 0.0),
            ]
        })))
        .mount(&server)
        .await;

    // The second property's report fails.
    mount_error(&server, "POST", "/v1beta/properties/300:runReport", 500).await;

    let snapshot = collect_snapshot(&test_client(&server), TOKEN).await;

    assert_eq!(snapshot.user.name, UNKNOWN_FIELD);
    assert_eq!(snapshot.user.email, UNKNOWN_FIELD);
    assert!(snapshot.merchant_accounts.is_empty());

    assert_eq!(snapshot.accounts.len(), 1);
    let account = &snapshot.accounts[0];
    assert_eq!(account.account_id.as_str(), "100");
    assert_eq!(account.account_name, "Main");
    assert_eq!(account.properties.len(), 2);

    let shop = &account.properties[0];
    assert_eq!(shop.id.as_str(), "200");
    assert_eq!(shop.currency_code.as_deref(), Some("BRL"));
    let marketing = shop.marketing_data.as_ref().expect("report succeeded");
    assert_eq!(marketing.summary.total_sessions, 70);
    assert_eq!(marketing.top_countries[0].country, "Brazil");
    assert_eq!(marketing.top_countries[0].sessions, 60);
    assert!(
        marketing.top_cities.iter().all(|c| c.city != "(not set)"),
        "unset cities are excluded"
    );

    let blog = &account.properties[1];
    assert!(blog.marketing_data.is_none(), "failed report is null");

    assert_eq!(snapshot.overview.property_count, 2);
    assert_eq!(snapshot.overview.totals.total_sessions, 70);
    assert_eq!(snapshot.summarized_property_count(), 1);
    // 6 conversions over 70 sessions
    assert_eq!(snapshot.overview.overall_conversion_rate, "8.57%");
    assert_eq!(snapshot.consolidated.traffic_sources.len(), 1);
    assert_eq!(
        snapshot.consolidated.traffic_sources[0].source_medium,
        "google / organic"
    );

    let json = serde_json::to_value(&snapshot).expect("snapshot serializes");
    assert!(json["accounts"][0]["properties"][1]["marketingData"].is_null());
}

#[tokio::test]
async fn collect_snapshot_survives_every_upstream_failing() {
    let server = MockServer::start().await;

    mount_error(&server, "GET", "/oauth2/v1/userinfo", 503).await;
    mount_error(&server, "GET", "/v1beta/accounts", 503).await;
    mount_error(&server, "GET", "/content/v2.1/accounts/authinfo", 503).await;

    let snapshot = collect_snapshot(&test_client(&server), TOKEN).await;

    assert!(snapshot.accounts.is_empty());
    assert!(snapshot.merchant_accounts.is_empty());
    assert_eq!(snapshot.overview.property_count, 0);
    assert_eq!(snapshot.overview.totals.total_users, 0);
    assert_eq!(snapshot.overview.overall_conversion_rate, "0%");
    assert!(snapshot.consolidated.top_countries.is_empty());
}

#[tokio::test]
async fn collect_snapshot_includes_profile_and_merchant_accounts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/oauth2/v1/userinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "42",
            "name": "Ada Lovelace",
            "email": "ada@example.com"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1beta/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/content/v2.1/accounts/authinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accountIdentifiers": [{ "merchantId": "777" }]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/content/v2.1/accounts/777"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "777",
            "name": "Ada's Shop",
            "subaccounts": [{ "id": "778" }]
        })))
        .mount(&server)
        .await;

    let snapshot = collect_snapshot(&test_client(&server), TOKEN).await;

    assert_eq!(snapshot.user.name, "Ada Lovelace");
    assert_eq!(snapshot.user.email, "ada@example.com");
    assert_eq!(snapshot.user_slug(), "Ada_Lovelace");
    assert_eq!(snapshot.merchant_accounts.len(), 1);
    assert_eq!(snapshot.merchant_accounts[0].name, "Ada's Shop");
    assert!(snapshot.merchant_accounts[0].is_mca, "sub-accounts make an MCA");
}
