//! Per-property marketing summaries.
//!
//! Turns the flat rows of the thirty-day marketing report (see
//! [`RunReportRequest::marketing`](crate::report::RunReportRequest::marketing))
//! into a [`PropertyMarketing`] document: headline totals, top-N rankings,
//! a device breakdown and a daily trend.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use crate::report::ReportRow;
use crate::tally::Tally;

/// Number of countries kept in a property's country ranking.
pub const TOP_COUNTRIES_LIMIT: usize = 10;
/// Number of cities kept in a property's city ranking.
pub const TOP_CITIES_LIMIT: usize = 10;
/// Number of source/medium pairs kept in a property's traffic ranking.
pub const TRAFFIC_SOURCES_LIMIT: usize = 15;
/// Number of pages kept in a property's page ranking.
pub const TOP_PAGES_LIMIT: usize = 15;

/// Placeholder the reporting API uses for an unknown dimension value.
pub const UNSET_DIMENSION: &str = "(not set)";

/// One marketing report row decoded by position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketingRow {
    pub date: String,
    pub country: String,
    pub city: String,
    pub device_category: String,
    pub source: String,
    pub medium: String,
    pub page_path: String,
    pub page_title: String,
    pub active_users: u64,
    pub new_users: u64,
    pub sessions: u64,
    pub page_views: u64,
    pub avg_session_duration: f64,
    pub bounce_rate: f64,
    pub conversions: f64,
    pub revenue: f64,
    pub engagement_rate: f64,
}

impl MarketingRow {
    /// Decode a row laid out as [`MARKETING_DIMENSIONS`](crate::report::MARKETING_DIMENSIONS)
    /// and [`MARKETING_METRICS`](crate::report::MARKETING_METRICS).
    #[must_use]
    pub fn from_row(row: &ReportRow) -> Self {
        Self {
            date: row.dimension(0).to_string(),
            country: row.dimension(1).to_string(),
            city: row.dimension(2).to_string(),
            device_category: row.dimension(3).to_string(),
            source: row.dimension(4).to_string(),
            medium: row.dimension(5).to_string(),
            page_path: row.dimension(6).to_string(),
            page_title: row.dimension(7).to_string(),
            active_users: row.count(0),
            new_users: row.count(1),
            sessions: row.count(2),
            page_views: row.count(3),
            avg_session_duration: row.metric(4),
            bounce_rate: row.metric(5),
            conversions: row.metric(6),
            revenue: row.metric(7),
            engagement_rate: row.metric(8),
        }
    }

    /// Traffic source key, `"{source} / {medium}"`.
    #[must_use]
    pub fn source_medium(&self) -> String {
        format!("{} / {}", self.source, self.medium)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Summary Types
// ─────────────────────────────────────────────────────────────────────────────

/// Headline totals for one property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketingSummary {
    pub total_users: u64,
    pub total_new_users: u64,
    pub total_sessions: u64,
    pub total_page_views: u64,
    pub total_conversions: f64,
    pub total_revenue: f64,
    /// Mean of the per-row average session duration, in seconds.
    pub avg_session_duration: f64,
    pub avg_bounce_rate: f64,
    pub avg_engagement_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountrySessions {
    pub country: String,
    pub sessions: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitySessions {
    pub city: String,
    pub sessions: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSessions {
    pub device: String,
    pub sessions: u64,
}

/// Sessions and users for one `source / medium` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficSource {
    pub source_medium: String,
    pub sessions: u64,
    pub users: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageViews {
    pub page_path: String,
    pub page_views: u64,
    pub page_title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTrend {
    pub date: String,
    pub users: u64,
    pub sessions: u64,
    pub page_views: u64,
}

/// Everything derived from one property's marketing report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyMarketing {
    pub summary: MarketingSummary,
    pub top_countries: Vec<CountrySessions>,
    pub top_cities: Vec<CitySessions>,
    pub device_breakdown: Vec<DeviceSessions>,
    pub traffic_sources: Vec<TrafficSource>,
    pub top_pages: Vec<PageViews>,
    pub daily_trend: Vec<DailyTrend>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Reshaping
// ─────────────────────────────────────────────────────────────────────────────

/// Summarize one property's marketing report rows.
///
/// An empty row set yields zeroed totals and empty lists.
#[must_use]
pub fn summarize_property(rows: &[ReportRow]) -> PropertyMarketing {
    let rows: Vec<MarketingRow> = rows.iter().map(MarketingRow::from_row).collect();

    PropertyMarketing {
        summary: summarize_totals(&rows),
        top_countries: top_countries(&rows),
        top_cities: top_cities(&rows),
        device_breakdown: device_breakdown(&rows),
        traffic_sources: traffic_sources(&rows),
        top_pages: top_pages(&rows),
        daily_trend: daily_trend(&rows),
    }
}

#[allow(clippy::cast_precision_loss)] // row counts stay far below 2^52
fn summarize_totals(rows: &[MarketingRow]) -> MarketingSummary {
    let mean = |pick: fn(&MarketingRow) -> f64| {
        if rows.is_empty() {
            0.0
        } else {
            rows.iter().map(pick).sum::<f64>() / rows.len() as f64
        }
    };

    MarketingSummary {
        total_users: sum_counts(rows.iter().map(|r| r.active_users)),
        total_new_users: sum_counts(rows.iter().map(|r| r.new_users)),
        total_sessions: sum_counts(rows.iter().map(|r| r.sessions)),
        total_page_views: sum_counts(rows.iter().map(|r| r.page_views)),
        total_conversions: rows.iter().map(|r| r.conversions).sum(),
        total_revenue: rows.iter().map(|r| r.revenue).sum(),
        avg_session_duration: mean(|r| r.avg_session_duration),
        avg_bounce_rate: mean(|r| r.bounce_rate),
        avg_engagement_rate: mean(|r| r.engagement_rate),
    }
}

/// Counts saturate rather than overflow on absurd upstream values.
fn sum_counts(counts: impl Iterator<Item = u64>) -> u64 {
    counts.fold(0, u64::saturating_add)
}

/// Sum sessions per key, rank descending, keep `limit`.
fn rank_sessions<'a>(
    keys_and_sessions: impl Iterator<Item = (&'a str, u64)>,
    limit: usize,
) -> Vec<(String, u64)> {
    let mut tally: Tally<u64> = Tally::new();
    for (key, sessions) in keys_and_sessions {
        let total = tally.entry(key);
        *total = total.saturating_add(sessions);
    }

    let mut ranked = tally.into_entries();
    ranked.sort_by_key(|(_, sessions)| Reverse(*sessions));
    ranked.truncate(limit);
    ranked
}

fn top_countries(rows: &[MarketingRow]) -> Vec<CountrySessions> {
    rank_sessions(
        rows.iter().map(|r| (r.country.as_str(), r.sessions)),
        TOP_COUNTRIES_LIMIT,
    )
    .into_iter()
    .map(|(country, sessions)| CountrySessions { country, sessions })
    .collect()
}

fn top_cities(rows: &[MarketingRow]) -> Vec<CitySessions> {
    rank_sessions(
        rows.iter()
            .filter(|r| !r.city.is_empty() && r.city != UNSET_DIMENSION)
            .map(|r| (r.city.as_str(), r.sessions)),
        TOP_CITIES_LIMIT,
    )
    .into_iter()
    .map(|(city, sessions)| CitySessions { city, sessions })
    .collect()
}

fn device_breakdown(rows: &[MarketingRow]) -> Vec<DeviceSessions> {
    let mut tally: Tally<u64> = Tally::new();
    for row in rows {
        let total = tally.entry(&row.device_category);
        *total = total.saturating_add(row.sessions);
    }

    tally
        .into_entries()
        .into_iter()
        .map(|(device, sessions)| DeviceSessions { device, sessions })
        .collect()
}

fn traffic_sources(rows: &[MarketingRow]) -> Vec<TrafficSource> {
    let mut tally: Tally<(u64, u64)> = Tally::new();
    for row in rows {
        let entry = tally.entry(&row.source_medium());
        entry.0 = entry.0.saturating_add(row.sessions);
        entry.1 = entry.1.saturating_add(row.active_users);
    }

    let mut sources: Vec<TrafficSource> = tally
        .into_entries()
        .into_iter()
        .map(|(source_medium, (sessions, users))| TrafficSource {
            source_medium,
            sessions,
            users,
        })
        .collect();
    sources.sort_by_key(|s| Reverse(s.sessions));
    sources.truncate(TRAFFIC_SOURCES_LIMIT);
    sources
}

fn top_pages(rows: &[MarketingRow]) -> Vec<PageViews> {
    let mut tally: Tally<(u64, String)> = Tally::new();
    for row in rows {
        let entry = tally.entry_with(&row.page_path, || (0, row.page_title.clone()));
        entry.0 = entry.0.saturating_add(row.page_views);
    }

    let mut pages: Vec<PageViews> = tally
        .into_entries()
        .into_iter()
        .map(|(page_path, (page_views, page_title))| PageViews {
            page_path,
            page_views,
            page_title,
        })
        .collect();
    pages.sort_by_key(|p| Reverse(p.page_views));
    pages.truncate(TOP_PAGES_LIMIT);
    pages
}

fn daily_trend(rows: &[MarketingRow]) -> Vec<DailyTrend> {
    let mut tally: Tally<DailyTrend> = Tally::new();
    for row in rows {
        let day = tally.entry(&row.date);
        day.users = day.users.saturating_add(row.active_users);
        day.sessions = day.sessions.saturating_add(row.sessions);
        day.page_views = day.page_views.saturating_add(row.page_views);
    }

    let mut trend: Vec<DailyTrend> = tally
        .into_entries()
        .into_iter()
        .map(|(date, day)| DailyTrend { date, ..day })
        .collect();
    trend.sort_by(|a, b| a.date.cmp(&b.date));
    trend
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    /// Marketing row with the interesting fields set and the rest zeroed.
    fn row(date: &str, country: &str, city: &str, sessions: u64, users: u64) -> ReportRow {
        let sessions = sessions.to_string();
        let users = users.to_string();
        ReportRow::new(
            &[date, country, city, "desktop", "google", "organic", "/", "Home"],
            &[&users, "0", &sessions, "1", "30", "0.5", "0", "0", "0.6", "3"],
        )
    }

    #[test]
    fn empty_rows_yield_zeroed_summary() {
        let marketing = summarize_property(&[]);
        assert_eq!(marketing, PropertyMarketing::default());
        assert_eq!(marketing.summary.total_sessions, 0);
        assert!(marketing.summary.avg_bounce_rate.abs() < f64::EPSILON);
        assert!(marketing.top_countries.is_empty());
        assert!(marketing.daily_trend.is_empty());
    }

    #[test]
    fn countries_are_summed_sorted_and_truncated() {
        let mut rows = Vec::new();
        for i in 0..12_u64 {
            rows.push(row("20240101", &format!("Country{i}"), "X", i + 1, 1));
        }
        rows.push(row("20240102", "Country0", "X", 100, 1));

        let marketing = summarize_property(&rows);
        assert_eq!(marketing.top_countries.len(), TOP_COUNTRIES_LIMIT);
        assert_eq!(marketing.top_countries[0].country, "Country0");
        assert_eq!(marketing.top_countries[0].sessions, 101);
        assert_eq!(marketing.top_countries[1].country, "Country11");
        assert_eq!(marketing.top_countries[1].sessions, 12);
        assert!(
            marketing
                .top_countries
                .windows(2)
                .all(|w| w[0].sessions >= w[1].sessions)
        );
    }

    #[test]
    fn unset_and_empty_cities_are_excluded() {
        let rows = vec![
            row("20240101", "Brazil", "(not set)", 50, 1),
            row("20240101", "Brazil", "", 40, 1),
            row("20240101", "Brazil", "Recife", 10, 1),
        ];

        let marketing = summarize_property(&rows);
        assert_eq!(
            marketing.top_cities,
            vec![CitySessions {
                city: "Recife".to_string(),
                sessions: 10
            }]
        );
        assert_eq!(marketing.top_countries[0].sessions, 100);
    }

    #[test]
    fn daily_trend_is_sorted_ascending() {
        let rows = vec![
            row("20240103", "Brazil", "Recife", 1, 1),
            row("20240101", "Brazil", "Recife", 2, 2),
            row("20240103", "Chile", "Santiago", 4, 4),
            row("20240102", "Brazil", "Recife", 3, 3),
        ];

        let trend = summarize_property(&rows).daily_trend;
        let dates: Vec<&str> = trend.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, vec!["20240101", "20240102", "20240103"]);
        assert_eq!(trend[2].sessions, 5);
        assert_eq!(trend[2].users, 5);
    }

    #[test]
    fn traffic_sources_merge_sessions_and_users() {
        let rows = vec![
            ReportRow::new(
                &["20240101", "BR", "A", "mobile", "google", "cpc", "/", "Home"],
                &["3", "0", "5", "0"],
            ),
            ReportRow::new(
                &["20240102", "BR", "A", "mobile", "google", "cpc", "/", "Home"],
                &["2", "0", "7", "0"],
            ),
            ReportRow::new(
                &["20240102", "BR", "A", "mobile", "(direct)", "(none)", "/", "Home"],
                &["1", "0", "20", "0"],
            ),
        ];

        let sources = summarize_property(&rows).traffic_sources;
        assert_eq!(sources[0].source_medium, "(direct) / (none)");
        assert_eq!(sources[1].source_medium, "google / cpc");
        assert_eq!(sources[1].sessions, 12);
        assert_eq!(sources[1].users, 5);
    }

    #[test]
    fn pages_keep_first_title_and_device_order() {
        let rows = vec![
            ReportRow::new(
                &["d", "c", "x", "tablet", "s", "m", "/pricing", "Pricing"],
                &["0", "0", "1", "4"],
            ),
            ReportRow::new(
                &["d", "c", "x", "desktop", "s", "m", "/pricing", "Pricing (old)"],
                &["0", "0", "9", "6"],
            ),
        ];

        let marketing = summarize_property(&rows);
        assert_eq!(marketing.top_pages[0].page_title, "Pricing");
        assert_eq!(marketing.top_pages[0].page_views, 10);
        let devices: Vec<&str> = marketing
            .device_breakdown
            .iter()
            .map(|d| d.device.as_str())
            .collect();
        assert_eq!(devices, vec!["tablet", "desktop"]);
    }

    #[test]
    fn summary_averages_over_rows() {
        let rows = vec![
            ReportRow::new(&[], &["1", "1", "1", "1", "10", "0.2", "1", "9.5", "0.4"]),
            ReportRow::new(&[], &["1", "0", "1", "1", "30", "0.4", "2", "0.5", "0.8"]),
        ];

        let summary = summarize_property(&rows).summary;
        assert_eq!(summary.total_users, 2);
        assert_eq!(summary.total_new_users, 1);
        assert!((summary.total_revenue - 10.0).abs() < 1e-9);
        assert!((summary.total_conversions - 3.0).abs() < 1e-9);
        assert!((summary.avg_session_duration - 20.0).abs() < 1e-9);
        assert!((summary.avg_bounce_rate - 0.3).abs() < 1e-9);
        assert!((summary.avg_engagement_rate - 0.6).abs() < 1e-9);
    }

    #[test]
    fn huge_counts_saturate_instead_of_overflowing() {
        let huge = ReportRow::new(
            &["20240101", "Brazil", "Rio", "desktop", "google", "organic", "/", "Home"],
            &["1e300", "1e300", "1e300", "1e300", "0", "0", "0", "0", "0", "0"],
        );
        let marketing = summarize_property(&[huge.clone(), huge]);

        assert_eq!(marketing.summary.total_sessions, u64::MAX);
        assert_eq!(marketing.summary.total_users, u64::MAX);
        assert_eq!(marketing.summary.total_page_views, u64::MAX);
        assert_eq!(marketing.top_countries[0].sessions, u64::MAX);
        assert_eq!(marketing.top_cities[0].sessions, u64::MAX);
        assert_eq!(marketing.device_breakdown[0].sessions, u64::MAX);
        assert_eq!(marketing.traffic_sources[0].users, u64::MAX);
        assert_eq!(marketing.top_pages[0].page_views, u64::MAX);
        assert_eq!(marketing.daily_trend[0].sessions, u64::MAX);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let marketing = summarize_property(&[row("20240101", "Brazil", "Recife", 1, 1)]);
        let json = serde_json::to_value(&marketing).unwrap_or_default();
        assert!(json["summary"].get("totalSessions").is_some());
        assert_eq!(json["trafficSources"][0]["sourceMedium"], "google / organic");
        assert_eq!(json["dailyTrend"][0]["pageViews"], 1);
    }
}
