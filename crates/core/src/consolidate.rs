//! Cross-property consolidation.
//!
//! Merges the per-property [`PropertyMarketing`] summaries of every account
//! into running totals and combined rankings.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use crate::marketing::{CountrySessions, MarketingSummary, PropertyMarketing, TrafficSource};
use crate::tally::Tally;

/// Number of entries kept in each consolidated ranking.
pub const CONSOLIDATED_LIMIT: usize = 10;

/// Running totals across every summarized property.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallTotals {
    pub total_users: u64,
    pub total_sessions: u64,
    pub total_page_views: u64,
    pub total_conversions: f64,
    pub total_revenue: f64,
}

impl OverallTotals {
    /// Fold one property's summary into the totals.
    pub fn add(&mut self, summary: &MarketingSummary) {
        self.total_users = self.total_users.saturating_add(summary.total_users);
        self.total_sessions = self.total_sessions.saturating_add(summary.total_sessions);
        self.total_page_views = self.total_page_views.saturating_add(summary.total_page_views);
        self.total_conversions += summary.total_conversions;
        self.total_revenue += summary.total_revenue;
    }

    /// Conversions per session as a percentage with two decimals.
    ///
    /// Returns `"0%"` when no sessions were recorded.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn conversion_rate(&self) -> String {
        if self.total_sessions == 0 {
            return "0%".to_string();
        }
        let rate = self.total_conversions / self.total_sessions as f64 * 100.0;
        format!("{rate:.2}%")
    }
}

/// Sum the headline totals of every property.
#[must_use]
pub fn overall_totals<'a>(properties: impl IntoIterator<Item = &'a PropertyMarketing>) -> OverallTotals {
    let mut totals = OverallTotals::default();
    for property in properties {
        totals.add(&property.summary);
    }
    totals
}

/// Merge every property's country ranking, keeping the top ten.
#[must_use]
pub fn consolidate_countries<'a>(
    properties: impl IntoIterator<Item = &'a PropertyMarketing>,
) -> Vec<CountrySessions> {
    let mut tally: Tally<u64> = Tally::new();
    for property in properties {
        for country in &property.top_countries {
            let total = tally.entry(&country.country);
            *total = total.saturating_add(country.sessions);
        }
    }

    let mut countries: Vec<CountrySessions> = tally
        .into_entries()
        .into_iter()
        .map(|(country, sessions)| CountrySessions { country, sessions })
        .collect();
    countries.sort_by_key(|c| Reverse(c.sessions));
    countries.truncate(CONSOLIDATED_LIMIT);
    countries
}

/// Merge every property's traffic sources, adding sessions and users per key.
#[must_use]
pub fn consolidate_traffic_sources<'a>(
    properties: impl IntoIterator<Item = &'a PropertyMarketing>,
) -> Vec<TrafficSource> {
    let mut tally: Tally<(u64, u64)> = Tally::new();
    for property in properties {
        for source in &property.traffic_sources {
            let entry = tally.entry(&source.source_medium);
            entry.0 = entry.0.saturating_add(source.sessions);
            entry.1 = entry.1.saturating_add(source.users);
        }
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
    sources.truncate(CONSOLIDATED_LIMIT);
    sources
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn source(key: &str, sessions: u64, users: u64) -> TrafficSource {
        TrafficSource {
            source_medium: key.to_string(),
            sessions,
            users,
        }
    }

    fn country(name: &str, sessions: u64) -> CountrySessions {
        CountrySessions {
            country: name.to_string(),
            sessions,
        }
    }

    #[test]
    fn overlapping_traffic_sources_merge_additively() {
        let a = PropertyMarketing {
            traffic_sources: vec![source("google / organic", 10, 4), source("bing / cpc", 2, 1)],
            ..PropertyMarketing::default()
        };
        let b = PropertyMarketing {
            traffic_sources: vec![source("google / organic", 5, 3)],
            ..PropertyMarketing::default()
        };

        let merged = consolidate_traffic_sources([&a, &b]);
        assert_eq!(
            merged,
            vec![source("google / organic", 15, 7), source("bing / cpc", 2, 1)]
        );
    }

    #[test]
    fn countries_merge_and_truncate() {
        let a = PropertyMarketing {
            top_countries: (0..8).map(|i| country(&format!("C{i}"), i)).collect(),
            ..PropertyMarketing::default()
        };
        let b = PropertyMarketing {
            top_countries: (4..12).map(|i| country(&format!("C{i}"), i)).collect(),
            ..PropertyMarketing::default()
        };

        let merged = consolidate_countries([&a, &b]);
        assert_eq!(merged.len(), CONSOLIDATED_LIMIT);
        assert_eq!(merged[0], country("C7", 14));
        assert_eq!(merged[1], country("C6", 12));
    }

    #[test]
    fn conversion_rate_formats_two_decimals() {
        let totals = OverallTotals {
            total_sessions: 3,
            total_conversions: 1.0,
            ..OverallTotals::default()
        };
        assert_eq!(totals.conversion_rate(), "33.33%");
        assert_eq!(OverallTotals::default().conversion_rate(), "0%");
    }

    #[test]
    fn totals_sum_property_summaries() {
        let property = |users, revenue| PropertyMarketing {
            summary: MarketingSummary {
                total_users: users,
                total_sessions: users * 2,
                total_revenue: revenue,
                ..MarketingSummary::default()
            },
            ..PropertyMarketing::default()
        };
        let properties = [property(3, 1.5), property(7, 2.5)];

        let totals = overall_totals(&properties);
        assert_eq!(totals.total_users, 10);
        assert_eq!(totals.total_sessions, 20);
        assert!((totals.total_revenue - 4.0).abs() < 1e-9);
    }

    #[test]
    fn totals_and_merges_saturate() {
        let property = PropertyMarketing {
            summary: MarketingSummary {
                total_sessions: u64::MAX,
                ..MarketingSummary::default()
            },
            top_countries: vec![country("Brazil", u64::MAX)],
            traffic_sources: vec![source("google / organic", u64::MAX, u64::MAX)],
            ..PropertyMarketing::default()
        };
        let properties = [property.clone(), property];

        assert_eq!(overall_totals(&properties).total_sessions, u64::MAX);
        assert_eq!(consolidate_countries(&properties)[0].sessions, u64::MAX);
        assert_eq!(consolidate_traffic_sources(&properties)[0].users, u64::MAX);
    }
}
