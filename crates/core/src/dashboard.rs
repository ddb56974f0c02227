//! Single-property dashboard report.

use serde::{Deserialize, Serialize};

use crate::report::ReportRow;

/// Payload of `/api/dashboard-data`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub main_report: Vec<DashboardRow>,
}

/// One dashboard report row, decoded by the dashboard layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardRow {
    pub date: String,
    pub device_category: String,
    pub country: String,
    pub city: String,
    pub page_path: String,
    pub session_source: String,
    pub session_medium: String,
    pub metrics: DashboardMetrics,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub active_users: u64,
    pub new_users: u64,
    pub sessions: u64,
    pub screen_page_views: u64,
    pub average_session_duration: f64,
    pub bounce_rate: f64,
    pub conversions: f64,
    pub total_revenue: f64,
    pub engaged_sessions: u64,
    pub engagement_rate: f64,
}

impl DashboardRow {
    /// Decode a row laid out as [`DASHBOARD_DIMENSIONS`](crate::report::DASHBOARD_DIMENSIONS)
    /// and [`DASHBOARD_METRICS`](crate::report::DASHBOARD_METRICS).
    #[must_use]
    pub fn from_row(row: &ReportRow) -> Self {
        Self {
            date: row.dimension(0).to_string(),
            device_category: row.dimension(1).to_string(),
            country: row.dimension(2).to_string(),
            city: row.dimension(3).to_string(),
            page_path: row.dimension(4).to_string(),
            session_source: row.dimension(5).to_string(),
            session_medium: row.dimension(6).to_string(),
            metrics: DashboardMetrics {
                active_users: row.count(0),
                new_users: row.count(1),
                sessions: row.count(2),
                screen_page_views: row.count(3),
                average_session_duration: row.metric(4),
                bounce_rate: row.metric(5),
                conversions: row.metric(6),
                total_revenue: row.metric(7),
                engaged_sessions: row.count(8),
                engagement_rate: row.metric(9),
            },
        }
    }
}

impl DashboardReport {
    /// Reshape report rows, preserving their order.
    #[must_use]
    pub fn from_rows(rows: &[ReportRow]) -> Self {
        Self {
            main_report: rows.iter().map(DashboardRow::from_row).collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.main_report.is_empty()
    }
}
