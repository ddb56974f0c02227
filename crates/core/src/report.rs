//! Analytics Data API report wire types.
//!
//! A report is requested with a date range, a list of dimensions, a list of
//! metrics and an optional ordering. Each returned row carries the dimension
//! values and metric values positionally, in request order, and every value
//! is a string. Missing values read as empty strings and metrics that do not
//! parse as numbers read as zero.

use serde::{Deserialize, Serialize};

/// Dimensions requested for the per-property marketing report.
pub const MARKETING_DIMENSIONS: [&str; 8] = [
    "date",
    "country",
    "city",
    "deviceCategory",
    "sessionSource",
    "sessionMedium",
    "pagePath",
    "pageTitle",
];

/// Metrics requested for the per-property marketing report.
pub const MARKETING_METRICS: [&str; 10] = [
    "activeUsers",
    "newUsers",
    "sessions",
    "screenPageViews",
    "averageSessionDuration",
    "bounceRate",
    "conversions",
    "totalRevenue",
    "engagementRate",
    "eventCount",
];

/// Dimensions requested for the single-property dashboard report.
pub const DASHBOARD_DIMENSIONS: [&str; 7] = [
    "date",
    "deviceCategory",
    "country",
    "city",
    "pagePath",
    "sessionSource",
    "sessionMedium",
];

/// Metrics requested for the single-property dashboard report.
pub const DASHBOARD_METRICS: [&str; 10] = [
    "activeUsers",
    "newUsers",
    "sessions",
    "screenPageViews",
    "averageSessionDuration",
    "bounceRate",
    "conversions",
    "totalRevenue",
    "engagedSessions",
    "engagementRate",
];

/// Row limit for the marketing report.
pub const MARKETING_ROW_LIMIT: u32 = 10_000;

/// Row limit for the dashboard report.
pub const DASHBOARD_ROW_LIMIT: u32 = 1_000;

// ─────────────────────────────────────────────────────────────────────────────
// Request
// ─────────────────────────────────────────────────────────────────────────────

/// Body of a `properties/{id}:runReport` call.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RunReportRequest {
    pub date_ranges: Vec<DateRange>,
    pub dimensions: Vec<Dimension>,
    pub metrics: Vec<Metric>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub order_bys: Vec<OrderBy>,
    pub limit: u32,
}

/// A relative or absolute date range (`30daysAgo`, `today`, `2024-01-31`).
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
}

impl DateRange {
    /// The trailing thirty days, ending today.
    #[must_use]
    pub fn last_30_days() -> Self {
        Self {
            start_date: "30daysAgo".to_string(),
            end_date: "today".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Dimension {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Metric {
    pub name: String,
}

/// Ordering on a dimension value.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OrderBy {
    pub dimension: DimensionOrderBy,
    pub desc: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DimensionOrderBy {
    pub dimension_name: String,
}

impl RunReportRequest {
    fn new(dimensions: &[&str], metrics: &[&str], limit: u32) -> Self {
        Self {
            date_ranges: vec![DateRange::last_30_days()],
            dimensions: dimensions
                .iter()
                .map(|name| Dimension {
                    name: (*name).to_string(),
                })
                .collect(),
            metrics: metrics
                .iter()
                .map(|name| Metric {
                    name: (*name).to_string(),
                })
                .collect(),
            order_bys: Vec::new(),
            limit,
        }
    }

    /// The thirty-day marketing report used by the aggregate snapshot.
    #[must_use]
    pub fn marketing() -> Self {
        Self::new(&MARKETING_DIMENSIONS, &MARKETING_METRICS, MARKETING_ROW_LIMIT)
    }

    /// The thirty-day dashboard report, newest dates first.
    #[must_use]
    pub fn dashboard() -> Self {
        let mut request = Self::new(&DASHBOARD_DIMENSIONS, &DASHBOARD_METRICS, DASHBOARD_ROW_LIMIT);
        request.order_bys.push(OrderBy {
            dimension: DimensionOrderBy {
                dimension_name: "date".to_string(),
            },
            desc: true,
        });
        request
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Response
// ─────────────────────────────────────────────────────────────────────────────

/// Response of a `runReport` call. Only the rows are consumed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReportResponse {
    #[serde(default)]
    pub rows: Vec<ReportRow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
}

/// One report row: positional dimension and metric values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    #[serde(default)]
    pub dimension_values: Vec<ReportValue>,
    #[serde(default)]
    pub metric_values: Vec<ReportValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportValue {
    #[serde(default)]
    pub value: String,
}

impl ReportRow {
    /// Build a row from plain string values.
    #[must_use]
    pub fn new(dimensions: &[&str], metrics: &[&str]) -> Self {
        let wrap = |values: &[&str]| {
            values
                .iter()
                .map(|value| ReportValue {
                    value: (*value).to_string(),
                })
                .collect()
        };

        Self {
            dimension_values: wrap(dimensions),
            metric_values: wrap(metrics),
        }
    }

    /// Dimension value at `index`, empty when absent.
    #[must_use]
    pub fn dimension(&self, index: usize) -> &str {
        self.dimension_values
            .get(index)
            .map_or("", |v| v.value.as_str())
    }

    /// Metric at `index` as a float, zero when absent or unparseable.
    #[must_use]
    pub fn metric(&self, index: usize) -> f64 {
        self.metric_values
            .get(index)
            .map_or(0.0, |v| metric_f64(&v.value))
    }

    /// Metric at `index` as a non-negative count.
    #[must_use]
    pub fn count(&self, index: usize) -> u64 {
        self.metric_values
            .get(index)
            .map_or(0, |v| metric_count(&v.value))
    }
}

/// Parse a metric string, treating blanks and garbage as zero.
#[must_use]
pub fn metric_f64(value: &str) -> f64 {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Parse a metric string as a count (users, sessions, views).
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped to >= 0 and rounded
pub fn metric_count(value: &str) -> u64 {
    let parsed = metric_f64(value);
    if parsed <= 0.0 {
        0
    } else {
        parsed.round() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_parsing_defaults_to_zero() {
        assert!((metric_f64("12.5") - 12.5).abs() < f64::EPSILON);
        assert!(metric_f64("").abs() < f64::EPSILON);
        assert!(metric_f64("n/a").abs() < f64::EPSILON);
        assert!(metric_f64("NaN").abs() < f64::EPSILON);
        assert_eq!(metric_count("42"), 42);
        assert_eq!(metric_count("-3"), 0);
        assert_eq!(metric_count("7.0"), 7);
    }

    #[test]
    fn row_accessors_tolerate_short_rows() {
        let row = ReportRow::new(&["20240101"], &["5"]);
        assert_eq!(row.dimension(0), "20240101");
        assert_eq!(row.dimension(3), "");
        assert_eq!(row.count(0), 5);
        assert_eq!(row.count(9), 0);
    }

    #[test]
    fn dashboard_request_orders_by_date_descending() {
        let body = serde_json::to_value(RunReportRequest::dashboard()).unwrap_or_default();
        assert_eq!(body["orderBys"][0]["dimension"]["dimensionName"], "date");
        assert_eq!(body["orderBys"][0]["desc"], true);
        assert_eq!(body["limit"], 1000);
        assert_eq!(body["dimensions"].as_array().map(Vec::len), Some(7));
    }

    #[test]
    fn marketing_request_has_no_ordering() {
        let body = serde_json::to_value(RunReportRequest::marketing()).unwrap_or_default();
        assert!(body.get("orderBys").is_none());
        assert_eq!(body["dateRanges"][0]["startDate"], "30daysAgo");
        assert_eq!(body["metrics"][7]["name"], "totalRevenue");
    }

    #[test]
    fn response_without_rows_deserializes_empty() {
        let response: RunReportResponse =
            serde_json::from_str(r#"{"kind":"analyticsData#runReport"}"#).unwrap_or_default();
        assert!(response.rows.is_empty());
    }
}
