//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats an integer with `,` thousands separators.
///
/// Values that are not integers are passed through unchanged.
///
/// Usage in templates: `{{ totals.total_users|thousands }}`
#[askama::filter_fn]
pub fn thousands(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(group_thousands(&value.to_string()))
}

/// Formats a monetary amount with two decimals and thousands separators.
///
/// Usage in templates: `{{ totals.total_revenue|money }}`
#[askama::filter_fn]
pub fn money(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let raw = value.to_string();
    let Ok(amount) = raw.parse::<f64>() else {
        return Ok(raw);
    };

    let fixed = format!("{amount:.2}");
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    Ok(format!("{}.{cents}", group_thousands(whole)))
}

fn group_thousands(digits: &str) -> String {
    let (sign, body) = digits
        .strip_prefix('-')
        .map_or(("", digits), |rest| ("-", rest));
    if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit()) {
        return digits.to_string();
    }

    let mut grouped = String::with_capacity(body.len() + body.len() / 3);
    for (i, c) in body.chars().enumerate() {
        if i > 0 && (body.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{sign}{grouped}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("0"), "0");
        assert_eq!(group_thousands("999"), "999");
        assert_eq!(group_thousands("1000"), "1,000");
        assert_eq!(group_thousands("1234567"), "1,234,567");
        assert_eq!(group_thousands("-98765"), "-98,765");
        assert_eq!(group_thousands("12.5"), "12.5");
        assert_eq!(group_thousands("N/A"), "N/A");
    }
}
