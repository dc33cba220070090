//! Value and timestamp formatting for axes, legends and the gauge.

use chrono::{Local, TimeZone};

/// Format a sample value in the panel's unit.
///
/// `percent` values are already percentages; `percentunit` values are
/// fractions and get multiplied by 100.
pub fn format_value(value: f64, unit: &str) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }

    let unit_lower = unit.to_lowercase();
    if unit_lower.starts_with("percent") {
        let factor = if unit_lower == "percentunit" { 100.0 } else { 1.0 };
        return format!("{:.2}%", value * factor);
    }

    match unit {
        "" | "short" | "none" => format_number(value),
        _ => format!("{} {}", format_number(value), unit),
    }
}

/// Format a number without trailing zeros (1.5, 2, 0.25).
fn format_number(value: f64) -> String {
    let s = format!("{:.2}", value);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Fraction in `[0, 1]` for drawing a gauge bar, when the unit is a percentage.
pub fn gauge_ratio(value: f64, unit: &str) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    let ratio = match unit.to_lowercase().as_str() {
        "percentunit" => value,
        u if u.starts_with("percent") => value / 100.0,
        _ => return None,
    };
    Some(ratio.clamp(0.0, 1.0))
}

/// Format a timestamp for an x axis label.
///
/// Short windows show time of day, longer ones show the date.
pub fn format_axis_time(millis: i64, span_millis: i64) -> String {
    const DAY_MS: i64 = 24 * 60 * 60 * 1000;

    let Some(dt) = Local.timestamp_millis_opt(millis).single() else {
        return String::new();
    };
    if span_millis <= DAY_MS {
        dt.format("%H:%M:%S").to_string()
    } else if span_millis <= 7 * DAY_MS {
        dt.format("%m/%d %H:%M").to_string()
    } else {
        dt.format("%m/%d/%Y").to_string()
    }
}

/// Format a timestamp in full (MM/DD/YYYY HH:MM:SS).
pub fn format_timestamp(millis: i64) -> String {
    Local
        .timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.format("%m/%d/%Y %H:%M:%S").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_units() {
        assert_eq!(format_value(0.5, "percentunit"), "50.00%");
        assert_eq!(format_value(42.123, "percent"), "42.12%");
        assert_eq!(format_value(0.5, "PercentUnit"), "50.00%");
    }

    #[test]
    fn test_plain_units() {
        assert_eq!(format_value(1.5, "bytes"), "1.5 bytes");
        assert_eq!(format_value(2.0, ""), "2");
        assert_eq!(format_value(0.25, "short"), "0.25");
        assert_eq!(format_value(3.0, "none"), "3");
        assert_eq!(format_value(3.0, "reqps"), "3 reqps");
        assert_eq!(format_value(f64::NAN, "bytes"), "-");
    }

    #[test]
    fn test_gauge_ratio() {
        assert_eq!(gauge_ratio(0.25, "percentunit"), Some(0.25));
        assert_eq!(gauge_ratio(50.0, "percent"), Some(0.5));
        assert_eq!(gauge_ratio(150.0, "percent"), Some(1.0));
        assert_eq!(gauge_ratio(3.0, "bytes"), None);
        assert_eq!(gauge_ratio(f64::NAN, "percent"), None);
    }

    #[test]
    fn test_axis_time_by_span() {
        let ts = 1_700_000_000_000;
        assert_eq!(format_axis_time(ts, 60_000).len(), "12:34:56".len());
        assert_eq!(format_axis_time(ts, 3 * 24 * 60 * 60 * 1000).len(), "11/14 22:13".len());
        assert_eq!(format_axis_time(ts, 90 * 24 * 60 * 60 * 1000).len(), "11/14/2023".len());
        assert_eq!(format_timestamp(ts).len(), "11/14/2023 22:13:20".len());
    }
}
