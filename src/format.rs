use chrono::{DateTime, NaiveDate, NaiveDateTime};

const LONG_DATE: &str = "%B %-d, %Y";

/// Renders an ISO-ish date as "January 5, 2024".
pub fn format_date(input: &str) -> String {
    match parse_date(input.trim()) {
        Some(date) => date.format(LONG_DATE).to_string(),
        None => input.to_string(),
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.date_naive());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|stamp| stamp.date())
}
