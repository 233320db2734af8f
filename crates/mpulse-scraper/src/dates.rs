use chrono::{DateTime, NaiveDate};

const MONTH_FIRST: [&str; 2] = ["%b %d, %Y", "%B %d, %Y"];
const DAY_FIRST: [&str; 2] = ["%d %b %Y", "%d %B %Y"];

/// Best-effort publication day from a provider or page timestamp.
///
/// Accepts `YYYY-MM-DD` (alone or followed by a `T` or space separated time),
/// RFC 3339, `Mon DD, YYYY` with an optional trailing time, and `DD Mon YYYY`.
/// Anything else, relative phrases like "2 hours ago" included, yields `None`.
#[must_use]
pub fn parse_loose_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }

    let date_part = raw.split(['T', ' ']).next().unwrap_or(raw);
    if let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        return Some(date);
    }

    // Month and day names are three whitespace tokens; drop any trailing time.
    let head = raw
        .split_whitespace()
        .take(3)
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(',')
        .to_string();

    MONTH_FIRST
        .iter()
        .chain(DAY_FIRST.iter())
        .find_map(|fmt| NaiveDate::parse_from_str(&head, fmt).ok())
}

/// Calendar day of a unix timestamp in UTC.
#[must_use]
pub fn date_from_unix(secs: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(secs, 0).map(|dt| dt.date_naive())
}
