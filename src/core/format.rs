//! Display helpers shared by event payloads and API responses.

use chrono::{DateTime, Utc};

/// Human-relative age of `timestamp` as seen at `now`.
///
/// Under a day reads as minutes or hours, then `Yesterday`, then days for a
/// week, then a calendar date.
pub fn format_timestamp(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now.signed_duration_since(timestamp);
    let days = age.num_days();
    let seconds = age.num_seconds();

    match days {
        d if d <= 0 => {
            if seconds < 60 {
                "Just now".to_string()
            } else if seconds < 3_600 {
                plural(seconds / 60, "minute")
            } else {
                plural(seconds / 3_600, "hour")
            }
        }
        1 => "Yesterday".to_string(),
        d if d < 7 => format!("{d} days ago"),
        _ => timestamp.format("%b %d, %Y").to_string(),
    }
}

/// Same as [`format_timestamp`] for an RFC 3339 string; unparsable input is
/// returned unchanged.
pub fn format_rfc3339(timestamp: &str, now: DateTime<Utc>) -> String {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(parsed) => format_timestamp(parsed.with_timezone(&Utc), now),
        Err(e) => {
            tracing::warn!("error formatting timestamp {timestamp:?}: {e}");
            timestamp.to_string()
        }
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}

pub fn validate_coordinates(latitude: f64, longitude: f64) -> bool {
    latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude)
}

/// Cut `text` to `max_chars` characters, appending `...` when shortened.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn at(secs_ago: i64) -> (DateTime<Utc>, DateTime<Utc>) {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        (now - Duration::seconds(secs_ago), now)
    }

    #[test]
    fn test_relative_formats() {
        let cases = [
            (5, "Just now"),
            (60, "1 minute ago"),
            (150, "2 minutes ago"),
            (3_600, "1 hour ago"),
            (5 * 3_600, "5 hours ago"),
            (30 * 3_600, "Yesterday"),
            (3 * 86_400, "3 days ago"),
            (10 * 86_400, "Oct 08, 2026"),
        ];
        for (secs, expected) in cases {
            let (ts, now) = at(secs);
            assert_eq!(format_timestamp(ts, now), expected, "{secs}s ago");
        }
    }

    #[test]
    fn test_future_timestamp_reads_as_now() {
        let (ts, now) = at(-30);
        assert_eq!(format_timestamp(ts, now), "Just now");
    }

    #[test]
    fn test_rfc3339_passthrough_on_garbage() {
        let (_, now) = at(0);
        assert_eq!(format_rfc3339("yesterday-ish", now), "yesterday-ish");
        assert_eq!(format_rfc3339("2026-10-18T11:58:00+00:00", now), "2 minutes ago");
    }

    #[test]
    fn test_coordinate_bounds() {
        assert!(validate_coordinates(90.0, -180.0));
        assert!(validate_coordinates(-33.9, 151.2));
        assert!(!validate_coordinates(90.1, 0.0));
        assert!(!validate_coordinates(0.0, 180.5));
        assert!(!validate_coordinates(f64::NAN, 0.0));
    }

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("abcdef", 3), "abc...");
        assert_eq!(truncate_text("ñandú ñandú", 5), "ñandú...");
        assert_eq!(truncate_text("", 3), "");
    }
}
