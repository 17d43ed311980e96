//! Expiry date parsing and comparison.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parse a client-supplied expiry date.
///
/// Accepts RFC 3339 timestamps (`2026-03-01T10:00:00Z`), naive timestamps
/// (`2026-03-01T10:00:00`, read as UTC) and plain dates (`2026-03-01`, read
/// as midnight UTC). Anything else yields `None`.
#[must_use]
pub fn parse_expiry(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// The later of two optional expiry dates.
///
/// When only one side is known, that side wins.
#[must_use]
pub fn later_of(
    existing: Option<DateTime<Utc>>,
    incoming: Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    match (existing, incoming) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let parsed = parse_expiry("2026-03-01T10:00:00+02:00");
        assert_eq!(
            parsed,
            Some(Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_js_iso_string() {
        let parsed = parse_expiry("2026-03-01T00:00:00.000Z");
        assert_eq!(
            parsed,
            Some(Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_plain_date() {
        assert_eq!(
            parse_expiry(" 2026-12-24 "),
            Some(Utc.with_ymd_and_hms(2026, 12, 24, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_naive_timestamp() {
        assert_eq!(
            parse_expiry("2026-12-24T18:30:00"),
            Some(Utc.with_ymd_and_hms(2026, 12, 24, 18, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(parse_expiry(""), None);
        assert_eq!(parse_expiry("soon"), None);
        assert_eq!(parse_expiry("2026-13-45"), None);
    }

    #[test]
    fn test_later_of() {
        let early = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();

        assert_eq!(later_of(Some(early), Some(late)), Some(late));
        assert_eq!(later_of(Some(late), Some(early)), Some(late));
        assert_eq!(later_of(None, Some(early)), Some(early));
        assert_eq!(later_of(Some(early), None), Some(early));
        assert_eq!(later_of(None, None), None);
    }
}
