use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static WINDOW_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)([dwh])$").expect("valid window regex"));

/// Lookback window used when nothing parseable is given
const FALLBACK_DAYS: i64 = 21;

/// A closed `[start, end]` lookback interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Parse `<number><unit>` windows such as `21d`, `3w` or `48h`, ending at `now`.
///
/// Unrecognised input falls back to the last 21 days.
pub fn parse_window(window: &str, now: DateTime<Utc>) -> Window {
    let span = WINDOW_RE
        .captures(window.trim())
        .and_then(|caps| {
            let value: i64 = caps[1].parse().ok()?;
            match &caps[2] {
                "d" => Duration::try_days(value),
                "w" => Duration::try_weeks(value),
                "h" => Duration::try_hours(value),
                _ => None,
            }
        })
        .unwrap_or_else(|| Duration::days(FALLBACK_DAYS));

    Window {
        start: now.checked_sub_signed(span).unwrap_or(DateTime::<Utc>::MIN_UTC),
        end: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_units() {
        assert_eq!(parse_window("21d", now()).start, now() - Duration::days(21));
        assert_eq!(parse_window("2w", now()).start, now() - Duration::weeks(2));
        assert_eq!(parse_window(" 6h ", now()).start, now() - Duration::hours(6));
        assert_eq!(parse_window("6h", now()).end, now());
    }

    #[test]
    fn test_invalid_falls_back_to_three_weeks() {
        for raw in ["", "21", "d", "5m", "-3d", "1.5d"] {
            assert_eq!(parse_window(raw, now()).start, now() - Duration::days(21), "{raw}");
        }
    }
}
