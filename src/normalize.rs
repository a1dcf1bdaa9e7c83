//! Field coercion for the raw CSV exports.
//!
//! DAS writes numbers and timestamps inconsistently between versions, so
//! every coercion here degrades to a default instead of failing: a record
//! with one bad field is still worth aggregating.

use chrono::{Datelike, NaiveDateTime, Timelike};
use tracing::debug;

/// Timestamp formats accepted by the exports, tried in order. First match
/// wins; the four-digit-year variant is a fallback for hand-edited files.
pub const TIME_FORMATS: &[&str] = &[
    "%m/%d/%y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

/// Parse a float field, defaulting to 0.0 on anything unparsable.
pub fn safe_f64(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed.parse::<f64>() {
        Ok(value) => value,
        Err(_) => {
            debug!("unparsable numeric field {:?}, defaulting to 0.0", raw);
            0.0
        }
    }
}

/// Parse an integer field, defaulting to 0 on anything unparsable.
pub fn safe_i64(raw: &str) -> i64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0;
    }
    match trimmed.parse::<i64>() {
        Ok(value) => value,
        Err(_) => {
            debug!("unparsable integer field {:?}, defaulting to 0", raw);
            0
        }
    }
}

/// Time-derived fields for one record.
///
/// An unparsable timestamp keeps the record alive with sentinel values
/// (hour 0, empty date, no weekday) rather than dropping the row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TradeTime {
    /// Canonical sortable value; chronological ordering downstream uses this.
    pub parsed: Option<NaiveDateTime>,
    pub hour: u32,
    /// ISO date (`YYYY-MM-DD`), or "" when the timestamp never parsed.
    pub date: String,
    /// Days from Monday (Monday = 0 .. Sunday = 6).
    pub weekday: Option<u32>,
}

impl TradeTime {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        for format in TIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
                return TradeTime {
                    parsed: Some(dt),
                    hour: dt.hour(),
                    date: dt.format("%Y-%m-%d").to_string(),
                    weekday: Some(dt.weekday().num_days_from_monday()),
                };
            }
        }
        if !trimmed.is_empty() {
            debug!("timestamp {:?} matched no accepted format", raw);
        }
        TradeTime::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_f64() {
        assert_eq!(safe_f64("10.5"), 10.5);
        assert_eq!(safe_f64(" -3.25 "), -3.25);
        assert_eq!(safe_f64(""), 0.0);
        assert_eq!(safe_f64("N/A"), 0.0);
        assert_eq!(safe_f64("1e3"), 1000.0);
    }

    #[test]
    fn test_safe_i64() {
        assert_eq!(safe_i64("100"), 100);
        assert_eq!(safe_i64(" -5 "), -5);
        assert_eq!(safe_i64(""), 0);
        // Float-formatted quantities are not silently truncated.
        assert_eq!(safe_i64("100.0"), 0);
        assert_eq!(safe_i64("abc"), 0);
    }

    #[test]
    fn test_trade_time_das_format() {
        let tt = TradeTime::parse("03/04/24 10:35:02");
        assert_eq!(tt.hour, 10);
        assert_eq!(tt.date, "2024-03-04");
        // 2024-03-04 is a Monday.
        assert_eq!(tt.weekday, Some(0));
        assert!(tt.parsed.is_some());
    }

    #[test]
    fn test_trade_time_iso_format() {
        let tt = TradeTime::parse("2024-03-08 15:59:59");
        assert_eq!(tt.hour, 15);
        assert_eq!(tt.date, "2024-03-08");
        // Friday.
        assert_eq!(tt.weekday, Some(4));
    }

    #[test]
    fn test_trade_time_fallback_four_digit_year() {
        let tt = TradeTime::parse("03/04/2024 10:35:02");
        assert_eq!(tt.date, "2024-03-04");
        assert_eq!(tt.hour, 10);
    }

    #[test]
    fn test_trade_time_sentinels_on_garbage() {
        let tt = TradeTime::parse("not a timestamp");
        assert_eq!(tt.parsed, None);
        assert_eq!(tt.hour, 0);
        assert_eq!(tt.date, "");
        assert_eq!(tt.weekday, None);

        assert_eq!(TradeTime::parse(""), TradeTime::default());
    }

    #[test]
    fn test_trade_time_sort_order() {
        let early = TradeTime::parse("03/04/24 09:30:00");
        let late = TradeTime::parse("2024-03-04 09:31:00");
        // Mixed formats still order chronologically via the parsed value.
        assert!(early.parsed < late.parsed);
        // Sentinel (None) sorts ahead of any parsed timestamp.
        assert!(TradeTime::default().parsed < early.parsed);
    }
}
