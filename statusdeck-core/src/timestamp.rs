//! Update timestamp parsing and display formatting
//!
//! Fragments carry ISO-8601 instants in `data-time` attributes. A trailing
//! literal `Z` is accepted as UTC offset shorthand. Anything unparseable is
//! kept as raw text and sorts as the oldest possible value.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

/// A parsed instant. Only the offset-carrying form renders a trailing
/// UTC-offset component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instant {
    Offset(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

/// An update timestamp: the raw attribute text plus its parsed form, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamp {
    pub raw: String,
    pub parsed: Option<Instant>,
}

impl Stamp {
    /// Parse an ISO-8601 timestamp, keeping the raw text either way.
    ///
    /// Accepted forms:
    /// - RFC 3339 with offset, including trailing `Z` (`2024-03-01T10:00:00Z`)
    /// - naive date-time, with or without seconds (`2024-03-01T10:00:00`,
    ///   `2024-03-01T10:00`)
    /// - bare date, read as midnight (`2024-03-01`)
    pub fn parse(raw: &str) -> Stamp {
        let text = raw.trim();
        Stamp {
            raw: text.to_string(),
            parsed: parse_iso(text),
        }
    }

    /// Display form: `YYYY-MM-DD HH:MM` plus ` +HHMM` when the instant
    /// carries an explicit offset. Unparsed stamps display as their raw text.
    pub fn display(&self) -> String {
        match self.parsed {
            Some(Instant::Offset(dt)) => dt.format("%Y-%m-%d %H:%M %z").to_string(),
            Some(Instant::Naive(dt)) => dt.format("%Y-%m-%d %H:%M").to_string(),
            None => self.raw.clone(),
        }
    }

    /// Ordering key on the UTC timeline, in milliseconds. Naive instants are
    /// read as UTC. Unparsed stamps return None and must sort as oldest.
    pub fn sort_key(&self) -> Option<i64> {
        match self.parsed {
            Some(Instant::Offset(dt)) => Some(dt.timestamp_millis()),
            Some(Instant::Naive(dt)) => Some(dt.and_utc().timestamp_millis()),
            None => None,
        }
    }
}

fn parse_iso(text: &str) -> Option<Instant> {
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(Instant::Offset(dt));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Instant::Naive(dt));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M") {
        return Some(Instant::Naive(dt));
    }
    if let Ok(d) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(Instant::Naive(d.and_hms_opt(0, 0, 0)?));
    }
    None
}
