//! Derived dashboard values
//!
//! Everything the templates need, computed per repository and globally.
//! Nothing here is stored back on the records; derived values are recomputed
//! on every run so identical input yields identical output.

use crate::extract::{RepoRecord, UpdateEntry, UpdateStatus};

/// Number of entries shown in the activity feed.
pub const ACTIVITY_FEED_LEN: usize = 3;

/// Badge shown when an identifier yields no alphanumeric tokens.
pub const FALLBACK_BADGE: &str = "RP";

/// One reduced feed line. `detail` is the stage for activity items and the
/// notes for incident items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub detail: String,
    pub when: String,
}

/// Global repository order: descending by the latest entry's parsed
/// timestamp. Records with no parsable timestamp go last. The sort is
/// stable, so ties keep the caller's input order.
pub fn sort_records(mut records: Vec<RepoRecord>) -> Vec<RepoRecord> {
    records.sort_by_key(|record| {
        std::cmp::Reverse(record.latest_sort_key().unwrap_or(i64::MIN))
    });
    records
}

/// First entry with status error, if any.
pub fn latest_incident(record: &RepoRecord) -> Option<&UpdateEntry> {
    record
        .entries
        .iter()
        .find(|entry| entry.status == UpdateStatus::Error)
}

/// The first three entries, reduced to summary / stage / display time.
pub fn activity_feed(record: &RepoRecord) -> Vec<FeedItem> {
    record
        .entries
        .iter()
        .take(ACTIVITY_FEED_LEN)
        .map(|entry| FeedItem {
            title: entry.summary.clone(),
            detail: entry.stage.clone(),
            when: entry.stamp.display(),
        })
        .collect()
}

/// All error entries, reduced to summary / notes / display time. Empty when
/// the repository has no incidents; the renderer substitutes the placeholder.
pub fn incident_feed(record: &RepoRecord) -> Vec<FeedItem> {
    record
        .entries
        .iter()
        .filter(|entry| entry.status == UpdateStatus::Error)
        .map(|entry| FeedItem {
            title: entry.summary.clone(),
            detail: entry.notes.clone(),
            when: entry.stamp.display(),
        })
        .collect()
}

/// Count of entries with status error (the open-incident metric card).
pub fn open_incidents(record: &RepoRecord) -> usize {
    record
        .entries
        .iter()
        .filter(|entry| entry.status == UpdateStatus::Error)
        .count()
}

/// Success rate as a rounded percentage: complete / (complete + error).
///
/// Entries with any other status are excluded from both numerator and
/// denominator. None when the denominator is zero; rendered as "N/A".
pub fn success_rate(record: &RepoRecord) -> Option<u32> {
    let complete = record
        .entries
        .iter()
        .filter(|entry| entry.status == UpdateStatus::Complete)
        .count();
    let error = open_incidents(record);
    let denominator = complete + error;
    if denominator == 0 {
        return None;
    }
    Some((100.0 * complete as f64 / denominator as f64).round() as u32)
}

/// Rendered success rate: "NN%" or the literal "N/A".
pub fn success_rate_display(record: &RepoRecord) -> String {
    match success_rate(record) {
        Some(rate) => format!("{}%", rate),
        None => "N/A".to_string(),
    }
}

/// Two-letter rail badge for a repository identifier.
///
/// Split on non-alphanumeric runs: a single token contributes its first two
/// characters, multiple tokens contribute the first character of each of the
/// first two. Uppercased either way; no tokens falls back to [`FALLBACK_BADGE`].
pub fn badge_label(repo: &str) -> String {
    let parts: Vec<&str> = repo
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect();
    let token: String = match parts.as_slice() {
        [] => return FALLBACK_BADGE.to_string(),
        [only] => only.chars().take(2).collect(),
        [first, second, ..] => first
            .chars()
            .take(1)
            .chain(second.chars().take(1))
            .collect(),
    };
    token.to_uppercase()
}
