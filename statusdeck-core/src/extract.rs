//! Fragment extraction
//!
//! Turns one HTML update fragment into a [`RepoRecord`]. The fragments are
//! self-produced with a fixed shape, so extraction is permissive pattern
//! scanning with per-field fallbacks. Missing optional structure degrades to
//! defaults; only an unreadable file is fatal.

use crate::timestamp::Stamp;
use anyhow::{Context, Result};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// Prefix stripped from file stems when deriving a repo identifier.
pub const UPDATE_FILE_PREFIX: &str = "updates-";

/// Status of a single update entry, as written in `data-status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    Complete,
    Error,
    Unknown,
    Other(String),
}

impl UpdateStatus {
    /// Parse the attribute text. Empty or whitespace-only degrades to Unknown.
    pub fn parse(text: &str) -> UpdateStatus {
        match text.trim() {
            "" | "unknown" => UpdateStatus::Unknown,
            "complete" => UpdateStatus::Complete,
            "error" => UpdateStatus::Error,
            other => UpdateStatus::Other(other.to_string()),
        }
    }

    /// Machine class used in CSS hooks (`status-pill {class}`).
    pub fn class(&self) -> &str {
        match self {
            UpdateStatus::Complete => "complete",
            UpdateStatus::Error => "error",
            UpdateStatus::Unknown => "unknown",
            UpdateStatus::Other(text) => text,
        }
    }

    /// Human label: machine class with the first letter uppercased.
    pub fn label(&self) -> String {
        capitalize(self.class())
    }
}

/// One timestamped update record within a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateEntry {
    pub status: UpdateStatus,
    pub stamp: Stamp,
    pub summary: String,
    pub stage: String,
    pub notes: String,
}

/// One repository's parsed update history.
///
/// Entries keep source document order. The fragment format is newest-first,
/// so the first entry is the latest; no re-sorting happens here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRecord {
    pub repo: String,
    pub agent: String,
    pub entries: Vec<UpdateEntry>,
    /// The raw section HTML, kept verbatim for history rendering.
    pub section_html: String,
}

impl RepoRecord {
    /// The latest entry, if any (document order, newest first).
    pub fn latest(&self) -> Option<&UpdateEntry> {
        self.entries.first()
    }

    /// Sort key of the latest entry; None when there is none or it never
    /// parsed. Records without a key sort to the end of the dashboard.
    pub fn latest_sort_key(&self) -> Option<i64> {
        self.latest().and_then(|entry| entry.stamp.sort_key())
    }
}

/// Read and extract one update fragment file.
///
/// Only the read itself can fail; every structural problem inside the file
/// degrades to defaults.
pub fn parse_update_file(path: &Path) -> Result<RepoRecord> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read update fragment: {}", path.display()))?;
    Ok(extract_record(&raw, path))
}

/// Extract a [`RepoRecord`] from fragment text. Infallible; structural
/// problems degrade per-field.
pub fn extract_record(raw: &str, path: &Path) -> RepoRecord {
    let section_html = extract_section(raw);

    let (repo, agent) = match section_attrs(&section_html) {
        Some(pair) => pair,
        None => {
            eprintln!(
                "warning: {}: missing data-repo/data-agent attributes, deriving from filename",
                path.display()
            );
            (repo_from_filename(path), "unknown".to_string())
        }
    };

    let entries = extract_entries(&section_html);

    RepoRecord {
        repo,
        agent,
        entries,
        section_html,
    }
}

/// First `<section>...</section>` element; the whole trimmed document when
/// no section is present (degraded but non-fatal).
fn extract_section(raw: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(?s)(<section[^>]*>.*?</section>)").unwrap());
    match re.captures(raw) {
        Some(cap) => cap[1].trim().to_string(),
        None => raw.trim().to_string(),
    }
}

/// `data-repo` and `data-agent` from the section's opening tag.
fn section_attrs(section_html: &str) -> Option<(String, String)> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r#"<section[^>]*data-repo="([^"]+)"[^>]*data-agent="([^"]+)""#).unwrap()
    });
    re.captures(section_html)
        .map(|cap| (cap[1].to_string(), cap[2].to_string()))
}

/// Repo identifier fallback: file stem with the `updates-` prefix stripped.
fn repo_from_filename(path: &Path) -> String {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    stem.strip_prefix(UPDATE_FILE_PREFIX)
        .unwrap_or(stem)
        .to_string()
}

/// All article blocks carrying status and time attributes, document order.
fn extract_entries(section_html: &str) -> Vec<UpdateEntry> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r#"(?s)<article[^>]*data-status="([^"]*)"[^>]*data-time="([^"]*)"[^>]*>(.*?)</article>"#)
            .unwrap()
    });

    re.captures_iter(section_html)
        .map(|cap| {
            let body = &cap[3];
            UpdateEntry {
                status: UpdateStatus::parse(&cap[1]),
                stamp: Stamp::parse(&cap[2]),
                summary: extract_summary(body),
                stage: labeled_field(body, "Stage:"),
                notes: labeled_field(body, "Notes:"),
            }
        })
        .collect()
}

/// Summary: first `<h4>` block, entity-unescaped then tag-stripped.
fn extract_summary(body: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(?s)<h4>(.*?)</h4>").unwrap());
    match re.captures(body) {
        Some(cap) => strip_tags(&html_unescape(&cap[1])),
        None => String::new(),
    }
}

/// Labeled field: literal label text, value runs to the next markup boundary.
fn labeled_field(body: &str, label: &str) -> String {
    let Some(at) = body.find(label) else {
        return String::new();
    };
    let value = &body[at + label.len()..];
    let end = value.find('<').unwrap_or(value.len());
    value[..end].trim().to_string()
}

fn strip_tags(value: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"<[^>]+>").unwrap());
    re.replace_all(value, "").trim().to_string()
}

/// Decode the standard named entities plus decimal/hex numeric references.
/// Single pass: a decoded character is never re-examined.
pub(crate) fn html_unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let semi = tail
            .char_indices()
            .take(12)
            .find(|&(_, c)| c == ';')
            .map(|(i, _)| i);
        if let Some(semi) = semi {
            if let Some(decoded) = decode_entity(&tail[1..semi]) {
                out.push(decoded);
                rest = &tail[semi + 1..];
                continue;
            }
        }
        out.push('&');
        rest = &tail[1..];
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = if let Some(hex) = num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                num.parse::<u32>().ok()?
            };
            char::from_u32(code)
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}
