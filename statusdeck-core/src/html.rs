//! Page rendering
//!
//! Fills the two page templates by literal `{{TOKEN}}` replacement. No
//! templating logic and no escaping beyond what extraction already did;
//! unrecognized template structure passes through untouched.

use crate::aggregate::{
    activity_feed, badge_label, incident_feed, latest_incident, open_incidents,
    success_rate_display, FeedItem,
};
use crate::extract::RepoRecord;
use anyhow::{Context, Result};
use std::path::Path;

/// Dashboard output filename, fixed relative to the output directory.
pub const DASHBOARD_FILE: &str = "dashboard.html";

/// Prefix of per-repository output filenames.
pub const REPO_PAGE_PREFIX: &str = "repo-";

/// Row substituted when no update files were found at all.
const MISSING_ROW: &str = "            <tr><td data-label=\"Repo\">-</td><td data-label=\"Latest Status\"><span class=\"status-pill error\">Missing</span></td><td data-label=\"Last Update\">-</td><td data-label=\"Agent\">-</td><td data-label=\"Summary\">No updates found</td></tr>";

/// The static experiment backlog shown on every repository page.
const BACKLOG_ITEMS: &str = "            <li class=\"backlog-item\">Canary rollout comparison</li>\n            <li class=\"backlog-item\">Nightly build bisection</li>";

/// The two page templates, read as-is from disk.
pub struct Templates {
    pub dashboard: String,
    pub repo: String,
}

impl Templates {
    /// Read both templates. Unreadable templates are fatal; nothing is
    /// rendered from partial template state.
    pub fn load(dashboard_path: &Path, repo_path: &Path) -> Result<Templates> {
        let dashboard = std::fs::read_to_string(dashboard_path).with_context(|| {
            format!("Failed to read dashboard template: {}", dashboard_path.display())
        })?;
        let repo = std::fs::read_to_string(repo_path)
            .with_context(|| format!("Failed to read repo template: {}", repo_path.display()))?;
        Ok(Templates { dashboard, repo })
    }
}

/// Output filename for a repository page.
pub fn repo_page_file(repo: &str) -> String {
    format!("{}{}.html", REPO_PAGE_PREFIX, repo)
}

/// Render the top-level dashboard page.
pub fn render_dashboard(templates: &Templates, records: &[RepoRecord]) -> String {
    let rows = if records.is_empty() {
        MISSING_ROW.to_string()
    } else {
        records.iter().map(status_row).collect::<Vec<_>>().join("\n")
    };
    let history = records
        .iter()
        .map(history_block)
        .collect::<Vec<_>>()
        .join("\n");

    fill(
        &templates.dashboard,
        &[
            ("SERVER_RAIL", server_rail(records, None)),
            ("STATUS_ROWS", rows),
            ("HISTORY_BLOCKS", history),
        ],
    )
}

/// Render one repository detail page.
pub fn render_repo_page(templates: &Templates, record: &RepoRecord, all: &[RepoRecord]) -> String {
    let latest = record.latest();
    let (status_class, status_label) = match latest {
        Some(entry) => (entry.status.class().to_string(), entry.status.label()),
        None => ("unknown".to_string(), "Unknown".to_string()),
    };
    let latest_summary = latest
        .map(|entry| dashed(&entry.summary))
        .unwrap_or_else(|| "-".to_string());
    let latest_stage = latest
        .map(|entry| dashed(&entry.stage))
        .unwrap_or_else(|| "-".to_string());
    let latest_time = latest
        .map(|entry| dashed(&entry.stamp.display()))
        .unwrap_or_else(|| "-".to_string());

    let incident = latest_incident(record);
    let incident_title = incident
        .map(|entry| dashed(&entry.summary))
        .unwrap_or_else(|| "-".to_string());
    let incident_notes = incident
        .map(|entry| dashed(&entry.notes))
        .unwrap_or_else(|| "-".to_string());

    fill(
        &templates.repo,
        &[
            ("SERVER_RAIL", server_rail(all, Some(&record.repo))),
            ("REPO_NAME", record.repo.clone()),
            ("AGENT_NAME", record.agent.clone()),
            ("STATUS_CLASS", status_class),
            ("STATUS_LABEL", status_label),
            ("LATEST_SUMMARY", latest_summary),
            ("LATEST_STAGE", latest_stage),
            ("LATEST_TIME", latest_time.clone()),
            ("INCIDENT_TITLE", incident_title),
            ("INCIDENT_NOTES", incident_notes),
            ("ACTIVITY_FEED", activity_list(&activity_feed(record))),
            ("INCIDENT_FEED", incident_list(&incident_feed(record))),
            ("SUCCESS_RATE", success_rate_display(record)),
            ("TOTAL_UPDATES", record.entries.len().to_string()),
            ("OPEN_INCIDENTS", open_incidents(record).to_string()),
            ("LAST_UPDATE", latest_time),
            ("BACKLOG_ITEMS", BACKLOG_ITEMS.to_string()),
            ("HISTORY_BLOCK", indent_block(&record.section_html, 12)),
        ],
    )
}

/// Literal placeholder replacement: `{{NAME}}` -> value, verbatim.
fn fill(template: &str, values: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (token, value) in values {
        out = out.replace(&format!("{{{{{}}}}}", token), value);
    }
    out
}

/// The sidebar rail: a fixed home entry, then one dot per repository in
/// dashboard order. `active` marks the current repository page; None marks
/// the home entry instead.
fn server_rail(records: &[RepoRecord], active: Option<&str>) -> String {
    let home_class = if active.is_none() {
        "server-dot active"
    } else {
        "server-dot"
    };
    let mut rail = vec![format!(
        "      <a class=\"{}\" href=\"{}\" title=\"Dashboard\">CD</a>",
        home_class, DASHBOARD_FILE
    )];
    for record in records {
        let class = if active == Some(record.repo.as_str()) {
            "server-dot active"
        } else {
            "server-dot"
        };
        rail.push(format!(
            "      <a class=\"{}\" href=\"{}\" title=\"{}\">{}</a>",
            class,
            repo_page_file(&record.repo),
            record.repo,
            badge_label(&record.repo)
        ));
    }
    rail.join("\n")
}

/// One status-table row: repo link, latest status pill, last update, agent,
/// latest summary.
fn status_row(record: &RepoRecord) -> String {
    let (pill, time, summary) = match record.latest() {
        Some(entry) => (
            format!(
                "<span class=\"status-pill {}\">{}</span>",
                entry.status.class(),
                entry.status.label()
            ),
            dashed(&entry.stamp.display()),
            dashed(&entry.summary),
        ),
        None => (
            "<span class=\"status-pill unknown\">Unknown</span>".to_string(),
            "-".to_string(),
            "-".to_string(),
        ),
    };
    format!(
        "            <tr>\n              <td data-label=\"Repo\"><a class=\"repo-link\" href=\"{page}\">{repo}</a></td>\n              <td data-label=\"Latest Status\">{pill}</td>\n              <td data-label=\"Last Update\">{time}</td>\n              <td data-label=\"Agent\">{agent}</td>\n              <td data-label=\"Summary\">{summary}</td>\n            </tr>",
        page = repo_page_file(&record.repo),
        repo = record.repo,
        pill = pill,
        time = time,
        agent = record.agent,
        summary = summary,
    )
}

/// One history block: per-repo header plus the raw section HTML indented
/// under it.
fn history_block(record: &RepoRecord) -> String {
    format!(
        "          <div class=\"repo-block\">\n            <div class=\"repo-header\">\n              <h3>{repo}</h3>\n              <span>Agent: {agent}</span>\n            </div>\n{section}\n          </div>",
        repo = record.repo,
        agent = record.agent,
        section = indent_block(&record.section_html, 12),
    )
}

fn activity_list(items: &[FeedItem]) -> String {
    if items.is_empty() {
        return "            <li class=\"feed-item feed-empty\">No recent activity</li>".to_string();
    }
    items
        .iter()
        .map(|item| {
            format!(
                "            <li class=\"feed-item\"><span class=\"feed-title\">{}</span><span class=\"feed-stage\">{}</span><time>{}</time></li>",
                item.title, item.detail, item.when
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn incident_list(items: &[FeedItem]) -> String {
    if items.is_empty() {
        return "            <li class=\"incident-item incident-empty\">No incidents</li>"
            .to_string();
    }
    items
        .iter()
        .map(|item| {
            format!(
                "            <li class=\"incident-item\"><span class=\"incident-title\">{}</span><span class=\"incident-notes\">{}</span><time>{}</time></li>",
                item.title, item.detail, item.when
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Indent every non-blank line by `spaces`. Blank lines are left untouched.
fn indent_block(text: &str, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                line.to_string()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn dashed(value: &str) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}
