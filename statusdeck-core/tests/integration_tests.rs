//! End-to-end tests for the dashboard build pipeline

use statusdeck_core::config::ResolvedConfig;
use statusdeck_core::{build_site, load_and_resolve};
use std::path::Path;
use tempfile::TempDir;

const DASHBOARD_TEMPLATE: &str = "<nav>\n{{SERVER_RAIL}}\n</nav>\n<tbody>\n{{STATUS_ROWS}}\n</tbody>\n<div id=\"history\">\n{{HISTORY_BLOCKS}}\n</div>\n";

const REPO_TEMPLATE: &str = "<nav>\n{{SERVER_RAIL}}\n</nav>\n<h1>{{REPO_NAME}}</h1>\n<p>{{AGENT_NAME}}</p>\n<span class=\"status-pill {{STATUS_CLASS}}\">{{STATUS_LABEL}}</span>\n<p>{{LATEST_SUMMARY}}|{{LATEST_STAGE}}|{{LATEST_TIME}}</p>\n<p>{{INCIDENT_TITLE}}|{{INCIDENT_NOTES}}</p>\n<ul>\n{{ACTIVITY_FEED}}\n</ul>\n<ul>\n{{INCIDENT_FEED}}\n</ul>\n<p>{{SUCCESS_RATE}}|{{TOTAL_UPDATES}}|{{OPEN_INCIDENTS}}|{{LAST_UPDATE}}</p>\n<ul>\n{{BACKLOG_ITEMS}}\n</ul>\n<div>\n{{HISTORY_BLOCK}}\n</div>\n";

fn fragment(repo: &str, agent: &str, articles: &str) -> String {
    format!(
        "<section class=\"update-log\" data-repo=\"{}\" data-agent=\"{}\">\n{}</section>\n",
        repo, agent, articles
    )
}

fn article(status: &str, time: &str, summary: &str, stage: &str, notes: &str) -> String {
    format!(
        "  <article class=\"update\" data-status=\"{}\" data-time=\"{}\">\n    <h4>{}</h4>\n    <p>Stage: {}</p>\n    <p>Notes: {}</p>\n  </article>\n",
        status, time, summary, stage, notes
    )
}

/// Lay out updates/, templates/, and an empty output dir under `root`.
fn setup(root: &Path) -> ResolvedConfig {
    let updates_dir = root.join("updates");
    let templates_dir = root.join("templates");
    std::fs::create_dir_all(&updates_dir).unwrap();
    std::fs::create_dir_all(&templates_dir).unwrap();
    let dashboard_template = templates_dir.join("dashboard.template.html");
    let repo_template = templates_dir.join("repo.template.html");
    std::fs::write(&dashboard_template, DASHBOARD_TEMPLATE).unwrap();
    std::fs::write(&repo_template, REPO_TEMPLATE).unwrap();
    ResolvedConfig {
        updates_dir,
        dashboard_template,
        repo_template,
        output_dir: root.join("dist"),
        config_path: None,
    }
}

fn write_fragment(config: &ResolvedConfig, name: &str, content: &str) {
    std::fs::write(config.updates_dir.join(name), content).unwrap();
}

fn read_output(config: &ResolvedConfig, name: &str) -> String {
    std::fs::read_to_string(config.output_dir.join(name)).unwrap()
}

fn output_files(config: &ResolvedConfig) -> Vec<String> {
    let mut names: Vec<String> = walkdir::WalkDir::new(&config.output_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

#[test]
fn test_build_orders_repos_by_recency() {
    let tmp = TempDir::new().unwrap();
    let config = setup(tmp.path());
    write_fragment(
        &config,
        "updates-older.html",
        &fragment(
            "older",
            "atlas",
            &article("complete", "2024-02-01T09:00:00Z", "Older deploy", "rollout", "fine"),
        ),
    );
    write_fragment(
        &config,
        "updates-newer.html",
        &fragment(
            "newer",
            "vega",
            &article("complete", "2024-03-01T09:00:00Z", "Newer deploy", "rollout", "fine"),
        ),
    );

    let summary = build_site(&config).unwrap();
    assert_eq!(summary.repos, 2);
    assert_eq!(summary.entries, 2);
    assert_eq!(summary.pages_written, 3);

    let dashboard = read_output(&config, "dashboard.html");
    let newer_at = dashboard.find("repo-newer.html").unwrap();
    let older_at = dashboard.find("repo-older.html").unwrap();
    assert!(newer_at < older_at, "most recent repo must come first");
}

#[test]
fn test_repo_page_latest_matches_first_entry() {
    let tmp = TempDir::new().unwrap();
    let config = setup(tmp.path());
    let articles = format!(
        "{}{}{}",
        article("complete", "2024-03-02T08:30:00Z", "Nightly deploy", "rollout", "green"),
        article("error", "2024-03-01T22:10:00Z", "Suite failed", "verify", "flaky socket"),
        article("running", "2024-03-01T20:00:00Z", "Suite started", "verify", ""),
    );
    write_fragment(
        &config,
        "updates-billing-api.html",
        &fragment("billing-api", "atlas", &articles),
    );

    build_site(&config).unwrap();
    let page = read_output(&config, "repo-billing-api.html");

    // latest fields come from the first (newest) entry
    assert!(page.contains("<h1>billing-api</h1>"));
    assert!(page.contains("<p>atlas</p>"));
    assert!(page.contains("status-pill complete\">Complete</span>"));
    assert!(page.contains("Nightly deploy|rollout|2024-03-02 08:30 +0000"));
    // incident fields come from the first error entry
    assert!(page.contains("Suite failed|flaky socket"));
    // 1 complete / (1 complete + 1 error); "running" is excluded
    assert!(page.contains("50%|3|1|2024-03-02 08:30 +0000"));
    // full raw section is carried into the history block
    assert!(page.contains("data-repo=\"billing-api\""));
}

#[test]
fn test_dashboard_row_matches_latest_entry() {
    let tmp = TempDir::new().unwrap();
    let config = setup(tmp.path());
    write_fragment(
        &config,
        "updates-billing-api.html",
        &fragment(
            "billing-api",
            "atlas",
            &article("error", "2024-03-01T10:00:00Z", "Suite failed", "verify", "flaky"),
        ),
    );

    build_site(&config).unwrap();
    let dashboard = read_output(&config, "dashboard.html");
    assert!(dashboard.contains("href=\"repo-billing-api.html\">billing-api</a>"));
    assert!(dashboard.contains("status-pill error\">Error</span>"));
    assert!(dashboard.contains("2024-03-01 10:00 +0000"));
    assert!(dashboard.contains("Suite failed"));
    assert!(dashboard.contains("Agent: atlas"));
}

#[test]
fn test_unparseable_timestamp_displays_raw_and_sorts_last() {
    let tmp = TempDir::new().unwrap();
    let config = setup(tmp.path());
    write_fragment(
        &config,
        "updates-fuzzy.html",
        &fragment(
            "fuzzy",
            "atlas",
            &article("complete", "yesterday", "Manual poke", "ops", ""),
        ),
    );
    write_fragment(
        &config,
        "updates-dated.html",
        &fragment(
            "dated",
            "vega",
            &article("complete", "2020-01-01T00:00:00Z", "Ancient deploy", "rollout", ""),
        ),
    );

    build_site(&config).unwrap();
    let dashboard = read_output(&config, "dashboard.html");
    assert!(dashboard.contains("yesterday"));
    let dated_at = dashboard.find("repo-dated.html").unwrap();
    let fuzzy_at = dashboard.find("repo-fuzzy.html").unwrap();
    assert!(dated_at < fuzzy_at, "unparseable timestamps sort last");
}

#[test]
fn test_empty_updates_dir_renders_placeholder_dashboard() {
    let tmp = TempDir::new().unwrap();
    let config = setup(tmp.path());

    let summary = build_site(&config).unwrap();
    assert_eq!(summary.repos, 0);
    assert_eq!(summary.pages_written, 1);

    let dashboard = read_output(&config, "dashboard.html");
    assert!(dashboard.contains("<td data-label=\"Repo\">-</td>"));
    assert!(dashboard.contains("status-pill error\">Missing</span>"));
    assert!(dashboard.contains("No updates found"));

    assert_eq!(output_files(&config), vec!["dashboard.html"]);
}

#[test]
fn test_non_matching_files_are_ignored() {
    let tmp = TempDir::new().unwrap();
    let config = setup(tmp.path());
    write_fragment(&config, "notes.html", "<section></section>");
    write_fragment(
        &config,
        "updates-real.html",
        &fragment(
            "real",
            "atlas",
            &article("complete", "2024-01-01T00:00:00Z", "ok", "s", "n"),
        ),
    );

    let summary = build_site(&config).unwrap();
    assert_eq!(summary.repos, 1);
    assert_eq!(output_files(&config), vec!["dashboard.html", "repo-real.html"]);
}

#[test]
fn test_rerun_produces_byte_identical_output() {
    let tmp = TempDir::new().unwrap();
    let config = setup(tmp.path());
    write_fragment(
        &config,
        "updates-billing-api.html",
        &fragment(
            "billing-api",
            "atlas",
            &article("complete", "2024-03-02T08:30:00Z", "Nightly deploy", "rollout", "green"),
        ),
    );

    build_site(&config).unwrap();
    let first_dashboard = read_output(&config, "dashboard.html");
    let first_page = read_output(&config, "repo-billing-api.html");

    build_site(&config).unwrap();
    assert_eq!(read_output(&config, "dashboard.html"), first_dashboard);
    assert_eq!(read_output(&config, "repo-billing-api.html"), first_page);
}

#[test]
fn test_missing_template_is_fatal_and_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    let mut config = setup(tmp.path());
    config.repo_template = tmp.path().join("templates/absent.html");

    let err = build_site(&config).unwrap_err();
    assert!(err.to_string().contains("repo template"));
    assert!(!config.output_dir.exists(), "no partial output on fatal error");
}

#[test]
fn test_fragment_without_attrs_uses_filename_fallback() {
    let tmp = TempDir::new().unwrap();
    let config = setup(tmp.path());
    write_fragment(
        &config,
        "updates-fallback-repo.html",
        "<section class=\"update-log\">\n  <article data-status=\"complete\" data-time=\"2024-01-01T00:00:00Z\">\n    <h4>Entry</h4>\n  </article>\n</section>\n",
    );

    build_site(&config).unwrap();
    let dashboard = read_output(&config, "dashboard.html");
    assert!(dashboard.contains("fallback-repo"));
    assert!(dashboard.contains("Agent: unknown"));
    assert!(config.output_dir.join("repo-fallback-repo.html").is_file());
}

#[test]
fn test_config_file_is_discovered_from_project_root() {
    let tmp = TempDir::new().unwrap();
    let config = setup(tmp.path());
    std::fs::write(
        tmp.path().join(".statusdeckrc.json"),
        r#"{"updates_dir": "updates", "output_dir": "rendered"}"#,
    )
    .unwrap();

    let resolved = load_and_resolve(tmp.path(), None).unwrap();
    assert_eq!(resolved.updates_dir, config.updates_dir);
    assert_eq!(resolved.output_dir, tmp.path().join("rendered"));
    assert!(resolved.config_path.is_some());

    write_fragment(
        &config,
        "updates-real.html",
        &fragment(
            "real",
            "atlas",
            &article("complete", "2024-01-01T00:00:00Z", "ok", "s", "n"),
        ),
    );
    build_site(&resolved).unwrap();
    assert!(tmp.path().join("rendered/dashboard.html").is_file());
}
