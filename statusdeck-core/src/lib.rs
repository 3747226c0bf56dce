//! Statusdeck core library - static status dashboard generation

#![deny(warnings)]

// Global invariants enforced in this crate:
// - Single-threaded, fully synchronous, no suspension points
// - All input files are read before any output is written
// - Deterministic traversal and sort order must be explicit
// - Identical input yields byte-for-byte identical output

pub mod aggregate;
pub mod config;
pub mod discover;
pub mod extract;
pub mod html;
pub mod timestamp;

pub use config::{load_and_resolve, ResolvedConfig, StatusdeckConfig};
pub use extract::{RepoRecord, UpdateEntry, UpdateStatus};
pub use html::{Templates, DASHBOARD_FILE};
pub use timestamp::Stamp;

use anyhow::{Context, Result};

/// Counts reported back to the caller after a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
    pub repos: usize,
    pub entries: usize,
    pub pages_written: usize,
}

/// Run the whole transform: discover fragments, extract, aggregate, render,
/// write.
///
/// Outputs are overwritten unconditionally. Zero input files is not an
/// error: the dashboard gets its placeholder row and no repository pages are
/// produced. Unreadable templates, an unreadable updates directory, an
/// unreadable fragment, or an unwritable output path abort the run.
pub fn build_site(config: &ResolvedConfig) -> Result<BuildSummary> {
    // Templates first: a broken template must not leave partial output.
    let templates = Templates::load(&config.dashboard_template, &config.repo_template)?;

    let update_files = discover::collect_update_files(&config.updates_dir)?;

    // Read and extract every input before writing anything.
    let mut records = Vec::with_capacity(update_files.len());
    for path in &update_files {
        records.push(extract::parse_update_file(path)?);
    }
    let records = aggregate::sort_records(records);
    let entries: usize = records.iter().map(|r| r.entries.len()).sum();

    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            config.output_dir.display()
        )
    })?;

    let mut pages_written = 0;
    let dashboard_path = config.output_dir.join(DASHBOARD_FILE);
    let dashboard = html::render_dashboard(&templates, &records);
    std::fs::write(&dashboard_path, dashboard)
        .with_context(|| format!("Failed to write {}", dashboard_path.display()))?;
    pages_written += 1;

    for record in &records {
        let page_path = config.output_dir.join(html::repo_page_file(&record.repo));
        let page = html::render_repo_page(&templates, record, &records);
        std::fs::write(&page_path, page)
            .with_context(|| format!("Failed to write {}", page_path.display()))?;
        pages_written += 1;
    }

    Ok(BuildSummary {
        repos: records.len(),
        entries,
        pages_written,
    })
}
