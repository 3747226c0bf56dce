//! Configuration file support for Statusdeck
//!
//! Loads project-specific configuration from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.statusdeckrc.json` in project root
//! 3. `statusdeck.config.json` in project root
//!
//! All fields are optional. CLI flags take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default updates directory relative to the project root.
const DEFAULT_UPDATES_DIR: &str = "updates";
/// Default dashboard template path relative to the project root.
const DEFAULT_DASHBOARD_TEMPLATE: &str = "templates/dashboard.template.html";
/// Default repository page template path relative to the project root.
const DEFAULT_REPO_TEMPLATE: &str = "templates/repo.template.html";
/// Default output directory relative to the project root.
const DEFAULT_OUTPUT_DIR: &str = "dist";

/// Statusdeck configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusdeckConfig {
    /// Directory scanned for `updates-*.html` fragments
    #[serde(default)]
    pub updates_dir: Option<String>,

    /// Dashboard page template
    #[serde(default)]
    pub dashboard_template: Option<String>,

    /// Per-repository page template
    #[serde(default)]
    pub repo_template: Option<String>,

    /// Directory the rendered pages are written to
    #[serde(default)]
    pub output_dir: Option<String>,
}

/// Resolved configuration: defaults merged with the config file, anchored at
/// the project root.
#[derive(Debug)]
pub struct ResolvedConfig {
    pub updates_dir: PathBuf,
    pub dashboard_template: PathBuf,
    pub repo_template: PathBuf,
    pub output_dir: PathBuf,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl StatusdeckConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("updates_dir", &self.updates_dir),
            ("dashboard_template", &self.dashboard_template),
            ("repo_template", &self.repo_template),
            ("output_dir", &self.output_dir),
        ] {
            if let Some(path) = value {
                if path.trim().is_empty() {
                    anyhow::bail!("{} must not be empty when specified", name);
                }
            }
        }
        if let (Some(dashboard), Some(repo)) = (&self.dashboard_template, &self.repo_template) {
            if dashboard == repo {
                anyhow::bail!(
                    "dashboard_template and repo_template must differ (both are {})",
                    dashboard
                );
            }
        }
        Ok(())
    }
}

/// Load configuration from the project root and resolve it with defaults.
///
/// An explicit path that does not exist is an error; the auto-discovered
/// locations are simply skipped when absent.
pub fn load_and_resolve(project_root: &Path, explicit: Option<&Path>) -> Result<ResolvedConfig> {
    let (config, config_path) = match find_config(project_root, explicit)? {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: StatusdeckConfig = serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            config.validate().with_context(|| {
                format!("Invalid configuration in {}", path.display())
            })?;
            (config, Some(path))
        }
        None => (StatusdeckConfig::default(), None),
    };

    let anchor = |value: &Option<String>, default: &str| -> PathBuf {
        let raw = value.as_deref().unwrap_or(default);
        let path = Path::new(raw);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            project_root.join(path)
        }
    };

    Ok(ResolvedConfig {
        updates_dir: anchor(&config.updates_dir, DEFAULT_UPDATES_DIR),
        dashboard_template: anchor(&config.dashboard_template, DEFAULT_DASHBOARD_TEMPLATE),
        repo_template: anchor(&config.repo_template, DEFAULT_REPO_TEMPLATE),
        output_dir: anchor(&config.output_dir, DEFAULT_OUTPUT_DIR),
        config_path,
    })
}

fn find_config(project_root: &Path, explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.exists() {
            anyhow::bail!("Config file does not exist: {}", path.display());
        }
        return Ok(Some(path.to_path_buf()));
    }

    for candidate in [".statusdeckrc.json", "statusdeck.config.json"] {
        let path = project_root.join(candidate);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_anchor_at_project_root() {
        let root = Path::new("/srv/deck");
        let resolved = load_and_resolve(root, None).unwrap();
        assert_eq!(resolved.updates_dir, root.join("updates"));
        assert_eq!(
            resolved.dashboard_template,
            root.join("templates/dashboard.template.html")
        );
        assert_eq!(resolved.output_dir, root.join("dist"));
        assert!(resolved.config_path.is_none());
    }

    #[test]
    fn test_explicit_missing_config_is_an_error() {
        let err = load_and_resolve(Path::new("/srv/deck"), Some(Path::new("/nope/config.json")))
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_validate_rejects_empty_paths() {
        let config = StatusdeckConfig {
            updates_dir: Some("  ".to_string()),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("updates_dir"));
    }

    #[test]
    fn test_validate_rejects_identical_templates() {
        let config = StatusdeckConfig {
            dashboard_template: Some("page.html".to_string()),
            repo_template: Some("page.html".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let parsed: Result<StatusdeckConfig, _> =
            serde_json::from_str(r#"{"updates_dir": "u", "bogus": 1}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_absolute_paths_pass_through() {
        let root = Path::new("/srv/deck");
        let resolved = load_and_resolve(root, None).unwrap();
        assert!(resolved.repo_template.is_absolute());
    }
}
