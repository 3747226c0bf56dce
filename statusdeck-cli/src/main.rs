//! Statusdeck CLI - static status dashboard generator

#![deny(warnings)]

// Global invariants enforced:
// - One-shot batch transform, no retries
// - Identical input yields byte-for-byte identical output

use anyhow::Context;
use clap::{Parser, Subcommand};
use statusdeck_core::{build_site, config};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "statusdeck")]
#[command(about = "Render a static status dashboard from per-repository HTML update fragments")]
#[command(version = env!("STATUSDECK_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the dashboard and per-repository pages
    Build {
        /// Updates directory to scan for updates-*.html fragments
        /// (overrides config file)
        path: Option<PathBuf>,

        /// Dashboard template path (overrides config file)
        #[arg(long)]
        dashboard_template: Option<PathBuf>,

        /// Per-repository page template path (overrides config file)
        #[arg(long)]
        repo_template: Option<PathBuf>,

        /// Output directory (overrides config file)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Validate a configuration file
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without rendering anything
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            path,
            dashboard_template,
            repo_template,
            output,
            config: config_path,
        } => {
            let project_root = std::env::current_dir()?;
            let mut resolved = config::load_and_resolve(&project_root, config_path.as_deref())
                .context("failed to load configuration")?;

            if let Some(config_path) = &resolved.config_path {
                eprintln!("Using config: {}", config_path.display());
            }

            // CLI flags override config file values
            if let Some(path) = path {
                resolved.updates_dir = absolutize(path, &project_root);
            }
            if let Some(path) = dashboard_template {
                resolved.dashboard_template = absolutize(path, &project_root);
            }
            if let Some(path) = repo_template {
                resolved.repo_template = absolutize(path, &project_root);
            }
            if let Some(path) = output {
                resolved.output_dir = absolutize(path, &project_root);
            }

            if !resolved.updates_dir.exists() {
                anyhow::bail!(
                    "Updates directory does not exist: {}",
                    resolved.updates_dir.display()
                );
            }

            let summary = build_site(&resolved)?;
            println!(
                "Rendered {} page(s) ({} repo(s), {} entr{})",
                summary.pages_written,
                summary.repos,
                summary.entries,
                if summary.entries == 1 { "y" } else { "ies" },
            );
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let project_root = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&project_root, path.as_deref());

                match resolved {
                    Ok(config) => {
                        if let Some(ref p) = config.config_path {
                            println!("Config valid: {}", p.display());
                        } else {
                            println!("No config file found. Using defaults.");
                        }
                    }
                    Err(e) => {
                        eprintln!("Config validation failed: {:#}", e);
                        std::process::exit(1);
                    }
                }
            }
            ConfigAction::Show { path } => {
                let project_root = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&project_root, path.as_deref())
                    .context("failed to load configuration")?;

                println!("Configuration:");
                if let Some(ref p) = resolved.config_path {
                    println!("  Source: {}", p.display());
                } else {
                    println!("  Source: defaults (no config file found)");
                }
                println!();
                println!("Paths:");
                println!("  updates_dir: {}", resolved.updates_dir.display());
                println!(
                    "  dashboard_template: {}",
                    resolved.dashboard_template.display()
                );
                println!("  repo_template: {}", resolved.repo_template.display());
                println!("  output_dir: {}", resolved.output_dir.display());
            }
        },
    }

    Ok(())
}

fn absolutize(path: PathBuf, project_root: &std::path::Path) -> PathBuf {
    if path.is_relative() {
        project_root.join(path)
    } else {
        path
    }
}
