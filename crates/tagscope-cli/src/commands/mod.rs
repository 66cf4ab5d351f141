//! CLI command implementations

pub mod check;
pub mod plan;
pub mod table;

pub use check::CheckArgs;
pub use plan::PlanArgs;
pub use table::TableArgs;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::env;
use std::path::Path;
use tagscope_core::TagLibrary;
use tagscope_core::config::{CONFIG_FILENAME, find_config_file, load_config_with_warnings};
use tracing::debug;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the variable synchronization table for every handler kind
    Table(TableArgs),

    /// Show the synchronization plan for one tag invocation
    Plan(PlanArgs),

    /// Plan every registered tag and report translation errors
    Check(CheckArgs),
}

/// Loads tag registrations from `config`, or from the nearest `tagscope.toml`.
pub fn load_library(config: Option<&Path>) -> Result<TagLibrary> {
    let path = match config {
        Some(path) => path.to_path_buf(),
        None => {
            let cwd = env::current_dir()?;
            find_config_file(&cwd).with_context(|| {
                format!(
                    "No {} found in {} or its parents",
                    CONFIG_FILENAME,
                    cwd.display()
                )
            })?
        }
    };

    debug!(path = %path.display(), "loading tag registrations");
    let result = load_config_with_warnings(&path)?;
    for warning in &result.warnings {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }

    Ok(TagLibrary::new(result.config))
}

pub fn configure_colors(no_color: bool) {
    let no_color_env = env::var("NO_COLOR").is_ok();
    if no_color || no_color_env {
        colored::control::set_override(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn load_library_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[[tag]]\nname = \"out\"\nkind = \"classic\"\n").unwrap();

        let library = load_library(Some(&path)).unwrap();

        assert_eq!(library.len(), 1);
        assert!(library.get("out").is_some());
    }

    #[test]
    fn load_library_reports_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(&path, "[[tag]]\nname = \"out\"\n").unwrap();

        let err = load_library(Some(&path)).unwrap_err();

        assert!(err.to_string().contains("Invalid TOML"));
    }
}
