//! CLI commands and argument parsing.

pub mod check;
pub mod rules;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use custos_policy::Catalog;
use tracing::{debug, info};

/// Custos - Deprecation checker for cloud policies
#[derive(Parser)]
#[command(name = "custos")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Report deprecated usage in policy files
    Check(check::CheckArgs),

    /// List the known deprecation rules
    Rules(rules::RulesArgs),

    /// Print version information
    Version,
}

/// Returns the per-user catalog path, `<config dir>/custos/catalog.yml`.
pub fn user_catalog_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("custos").join("catalog.yml"))
}

/// Loads the builtin catalog, extended by a user catalog.
///
/// An explicit `path` must exist. Without one, the per-user catalog is used
/// when present.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    let mut catalog = Catalog::builtin().context("Failed to load builtin catalog")?;

    let user_catalog = match path {
        Some(path) => Some(path.to_path_buf()),
        None => user_catalog_path().filter(|path| path.is_file()),
    };

    if let Some(path) = user_catalog {
        info!(path = %path.display(), "Loading user catalog");
        let extra = Catalog::from_yaml_file(&path)
            .with_context(|| format!("Failed to load catalog {}", path.display()))?;
        catalog.extend(extra);
    } else {
        debug!("No user catalog");
    }

    Ok(catalog)
}
