//! Policy file discovery.
//!
//! A path given on the command line may name a single policy file or a
//! directory. Directories are scanned for `*.yml` and `*.yaml` files, skipping
//! excluded directories such as `.git`.
//!
//! # Example
//!
//! ```rust,ignore
//! use custos_policy::discovery::PolicyDiscovery;
//!
//! let files = PolicyDiscovery::new().discover("policies/")?;
//! for file in &files {
//!     println!("found policy file: {}", file.display());
//! }
//! ```

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

use crate::error::{PolicyError, Result};

/// Configuration for policy file discovery.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Whether to search subdirectories.
    pub recursive: bool,
    /// Directory names to skip.
    pub exclude_dirs: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            recursive: true,
            exclude_dirs: vec![
                ".git".to_string(),
                "node_modules".to_string(),
                "target".to_string(),
            ],
        }
    }
}

impl DiscoveryConfig {
    /// Creates a new discovery configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to search recursively.
    #[must_use]
    pub const fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Adds a directory to exclude.
    #[must_use]
    pub fn exclude_dir(mut self, dir: impl Into<String>) -> Self {
        self.exclude_dirs.push(dir.into());
        self
    }
}

/// Finds policy files.
#[derive(Debug, Default)]
pub struct PolicyDiscovery {
    config: DiscoveryConfig,
}

impl PolicyDiscovery {
    /// Creates a discovery instance with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a discovery instance with a custom configuration.
    #[must_use]
    pub const fn with_config(config: DiscoveryConfig) -> Self {
        Self { config }
    }

    /// Returns the policy files under `path`, sorted by path.
    ///
    /// A file path is returned as is, whatever its extension.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` does not exist or a directory cannot be read.
    pub fn discover(&self, path: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let root = path.as_ref();

        if !root.exists() {
            return Err(PolicyError::Discovery(format!(
                "Path does not exist: {}",
                root.display()
            )));
        }
        if root.is_file() {
            return Ok(vec![root.to_path_buf()]);
        }

        info!(path = %root.display(), "Scanning for policy files");

        let max_depth = if self.config.recursive { usize::MAX } else { 1 };
        let walker = WalkDir::new(root)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_excluded(entry));

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| PolicyError::Discovery(e.to_string()))?;
            if entry.file_type().is_file() && is_policy_file(entry.path()) {
                debug!(file = %entry.path().display(), "Found policy file");
                files.push(entry.into_path());
            }
        }

        info!(files = files.len(), "Discovery complete");
        Ok(files)
    }

    fn is_excluded(&self, entry: &DirEntry) -> bool {
        // The root itself is never excluded.
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return false;
        }
        let name = entry.file_name().to_str().unwrap_or("");
        let excluded = self.config.exclude_dirs.iter().any(|dir| dir == name);
        if excluded {
            debug!(dir = %entry.path().display(), "Skipping excluded directory");
        }
        excluded
    }
}

/// Returns true for `*.yml` and `*.yaml` paths.
#[must_use]
pub fn is_policy_file(path: &Path) -> bool {
    let extension = path.extension().and_then(OsStr::to_str).unwrap_or("");
    extension.eq_ignore_ascii_case("yml") || extension.eq_ignore_ascii_case("yaml")
}
