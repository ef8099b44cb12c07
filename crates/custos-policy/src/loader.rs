//! Loading policy files for checking.

use std::fs;
use std::path::{Path, PathBuf};

use custos_core::Report;
use tracing::debug;

use crate::binding::Policy;
use crate::catalog::Catalog;
use crate::document::PolicyFile;
use crate::error::{PolicyError, Result};
use crate::locator::YamlSourceLocator;

/// The policies of one file together with their source locations.
#[derive(Debug, Clone)]
pub struct LoadedPolicies {
    path: PathBuf,
    file: PolicyFile,
    locator: YamlSourceLocator,
}

impl LoadedPolicies {
    /// Reads and parses a policy file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid policy
    /// file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| PolicyError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let file = PolicyFile::from_yaml_str(&content)?;
        debug!(path = %path.display(), policies = file.len(), "loaded policy file");

        Ok(Self {
            path: path.to_path_buf(),
            locator: YamlSourceLocator::new(path.display().to_string(), &content),
            file,
        })
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the parsed policies.
    #[must_use]
    pub const fn file(&self) -> &PolicyFile {
        &self.file
    }

    /// Returns the source locator for this file.
    #[must_use]
    pub const fn locator(&self) -> &YamlSourceLocator {
        &self.locator
    }

    /// Builds the deprecation report of every policy, in file order.
    #[must_use]
    pub fn reports(&self, catalog: &Catalog) -> Vec<Report> {
        self.file
            .policies
            .iter()
            .map(|document| Policy::bind(document, catalog).report())
            .collect()
    }
}
