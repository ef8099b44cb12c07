//! Error types for loading policies and rule catalogs.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for policy operations.
pub type Result<T> = std::result::Result<T, PolicyError>;

/// Errors that can occur while loading policy files and rule catalogs.
#[derive(Error, Debug)]
pub enum PolicyError {
    /// Failed to read a file.
    #[error("Failed to read {path}: {source}")]
    FileReadError {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The policy document does not have the expected structure.
    #[error("Invalid policy document: {reason}")]
    InvalidDocument {
        /// Reason the document is invalid.
        reason: String,
    },

    /// A policy is missing a required field.
    #[error("Policy #{index} is missing required field '{field}'")]
    MissingField {
        /// Position of the policy in the file (1-based).
        index: usize,
        /// Name of the missing field.
        field: &'static str,
    },

    /// A catalog rule could not be constructed.
    #[error("Invalid rule in catalog section '{section}': {source}")]
    InvalidRule {
        /// Catalog section the rule belongs to.
        section: String,
        /// Underlying construction error.
        #[source]
        source: custos_core::Error,
    },

    /// A catalog element entry does not name any type.
    #[error("Catalog section '{section}' has an entry without names")]
    UnnamedElement {
        /// Catalog section of the entry.
        section: &'static str,
    },

    /// Policy files could not be discovered.
    #[error("Discovery error: {0}")]
    Discovery(String),

    /// YAML error.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_display() {
        let err = PolicyError::MissingField {
            index: 2,
            field: "resource",
        };
        assert_eq!(err.to_string(), "Policy #2 is missing required field 'resource'");
    }

    #[test]
    fn test_invalid_rule_display() {
        let err = PolicyError::InvalidRule {
            section: "actions".to_string(),
            source: custos_core::Error::InvalidRemovalDate {
                value: "2021-13-01".to_string(),
            },
        };
        assert_eq!(
            err.to_string(),
            "Invalid rule in catalog section 'actions': removed_after must be a valid date in the format 'YYYY-MM-DD', got '2021-13-01'"
        );
    }
}
