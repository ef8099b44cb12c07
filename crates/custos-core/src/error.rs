//! Error types for Custos core operations.
//!
//! Every error here is raised while a deprecation rule is being constructed.
//! Checking, describing, collecting and formatting never fail.

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while constructing deprecation rules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The removal date is not a calendar date in `YYYY-MM-DD` form.
    #[error("removed_after must be a valid date in the format 'YYYY-MM-DD', got '{value}'")]
    InvalidRemovalDate {
        /// The offending value.
        value: String,
    },

    /// The removal date was supplied as something other than a string.
    #[error("removed_after must be a string, got {value}")]
    RemovalDateNotString {
        /// The offending value, rendered as JSON.
        value: String,
    },

    /// An optionality rule was declared without any field names.
    #[error("optional field rule must name at least one field")]
    EmptyFieldSet,
}
