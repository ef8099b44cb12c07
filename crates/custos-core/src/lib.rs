//! # Custos Core
//!
//! Deprecation rules and reporting for declarative cloud policies.
//!
//! This crate provides:
//!
//! - [`Deprecation`] - a checkable description of a discouraged usage
//! - [`Context`] - a label attributing a rule to the element that triggered it
//! - [`check_deprecations`] - matching an element's declared rules against its data
//! - [`Report`] - the per-policy aggregation of matches, rendered as text
//!
//! Policy elements take part by implementing [`DeprecationSource`]; resource
//! managers and policies build on it with [`ResourceManager`] and
//! [`PolicySource`].
//!
//! ## Example
//!
//! ```rust
//! use custos_core::{deprecation, Context, Report};
//!
//! let mut report = Report::new("some-policy");
//! report.actions = vec![
//!     Context::new(
//!         "mark-for-op:",
//!         deprecation::optional_fields(["hours", "days"], Some("2021-06-30"))?,
//!     )
//!     .into(),
//!     Context::new("mark-for-op:", deprecation::optional_field("tag", Some("2021-06-30"))?).into(),
//! ];
//!
//! assert_eq!(
//!     report.format(None),
//!     "policy 'some-policy'\n  actions:\n    \
//!      mark-for-op: optional fields deprecated (one of 'hours' or 'days' must be specified)\n    \
//!      mark-for-op: optional field 'tag' deprecated (must be specified)"
//! );
//! # Ok::<(), custos_core::Error>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod collector;
pub mod context;
pub mod deprecation;
pub mod error;
pub mod report;

#[cfg(test)]
mod proptest_tests;

pub use collector::{check_deprecations, DeprecationSource, PolicySource, ResourceManager};
pub use context::{Context, Finding};
pub use deprecation::{
    Data, Deprecation, DeprecationId, DeprecationKind, DeprecationRegistry, ElementKind,
    RemovalDate,
};
pub use error::{Error, Result};
pub use report::{report, Report, Section, SourceLocator};
