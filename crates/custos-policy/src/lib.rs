//! # Custos Policy
//!
//! Policy documents and rule catalogs for the Custos deprecation checker.
//!
//! This crate provides functionality for:
//!
//! - Parsing YAML policy files into [`PolicyDocument`]s
//! - Loading rule [`Catalog`]s, including the built-in one
//! - Binding policies to catalog rules so `custos-core` can report on them
//! - Locating policies in their source files
//! - Discovering policy files in directories
//!
//! ## Example
//!
//! ```rust
//! use custos_policy::{Catalog, Policy, PolicyFile};
//!
//! let file = PolicyFile::from_yaml_str(
//!     r"
//! policies:
//!   - name: ec2-tag
//!     resource: ec2
//!     actions:
//!       - type: mark
//!         key: owner
//! ",
//! )?;
//! let catalog = Catalog::builtin()?;
//!
//! let report = Policy::bind(&file.policies[0], &catalog).report();
//! assert_eq!(
//!     report.to_string(),
//!     "policy 'ec2-tag'\n  actions: mark: alias 'mark' has been deprecated"
//! );
//! # Ok::<(), custos_policy::PolicyError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod binding;
pub mod catalog;
pub mod discovery;
pub mod document;
pub mod error;
pub mod loader;
pub mod locator;

pub use binding::{BoundElement, BoundResource, Policy, DEFAULT_MODE, VALUE_FILTER};
pub use catalog::{Catalog, CatalogRule, ElementType};
pub use discovery::{DiscoveryConfig, PolicyDiscovery};
pub use document::{PolicyDocument, PolicyFile, DEFAULT_PROVIDER};
pub use error::{PolicyError, Result};
pub use loader::LoadedPolicies;
pub use locator::YamlSourceLocator;
