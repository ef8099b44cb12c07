//! Deprecation rules.
//!
//! A [`Deprecation`] describes one discouraged usage inside a policy document
//! and knows how to recognise it in the untyped [`Data`] of a filter, action,
//! mode, resource or policy. The set of rule kinds is closed:
//!
//! - [`DeprecationKind::Alias`] - a filter or action type name is deprecated
//! - [`DeprecationKind::Field`] - a data key has been renamed
//! - [`DeprecationKind::Element`] - a whole filter, action or mode is superseded
//! - [`DeprecationKind::Optionality`] - one of several optional fields is becoming required
//!
//! Rules receive their [`DeprecationId`] from a [`DeprecationRegistry`] when they
//! are constructed. The free functions in this module ([`field`], [`alias`], ...)
//! use the process-wide registry.
//!
//! ## Example
//!
//! ```rust
//! use custos_core::deprecation;
//! use serde_json::json;
//!
//! let rule = deprecation::field("severity_normalized", "severity_label", Some("2021-06-30"))?;
//! let data = json!({"severity_normalized": "10"});
//!
//! assert!(rule.check(data.as_object().unwrap()));
//! assert_eq!(
//!     rule.describe(),
//!     "field 'severity_normalized' has been deprecated (replaced by 'severity_label')"
//! );
//! # Ok::<(), custos_core::Error>(())
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Untyped key/value data of a policy document fragment.
pub type Data = serde_json::Map<String, Value>;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// The date after which a deprecated usage is scheduled for removal.
///
/// Only calendar dates written exactly as `YYYY-MM-DD` are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RemovalDate(NaiveDate);

impl RemovalDate {
    /// Parses a removal date.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRemovalDate`] if the value is not a real
    /// calendar date in `YYYY-MM-DD` form. Years start at 1.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use custos_core::RemovalDate;
    ///
    /// assert!(RemovalDate::parse("2021-06-30").is_ok());
    /// assert!(RemovalDate::parse("2021-13-01").is_err());
    /// assert!(RemovalDate::parse("2021-6-30").is_err());
    /// ```
    pub fn parse(value: &str) -> Result<Self> {
        if !has_date_shape(value) {
            return Err(Error::InvalidRemovalDate {
                value: value.to_string(),
            });
        }
        NaiveDate::parse_from_str(value, DATE_FORMAT)
            .ok()
            .filter(|date| date.year() >= 1)
            .map(Self)
            .ok_or_else(|| Error::InvalidRemovalDate {
                value: value.to_string(),
            })
    }

    /// Reads an optional removal date from untyped data.
    ///
    /// `null` means no removal date.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RemovalDateNotString`] for non-string values and
    /// [`Error::InvalidRemovalDate`] for unparsable strings.
    pub fn from_value(value: &Value) -> Result<Option<Self>> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) => Self::parse(s).map(Some),
            other => Err(Error::RemovalDateNotString {
                value: other.to_string(),
            }),
        }
    }

    /// Returns the calendar date.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for RemovalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

fn has_date_shape(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| {
            if i == 4 || i == 7 {
                *b == b'-'
            } else {
                b.is_ascii_digit()
            }
        })
}

/// Identifier of a deprecation rule instance.
///
/// Identifiers are unique within a [`DeprecationRegistry`] and increase in
/// construction order. Clones of a rule share its identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeprecationId(u64);

impl DeprecationId {
    /// Returns the raw identifier value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DeprecationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of policy element a [`DeprecationKind::Element`] rule supersedes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// A resource filter.
    Filter,
    /// A resource action.
    Action,
    /// A policy execution mode.
    Mode,
    /// A resource type.
    Resource,
}

impl ElementKind {
    /// Returns the string representation used in messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Filter => "filter",
            Self::Action => "action",
            Self::Mode => "mode",
            Self::Resource => "resource",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a deprecation rule matches and how it is described.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeprecationKind {
    /// The filter or action type name `name` is deprecated.
    Alias {
        /// Deprecated type name.
        name: String,
    },
    /// The data key `name` has been replaced.
    Field {
        /// Deprecated key.
        name: String,
        /// Replacement key, or a phrase describing the replacement.
        replacement: String,
    },
    /// A whole filter, action or mode is superseded.
    Element {
        /// What kind of element is deprecated.
        element: ElementKind,
        /// Name of the element.
        name: String,
        /// Guidance on what to use instead.
        replacement: String,
    },
    /// At least one of `fields` will become required.
    Optionality {
        /// Field names in declared order, without duplicates.
        fields: Vec<String>,
    },
}

impl DeprecationKind {
    /// Returns a short name for the rule kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Alias { .. } => "alias",
            Self::Field { .. } => "field",
            Self::Element { .. } => "element",
            Self::Optionality { .. } => "optionality",
        }
    }
}

/// A deprecation rule.
///
/// Rules are immutable once shared. [`Deprecation::with_link`] is meant to be
/// chained onto a constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deprecation {
    id: DeprecationId,
    kind: DeprecationKind,
    removed_after: Option<RemovalDate>,
    link: Option<String>,
}

impl Deprecation {
    /// Returns the rule identifier.
    #[must_use]
    pub const fn id(&self) -> DeprecationId {
        self.id
    }

    /// Returns what the rule matches.
    #[must_use]
    pub const fn kind(&self) -> &DeprecationKind {
        &self.kind
    }

    /// Returns the scheduled removal date, if any.
    #[must_use]
    pub const fn removed_after(&self) -> Option<RemovalDate> {
        self.removed_after
    }

    /// Returns the documentation link, if any.
    #[must_use]
    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    /// Attaches a documentation link.
    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// Returns true if `data` uses the deprecated form.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use custos_core::deprecation;
    /// use serde_json::json;
    ///
    /// let rule = deprecation::optional_fields(["days", "hours"], None)?;
    /// assert!(rule.check(json!({}).as_object().unwrap()));
    /// assert!(!rule.check(json!({"days": 1}).as_object().unwrap()));
    /// # Ok::<(), custos_core::Error>(())
    /// ```
    #[must_use]
    pub fn check(&self, data: &Data) -> bool {
        match &self.kind {
            DeprecationKind::Alias { name } => {
                data.get("type").and_then(Value::as_str) == Some(name.as_str())
            }
            DeprecationKind::Field { name, .. } => data.contains_key(name),
            DeprecationKind::Element { .. } => true,
            DeprecationKind::Optionality { fields } => {
                fields.iter().all(|field| !data.contains_key(field))
            }
        }
    }

    /// Returns the human-readable message for this rule.
    #[must_use]
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Deprecation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DeprecationKind::Alias { name } => write!(f, "alias '{name}' has been deprecated"),
            DeprecationKind::Field { name, replacement } => {
                // Single words name a replacement key, anything else is a phrase.
                if replacement.contains(' ') {
                    write!(f, "field '{name}' has been deprecated (replaced by {replacement})")
                } else {
                    write!(f, "field '{name}' has been deprecated (replaced by '{replacement}')")
                }
            }
            DeprecationKind::Element {
                element,
                name,
                replacement,
            } => write!(f, "{element} '{name}' has been deprecated ({replacement})"),
            DeprecationKind::Optionality { fields } => match fields.as_slice() {
                [field] => write!(f, "optional field '{field}' deprecated (must be specified)"),
                _ => {
                    let names = fields
                        .iter()
                        .map(|field| format!("'{field}'"))
                        .collect::<Vec<_>>()
                        .join(" or ");
                    write!(f, "optional fields deprecated (one of {names} must be specified)")
                }
            },
        }
    }
}

/// Hands out deprecation identifiers.
///
/// The process-wide registry returned by [`DeprecationRegistry::global`]
/// backs the free constructor functions. Tests that assert on identifier
/// ordering create their own registry.
#[derive(Debug)]
pub struct DeprecationRegistry {
    next_id: AtomicU64,
}

static GLOBAL_REGISTRY: DeprecationRegistry = DeprecationRegistry::new();

impl Default for DeprecationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DeprecationRegistry {
    /// Creates a registry whose first identifier is 1.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
        }
    }

    /// Returns the process-wide registry.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL_REGISTRY
    }

    /// Validates a rule and assigns it the next identifier.
    ///
    /// Repeated optional field names are kept once, at their first position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyFieldSet`] for an optionality rule without fields.
    pub fn register(
        &self,
        kind: DeprecationKind,
        removed_after: Option<RemovalDate>,
    ) -> Result<Deprecation> {
        let kind = match kind {
            DeprecationKind::Optionality { fields } => {
                if fields.is_empty() {
                    return Err(Error::EmptyFieldSet);
                }
                let mut unique: Vec<String> = Vec::with_capacity(fields.len());
                for field in fields {
                    if !unique.contains(&field) {
                        unique.push(field);
                    }
                }
                DeprecationKind::Optionality { fields: unique }
            }
            other => other,
        };
        let id = DeprecationId(self.next_id.fetch_add(1, Ordering::Relaxed));
        Ok(Deprecation {
            id,
            kind,
            removed_after,
            link: None,
        })
    }

    /// A filter or action alias is deprecated.
    ///
    /// # Errors
    ///
    /// Returns an error if `removed_after` is not a valid date.
    pub fn alias(
        &self,
        name: impl Into<String>,
        removed_after: Option<&str>,
    ) -> Result<Deprecation> {
        let removed_after = parse_removal_date(removed_after)?;
        self.register(DeprecationKind::Alias { name: name.into() }, removed_after)
    }

    /// The field has been renamed to something else.
    ///
    /// # Errors
    ///
    /// Returns an error if `removed_after` is not a valid date.
    pub fn field(
        &self,
        name: impl Into<String>,
        replacement: impl Into<String>,
        removed_after: Option<&str>,
    ) -> Result<Deprecation> {
        let removed_after = parse_removal_date(removed_after)?;
        self.register(
            DeprecationKind::Field {
                name: name.into(),
                replacement: replacement.into(),
            },
            removed_after,
        )
    }

    /// A whole element has been superseded.
    ///
    /// # Errors
    ///
    /// Returns an error if `removed_after` is not a valid date.
    pub fn element(
        &self,
        element: ElementKind,
        name: impl Into<String>,
        replacement: impl Into<String>,
        removed_after: Option<&str>,
    ) -> Result<Deprecation> {
        let removed_after = parse_removal_date(removed_after)?;
        self.register(
            DeprecationKind::Element {
                element,
                name: name.into(),
                replacement: replacement.into(),
            },
            removed_after,
        )
    }

    /// The filter has been superseded by another filter.
    ///
    /// # Errors
    ///
    /// Returns an error if `removed_after` is not a valid date.
    pub fn filter(
        &self,
        name: impl Into<String>,
        replacement: impl Into<String>,
        removed_after: Option<&str>,
    ) -> Result<Deprecation> {
        self.element(ElementKind::Filter, name, replacement, removed_after)
    }

    /// The action has been superseded by another action.
    ///
    /// # Errors
    ///
    /// Returns an error if `removed_after` is not a valid date.
    pub fn action(
        &self,
        name: impl Into<String>,
        replacement: impl Into<String>,
        removed_after: Option<&str>,
    ) -> Result<Deprecation> {
        self.element(ElementKind::Action, name, replacement, removed_after)
    }

    /// The execution mode has been superseded by another mode.
    ///
    /// # Errors
    ///
    /// Returns an error if `removed_after` is not a valid date.
    pub fn mode(
        &self,
        name: impl Into<String>,
        replacement: impl Into<String>,
        removed_after: Option<&str>,
    ) -> Result<Deprecation> {
        self.element(ElementKind::Mode, name, replacement, removed_after)
    }

    /// The field must now be specified.
    ///
    /// # Errors
    ///
    /// Returns an error if `removed_after` is not a valid date.
    pub fn optional_field(
        &self,
        name: impl Into<String>,
        removed_after: Option<&str>,
    ) -> Result<Deprecation> {
        self.optional_fields([name.into()], removed_after)
    }

    /// One of the field names must now be specified.
    ///
    /// # Errors
    ///
    /// Returns an error if `removed_after` is not a valid date or no names
    /// are given.
    pub fn optional_fields<I, S>(
        &self,
        names: I,
        removed_after: Option<&str>,
    ) -> Result<Deprecation>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let removed_after = parse_removal_date(removed_after)?;
        let fields = names.into_iter().map(Into::into).collect();
        self.register(DeprecationKind::Optionality { fields }, removed_after)
    }
}

fn parse_removal_date(removed_after: Option<&str>) -> Result<Option<RemovalDate>> {
    removed_after.map(RemovalDate::parse).transpose()
}

/// A filter or action alias is deprecated.
///
/// # Errors
///
/// Returns an error if `removed_after` is not a valid date.
pub fn alias(name: impl Into<String>, removed_after: Option<&str>) -> Result<Deprecation> {
    DeprecationRegistry::global().alias(name, removed_after)
}

/// The field has been renamed to something else.
///
/// # Errors
///
/// Returns an error if `removed_after` is not a valid date.
pub fn field(
    name: impl Into<String>,
    replacement: impl Into<String>,
    removed_after: Option<&str>,
) -> Result<Deprecation> {
    DeprecationRegistry::global().field(name, replacement, removed_after)
}

/// The filter has been superseded by another filter.
///
/// # Errors
///
/// Returns an error if `removed_after` is not a valid date.
pub fn filter(
    name: impl Into<String>,
    replacement: impl Into<String>,
    removed_after: Option<&str>,
) -> Result<Deprecation> {
    DeprecationRegistry::global().filter(name, replacement, removed_after)
}

/// The action has been superseded by another action.
///
/// # Errors
///
/// Returns an error if `removed_after` is not a valid date.
pub fn action(
    name: impl Into<String>,
    replacement: impl Into<String>,
    removed_after: Option<&str>,
) -> Result<Deprecation> {
    DeprecationRegistry::global().action(name, replacement, removed_after)
}

/// The execution mode has been superseded by another mode.
///
/// # Errors
///
/// Returns an error if `removed_after` is not a valid date.
pub fn mode(
    name: impl Into<String>,
    replacement: impl Into<String>,
    removed_after: Option<&str>,
) -> Result<Deprecation> {
    DeprecationRegistry::global().mode(name, replacement, removed_after)
}

/// The field must now be specified.
///
/// # Errors
///
/// Returns an error if `removed_after` is not a valid date.
pub fn optional_field(name: impl Into<String>, removed_after: Option<&str>) -> Result<Deprecation> {
    DeprecationRegistry::global().optional_field(name, removed_after)
}

/// One of the field names must now be specified.
///
/// # Errors
///
/// Returns an error if `removed_after` is not a valid date or no names are given.
pub fn optional_fields<I, S>(names: I, removed_after: Option<&str>) -> Result<Deprecation>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    DeprecationRegistry::global().optional_fields(names, removed_after)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: Value) -> Data {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_action() {
        let rule = action(
            "set-snapshot-copy-tags",
            "use modify-db instead with `CopyTagsToSnapshot`",
            Some("2021-06-30"),
        )
        .unwrap();

        assert!(rule.check(&Data::new()));
        assert_eq!(
            rule.describe(),
            "action 'set-snapshot-copy-tags' has been deprecated (use modify-db instead with `CopyTagsToSnapshot`)"
        );
    }

    #[test]
    fn test_filter() {
        let rule = filter(
            "unused",
            "use the 'used' filter with 'state' attribute",
            Some("2021-06-30"),
        )
        .unwrap();

        assert!(rule.check(&Data::new()));
        assert_eq!(
            rule.describe(),
            "filter 'unused' has been deprecated (use the 'used' filter with 'state' attribute)"
        );
    }

    #[test]
    fn test_field() {
        let rule = field("severity_normalized", "severity_label", Some("2021-06-30")).unwrap();

        assert!(rule.check(&data(json!({"severity_normalized": "10"}))));
        assert!(!rule.check(&data(json!({"no-match": "ignored"}))));
        assert_eq!(
            rule.describe(),
            "field 'severity_normalized' has been deprecated (replaced by 'severity_label')"
        );
    }

    #[test]
    fn test_field_phrase_replacement_is_not_quoted() {
        let rule = field("region", "region in condition block", None).unwrap();
        assert_eq!(
            rule.to_string(),
            "field 'region' has been deprecated (replaced by region in condition block)"
        );
    }

    #[test]
    fn test_alias() {
        let rule = alias("whitelist", None).unwrap();

        assert!(rule.check(&data(json!({"type": "whitelist"}))));
        assert!(!rule.check(&data(json!({"type": "allow"}))));
        assert!(!rule.check(&data(json!({"whitelist": true}))));
        assert!(!rule.check(&data(json!({"type": ["whitelist"]}))));
        assert_eq!(rule.describe(), "alias 'whitelist' has been deprecated");
    }

    #[test]
    fn test_optional_fields() {
        let rule = optional_fields(["days", "hours"], Some("2021-06-30")).unwrap();

        assert!(rule.check(&Data::new()));
        assert!(!rule.check(&data(json!({"days": 1}))));
        assert!(!rule.check(&data(json!({"days": 1, "hours": 1}))));
    }

    #[test]
    fn test_optional_fields_message_keeps_declared_order() {
        let rule = optional_fields(["hours", "days"], None).unwrap();
        assert_eq!(
            rule.describe(),
            "optional fields deprecated (one of 'hours' or 'days' must be specified)"
        );
    }

    #[test]
    fn test_optional_field_message() {
        let rule = optional_field("tag", Some("2021-06-30")).unwrap();
        assert_eq!(rule.describe(), "optional field 'tag' deprecated (must be specified)");
        assert!(rule.check(&data(json!({"op": "stop"}))));
        assert!(!rule.check(&data(json!({"tag": "maid_status"}))));
    }

    #[test]
    fn test_optional_fields_deduplicates() {
        let rule = optional_fields(["days", "hours", "days"], None).unwrap();
        assert_eq!(
            rule.kind(),
            &DeprecationKind::Optionality {
                fields: vec!["days".to_string(), "hours".to_string()]
            }
        );
    }

    #[test]
    fn test_optional_fields_requires_a_field() {
        let result = optional_fields(Vec::<String>::new(), None);
        assert_eq!(result.unwrap_err(), Error::EmptyFieldSet);
    }

    #[test]
    fn test_invalid_month_is_rejected() {
        let err = field("foo", "bar", Some("2021-13-01")).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidRemovalDate {
                value: "2021-13-01".to_string()
            }
        );
    }

    #[test]
    fn test_removal_date_shapes() {
        assert!(RemovalDate::parse("2024-02-29").is_ok());
        assert!(RemovalDate::parse("2023-02-29").is_err());
        assert!(RemovalDate::parse("2021-6-30").is_err());
        assert!(RemovalDate::parse(" 2021-06-30").is_err());
        assert!(RemovalDate::parse("30-06-2021").is_err());
        assert!(RemovalDate::parse("").is_err());
    }

    #[test]
    fn test_year_zero_is_rejected() {
        assert_eq!(
            RemovalDate::parse("0000-01-01").unwrap_err(),
            Error::InvalidRemovalDate {
                value: "0000-01-01".to_string()
            }
        );
        assert!(RemovalDate::parse("0001-01-01").is_ok());
    }

    #[test]
    fn test_removal_date_from_value() {
        assert_eq!(RemovalDate::from_value(&Value::Null).unwrap(), None);
        assert_eq!(
            RemovalDate::from_value(&json!("2021-06-30"))
                .unwrap()
                .map(|d| d.to_string()),
            Some("2021-06-30".to_string())
        );
        assert_eq!(
            RemovalDate::from_value(&json!(20_210_630)).unwrap_err(),
            Error::RemovalDateNotString {
                value: "20210630".to_string()
            }
        );
        assert!(RemovalDate::from_value(&json!(["2021-06-30"])).is_err());
    }

    #[test]
    fn test_registry_ids_increase() {
        let registry = DeprecationRegistry::new();
        let first = registry.alias("mark", None).unwrap();
        let second = registry.alias("unmark", None).unwrap();

        assert_eq!(first.id().get(), 1);
        assert_eq!(second.id().get(), 2);
        assert!(first.id() < second.id());
    }

    #[test]
    fn test_registry_ids_are_unique_across_threads() {
        let registry = DeprecationRegistry::new();
        let ids: Vec<DeprecationId> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|t| {
                    let registry = &registry;
                    scope.spawn(move || {
                        (0..50)
                            .map(|i| {
                                registry
                                    .alias(format!("alias-{t}-{i}"), None)
                                    .unwrap()
                                    .id()
                            })
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|handle| handle.join().unwrap())
                .collect()
        });

        let unique: std::collections::HashSet<_> = ids.iter().copied().collect();
        assert_eq!(ids.len(), 400);
        assert_eq!(unique.len(), 400);
        assert_eq!(ids.iter().map(|id| id.get()).max(), Some(400));
    }

    #[test]
    fn test_rules_and_reports_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}

        assert_send_sync::<Deprecation>();
        assert_send_sync::<DeprecationRegistry>();
        assert_send_sync::<crate::context::Context>();
        assert_send_sync::<crate::context::Finding>();
        assert_send_sync::<crate::report::Report>();
    }

    #[test]
    fn test_failed_construction_does_not_consume_id() {
        let registry = DeprecationRegistry::new();
        assert!(registry.field("a", "b", Some("not-a-date")).is_err());
        let rule = registry.field("a", "b", None).unwrap();
        assert_eq!(rule.id().get(), 1);
    }

    #[test]
    fn test_clone_keeps_id() {
        let rule = optional_field("tag", None).unwrap();
        let copy = rule.clone();
        assert_eq!(rule.id(), copy.id());
        assert_eq!(rule, copy);
    }

    #[test]
    fn test_link_and_removal_date_accessors() {
        let rule = alias("whitelist", Some("2021-03-21"))
            .unwrap()
            .with_link("https://example.com/deprecations#whitelist");

        assert_eq!(rule.link(), Some("https://example.com/deprecations#whitelist"));
        assert_eq!(
            rule.removed_after().map(|d| d.to_string()),
            Some("2021-03-21".to_string())
        );
        assert_eq!(rule.kind().as_str(), "alias");
    }

    #[test]
    fn test_mode_element() {
        let rule = mode("ec2-instance-state", "use cloudtrail mode", None).unwrap();
        assert_eq!(
            rule.describe(),
            "mode 'ec2-instance-state' has been deprecated (use cloudtrail mode)"
        );
    }
}
