//! Attributing deprecations to the element that triggered them.
//!
//! One rule instance is frequently shared by several filters or actions. A
//! [`Context`] puts a label in front of the rule's message so a report can say
//! which element the match came from. [`Finding`] is the entry type of every
//! collected sequence: either a bare rule or a rule in context.

use std::fmt;

use crate::deprecation::{Deprecation, DeprecationId};

/// A deprecation with a free-text label naming where it was found.
///
/// # Examples
///
/// ```rust
/// use custos_core::{deprecation, Context};
///
/// let rule = deprecation::optional_field("tag", Some("2021-06-30"))?;
/// let context = Context::new("mark-for-op:", rule.clone());
///
/// assert_eq!(context.id(), rule.id());
/// assert_eq!(
///     context.describe(),
///     "mark-for-op: optional field 'tag' deprecated (must be specified)"
/// );
/// # Ok::<(), custos_core::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    label: String,
    deprecation: Deprecation,
}

impl Context {
    /// Wraps a deprecation with a label.
    #[must_use]
    pub fn new(label: impl Into<String>, deprecation: Deprecation) -> Self {
        Self {
            label: label.into(),
            deprecation,
        }
    }

    /// Returns the label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the wrapped deprecation.
    #[must_use]
    pub const fn deprecation(&self) -> &Deprecation {
        &self.deprecation
    }

    /// Returns the identifier of the wrapped deprecation.
    #[must_use]
    pub const fn id(&self) -> DeprecationId {
        self.deprecation.id()
    }

    /// Returns the labelled message.
    #[must_use]
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.label, self.deprecation)
    }
}

/// A deprecation match, with or without context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// A rule reported as-is.
    Rule(Deprecation),
    /// A rule attributed to a labelled element.
    Context(Context),
}

impl Finding {
    /// Returns the identifier of the underlying rule.
    #[must_use]
    pub const fn id(&self) -> DeprecationId {
        self.deprecation().id()
    }

    /// Returns the underlying rule.
    #[must_use]
    pub const fn deprecation(&self) -> &Deprecation {
        match self {
            Self::Rule(deprecation) => deprecation,
            Self::Context(context) => context.deprecation(),
        }
    }

    /// Returns the context label, if any.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Rule(_) => None,
            Self::Context(context) => Some(context.label()),
        }
    }

    /// Returns the message as it appears in a report.
    #[must_use]
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rule(deprecation) => fmt::Display::fmt(deprecation, f),
            Self::Context(context) => fmt::Display::fmt(context, f),
        }
    }
}

impl From<Deprecation> for Finding {
    fn from(deprecation: Deprecation) -> Self {
        Self::Rule(deprecation)
    }
}

impl From<Context> for Finding {
    fn from(context: Context) -> Self {
        Self::Context(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deprecation;

    #[test]
    fn test_context_describe() {
        let rule = deprecation::optional_fields(["hours", "days"], Some("2021-06-30")).unwrap();
        let context = Context::new("mark-for-op:", rule);

        assert_eq!(
            context.to_string(),
            "mark-for-op: optional fields deprecated (one of 'hours' or 'days' must be specified)"
        );
        assert_eq!(context.label(), "mark-for-op:");
    }

    #[test]
    fn test_shared_rule_keeps_id_across_contexts() {
        let rule = deprecation::optional_field("tag", None).unwrap();
        let first = Context::new("mark-for-op:", rule.clone());
        let second = Context::new("auto-tag-user:", rule.clone());

        assert_eq!(first.id(), rule.id());
        assert_eq!(second.id(), rule.id());
        assert_ne!(first, second);
    }

    #[test]
    fn test_finding_delegates() {
        let rule = deprecation::field("foo", "bar", None).unwrap();
        let bare = Finding::from(rule.clone());
        let wrapped = Finding::from(Context::new("mode:", rule.clone()));

        assert_eq!(bare.id(), wrapped.id());
        assert_eq!(bare.label(), None);
        assert_eq!(wrapped.label(), Some("mode:"));
        assert_eq!(bare.describe(), "field 'foo' has been deprecated (replaced by 'bar')");
        assert_eq!(
            wrapped.describe(),
            "mode: field 'foo' has been deprecated (replaced by 'bar')"
        );
        assert_eq!(wrapped.deprecation(), &rule);
    }
}
