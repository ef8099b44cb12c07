//! Collecting deprecation matches from policy collaborators.
//!
//! Filters, actions, modes, condition blocks, resource managers and policies
//! all implement [`DeprecationSource`]: they declare which rules apply to them
//! and expose the policy-document fragment those rules are checked against.
//! [`check_deprecations`] turns that declaration into matches.

use tracing::trace;

use crate::context::{Context, Finding};
use crate::deprecation::{Data, Deprecation};

/// A policy element that declares deprecation rules.
///
/// Every method has a default, so an element without deprecations only needs
/// an empty `impl`.
pub trait DeprecationSource {
    /// The rules applicable to this element type, in declaration order.
    fn deprecations(&self) -> &[Deprecation] {
        &[]
    }

    /// The raw policy-document fragment of this element.
    fn data(&self) -> Option<&Data> {
        None
    }

    /// Returns the rules that match this element's own data.
    fn get_deprecations(&self) -> Vec<Finding> {
        check_deprecations(self, None, None)
    }
}

/// A resource manager with its attached filters and actions.
pub trait ResourceManager: DeprecationSource {
    /// Filters in policy order.
    fn filters(&self) -> Vec<&dyn DeprecationSource>;

    /// Actions in policy order.
    fn actions(&self) -> Vec<&dyn DeprecationSource>;
}

/// A policy and the collaborators a deprecation report is built from.
///
/// A policy without a condition block, mode or resource manager contributes
/// nothing for that section.
pub trait PolicySource: DeprecationSource {
    /// The policy name.
    fn name(&self) -> &str;

    /// The condition block.
    fn conditions(&self) -> Option<&dyn DeprecationSource> {
        None
    }

    /// The execution mode.
    fn execution_mode(&self) -> Option<&dyn DeprecationSource> {
        None
    }

    /// The resource manager.
    fn resource_manager(&self) -> Option<&dyn ResourceManager> {
        None
    }
}

/// Returns the rules declared by `source` that match its data.
///
/// `data` overrides the source's own data; a source without data is checked
/// against an empty mapping. When `context` is given every match is wrapped in
/// a [`Context`] with that label. Matches keep declaration order.
///
/// # Examples
///
/// ```rust
/// use custos_core::{check_deprecations, deprecation, Data, Deprecation, DeprecationSource};
/// use serde_json::json;
///
/// struct MarkForOp {
///     rules: Vec<Deprecation>,
///     data: Data,
/// }
///
/// impl DeprecationSource for MarkForOp {
///     fn deprecations(&self) -> &[Deprecation] {
///         &self.rules
///     }
///
///     fn data(&self) -> Option<&Data> {
///         Some(&self.data)
///     }
/// }
///
/// let action = MarkForOp {
///     rules: vec![deprecation::optional_field("tag", None)?],
///     data: json!({"type": "mark-for-op", "op": "stop"}).as_object().cloned().unwrap(),
/// };
///
/// let found = check_deprecations(&action, Some("mark-for-op:"), None);
/// assert_eq!(found.len(), 1);
/// assert_eq!(
///     found[0].describe(),
///     "mark-for-op: optional field 'tag' deprecated (must be specified)"
/// );
/// # Ok::<(), custos_core::Error>(())
/// ```
pub fn check_deprecations<S>(source: &S, context: Option<&str>, data: Option<&Data>) -> Vec<Finding>
where
    S: DeprecationSource + ?Sized,
{
    let empty = Data::new();
    let data = data.or_else(|| source.data()).unwrap_or(&empty);

    let found: Vec<Finding> = source
        .deprecations()
        .iter()
        .filter(|deprecation| deprecation.check(data))
        .map(|deprecation| match context {
            Some(label) => Context::new(label, deprecation.clone()).into(),
            None => deprecation.clone().into(),
        })
        .collect();

    trace!(
        declared = source.deprecations().len(),
        matched = found.len(),
        context = context.unwrap_or_default(),
        "checked deprecations"
    );

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deprecation;
    use serde_json::json;

    struct Element {
        rules: Vec<Deprecation>,
        data: Option<Data>,
    }

    impl DeprecationSource for Element {
        fn deprecations(&self) -> &[Deprecation] {
            &self.rules
        }

        fn data(&self) -> Option<&Data> {
            self.data.as_ref()
        }
    }

    struct Undeclared;

    impl DeprecationSource for Undeclared {}

    fn tag_action(data: serde_json::Value) -> Element {
        Element {
            rules: vec![
                deprecation::optional_fields(["hours", "days"], Some("2021-06-30")).unwrap(),
                deprecation::optional_field("tag", Some("2021-06-30")).unwrap(),
            ],
            data: data.as_object().cloned(),
        }
    }

    #[test]
    fn test_collects_matching_rules_in_order() {
        let action = tag_action(json!({"type": "mark-for-op", "op": "stop"}));
        let found = action.get_deprecations();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].id(), action.rules[0].id());
        assert_eq!(found[1].id(), action.rules[1].id());
        assert!(found.iter().all(|f| f.label().is_none()));
    }

    #[test]
    fn test_skips_rules_that_do_not_match() {
        let action = tag_action(json!({"type": "mark-for-op", "days": 4, "tag": "maid"}));
        assert!(action.get_deprecations().is_empty());
    }

    #[test]
    fn test_wraps_matches_in_context() {
        let action = tag_action(json!({"type": "mark-for-op", "hours": 2}));
        let found = check_deprecations(&action, Some("mark-for-op:"), None);

        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].describe(),
            "mark-for-op: optional field 'tag' deprecated (must be specified)"
        );
    }

    #[test]
    fn test_explicit_data_overrides_source_data() {
        let action = tag_action(json!({"type": "mark-for-op"}));
        let data = json!({"days": 1, "tag": "x"});
        let found = check_deprecations(&action, None, data.as_object());
        assert!(found.is_empty());
    }

    #[test]
    fn test_missing_data_checks_against_empty_mapping() {
        let element = Element {
            rules: vec![
                deprecation::field("whitelist", "allow", None).unwrap(),
                deprecation::optional_field("tag", None).unwrap(),
            ],
            data: None,
        };

        let found = element.get_deprecations();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), element.rules[1].id());
    }

    #[test]
    fn test_undeclared_source_contributes_nothing() {
        assert!(Undeclared.get_deprecations().is_empty());
        assert!(check_deprecations(&Undeclared, Some("filter:"), None).is_empty());
    }

    #[test]
    fn test_collection_is_idempotent() {
        let action = tag_action(json!({"type": "mark-for-op"}));
        let first = check_deprecations(&action, Some("mark-for-op:"), None);
        let second = check_deprecations(&action, Some("mark-for-op:"), None);
        assert_eq!(first, second);
    }

    #[test]
    fn test_trait_objects() {
        let action = tag_action(json!({}));
        let source: &dyn DeprecationSource = &action;
        assert_eq!(source.get_deprecations().len(), 2);
    }
}
