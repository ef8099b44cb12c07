//! Per-policy deprecation reports.
//!
//! [`report`] gathers matches from the six sections of a policy into a
//! [`Report`], which renders as indented plain text:
//!
//! ```text
//! policy 'some-policy' (policies.yml:12)
//!   condition: field 'region' has been deprecated (replaced by region in condition block)
//!   actions:
//!     mark-for-op: optional fields deprecated (one of 'hours' or 'days' must be specified)
//!     mark-for-op: optional field 'tag' deprecated (must be specified)
//! ```
//!
//! A section with one entry is rendered on the label line, a section with more
//! entries gets a line per entry. Empty sections are left out.

use std::collections::BTreeSet;
use std::fmt;

use tracing::debug;

use crate::collector::PolicySource;
use crate::context::Finding;
use crate::deprecation::DeprecationId;

/// Maps a policy name to the place it is defined.
pub trait SourceLocator {
    /// Returns a `<file>:<line>` description of where `policy_name` is defined.
    fn find(&self, policy_name: &str) -> Option<String>;
}

/// A section of a deprecation report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// Fields of the policy itself.
    Attributes,
    /// The policy condition block.
    Condition,
    /// The execution mode.
    Mode,
    /// The resource type.
    Resource,
    /// Filters.
    Filters,
    /// Actions.
    Actions,
}

impl Section {
    /// All sections in rendering order.
    pub const ALL: [Self; 6] = [
        Self::Attributes,
        Self::Condition,
        Self::Mode,
        Self::Resource,
        Self::Filters,
        Self::Actions,
    ];

    /// Returns the label used in rendered reports.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Attributes => "attributes",
            Self::Condition => "condition",
            Self::Mode => "mode",
            Self::Resource => "resource",
            Self::Filters => "filters",
            Self::Actions => "actions",
        }
    }
}

/// The deprecations found in one policy.
///
/// # Examples
///
/// ```rust
/// use custos_core::{deprecation, Report};
///
/// let mut report = Report::new("some-policy");
/// assert!(!report.has_deprecations());
/// assert_eq!(report.format(None), "policy 'some-policy'");
///
/// report.conditions.push(
///     deprecation::field("region", "region in condition block", Some("2021-06-30"))?.into(),
/// );
/// assert_eq!(
///     report.format(None),
///     "policy 'some-policy'\n  condition: field 'region' has been deprecated (replaced by region in condition block)"
/// );
/// # Ok::<(), custos_core::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    /// Name of the policy.
    pub policy_name: String,
    /// Matches against the policy's own fields.
    pub policy_fields: Vec<Finding>,
    /// Matches against the condition block.
    pub conditions: Vec<Finding>,
    /// Matches against the execution mode.
    pub mode: Vec<Finding>,
    /// Matches against the resource type.
    pub resource: Vec<Finding>,
    /// Matches against filters, in filter order.
    pub filters: Vec<Finding>,
    /// Matches against actions, in action order.
    pub actions: Vec<Finding>,
}

impl Report {
    /// Creates an empty report.
    #[must_use]
    pub fn new(policy_name: impl Into<String>) -> Self {
        Self {
            policy_name: policy_name.into(),
            ..Self::default()
        }
    }

    /// Returns the findings of one section.
    #[must_use]
    pub fn section(&self, section: Section) -> &[Finding] {
        match section {
            Section::Attributes => &self.policy_fields,
            Section::Condition => &self.conditions,
            Section::Mode => &self.mode,
            Section::Resource => &self.resource,
            Section::Filters => &self.filters,
            Section::Actions => &self.actions,
        }
    }

    /// Returns every section with its findings, in rendering order.
    pub fn sections(&self) -> impl Iterator<Item = (Section, &[Finding])> + '_ {
        Section::ALL
            .into_iter()
            .map(move |section| (section, self.section(section)))
    }

    /// Returns true if any section has a finding.
    #[must_use]
    pub fn has_deprecations(&self) -> bool {
        // Filters and actions are the most likely places.
        !self.filters.is_empty()
            || !self.actions.is_empty()
            || !self.policy_fields.is_empty()
            || !self.conditions.is_empty()
            || !self.resource.is_empty()
            || !self.mode.is_empty()
    }

    /// Returns the total number of findings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections().map(|(_, findings)| findings.len()).sum()
    }

    /// Returns true if the report has no findings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.has_deprecations()
    }

    /// Returns the distinct rule identifiers across all sections.
    #[must_use]
    pub fn rule_ids(&self) -> BTreeSet<DeprecationId> {
        self.sections()
            .flat_map(|(_, findings)| findings.iter().map(Finding::id))
            .collect()
    }

    /// Renders the report.
    ///
    /// When `source_locator` knows where the policy is defined, the location
    /// is appended to the header line.
    #[must_use]
    pub fn format(&self, source_locator: Option<&dyn SourceLocator>) -> String {
        let location = source_locator
            .and_then(|locator| locator.find(&self.policy_name))
            .filter(|location| !location.is_empty())
            .map(|location| format!(" ({location})"))
            .unwrap_or_default();

        let mut lines = vec![format!("policy '{}'{location}", self.policy_name)];
        for (section, findings) in self.sections() {
            render_section(&mut lines, section.label(), findings);
        }
        lines.join("\n")
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(None))
    }
}

fn render_section(lines: &mut Vec<String>, label: &str, findings: &[Finding]) {
    match findings {
        [] => {}
        [finding] => lines.push(format!("  {label}: {finding}")),
        _ => {
            lines.push(format!("  {label}:"));
            lines.extend(findings.iter().map(|finding| format!("    {finding}")));
        }
    }
}

/// Builds the deprecation report for a policy.
///
/// Sections are gathered in a fixed order: the policy's own fields, its
/// condition block, its execution mode, its resource manager, then every
/// filter and every action in policy order.
pub fn report<P>(policy: &P) -> Report
where
    P: PolicySource + ?Sized,
{
    let mut report = Report::new(policy.name());
    report.policy_fields = policy.get_deprecations();
    if let Some(conditions) = policy.conditions() {
        report.conditions = conditions.get_deprecations();
    }
    if let Some(mode) = policy.execution_mode() {
        report.mode = mode.get_deprecations();
    }
    if let Some(manager) = policy.resource_manager() {
        report.resource = manager.get_deprecations();
        report.filters = manager
            .filters()
            .into_iter()
            .flat_map(|filter| filter.get_deprecations())
            .collect();
        report.actions = manager
            .actions()
            .into_iter()
            .flat_map(|action| action.get_deprecations())
            .collect();
    }

    debug!(
        policy = %report.policy_name,
        findings = report.len(),
        "built deprecation report"
    );
    report
}
