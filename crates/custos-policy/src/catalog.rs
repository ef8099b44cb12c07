//! Rule catalogs.
//!
//! A [`Catalog`] records which deprecation rules every known policy element
//! declares: the policy itself, its condition block, execution modes,
//! resource types, and the filters and actions of each resource type.
//!
//! Catalogs are written in YAML:
//!
//! ```yaml
//! conditions:
//!   - kind: field
//!     name: region
//!     replacement: region in condition block
//!     removed_after: "2021-06-30"
//!
//! actions:
//!   - names: [tag, mark]          # current name first, then aliases
//!     resources: [aws.ec2]        # omit to apply to every resource type
//!     deprecations:
//!       - kind: alias
//!         name: mark
//!         removed_after: "2021-06-30"
//!         link: https://example.com/deprecations#mark
//! ```
//!
//! Rule kinds are `alias`, `field`, `element`, `optional-field` and
//! `optional-fields`. Every rule is validated when the catalog is loaded.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use custos_core::{
    Deprecation, DeprecationId, DeprecationKind, DeprecationRegistry, ElementKind, RemovalDate,
    Section,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::document::normalize_resource_type;
use crate::error::{PolicyError, Result};

const BUILTIN_CATALOG: &str = include_str!("builtin.yml");

/// The declared rules of one element type.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementType {
    names: Vec<String>,
    deprecations: Vec<Deprecation>,
}

impl ElementType {
    /// Creates an element type.
    ///
    /// The first name is the current one, later names are aliases.
    #[must_use]
    pub const fn new(names: Vec<String>, deprecations: Vec<Deprecation>) -> Self {
        Self {
            names,
            deprecations,
        }
    }

    /// Returns the current name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.names.first().map_or("", String::as_str)
    }

    /// Returns every name, current first.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns the declared rules.
    #[must_use]
    pub fn deprecations(&self) -> &[Deprecation] {
        &self.deprecations
    }
}

#[derive(Debug, Clone, Default)]
struct ResourceType {
    deprecations: Vec<Deprecation>,
    filters: BTreeMap<String, Arc<ElementType>>,
    actions: BTreeMap<String, Arc<ElementType>>,
}

/// A rule listed by [`Catalog::rules`].
#[derive(Debug, Clone, Copy)]
pub struct CatalogRule<'a> {
    /// The report section the rule contributes to.
    pub section: Section,
    /// The element declaring the rule: a mode, resource, filter or action
    /// name. Empty for policy and condition rules.
    pub element: &'a str,
    /// The rule.
    pub deprecation: &'a Deprecation,
}

/// The deprecation rules of every known policy element.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    policy: Vec<Deprecation>,
    conditions: Vec<Deprecation>,
    modes: BTreeMap<String, Arc<ElementType>>,
    resources: BTreeMap<String, ResourceType>,
    common_filters: BTreeMap<String, Arc<ElementType>>,
    common_actions: BTreeMap<String, Arc<ElementType>>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the catalog shipped with custos.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled catalog fails to load.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str(BUILTIN_CATALOG)
    }

    /// Parses a catalog from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or a rule is invalid.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: CatalogConfig = serde_yaml::from_str(content)?;
        config.build(DeprecationRegistry::global())
    }

    /// Loads a catalog file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| PolicyError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let catalog = Self::from_yaml_str(&content)?;
        debug!(path = %path.display(), rules = catalog.rules().len(), "loaded rule catalog");
        Ok(catalog)
    }

    /// Adds the rules and element types of `other`.
    ///
    /// An element type registered under an existing name replaces it.
    pub fn extend(&mut self, other: Self) {
        self.policy.extend(other.policy);
        self.conditions.extend(other.conditions);
        self.modes.extend(other.modes);
        for (name, resource) in other.resources {
            let entry = self.resources.entry(name).or_default();
            entry.deprecations.extend(resource.deprecations);
            entry.filters.extend(resource.filters);
            entry.actions.extend(resource.actions);
        }
        self.common_filters.extend(other.common_filters);
        self.common_actions.extend(other.common_actions);
    }

    /// Adds a rule checked against the policy's own fields.
    pub fn add_policy_rule(&mut self, deprecation: Deprecation) {
        self.policy.push(deprecation);
    }

    /// Adds a rule checked against the policy's condition block.
    pub fn add_condition_rule(&mut self, deprecation: Deprecation) {
        self.conditions.push(deprecation);
    }

    /// Adds a rule declared by a resource type.
    pub fn add_resource_rule(&mut self, resource: &str, deprecation: Deprecation) {
        self.resources
            .entry(normalize_resource_type(resource))
            .or_default()
            .deprecations
            .push(deprecation);
    }

    /// Registers an execution mode under each of its names.
    pub fn register_mode(&mut self, mode: ElementType) {
        let mode = Arc::new(mode);
        for name in mode.names() {
            self.modes.insert(name.clone(), Arc::clone(&mode));
        }
    }

    /// Registers a filter for the given resource types, or for every
    /// resource type when `resources` is empty.
    pub fn register_filter<S: AsRef<str>>(&mut self, resources: &[S], filter: ElementType) {
        let filter = Arc::new(filter);
        if resources.is_empty() {
            insert_names(&mut self.common_filters, &filter);
        }
        for resource in resources {
            let entry = self
                .resources
                .entry(normalize_resource_type(resource.as_ref()))
                .or_default();
            insert_names(&mut entry.filters, &filter);
        }
    }

    /// Registers an action for the given resource types, or for every
    /// resource type when `resources` is empty.
    pub fn register_action<S: AsRef<str>>(&mut self, resources: &[S], action: ElementType) {
        let action = Arc::new(action);
        if resources.is_empty() {
            insert_names(&mut self.common_actions, &action);
        }
        for resource in resources {
            let entry = self
                .resources
                .entry(normalize_resource_type(resource.as_ref()))
                .or_default();
            insert_names(&mut entry.actions, &action);
        }
    }

    /// Rules checked against the policy's own fields.
    #[must_use]
    pub fn policy_rules(&self) -> &[Deprecation] {
        &self.policy
    }

    /// Rules checked against the policy's condition block.
    #[must_use]
    pub fn condition_rules(&self) -> &[Deprecation] {
        &self.conditions
    }

    /// Rules declared by a resource type.
    #[must_use]
    pub fn resource_rules(&self, resource: &str) -> &[Deprecation] {
        self.resources
            .get(resource)
            .map(|r| r.deprecations.as_slice())
            .unwrap_or_default()
    }

    /// Looks up an execution mode by any of its names.
    #[must_use]
    pub fn mode(&self, name: &str) -> Option<&ElementType> {
        self.modes.get(name).map(Arc::as_ref)
    }

    /// Looks up a filter of a resource type by any of its names.
    ///
    /// Filters registered for the resource type take precedence over filters
    /// registered for every resource type.
    #[must_use]
    pub fn filter(&self, resource: &str, name: &str) -> Option<&ElementType> {
        self.resources
            .get(resource)
            .and_then(|r| r.filters.get(name))
            .or_else(|| self.common_filters.get(name))
            .map(Arc::as_ref)
    }

    /// Looks up an action of a resource type by any of its names.
    ///
    /// Actions registered for the resource type take precedence over actions
    /// registered for every resource type.
    #[must_use]
    pub fn action(&self, resource: &str, name: &str) -> Option<&ElementType> {
        self.resources
            .get(resource)
            .and_then(|r| r.actions.get(name))
            .or_else(|| self.common_actions.get(name))
            .map(Arc::as_ref)
    }

    /// Lists every distinct rule, grouped by report section.
    #[must_use]
    pub fn rules(&self) -> Vec<CatalogRule<'_>> {
        let mut listing = RuleListing::default();

        listing.push(Section::Attributes, "", &self.policy);
        listing.push(Section::Condition, "", &self.conditions);
        for mode in self.modes.values() {
            listing.push(Section::Mode, mode.name(), mode.deprecations());
        }
        for (name, resource) in &self.resources {
            listing.push(Section::Resource, name, &resource.deprecations);
        }
        let filters = self
            .resources
            .values()
            .flat_map(|r| r.filters.values())
            .chain(self.common_filters.values());
        for filter in filters {
            listing.push(Section::Filters, filter.name(), filter.deprecations());
        }
        let actions = self
            .resources
            .values()
            .flat_map(|r| r.actions.values())
            .chain(self.common_actions.values());
        for action in actions {
            listing.push(Section::Actions, action.name(), action.deprecations());
        }

        listing.rules
    }
}

#[derive(Default)]
struct RuleListing<'a> {
    rules: Vec<CatalogRule<'a>>,
    seen: HashSet<DeprecationId>,
}

impl<'a> RuleListing<'a> {
    fn push(&mut self, section: Section, element: &'a str, deprecations: &'a [Deprecation]) {
        for deprecation in deprecations {
            if self.seen.insert(deprecation.id()) {
                self.rules.push(CatalogRule {
                    section,
                    element,
                    deprecation,
                });
            }
        }
    }
}

fn insert_names(map: &mut BTreeMap<String, Arc<ElementType>>, element: &Arc<ElementType>) {
    for name in element.names() {
        map.insert(name.clone(), Arc::clone(element));
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogConfig {
    #[serde(default)]
    policy: Vec<RuleConfig>,
    #[serde(default)]
    conditions: Vec<RuleConfig>,
    #[serde(default)]
    modes: Vec<ElementConfig>,
    #[serde(default)]
    resources: Vec<ResourceConfig>,
    #[serde(default)]
    filters: Vec<ElementConfig>,
    #[serde(default)]
    actions: Vec<ElementConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ResourceConfig {
    resource: String,
    #[serde(default)]
    deprecations: Vec<RuleConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ElementConfig {
    names: Vec<String>,
    #[serde(default)]
    resources: Vec<String>,
    #[serde(default)]
    deprecations: Vec<RuleConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case", deny_unknown_fields)]
enum RuleConfig {
    Alias {
        name: String,
        #[serde(default)]
        removed_after: Value,
        #[serde(default)]
        link: Option<String>,
    },
    Field {
        name: String,
        replacement: String,
        #[serde(default)]
        removed_after: Value,
        #[serde(default)]
        link: Option<String>,
    },
    Element {
        element: ElementKind,
        name: String,
        replacement: String,
        #[serde(default)]
        removed_after: Value,
        #[serde(default)]
        link: Option<String>,
    },
    OptionalField {
        name: String,
        #[serde(default)]
        removed_after: Value,
        #[serde(default)]
        link: Option<String>,
    },
    OptionalFields {
        names: Vec<String>,
        #[serde(default)]
        removed_after: Value,
        #[serde(default)]
        link: Option<String>,
    },
}

impl RuleConfig {
    fn build(self, registry: &DeprecationRegistry) -> custos_core::Result<Deprecation> {
        let (kind, removed_after, link) = match self {
            Self::Alias {
                name,
                removed_after,
                link,
            } => (DeprecationKind::Alias { name }, removed_after, link),
            Self::Field {
                name,
                replacement,
                removed_after,
                link,
            } => (
                DeprecationKind::Field { name, replacement },
                removed_after,
                link,
            ),
            Self::Element {
                element,
                name,
                replacement,
                removed_after,
                link,
            } => (
                DeprecationKind::Element {
                    element,
                    name,
                    replacement,
                },
                removed_after,
                link,
            ),
            Self::OptionalField {
                name,
                removed_after,
                link,
            } => (
                DeprecationKind::Optionality { fields: vec![name] },
                removed_after,
                link,
            ),
            Self::OptionalFields {
                names,
                removed_after,
                link,
            } => (
                DeprecationKind::Optionality { fields: names },
                removed_after,
                link,
            ),
        };

        let removed_after = RemovalDate::from_value(&removed_after)?;
        let deprecation = registry.register(kind, removed_after)?;
        Ok(match link {
            Some(link) => deprecation.with_link(link),
            None => deprecation,
        })
    }
}

fn build_rules(
    registry: &DeprecationRegistry,
    section: &str,
    rules: Vec<RuleConfig>,
) -> Result<Vec<Deprecation>> {
    rules
        .into_iter()
        .map(|rule| {
            rule.build(registry).map_err(|source| PolicyError::InvalidRule {
                section: section.to_string(),
                source,
            })
        })
        .collect()
}

fn build_element(
    registry: &DeprecationRegistry,
    section: &'static str,
    config: ElementConfig,
) -> Result<(Vec<String>, ElementType)> {
    let name = config
        .names
        .first()
        .cloned()
        .ok_or(PolicyError::UnnamedElement { section })?;
    let deprecations = build_rules(registry, &format!("{section}.{name}"), config.deprecations)?;
    Ok((config.resources, ElementType::new(config.names, deprecations)))
}

impl CatalogConfig {
    fn build(self, registry: &DeprecationRegistry) -> Result<Catalog> {
        let mut catalog = Catalog::new();
        catalog.policy = build_rules(registry, "policy", self.policy)?;
        catalog.conditions = build_rules(registry, "conditions", self.conditions)?;

        for config in self.modes {
            let (_, mode) = build_element(registry, "modes", config)?;
            catalog.register_mode(mode);
        }
        for config in self.resources {
            let section = format!("resources.{}", config.resource);
            for deprecation in build_rules(registry, &section, config.deprecations)? {
                catalog.add_resource_rule(&config.resource, deprecation);
            }
        }
        for config in self.filters {
            let (resources, filter) = build_element(registry, "filters", config)?;
            catalog.register_filter(&resources, filter);
        }
        for config in self.actions {
            let (resources, action) = build_element(registry, "actions", config)?;
            catalog.register_action(&resources, action);
        }

        Ok(catalog)
    }
}
