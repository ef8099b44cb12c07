//! Binding policy documents to catalog rules.
//!
//! [`Policy::bind`] pairs every element of a [`PolicyDocument`] with the rules
//! the [`Catalog`] declares for its type. The result implements
//! [`PolicySource`], so [`custos_core::report`] can build its deprecation
//! report.
//!
//! Filters and actions may be written as a bare type name (`- running`) or as
//! a mapping with a `type` key. Filter mappings without a `type` are value
//! filters, and `or`/`and`/`not` blocks are flattened into the filters they
//! contain. Findings of filters and actions are labelled with the type name as
//! written, e.g. `mark:`.

use std::borrow::Cow;

use custos_core::{
    check_deprecations, Data, Deprecation, DeprecationSource, Finding, PolicySource, Report,
    ResourceManager,
};
use serde_json::Value;
use tracing::{trace, warn};

use crate::catalog::{Catalog, ElementType};
use crate::document::PolicyDocument;

/// Mode type assumed when a policy has no `mode` block or it has no `type`.
pub const DEFAULT_MODE: &str = "pull";

/// Filter type of mappings written without a `type` key.
pub const VALUE_FILTER: &str = "value";

const BOOLEAN_BLOCKS: [&str; 3] = ["or", "and", "not"];

/// A policy element bound to the rules of its type.
#[derive(Debug, Clone)]
pub struct BoundElement<'a> {
    type_name: String,
    label: Option<String>,
    data: Cow<'a, Data>,
    rules: &'a [Deprecation],
}

impl<'a> BoundElement<'a> {
    fn new(type_name: String, data: Cow<'a, Data>, element: Option<&'a ElementType>) -> Self {
        if element.is_none() {
            trace!(element = %type_name, "no catalog entry");
        }
        Self {
            type_name,
            label: None,
            data,
            rules: element.map(ElementType::deprecations).unwrap_or_default(),
        }
    }

    fn labelled(mut self) -> Self {
        self.label = Some(format!("{}:", self.type_name));
        self
    }

    /// Returns the type name as written in the policy.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the label findings are attributed to, if any.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl DeprecationSource for BoundElement<'_> {
    fn deprecations(&self) -> &[Deprecation] {
        self.rules
    }

    fn data(&self) -> Option<&Data> {
        Some(&self.data)
    }

    fn get_deprecations(&self) -> Vec<Finding> {
        check_deprecations(self, self.label.as_deref(), None)
    }
}

/// Rules checked against the whole policy, such as the condition block.
#[derive(Debug, Clone, Copy)]
struct Scoped<'a> {
    data: &'a Data,
    rules: &'a [Deprecation],
}

impl DeprecationSource for Scoped<'_> {
    fn deprecations(&self) -> &[Deprecation] {
        self.rules
    }

    fn data(&self) -> Option<&Data> {
        Some(self.data)
    }
}

/// The resource type of a policy with its filters and actions.
#[derive(Debug, Clone)]
pub struct BoundResource<'a> {
    resource: Scoped<'a>,
    filters: Vec<BoundElement<'a>>,
    actions: Vec<BoundElement<'a>>,
}

impl<'a> BoundResource<'a> {
    /// Returns the bound filters in policy order.
    #[must_use]
    pub fn bound_filters(&self) -> &[BoundElement<'a>] {
        &self.filters
    }

    /// Returns the bound actions in policy order.
    #[must_use]
    pub fn bound_actions(&self) -> &[BoundElement<'a>] {
        &self.actions
    }
}

impl DeprecationSource for BoundResource<'_> {
    fn deprecations(&self) -> &[Deprecation] {
        self.resource.rules
    }

    fn data(&self) -> Option<&Data> {
        Some(self.resource.data)
    }
}

impl ResourceManager for BoundResource<'_> {
    fn filters(&self) -> Vec<&dyn DeprecationSource> {
        self.filters
            .iter()
            .map(|f| f as &dyn DeprecationSource)
            .collect()
    }

    fn actions(&self) -> Vec<&dyn DeprecationSource> {
        self.actions
            .iter()
            .map(|a| a as &dyn DeprecationSource)
            .collect()
    }
}

/// A policy document bound to a catalog.
#[derive(Debug, Clone)]
pub struct Policy<'a> {
    document: &'a PolicyDocument,
    policy: Scoped<'a>,
    conditions: Scoped<'a>,
    mode: BoundElement<'a>,
    resource: BoundResource<'a>,
}

impl<'a> Policy<'a> {
    /// Binds every element of `document` to its rules in `catalog`.
    ///
    /// Elements whose type the catalog does not know declare no rules.
    #[must_use]
    pub fn bind(document: &'a PolicyDocument, catalog: &'a Catalog) -> Self {
        let data = document.data();
        let resource_type = document.resource_type();

        let mode = bind_mode(document.mode(), catalog);

        let mut filters = Vec::new();
        for filter in document.filters() {
            bind_filter(filter, resource_type, catalog, &mut filters);
        }

        let actions = document
            .actions()
            .iter()
            .filter_map(|action| bind_action(action, resource_type, catalog))
            .collect();

        Self {
            document,
            policy: Scoped {
                data,
                rules: catalog.policy_rules(),
            },
            conditions: Scoped {
                data,
                rules: catalog.condition_rules(),
            },
            mode,
            resource: BoundResource {
                resource: Scoped {
                    data,
                    rules: catalog.resource_rules(resource_type),
                },
                filters,
                actions,
            },
        }
    }

    /// Returns the underlying document.
    #[must_use]
    pub const fn document(&self) -> &'a PolicyDocument {
        self.document
    }

    /// Returns the bound execution mode.
    #[must_use]
    pub const fn mode(&self) -> &BoundElement<'a> {
        &self.mode
    }

    /// Returns the bound resource type.
    #[must_use]
    pub const fn resource(&self) -> &BoundResource<'a> {
        &self.resource
    }

    /// Builds the deprecation report of this policy.
    #[must_use]
    pub fn report(&self) -> Report {
        custos_core::report(self)
    }
}

impl DeprecationSource for Policy<'_> {
    fn deprecations(&self) -> &[Deprecation] {
        self.policy.rules
    }

    fn data(&self) -> Option<&Data> {
        Some(self.policy.data)
    }
}

impl PolicySource for Policy<'_> {
    fn name(&self) -> &str {
        self.document.name()
    }

    fn conditions(&self) -> Option<&dyn DeprecationSource> {
        Some(&self.conditions)
    }

    fn execution_mode(&self) -> Option<&dyn DeprecationSource> {
        Some(&self.mode)
    }

    fn resource_manager(&self) -> Option<&dyn ResourceManager> {
        Some(&self.resource)
    }
}

fn bind_mode<'a>(mode: Option<&'a Data>, catalog: &'a Catalog) -> BoundElement<'a> {
    let type_name = mode
        .and_then(|m| m.get("type"))
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_MODE)
        .to_string();
    let data = mode.map_or_else(|| Cow::Owned(Data::new()), Cow::Borrowed);
    let element = catalog.mode(&type_name);
    BoundElement::new(type_name, data, element)
}

fn bind_filter<'a>(
    filter: &'a Value,
    resource_type: &str,
    catalog: &'a Catalog,
    bound: &mut Vec<BoundElement<'a>>,
) {
    let (type_name, data) = match filter {
        Value::String(name) => (name.clone(), Cow::Owned(type_only(name))),
        Value::Object(data) => {
            if let Some(children) = boolean_block(data) {
                for child in children {
                    bind_filter(child, resource_type, catalog, bound);
                }
                return;
            }
            let type_name = data
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or(VALUE_FILTER);
            (type_name.to_string(), Cow::Borrowed(data))
        }
        other => {
            warn!(filter = %other, "skipping filter that is neither a name nor a mapping");
            return;
        }
    };
    let element = catalog.filter(resource_type, &type_name);
    bound.push(BoundElement::new(type_name, data, element).labelled());
}

fn bind_action<'a>(
    action: &'a Value,
    resource_type: &str,
    catalog: &'a Catalog,
) -> Option<BoundElement<'a>> {
    let (type_name, data) = match action {
        Value::String(name) => (name.clone(), Cow::Owned(type_only(name))),
        Value::Object(data) => match data.get("type").and_then(Value::as_str) {
            Some(name) => (name.to_string(), Cow::Borrowed(data)),
            None => {
                warn!(action = %action, "skipping action without a type");
                return None;
            }
        },
        other => {
            warn!(action = %other, "skipping action that is neither a name nor a mapping");
            return None;
        }
    };
    let element = catalog.action(resource_type, &type_name);
    Some(BoundElement::new(type_name, data, element).labelled())
}

/// Returns the filters of a single-key `or`/`and`/`not` block.
fn boolean_block(data: &Data) -> Option<&[Value]> {
    if data.len() != 1 {
        return None;
    }
    let (key, value) = data.iter().next()?;
    if !BOOLEAN_BLOCKS.contains(&key.as_str()) {
        return None;
    }
    value.as_array().map(Vec::as_slice)
}

fn type_only(name: &str) -> Data {
    let mut data = Data::new();
    data.insert("type".to_string(), Value::String(name.to_string()));
    data
}
