//! Policy documents.
//!
//! A policy file is YAML with a top-level `policies` list. Each policy is kept
//! as untyped [`Data`] so deprecation rules can look at any key, including keys
//! no current schema knows about.
//!
//! ```yaml
//! policies:
//!   - name: ec2-offhours
//!     resource: ec2
//!     filters:
//!       - type: cross-account
//!         whitelist: ["123456789012"]
//!     actions:
//!       - type: mark-for-op
//!         op: stop
//! ```

use std::fs;
use std::path::Path;

use custos_core::Data;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{PolicyError, Result};

/// Provider assumed for resource types written without one.
pub const DEFAULT_PROVIDER: &str = "aws";

/// Qualifies a resource type with the default provider when it has none.
///
/// # Examples
///
/// ```rust
/// use custos_policy::document::normalize_resource_type;
///
/// assert_eq!(normalize_resource_type("ec2"), "aws.ec2");
/// assert_eq!(normalize_resource_type("azure.keyvault"), "azure.keyvault");
/// ```
#[must_use]
pub fn normalize_resource_type(resource: &str) -> String {
    if resource.contains('.') {
        resource.to_string()
    } else {
        format!("{DEFAULT_PROVIDER}.{resource}")
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawPolicyFile {
    #[serde(default)]
    policies: Vec<Value>,
}

/// The policies defined in one file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicyFile {
    /// Policies in file order.
    pub policies: Vec<PolicyDocument>,
}

impl PolicyFile {
    /// Parses a policy file from YAML.
    ///
    /// An empty document holds no policies.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed, a policy is not a mapping,
    /// or a policy lacks a `name` or `resource`.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: RawPolicyFile = serde_yaml::from_str(content)?;
        let policies = raw
            .policies
            .into_iter()
            .enumerate()
            .map(|(i, value)| match value {
                Value::Object(data) => PolicyDocument::from_data(i + 1, data),
                other => Err(PolicyError::InvalidDocument {
                    reason: format!("policy #{} is not a mapping: {other}", i + 1),
                }),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { policies })
    }

    /// Loads a policy file from disk.
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
        Self::from_yaml_str(&content)
    }

    /// Returns the number of policies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Returns true if the file defines no policies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

/// A single policy.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyDocument {
    name: String,
    resource_type: String,
    data: Data,
}

impl PolicyDocument {
    /// Creates a policy from its raw data.
    ///
    /// `index` is the 1-based position of the policy, used in errors.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::MissingField`] if `name` or `resource` is
    /// missing or not a string.
    pub fn from_data(index: usize, data: Data) -> Result<Self> {
        let name = data
            .get("name")
            .and_then(Value::as_str)
            .ok_or(PolicyError::MissingField {
                index,
                field: "name",
            })?
            .to_string();
        let resource = data
            .get("resource")
            .and_then(Value::as_str)
            .ok_or(PolicyError::MissingField {
                index,
                field: "resource",
            })?;
        let resource_type = normalize_resource_type(resource);

        Ok(Self {
            name,
            resource_type,
            data,
        })
    }

    /// Returns the policy name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the provider-qualified resource type.
    #[must_use]
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Returns the raw policy data.
    #[must_use]
    pub const fn data(&self) -> &Data {
        &self.data
    }

    /// Returns the filter entries.
    #[must_use]
    pub fn filters(&self) -> &[Value] {
        self.list("filters")
    }

    /// Returns the action entries.
    #[must_use]
    pub fn actions(&self) -> &[Value] {
        self.list("actions")
    }

    /// Returns the execution mode block, if any.
    #[must_use]
    pub fn mode(&self) -> Option<&Data> {
        self.data.get("mode").and_then(Value::as_object)
    }

    fn list(&self, key: &str) -> &[Value] {
        self.data
            .get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
