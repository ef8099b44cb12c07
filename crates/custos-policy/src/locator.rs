//! Source locations of policies in YAML files.

use std::fs;
use std::path::Path;

use custos_core::SourceLocator;

use crate::error::{PolicyError, Result};

/// Finds the line each policy is declared on.
///
/// Policies are located by the `name:` key of each item of the top-level
/// `policies` list. Only the first declaration of a name is recorded.
#[derive(Debug, Clone, Default)]
pub struct YamlSourceLocator {
    file: String,
    positions: Vec<(String, usize)>,
}

impl YamlSourceLocator {
    /// Indexes `content`, reporting locations against `file`.
    #[must_use]
    pub fn new(file: impl Into<String>, content: &str) -> Self {
        let mut positions: Vec<(String, usize)> = Vec::new();
        for (name, line) in policy_names(content) {
            if !positions.iter().any(|(known, _)| known == name) {
                positions.push((name.to_string(), line));
            }
        }
        Self {
            file: file.into(),
            positions,
        }
    }

    /// Indexes a policy file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| PolicyError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self::new(path.display().to_string(), &content))
    }

    /// Returns the 1-based line a policy is declared on.
    #[must_use]
    pub fn line(&self, policy_name: &str) -> Option<usize> {
        self.positions
            .iter()
            .find(|(name, _)| name == policy_name)
            .map(|&(_, line)| line)
    }
}

impl SourceLocator for YamlSourceLocator {
    fn find(&self, policy_name: &str) -> Option<String> {
        self.line(policy_name)
            .map(|line| format!("{}:{line}", self.file))
    }
}

/// Yields the `name:` of every item of the top-level `policies` list with
/// its 1-based line. Keys nested deeper inside a policy are ignored.
fn policy_names(content: &str) -> Vec<(&str, usize)> {
    let mut names = Vec::new();
    // Indentation of the `policies:` key while inside its block.
    let mut policies: Option<usize> = None;
    let mut item_indent: Option<usize> = None;
    let mut key_indent: Option<usize> = None;

    for (index, line) in content.lines().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let indent = line.len() - trimmed.len();

        if let Some(block) = policies {
            let is_item = trimmed == "-" || trimmed.starts_with("- ");
            if indent < block || (indent == block && !is_item) {
                policies = None;
            }
        }
        let Some(block) = policies else {
            if trimmed.starts_with("policies:") {
                policies = Some(indent);
                item_indent = None;
                key_indent = None;
            }
            continue;
        };

        if let Some(rest) = trimmed.strip_prefix('-') {
            let item = *item_indent.get_or_insert(indent.max(block));
            if indent != item {
                continue;
            }
            let key = rest.trim_start();
            key_indent = Some(indent + 1 + (rest.len() - key.len()));
            if let Some(name) = name_value(key) {
                names.push((name, index + 1));
            }
        } else if key_indent == Some(indent) {
            if let Some(name) = name_value(trimmed) {
                names.push((name, index + 1));
            }
        }
    }

    names
}

fn name_value(key: &str) -> Option<&str> {
    let value = key.strip_prefix("name:")?;
    let value = value.find(" #").map_or(value, |i| &value[..i]).trim();
    let value = strip_quotes(value);
    (!value.is_empty()).then_some(value)
}

fn strip_quotes(value: &str) -> &str {
    ['"', '\'']
        .iter()
        .find_map(|&q| value.strip_prefix(q).and_then(|v| v.strip_suffix(q)))
        .unwrap_or(value)
}
