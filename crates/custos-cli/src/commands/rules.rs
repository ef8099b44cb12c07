//! Rules command implementation.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use custos_policy::{Catalog, CatalogRule};

use super::load_catalog;

/// Arguments for the rules command.
#[derive(Args)]
pub struct RulesArgs {
    /// Catalog file extending the builtin deprecation rules
    #[arg(long, env = "CUSTOS_CATALOG")]
    pub catalog: Option<PathBuf>,
}

/// Runs the rules command.
pub fn run(args: &RulesArgs) -> Result<()> {
    let catalog = load_catalog(args.catalog.as_deref())?;
    print!("{}", render(&catalog));
    Ok(())
}

/// Renders one line per rule, followed by its removal date and link.
pub fn render(catalog: &Catalog) -> String {
    let rules = catalog.rules();
    let mut output = String::new();
    for rule in &rules {
        output.push_str(&render_rule(rule));
        output.push('\n');
    }
    output.push_str(&format!("{} rules\n", rules.len()));
    output
}

fn render_rule(rule: &CatalogRule<'_>) -> String {
    let deprecation = rule.deprecation;
    let scope = if rule.element.is_empty() {
        rule.section.label().to_string()
    } else {
        format!("{} {}", rule.section.label(), rule.element)
    };

    let mut line = format!("#{} [{scope}] {deprecation}", deprecation.id());
    if let Some(date) = deprecation.removed_after() {
        line.push_str(&format!("\n    removed after {date}"));
    }
    if let Some(link) = deprecation.link() {
        line.push_str(&format!("\n    see {link}"));
    }
    line
}
