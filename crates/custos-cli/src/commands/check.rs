//! Check command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use custos_core::SourceLocator;
use custos_policy::{Catalog, LoadedPolicies, PolicyDiscovery};
use tracing::{debug, info};

use super::load_catalog;

/// Arguments for the check command.
#[derive(Args)]
pub struct CheckArgs {
    /// Policy files or directories to check
    #[arg(default_value = "policies")]
    pub paths: Vec<PathBuf>,

    /// Catalog file extending the builtin deprecation rules
    #[arg(long, env = "CUSTOS_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Exit with an error when any deprecation is found
    #[arg(long)]
    pub strict: bool,

    /// Omit source locations from reports
    #[arg(long)]
    pub no_location: bool,
}

/// Outcome of checking a set of policy files.
#[derive(Debug, Default)]
pub struct CheckSummary {
    /// Number of policy files read.
    pub files: usize,
    /// Number of policies checked.
    pub policies: usize,
    /// Number of policies with at least one deprecation.
    pub deprecated: usize,
    /// Rendered reports of the deprecated policies.
    pub output: String,
}

impl CheckSummary {
    /// Returns the one-line summary printed after the reports.
    pub fn summary_line(&self) -> String {
        format!(
            "Checked {} policies in {} files, {} with deprecations",
            self.policies, self.files, self.deprecated
        )
    }
}

/// Runs the check command.
pub fn run(args: &CheckArgs) -> Result<()> {
    info!(paths = ?args.paths, "Checking policies");

    let catalog = load_catalog(args.catalog.as_deref())?;
    let summary = check(args, &catalog)?;

    print!("{}", summary.output);
    println!("{}", summary.summary_line());

    if args.strict && summary.deprecated > 0 {
        anyhow::bail!("{} policies use deprecated features", summary.deprecated);
    }
    Ok(())
}

/// Checks every policy file under `args.paths` against `catalog`.
pub fn check(args: &CheckArgs, catalog: &Catalog) -> Result<CheckSummary> {
    let discovery = PolicyDiscovery::new();
    let mut summary = CheckSummary::default();

    for path in &args.paths {
        let files = discovery
            .discover(path)
            .with_context(|| format!("Failed to find policies in {}", path.display()))?;

        for file in files {
            let loaded = LoadedPolicies::load(&file)
                .with_context(|| format!("Failed to load {}", file.display()))?;
            let locator: Option<&dyn SourceLocator> = if args.no_location {
                None
            } else {
                Some(loaded.locator())
            };

            summary.files += 1;
            for report in loaded.reports(catalog) {
                summary.policies += 1;
                if !report.has_deprecations() {
                    debug!(policy = %report.policy_name, "no deprecations");
                    continue;
                }
                summary.deprecated += 1;
                summary.output.push_str(&report.format(locator));
                summary.output.push('\n');
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn args(paths: Vec<PathBuf>) -> CheckArgs {
        CheckArgs {
            paths,
            catalog: None,
            strict: false,
            no_location: false,
        }
    }

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_check_directory() {
        let temp_dir = TempDir::new().unwrap();
        let ec2 = write(
            temp_dir.path(),
            "ec2.yml",
            "policies:\n  - name: old-tag\n    resource: ec2\n    actions: [mark]\n  - name: fine\n    resource: ec2\n",
        );
        write(
            temp_dir.path(),
            "s3.yaml",
            "policies:\n  - name: s3-fine\n    resource: s3\n",
        );
        write(temp_dir.path(), "README.md", "not a policy");

        let catalog = Catalog::builtin().unwrap();
        let summary = check(&args(vec![temp_dir.path().to_path_buf()]), &catalog).unwrap();

        assert_eq!(summary.files, 2);
        assert_eq!(summary.policies, 3);
        assert_eq!(summary.deprecated, 1);
        assert_eq!(
            summary.output,
            format!(
                "policy 'old-tag' ({}:2)\n  actions: mark: alias 'mark' has been deprecated\n",
                ec2.display()
            )
        );
        assert_eq!(
            summary.summary_line(),
            "Checked 3 policies in 2 files, 1 with deprecations"
        );
    }

    #[test]
    fn test_check_without_location() {
        let temp_dir = TempDir::new().unwrap();
        let file = write(
            temp_dir.path(),
            "ec2.yml",
            "policies:\n  - name: offhours\n    resource: ec2\n    region: us-east-1\n",
        );

        let mut args = args(vec![file]);
        args.no_location = true;
        let summary = check(&args, &Catalog::builtin().unwrap()).unwrap();

        assert_eq!(
            summary.output,
            "policy 'offhours'\n  condition: field 'region' has been deprecated (replaced by region in condition block)\n"
        );
    }

    #[test]
    fn test_check_missing_path() {
        let err = check(
            &args(vec![PathBuf::from("/nonexistent/policies")]),
            &Catalog::builtin().unwrap(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/policies"));
    }

    #[test]
    fn test_check_invalid_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = write(temp_dir.path(), "bad.yml", "policies:\n  - resource: ec2\n");

        let err = check(&args(vec![file]), &Catalog::builtin().unwrap()).unwrap_err();
        assert!(err.to_string().starts_with("Failed to load"));
    }
}
