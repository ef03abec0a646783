//! Command implementations for sitewarden-cli

pub mod audit;
pub mod validate;

pub use audit::{run_check, run_fix};
pub use validate::run_validate;

use std::path::Path;

use colored::Colorize;
use sitewarden_core::config::{Config, ConfigIssue, Severity, lint, load_config};
use sitewarden_fs::NormalizedPath;

use crate::error::{CliError, Result};

/// Load the configuration and print its lint issues to stderr.
///
/// Returns the issues alongside the config so callers decide whether
/// errors are fatal.
pub(crate) fn load_and_lint(path: &Path) -> Result<(Config, Vec<ConfigIssue>)> {
    let config = load_config(&NormalizedPath::new(path))?;
    let issues = lint(&config);
    for issue in &issues {
        let label = match issue.severity {
            Severity::Warning => "warning".yellow().bold(),
            Severity::Error => "error".red().bold(),
        };
        match &issue.site {
            Some(site) => eprintln!("{} [{}]: {}", label, site, issue.message),
            None => eprintln!("{}: {}", label, issue.message),
        }
    }
    Ok((config, issues))
}

/// Error returned when lint found errors.
pub(crate) fn invalid_config(issues: &[ConfigIssue]) -> CliError {
    let count = issues
        .iter()
        .filter(|issue| issue.severity == Severity::Error)
        .count();
    CliError::user(format!("configuration has {} error(s)", count))
}
