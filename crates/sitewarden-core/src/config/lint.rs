//! Preflight lint of a loaded configuration
//!
//! Catches, before any filesystem access, the configuration errors a run
//! would otherwise only hit when it reaches the offending site or entity.

use serde::{Deserialize, Serialize};

use super::identity_ref::IdentityRef;
use super::model::{Config, DirectoryStructure};
use crate::mode::FileMode;
use crate::{Error, Result};

/// Severity of a lint issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The rule is legal but can never take effect
    Warning,
    /// A run would abort on this
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A problem found in the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigIssue {
    pub severity: Severity,
    /// Human-readable description
    pub message: String,
    /// Site root this relates to, if applicable
    pub site: Option<String>,
}

impl ConfigIssue {
    fn error(site: Option<&str>, message: String) -> Self {
        Self {
            severity: Severity::Error,
            message,
            site: site.map(str::to_string),
        }
    }

    fn warning(site: Option<&str>, message: String) -> Self {
        Self {
            severity: Severity::Warning,
            message,
            site: site.map(str::to_string),
        }
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.site {
            Some(site) => write!(f, "{} [{}]: {}", self.severity, site, self.message),
            None => write!(f, "{}: {}", self.severity, self.message),
        }
    }
}

/// Lint the configuration
///
/// Checks for:
/// - Mode strings that are not exactly four octal digits
/// - Group-only placeholders used as an owner
/// - Sites naming an unknown site type
/// - Optional directories a site provides neither an option nor a default for
/// - `keep_empty` paths the reaper's safety gate would reject
/// - Special-rule paths outside every `allow_specials` directory (warning)
pub fn lint(config: &Config) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();
    let structure = &config.directory_structure;

    lint_structure(structure, &mut issues);

    for (type_name, site_type) in &config.site_types {
        for fragment in &site_type.keep_empty {
            if let Err(reason) = structure.scratch_path(fragment) {
                issues.push(ConfigIssue::error(
                    None,
                    format!(
                        "Site type '{}': keep_empty path '{}' is unsafe: {}",
                        type_name, fragment, reason
                    ),
                ));
            }
        }
        for fragment in site_type.open_folders.iter().chain(&site_type.read_only) {
            if !specials_apply(structure, fragment) {
                issues.push(ConfigIssue::warning(
                    None,
                    format!(
                        "Site type '{}': '{}' is not inside a directory with allow_specials; the rule never applies",
                        type_name, fragment
                    ),
                ));
            }
        }
    }

    for (root, site) in &config.sites {
        if let Err(e) = config.site_type_of(root, site) {
            issues.push(ConfigIssue::error(Some(root), e.to_string()));
        }

        for (name, rule) in &structure.directories {
            if let Some(option) = &rule.optional
                && site.option_flag(option).is_none()
                && rule.optional_default.is_none()
            {
                issues.push(ConfigIssue::error(
                    Some(root),
                    format!(
                        "Optional directory '{}' needs site option '{}' or an optional_default",
                        name, option
                    ),
                ));
            }
        }

        let specials = site
            .open_folders
            .iter()
            .chain(&site.read_only)
            .chain(&site.server_files)
            .chain(&site.ownership_only);
        for fragment in specials {
            if !specials_apply(structure, fragment) {
                issues.push(ConfigIssue::warning(
                    Some(root),
                    format!(
                        "'{}' is not inside a directory with allow_specials; the rule never applies",
                        fragment
                    ),
                ));
            }
        }
    }

    issues
}

/// True if any issue is an error.
pub fn has_errors(issues: &[ConfigIssue]) -> bool {
    issues.iter().any(|issue| issue.severity == Severity::Error)
}

/// Run [`lint`] and fail on the first error.
pub fn ensure_valid(config: &Config) -> Result<Vec<ConfigIssue>> {
    let issues = lint(config);
    let errors: Vec<&ConfigIssue> = issues
        .iter()
        .filter(|issue| issue.severity == Severity::Error)
        .collect();
    if let Some(first) = errors.first() {
        return Err(Error::InvalidConfig {
            count: errors.len(),
            first: first.to_string(),
        });
    }
    Ok(issues)
}

fn lint_structure(structure: &DirectoryStructure, issues: &mut Vec<ConfigIssue>) {
    let mut check_mode = |location: &str, value: Option<&String>| {
        if let Some(value) = value
            && FileMode::parse(value).is_err()
        {
            issues.push(ConfigIssue::error(
                None,
                format!(
                    "{}: mode '{}' is not exactly four octal digits",
                    location, value
                ),
            ));
        }
    };

    check_mode("directory_structure.d_mode", Some(&structure.d_mode));
    check_mode("directory_structure.f_mode", Some(&structure.f_mode));
    for (name, rule) in &structure.directories {
        check_mode(&format!("{}.d_mode", name), rule.d_mode.as_ref());
        check_mode(&format!("{}.f_mode", name), rule.f_mode.as_ref());
        check_mode(&format!("{}.contents.d_mode", name), rule.contents.d_mode.as_ref());
        check_mode(&format!("{}.contents.f_mode", name), rule.contents.f_mode.as_ref());
    }

    let mut owners: Vec<(String, &IdentityRef)> =
        vec![("directory_structure.user".to_string(), &structure.user)];
    for (name, rule) in &structure.directories {
        if let Some(user) = &rule.user {
            owners.push((format!("{}.user", name), user));
        }
        if let Some(user) = &rule.contents.user {
            owners.push((format!("{}.contents.user", name), user));
        }
    }
    for (location, owner) in owners {
        if owner.is_group_only() {
            issues.push(ConfigIssue::error(
                None,
                format!("{}: '{}' names a group, not a user", location, owner),
            ));
        }
    }
}

fn specials_apply(structure: &DirectoryStructure, fragment: &str) -> bool {
    sitewarden_fs::NormalizedPath::relative(fragment)
        .segments()
        .next()
        .and_then(|first| structure.directories.get(first))
        .is_some_and(|rule| rule.allow_specials)
}
