//! `validate` command

use std::path::Path;

use colored::Colorize;
use sitewarden_core::config::has_errors;

use super::{invalid_config, load_and_lint};
use crate::error::Result;

/// Lint the configuration; fails if any issue is an error.
pub fn run_validate(config_path: &Path) -> Result<()> {
    let (config, issues) = load_and_lint(config_path)?;
    if has_errors(&issues) {
        return Err(invalid_config(&issues));
    }

    println!(
        "{} {} site(s), {} managed directories, {} warning(s).",
        "OK".green().bold(),
        config.sites.len(),
        config.directory_structure.directories.len(),
        issues.len()
    );
    Ok(())
}
