//! `check` and `fix` commands

use std::path::Path;

use colored::Colorize;
use sitewarden_core::config::has_errors;
use sitewarden_core::{Auditor, Enforce, EventSink, IdentityResolver, Report};

use super::{invalid_config, load_and_lint};
use crate::error::Result;

/// Report drift for the selected sites.
pub fn run_check(config_path: &Path, sites: &[String]) -> Result<()> {
    let mut report = Report::new();
    run(config_path, sites, &mut report)?;

    for line in report.lines() {
        println!("{}", line);
    }
    if report.is_clean() {
        println!("{} No discrepancies found.", "OK".green().bold());
        return Ok(());
    }

    println!();
    println!("{} {} discrepancies:", "DRIFTED".red().bold(), report.total());
    for (kind, count) in report.counts() {
        println!("   {} {}: {}", "-".yellow(), kind.as_str().cyan(), count);
    }
    println!();
    println!("Run {} to correct.", "sitewarden fix".cyan());
    Ok(())
}

/// Correct drift for the selected sites.
pub fn run_fix(config_path: &Path, sites: &[String]) -> Result<()> {
    let mut sink = Enforce::new();
    run(config_path, sites, &mut sink)?;
    let report = sink.into_report();

    for line in report.lines() {
        println!("{}", line);
    }
    if report.is_clean() {
        println!("{} Nothing to fix.", "OK".green().bold());
    } else {
        println!("{} {} entries processed.", "FIXED".green().bold(), report.total());
    }
    Ok(())
}

fn run(config_path: &Path, sites: &[String], sink: &mut dyn EventSink) -> Result<()> {
    let (config, issues) = load_and_lint(config_path)?;
    if has_errors(&issues) {
        return Err(invalid_config(&issues));
    }

    let mut auditor = Auditor::new(&config, IdentityResolver::system());
    if !sites.is_empty() {
        auditor = auditor.only_sites(sites.iter().cloned())?;
    }
    tracing::debug!(sites = ?auditor.site_roots(), "Starting run");
    auditor.run(sink)?;
    Ok(())
}
