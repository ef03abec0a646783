//! Audit engine
//!
//! This module provides:
//! - **checker**: compare one entity against its expected identity
//! - **walker**: traverse a site in deterministic order
//! - **reaper**: expire stale entries in `keep_empty` scratch directories
//! - **engine**: the [`Auditor`] running every selected site through one sink

mod checker;
mod engine;
mod reaper;
mod walker;

pub use checker::EntityChecker;
pub use engine::{Auditor, audit, enforce};
pub use reaper::{RETENTION_HOURS, RetentionReaper};
pub use walker::DirectoryWalker;
