//! Corrective sink
//!
//! Applies the correction for each mismatch before recording it. A rejected
//! mutation aborts the run; corrections already applied stay in place.

use sitewarden_fs::{EntityKind, io};

use super::{EventSink, Report};
use crate::Result;
use crate::event::{Event, EventKind};

/// Corrects drift in place and records a change line per correction.
///
/// Events with no correction (unknown entries, missing directories) are
/// recorded exactly as [`Report`] would record them.
#[derive(Debug, Clone, Default)]
pub struct Enforce {
    report: Report,
}

impl Enforce {
    pub fn new() -> Self {
        Self::default()
    }

    /// The change and diagnostic lines recorded so far.
    pub fn report(&self) -> &Report {
        &self.report
    }

    pub fn into_report(self) -> Report {
        self.report
    }
}

impl EventSink for Enforce {
    fn handle(&mut self, event: &Event) -> Result<()> {
        match event {
            Event::ModeError { path, expected, actual } => {
                io::set_mode(path, expected.bits())?;
                tracing::info!(path = %path.display(), from = %actual, to = %expected, "Changed mode");
                self.report.record(
                    EventKind::ModeError,
                    format!("[mode] {}: changed {} -> {}", path.display(), actual, expected),
                );
            }
            Event::UserError {
                path,
                expected,
                expected_label,
                actual,
            } => {
                io::set_owner(path, *expected)?;
                tracing::info!(path = %path.display(), from = actual, to = expected, "Changed owner");
                self.report.record(
                    EventKind::UserError,
                    format!("[owner] {}: changed {} -> {}", path.display(), actual, expected_label),
                );
            }
            Event::GroupError {
                path,
                expected,
                expected_label,
                actual,
            } => {
                io::set_group(path, *expected)?;
                tracing::info!(path = %path.display(), from = actual, to = expected, "Changed group");
                self.report.record(
                    EventKind::GroupError,
                    format!("[group] {}: changed {} -> {}", path.display(), actual, expected_label),
                );
            }
            Event::KeepEmptyDeleted { path, kind, .. } => {
                let removed = match kind {
                    EntityKind::Directory => io::remove_empty_dir(path)?,
                    EntityKind::File | EntityKind::Other => {
                        io::remove_file(path)?;
                        true
                    }
                };
                if removed {
                    tracing::info!(path = %path.display(), "Deleted scratch entry");
                    self.report.record(
                        EventKind::KeepEmptyDeleted,
                        format!("[deleted] {}: removed stale {}", path.display(), kind),
                    );
                } else {
                    tracing::debug!(path = %path.display(), "Scratch directory not empty, kept");
                }
            }
            other => self.report.handle(other)?,
        }
        Ok(())
    }
}
