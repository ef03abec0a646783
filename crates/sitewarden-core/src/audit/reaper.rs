//! Retention of `keep_empty` scratch directories
//!
//! Scratch trees are visited children first. Files not accessed within the
//! retention window are raised as `keep_empty_deleted`; a directory is
//! raised only once it is empty, which under enforcement happens after its
//! stale children have been removed. The scratch root itself is never
//! raised. Deletion is left to the sink, so a report run never mutates.

use chrono::{DateTime, TimeDelta, Utc};
use sitewarden_fs::{EntityKind, NormalizedPath, io};
use walkdir::WalkDir;

use crate::config::DirectoryStructure;
use crate::event::Event;
use crate::sink::EventSink;
use crate::{Error, Result};

/// Default retention window.
pub const RETENTION_HOURS: i64 = 24;

/// Reaps stale entries from scratch directories.
#[derive(Debug, Clone, Copy)]
pub struct RetentionReaper {
    max_age: TimeDelta,
    now: DateTime<Utc>,
}

impl Default for RetentionReaper {
    fn default() -> Self {
        Self::new()
    }
}

impl RetentionReaper {
    /// A reaper with the default window, measured from now.
    pub fn new() -> Self {
        Self {
            max_age: TimeDelta::hours(RETENTION_HOURS),
            now: Utc::now(),
        }
    }

    pub fn with_max_age(mut self, max_age: TimeDelta) -> Self {
        self.max_age = max_age;
        self
    }

    /// Measure ages from a fixed instant instead of the creation time.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Entries last accessed before this instant are stale.
    pub fn cutoff(&self) -> DateTime<Utc> {
        self.now - self.max_age
    }

    /// Apply the safety gate to a site's `keep_empty` fragment.
    ///
    /// Touches nothing on disk.
    pub fn validate(structure: &DirectoryStructure, site: &str, fragment: &str) -> Result<NormalizedPath> {
        structure
            .scratch_path(fragment)
            .map_err(|reason| Error::UnsafeScratchPath {
                site: site.to_string(),
                path: fragment.to_string(),
                reason,
            })
    }

    /// Reap one scratch directory of a site.
    pub fn reap(
        &self,
        structure: &DirectoryStructure,
        site_root: &NormalizedPath,
        fragment: &str,
        sink: &mut dyn EventSink,
    ) -> Result<()> {
        let rel = Self::validate(structure, site_root.as_str(), fragment)?;

        let mut scratch = site_root.to_native();
        for segment in rel.segments() {
            scratch.push(segment);
            match io::try_stat(&scratch)? {
                Some(stat) if stat.kind == EntityKind::Directory => {}
                Some(_) => {
                    tracing::debug!(path = %scratch.display(), "Scratch path crosses a non-directory, skipping");
                    return Ok(());
                }
                None => {
                    tracing::debug!(path = %scratch.display(), "Scratch directory absent, skipping");
                    return Ok(());
                }
            }
        }

        let cutoff = self.cutoff();
        tracing::debug!(path = %scratch.display(), %cutoff, "Reaping scratch directory");

        let walker = WalkDir::new(&scratch)
            .min_depth(1)
            .follow_links(false)
            .follow_root_links(false)
            .contents_first(true)
            .sort_by_file_name();
        for entry in walker {
            let entry = entry?;
            let path = entry.path();

            if entry.file_type().is_dir() {
                if io::is_empty_dir(path)? {
                    sink.handle(&Event::KeepEmptyDeleted {
                        path: path.to_path_buf(),
                        kind: EntityKind::Directory,
                        last_accessed: None,
                    })?;
                }
                continue;
            }

            let stat = io::stat(path)?;
            let accessed: DateTime<Utc> = stat.accessed.into();
            if accessed < cutoff {
                sink.handle(&Event::KeepEmptyDeleted {
                    path: path.to_path_buf(),
                    kind: stat.kind,
                    last_accessed: Some(accessed),
                })?;
            }
        }
        Ok(())
    }
}
