//! Per-entity comparison of actual against expected identity

use std::path::Path;

use sitewarden_fs::{EntityKind, EntityStat, NormalizedPath, io};

use crate::event::Event;
use crate::identity::IdentityResolver;
use crate::mode::FileMode;
use crate::policy::{PolicyResolver, ResolvedDirectory};
use crate::sink::EventSink;
use crate::{Error, Result};

/// Checks single entities of one site.
///
/// Mismatches are raised in the order owner, group, mode: enforcement
/// applies them in that order, and a `chown` may clear setuid/setgid bits
/// that a preceding `chmod` had set.
#[derive(Debug, Clone, Copy)]
pub struct EntityChecker<'p, 'a> {
    policy: &'p PolicyResolver<'a>,
    site_root: &'p NormalizedPath,
}

impl<'p, 'a> EntityChecker<'p, 'a> {
    pub fn new(policy: &'p PolicyResolver<'a>, site_root: &'p NormalizedPath) -> Self {
        Self { policy, site_root }
    }

    /// Stat `path` (without following symlinks) and check it.
    pub fn check(
        &self,
        ids: &mut IdentityResolver,
        dir: &ResolvedDirectory,
        path: &Path,
        sink: &mut dyn EventSink,
    ) -> Result<()> {
        let stat = io::stat(path)?;
        self.check_stat(ids, dir, path, &stat, sink)
    }

    /// Check an entity whose `lstat` result is already known.
    pub fn check_stat(
        &self,
        ids: &mut IdentityResolver,
        dir: &ResolvedDirectory,
        path: &Path,
        stat: &EntityStat,
        sink: &mut dyn EventSink,
    ) -> Result<()> {
        if stat.kind == EntityKind::Other {
            return sink.handle(&Event::UnknownEntry {
                path: path.to_path_buf(),
            });
        }

        let rel = path
            .strip_prefix(self.site_root.to_native())
            .ok()
            .and_then(NormalizedPath::from_components)
            .ok_or_else(|| Error::OutsideSite {
                path: path.to_path_buf(),
                root: self.site_root.to_native(),
            })?;
        let expected = self.policy.resolve(ids, dir, &rel, stat.kind)?;

        if stat.uid != expected.uid {
            sink.handle(&Event::UserError {
                path: path.to_path_buf(),
                expected: expected.uid,
                expected_label: expected.user_label,
                actual: stat.uid,
            })?;
        }
        if stat.gid != expected.gid {
            sink.handle(&Event::GroupError {
                path: path.to_path_buf(),
                expected: expected.gid,
                expected_label: expected.group_label,
                actual: stat.gid,
            })?;
        }
        if let Some(mode) = expected.mode
            && mode.bits() != stat.mode
        {
            sink.handle(&Event::ModeError {
                path: path.to_path_buf(),
                expected: mode,
                actual: FileMode::from_bits(stat.mode),
            })?;
        }
        Ok(())
    }
}
