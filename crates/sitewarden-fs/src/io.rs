//! Entity inspection and corrective mutations
//!
//! Every inspection uses `lstat` semantics: symbolic links are reported as
//! [`EntityKind::Other`] and never followed.

use std::fs;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::Path;
use std::time::SystemTime;

use crate::{Error, Result};

/// Permission and special bits (setuid, setgid, sticky, rwx for all).
pub const MODE_BITS: u32 = 0o7777;

/// Kind of a filesystem entity as far as policy is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    File,
    Directory,
    /// Symlinks, sockets, FIFOs, device nodes.
    Other,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Directory => write!(f, "directory"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// The subset of `lstat` output the auditor compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityStat {
    pub kind: EntityKind,
    /// Low 12 bits of `st_mode`.
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub accessed: SystemTime,
}

/// Stat an entity without following symlinks.
pub fn stat(path: &Path) -> Result<EntityStat> {
    let metadata = fs::symlink_metadata(path).map_err(|e| Error::io(path, e))?;
    let file_type = metadata.file_type();
    let kind = if file_type.is_file() {
        EntityKind::File
    } else if file_type.is_dir() {
        EntityKind::Directory
    } else {
        EntityKind::Other
    };
    let accessed = metadata.accessed().map_err(|e| Error::io(path, e))?;

    Ok(EntityStat {
        kind,
        mode: metadata.mode() & MODE_BITS,
        uid: metadata.uid(),
        gid: metadata.gid(),
        accessed,
    })
}

/// Like [`stat`], but an absent entity is `Ok(None)`.
pub fn try_stat(path: &Path) -> Result<Option<EntityStat>> {
    match fs::symlink_metadata(path) {
        Ok(_) => stat(path).map(Some),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Names of the direct children of a directory, sorted.
pub fn list_names(dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

/// True if the directory currently has no entries.
pub fn is_empty_dir(dir: &Path) -> Result<bool> {
    let mut entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
    Ok(entries.next().is_none())
}

/// Replace the permission bits of an entity.
pub fn set_mode(path: &Path, mode: u32) -> Result<()> {
    fs::set_permissions(path, fs::Permissions::from_mode(mode & MODE_BITS))
        .map_err(|e| Error::mutation(path, "mode", e))
}

/// Change the owning user, leaving the group untouched.
pub fn set_owner(path: &Path, uid: u32) -> Result<()> {
    std::os::unix::fs::lchown(path, Some(uid), None).map_err(|e| Error::mutation(path, "owner", e))
}

/// Change the owning group, leaving the user untouched.
pub fn set_group(path: &Path, gid: u32) -> Result<()> {
    std::os::unix::fs::lchown(path, None, Some(gid)).map_err(|e| Error::mutation(path, "group", e))
}

/// Delete a non-directory entity.
pub fn remove_file(path: &Path) -> Result<()> {
    fs::remove_file(path).map_err(|e| Error::mutation(path, "existence", e))
}

/// Remove a directory if it is empty.
///
/// Returns `Ok(false)` when the directory still has entries; any other
/// failure is an error.
pub fn remove_empty_dir(path: &Path) -> Result<bool> {
    match fs::remove_dir(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::DirectoryNotEmpty => Ok(false),
        Err(e) => Err(Error::mutation(path, "existence", e)),
    }
}
