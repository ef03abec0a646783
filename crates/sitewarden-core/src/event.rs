//! Typed audit events
//!
//! Every discrepancy the walker, checker or reaper finds is raised as one
//! [`Event`]. Its `Display` form is the diagnostic line a report records.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sitewarden_fs::EntityKind;

use crate::mode::FileMode;

/// Tag of an [`Event`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    MissingOptionalDir,
    UnallocatedOptionalDir,
    MissingRequiredDir,
    UserError,
    GroupError,
    ModeError,
    UnknownEntry,
    UnknownRootEntry,
    KeepEmptyDeleted,
}

impl EventKind {
    pub const ALL: [EventKind; 9] = [
        Self::MissingOptionalDir,
        Self::UnallocatedOptionalDir,
        Self::MissingRequiredDir,
        Self::UserError,
        Self::GroupError,
        Self::ModeError,
        Self::UnknownEntry,
        Self::UnknownRootEntry,
        Self::KeepEmptyDeleted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingOptionalDir => "missing_optional_dir",
            Self::UnallocatedOptionalDir => "unallocated_optional_dir",
            Self::MissingRequiredDir => "missing_required_dir",
            Self::UserError => "user_error",
            Self::GroupError => "group_error",
            Self::ModeError => "mode_error",
            Self::UnknownEntry => "unknown_entry",
            Self::UnknownRootEntry => "unknown_root_entry",
            Self::KeepEmptyDeleted => "keep_empty_deleted",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One discrepancy between policy and filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Optional directory the site option says should exist is absent
    MissingOptionalDir { path: PathBuf, option: String },
    /// Optional directory the site option says should not exist is present
    UnallocatedOptionalDir { path: PathBuf, option: String },
    /// Required managed directory is absent
    MissingRequiredDir { path: PathBuf },
    UserError {
        path: PathBuf,
        expected: u32,
        expected_label: String,
        actual: u32,
    },
    GroupError {
        path: PathBuf,
        expected: u32,
        expected_label: String,
        actual: u32,
    },
    ModeError {
        path: PathBuf,
        expected: FileMode,
        actual: FileMode,
    },
    /// Entity that is neither a regular file nor a directory
    UnknownEntry { path: PathBuf },
    /// Site root child that is not a managed directory
    UnknownRootEntry { path: PathBuf },
    /// Stale scratch file, or emptied scratch directory, due for deletion
    KeepEmptyDeleted {
        path: PathBuf,
        kind: EntityKind,
        last_accessed: Option<DateTime<Utc>>,
    },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::MissingOptionalDir { .. } => EventKind::MissingOptionalDir,
            Self::UnallocatedOptionalDir { .. } => EventKind::UnallocatedOptionalDir,
            Self::MissingRequiredDir { .. } => EventKind::MissingRequiredDir,
            Self::UserError { .. } => EventKind::UserError,
            Self::GroupError { .. } => EventKind::GroupError,
            Self::ModeError { .. } => EventKind::ModeError,
            Self::UnknownEntry { .. } => EventKind::UnknownEntry,
            Self::UnknownRootEntry { .. } => EventKind::UnknownRootEntry,
            Self::KeepEmptyDeleted { .. } => EventKind::KeepEmptyDeleted,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::MissingOptionalDir { path, .. }
            | Self::UnallocatedOptionalDir { path, .. }
            | Self::MissingRequiredDir { path }
            | Self::UserError { path, .. }
            | Self::GroupError { path, .. }
            | Self::ModeError { path, .. }
            | Self::UnknownEntry { path }
            | Self::UnknownRootEntry { path }
            | Self::KeepEmptyDeleted { path, .. } => path,
        }
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = self.kind();
        let path = self.path().display();
        match self {
            Self::MissingOptionalDir { option, .. } => {
                write!(f, "[{}] {}: absent but option '{}' is set", kind, path, option)
            }
            Self::UnallocatedOptionalDir { option, .. } => {
                write!(f, "[{}] {}: present but option '{}' is not set", kind, path, option)
            }
            Self::MissingRequiredDir { .. } => write!(f, "[{}] {}: required directory is absent", kind, path),
            Self::UserError {
                expected_label, actual, ..
            } => write!(f, "[{}] {}: owner should be {}, found {}", kind, path, expected_label, actual),
            Self::GroupError {
                expected_label, actual, ..
            } => write!(f, "[{}] {}: group should be {}, found {}", kind, path, expected_label, actual),
            Self::ModeError { expected, actual, .. } => {
                write!(f, "[{}] {}: mode should be {}, found {}", kind, path, expected, actual)
            }
            Self::UnknownEntry { .. } => write!(f, "[{}] {}: neither a file nor a directory", kind, path),
            Self::UnknownRootEntry { .. } => write!(f, "[{}] {}: not a managed directory", kind, path),
            Self::KeepEmptyDeleted {
                kind: entity,
                last_accessed,
                ..
            } => match last_accessed {
                Some(at) => write!(
                    f,
                    "[{}] {}: stale {} last accessed {}",
                    kind,
                    path,
                    entity,
                    at.format("%Y-%m-%d %H:%M:%S UTC")
                ),
                None => write!(f, "[{}] {}: empty {}", kind, path, entity),
            },
        }
    }
}
