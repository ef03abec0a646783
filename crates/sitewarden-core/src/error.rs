//! Error types for sitewarden-core

use std::path::PathBuf;

/// Result type for sitewarden-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a run.
///
/// Filesystem drift is never an error; it is reported through events. Every
/// variant here is either a configuration problem or a failed enforcement /
/// traversal step.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Mode string is not exactly four octal digits
    #[error("Invalid mode '{value}': expected exactly four octal digits")]
    InvalidMode { value: String },

    /// Site filter names a site the config does not declare
    #[error("Unknown site: {site}")]
    UnknownSite { site: String },

    /// Site references a site type the config does not declare
    #[error("Site {site} references unknown site type '{site_type}'")]
    UnknownSiteType { site: String, site_type: String },

    /// Optional directory whose provisioning flag cannot be determined
    #[error(
        "Site {site}: option '{option}' for optional directory '{directory}' is not set and has no default"
    )]
    UnresolvedOption {
        site: String,
        directory: String,
        option: String,
    },

    /// User name unknown to the identity service
    #[error("Unknown user '{name}'")]
    UnknownUser { name: String },

    /// Group name unknown to the identity service
    #[error("Unknown group '{name}'")]
    UnknownGroup { name: String },

    /// Placeholder used in a role it cannot fill (e.g. a primary group as owner)
    #[error("'{reference}' cannot be used as a {role}")]
    InvalidIdentityRole {
        reference: String,
        role: &'static str,
    },

    /// Scratch path rejected by the reaper's safety gate
    #[error("Unsafe keep_empty path '{path}' for site {site}: {reason}")]
    UnsafeScratchPath {
        site: String,
        path: String,
        reason: &'static str,
    },

    /// Site root missing or not a directory
    #[error("Site root {path} does not exist or is not a directory")]
    SiteRootMissing { path: PathBuf },

    /// Entity handed to the checker lies outside the site being audited
    #[error("{path} is outside site root {root}")]
    OutsideSite { path: PathBuf, root: PathBuf },

    /// Callback sink built without a single handler
    #[error("No event handlers supplied")]
    NoHandlers,

    /// Preflight lint found errors
    #[error("Configuration has {count} error(s); first: {first}")]
    InvalidConfig { count: usize, first: String },

    /// Directory traversal failure
    #[error(transparent)]
    Walk(#[from] walkdir::Error),

    /// Filesystem or identity-database error from sitewarden-fs
    #[error(transparent)]
    Fs(#[from] sitewarden_fs::Error),

    /// JSON deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for errors caused by the configuration rather than the filesystem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidMode { .. }
                | Self::UnknownSite { .. }
                | Self::UnknownSiteType { .. }
                | Self::UnresolvedOption { .. }
                | Self::UnknownUser { .. }
                | Self::UnknownGroup { .. }
                | Self::InvalidIdentityRole { .. }
                | Self::UnsafeScratchPath { .. }
                | Self::SiteRootMissing { .. }
                | Self::NoHandlers
                | Self::InvalidConfig { .. }
        )
    }
}
