//! Configuration model, loading and preflight lint
//!
//! The configuration document has four top-level keys:
//!
//! - **`sites`**: site root path -> owning user, site type, options and the
//!   site-scoped special lists (`open_folders`, `read_only`, `server_files`,
//!   `ownership_only`)
//! - **`directory_structure`**: root-level `d_mode` / `f_mode` / `user` /
//!   `group` defaults plus one rule per managed directory name
//! - **`site_types`**: shared `open_folders`, `read_only` and `keep_empty`
//!   lists
//! - **`web_server`**: the identity used for server files
//!
//! # Example
//!
//! ```ignore
//! use sitewarden_core::config::{load_config, lint};
//! use sitewarden_fs::NormalizedPath;
//!
//! let config = load_config(&NormalizedPath::new("/etc/sitewarden/config.json"))?;
//! for issue in lint(&config) {
//!     println!("{}", issue);
//! }
//! ```

mod identity_ref;
mod lint;
mod model;

pub use identity_ref::IdentityRef;
pub use lint::{ConfigIssue, Severity, ensure_valid, has_errors, lint};
pub use model::{
    Config, ContentsRule, DirectoryRule, DirectoryStructure, MIN_SCRATCH_DEPTH, SiteConfig,
    SiteTypeConfig,
};

use crate::Result;
use sitewarden_fs::{ConfigStore, NormalizedPath};

/// Load a configuration document; the format follows the file extension.
pub fn load_config(path: &NormalizedPath) -> Result<Config> {
    let config: Config = ConfigStore::new().load(path)?;
    tracing::debug!(
        path = %path,
        sites = config.sites.len(),
        directories = config.directory_structure.directories.len(),
        "Configuration loaded"
    );
    Ok(config)
}
