//! Filesystem abstraction for sitewarden
//!
//! Provides segment-aware path handling, `lstat`-based entity inspection,
//! the corrective mutations (chmod, chown, unlink, rmdir) used by
//! enforcement, and lookups against the system user and group databases.

pub mod config;
pub mod constants;
pub mod error;
pub mod identity;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use constants::VcsDir;
pub use error::{Error, Result};
pub use identity::{GroupEntry, UserEntry, lookup_group, lookup_user};
pub use io::{EntityKind, EntityStat};
pub use path::NormalizedPath;
