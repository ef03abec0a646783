//! Policy resolution, tree walking and enforcement for sitewarden
//!
//! This crate implements:
//!
//! - **Configuration**: typed model of the policy document plus a preflight lint
//! - **Identity resolution**: placeholder and name lookup with a per-run cache
//! - **Policy resolution**: the single expected mode/owner/group of every entity
//! - **Auditing**: deterministic traversal raising one [`Event`] per discrepancy
//! - **Sinks**: [`Report`], [`Enforce`] and [`Callbacks`] consumers of those events
//!
//! # Architecture
//!
//! ```text
//!                 sitewarden-cli
//!                       |
//!                    Auditor
//!                       |
//!        DirectoryWalker + RetentionReaper
//!                       |
//!                 EntityChecker ---> EventSink
//!                       |
//!        PolicyResolver + IdentityResolver
//!                       |
//!                 sitewarden-fs
//! ```
//!
//! # Example
//!
//! ```ignore
//! use sitewarden_core::{IdentityResolver, audit, config::load_config};
//! use sitewarden_fs::NormalizedPath;
//!
//! let config = load_config(&NormalizedPath::new("/etc/sitewarden/config.json"))?;
//! let report = audit(&config, IdentityResolver::system())?;
//! for line in report.lines() {
//!     println!("{}", line);
//! }
//! ```

pub mod audit;
pub mod config;
pub mod error;
pub mod event;
pub mod identity;
pub mod mode;
pub mod policy;
pub mod sink;

pub use audit::{Auditor, DirectoryWalker, EntityChecker, RetentionReaper, audit, enforce};
pub use config::{Config, ConfigIssue, IdentityRef, Severity, load_config};
pub use error::{Error, Result};
pub use event::{Event, EventKind};
pub use identity::{IdentityResolver, IdentityService, StaticIdentities, SystemIdentities};
pub use mode::FileMode;
pub use policy::{EffectiveIdentity, PolicyResolver, PolicyRule, ResolvedDirectory};
pub use sink::{Callbacks, Enforce, EventSink, Report};
