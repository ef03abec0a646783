//! Shared test utilities for the sitewarden workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`site`]: [`SiteFixture`] builder for site trees with explicit modes
//!   and access times

pub mod site;

pub use site::{EntryStamp, SiteFixture};
