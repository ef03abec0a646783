//! Typed configuration tree
//!
//! The document is deserialized once into these types; nothing downstream
//! performs untyped lookups.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sitewarden_fs::NormalizedPath;

use super::identity_ref::IdentityRef;
use crate::{Error, Result};

/// Minimum number of segments in a `keep_empty` path.
pub const MIN_SCRATCH_DEPTH: usize = 3;

/// Root of the configuration document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Sites keyed by their root path
    #[serde(default)]
    pub sites: BTreeMap<String, SiteConfig>,

    /// Managed directory layout shared by every site
    pub directory_structure: DirectoryStructure,

    /// Site types keyed by name
    #[serde(default)]
    pub site_types: BTreeMap<String, SiteTypeConfig>,

    /// User (and same-named group) the web server runs as
    pub web_server: String,
}

impl Config {
    /// Parse a configuration from JSON content
    ///
    /// # Example
    ///
    /// ```
    /// use sitewarden_core::config::Config;
    ///
    /// let config = Config::parse_json(r#"{
    ///     "web_server": "www-data",
    ///     "directory_structure": {
    ///         "d_mode": "0750", "f_mode": "0640",
    ///         "user": "[user]", "group": "[user_primary]",
    ///         "public_html": { "d_mode": "0755", "allow_specials": true }
    ///     },
    ///     "sites": { "/srv/www/example.com": { "user": "example" } }
    /// }"#).unwrap();
    ///
    /// assert!(config.directory_structure.directories["public_html"].allow_specials);
    /// ```
    pub fn parse_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Look up a site by its root path.
    pub fn site(&self, root: &str) -> Result<&SiteConfig> {
        self.sites.get(root).ok_or_else(|| Error::UnknownSite {
            site: root.to_string(),
        })
    }

    /// The site type a site refers to, if it names one.
    pub fn site_type_of(&self, root: &str, site: &SiteConfig) -> Result<Option<&SiteTypeConfig>> {
        match &site.site_type {
            None => Ok(None),
            Some(name) => self
                .site_types
                .get(name)
                .map(Some)
                .ok_or_else(|| Error::UnknownSiteType {
                    site: root.to_string(),
                    site_type: name.clone(),
                }),
        }
    }
}

/// Root-level defaults plus one rule per managed directory.
///
/// Managed directory names share the object with the default keys, so
/// `{"d_mode": "0750", ..., "logs": {...}}` declares a `logs` directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryStructure {
    pub d_mode: String,
    pub f_mode: String,
    pub user: IdentityRef,
    pub group: IdentityRef,

    #[serde(flatten)]
    pub directories: BTreeMap<String, DirectoryRule>,
}

impl DirectoryStructure {
    /// Apply the reaper's safety gate to a `keep_empty` fragment.
    ///
    /// The normalized path must have at least [`MIN_SCRATCH_DEPTH`] segments
    /// and its first segment must name a managed directory with
    /// `allow_specials`. Returns the normalized path or the rejection reason.
    pub fn scratch_path(&self, fragment: &str) -> std::result::Result<NormalizedPath, &'static str> {
        let path = NormalizedPath::relative(fragment);
        if path.depth() < MIN_SCRATCH_DEPTH {
            return Err("fewer than three path segments");
        }
        let allowed = path
            .segments()
            .next()
            .and_then(|first| self.directories.get(first))
            .is_some_and(|rule| rule.allow_specials);
        if !allowed {
            return Err("not beneath a managed directory with allow_specials");
        }
        Ok(path)
    }
}

/// Policy for one managed directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub f_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<IdentityRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<IdentityRef>,

    /// Site option deciding whether this directory should exist
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional: Option<String>,

    /// Used when the site does not set the option
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional_default: Option<bool>,

    /// Enables open folders, read-only lists, server files and
    /// ownership-only paths inside this directory
    #[serde(default)]
    pub allow_specials: bool,

    /// Overrides for everything beneath the directory itself
    #[serde(default)]
    pub contents: ContentsRule,
}

/// Overrides applied beneath a managed directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentsRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub f_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<IdentityRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<IdentityRef>,
}

/// Per-site settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Owning user of the site
    pub user: String,

    /// Name of an entry in `site_types`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub site_type: Option<String>,

    /// Named values gating optional directories
    #[serde(default)]
    pub options: BTreeMap<String, Value>,

    #[serde(default)]
    pub open_folders: Vec<String>,
    #[serde(default)]
    pub read_only: Vec<String>,
    #[serde(default)]
    pub server_files: Vec<String>,
    #[serde(default)]
    pub ownership_only: Vec<String>,
}

impl SiteConfig {
    /// Interpret a site option as a provisioning flag.
    ///
    /// Booleans are taken as-is; numbers are true unless zero; strings are
    /// true unless empty, `"0"`, `"false"`, `"no"` or `"off"`; null is false;
    /// arrays and objects are true when non-empty.
    pub fn option_flag(&self, name: &str) -> Option<bool> {
        self.options.get(name).map(truthy)
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "" | "0" | "false" | "no" | "off"
        ),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Defaults shared by every site of one type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteTypeConfig {
    #[serde(default)]
    pub open_folders: Vec<String>,
    #[serde(default)]
    pub read_only: Vec<String>,
    /// Scratch directories purged by the reaper
    #[serde(default)]
    pub keep_empty: Vec<String>,
}
