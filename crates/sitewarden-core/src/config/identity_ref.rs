//! Identity references used in `user` / `group` fields

use serde::{Deserialize, Serialize};

/// A user or group as written in the configuration.
///
/// Bracketed tokens are placeholders resolved per site; any other string is
/// taken as a literal user or group name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IdentityRef {
    /// `[user]`: the site's configured user
    SiteUser,
    /// `[web_server]`: the global web-server identity
    WebServer,
    /// `[user_primary]`: the primary group of the site user
    UserPrimary,
    /// `[root_primary]`: the primary group of the superuser
    RootPrimary,
    /// Any other string
    Named(String),
}

impl IdentityRef {
    /// True for placeholders that only make sense as a group.
    pub fn is_group_only(&self) -> bool {
        matches!(self, Self::UserPrimary | Self::RootPrimary)
    }
}

impl From<&str> for IdentityRef {
    fn from(value: &str) -> Self {
        match value {
            "[user]" => Self::SiteUser,
            "[web_server]" => Self::WebServer,
            "[user_primary]" => Self::UserPrimary,
            "[root_primary]" => Self::RootPrimary,
            other => Self::Named(other.to_string()),
        }
    }
}

impl From<String> for IdentityRef {
    fn from(value: String) -> Self {
        match Self::from(value.as_str()) {
            Self::Named(_) => Self::Named(value),
            placeholder => placeholder,
        }
    }
}

impl From<IdentityRef> for String {
    fn from(value: IdentityRef) -> Self {
        value.to_string()
    }
}

impl std::fmt::Display for IdentityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SiteUser => write!(f, "[user]"),
            Self::WebServer => write!(f, "[web_server]"),
            Self::UserPrimary => write!(f, "[user_primary]"),
            Self::RootPrimary => write!(f, "[root_primary]"),
            Self::Named(name) => write!(f, "{}", name),
        }
    }
}
