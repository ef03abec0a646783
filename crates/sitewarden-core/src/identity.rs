//! Identity resolution with a per-run cache
//!
//! [`IdentityResolver`] turns [`IdentityRef`]s into numeric ids. Lookups go
//! through an [`IdentityService`] and are memoized per name for the lifetime
//! of the resolver, which assumes the user and group databases do not change
//! during a run.

use std::collections::HashMap;

use crate::config::IdentityRef;
use crate::{Error, Result};

/// Superuser whose primary group `[root_primary]` refers to.
pub const SUPERUSER: &str = "root";

/// Name-to-id lookups against a user and group database.
///
/// `Ok(None)` means the name is unknown; `Err` means the database itself
/// could not be queried.
pub trait IdentityService {
    /// Uid of a user.
    fn user_id(&self, name: &str) -> Result<Option<u32>>;

    /// Gid of a group.
    fn group_id(&self, name: &str) -> Result<Option<u32>>;

    /// Gid of a user's primary group.
    fn primary_group_id(&self, user: &str) -> Result<Option<u32>>;
}

/// The host's passwd and group databases.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemIdentities;

impl IdentityService for SystemIdentities {
    fn user_id(&self, name: &str) -> Result<Option<u32>> {
        Ok(sitewarden_fs::lookup_user(name)?.map(|entry| entry.uid))
    }

    fn group_id(&self, name: &str) -> Result<Option<u32>> {
        Ok(sitewarden_fs::lookup_group(name)?.map(|entry| entry.gid))
    }

    fn primary_group_id(&self, user: &str) -> Result<Option<u32>> {
        Ok(sitewarden_fs::lookup_user(user)?.map(|entry| entry.gid))
    }
}

/// A fixed in-memory identity table.
#[derive(Debug, Default, Clone)]
pub struct StaticIdentities {
    users: HashMap<String, (u32, u32)>,
    groups: HashMap<String, u32>,
}

impl StaticIdentities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user with its primary group.
    pub fn with_user(mut self, name: impl Into<String>, uid: u32, primary_gid: u32) -> Self {
        self.users.insert(name.into(), (uid, primary_gid));
        self
    }

    /// Add a group.
    pub fn with_group(mut self, name: impl Into<String>, gid: u32) -> Self {
        self.groups.insert(name.into(), gid);
        self
    }
}

impl IdentityService for StaticIdentities {
    fn user_id(&self, name: &str) -> Result<Option<u32>> {
        Ok(self.users.get(name).map(|(uid, _)| *uid))
    }

    fn group_id(&self, name: &str) -> Result<Option<u32>> {
        Ok(self.groups.get(name).copied())
    }

    fn primary_group_id(&self, user: &str) -> Result<Option<u32>> {
        Ok(self.users.get(user).map(|(_, gid)| *gid))
    }
}

/// Names the placeholders point at while resolving one site.
#[derive(Debug, Clone, Copy)]
pub struct IdentityScope<'a> {
    pub site_user: &'a str,
    pub web_server: &'a str,
}

/// A numeric id with the label used in diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedId {
    pub id: u32,
    pub label: String,
}

/// Resolves identity references, caching every lookup for the run.
pub struct IdentityResolver {
    service: Box<dyn IdentityService>,
    users: HashMap<String, u32>,
    groups: HashMap<String, u32>,
    primary_groups: HashMap<String, u32>,
}

impl IdentityResolver {
    /// Create a resolver over any identity service.
    pub fn new(service: impl IdentityService + 'static) -> Self {
        Self {
            service: Box::new(service),
            users: HashMap::new(),
            groups: HashMap::new(),
            primary_groups: HashMap::new(),
        }
    }

    /// Create a resolver over the host's databases.
    pub fn system() -> Self {
        Self::new(SystemIdentities)
    }

    /// Resolve a reference in the owner role.
    pub fn resolve_user(&mut self, reference: &IdentityRef, scope: IdentityScope<'_>) -> Result<ResolvedId> {
        let name = match reference {
            IdentityRef::SiteUser => scope.site_user,
            IdentityRef::WebServer => scope.web_server,
            IdentityRef::Named(name) => name.as_str(),
            IdentityRef::UserPrimary | IdentityRef::RootPrimary => {
                return Err(Error::InvalidIdentityRole {
                    reference: reference.to_string(),
                    role: "user",
                });
            }
        };
        let id = self.uid(name)?;
        Ok(ResolvedId {
            id,
            label: format!("{} ({})", name, id),
        })
    }

    /// Resolve a reference in the group role.
    pub fn resolve_group(&mut self, reference: &IdentityRef, scope: IdentityScope<'_>) -> Result<ResolvedId> {
        let (id, label) = match reference {
            IdentityRef::SiteUser => self.named_group(scope.site_user)?,
            IdentityRef::WebServer => self.named_group(scope.web_server)?,
            IdentityRef::Named(name) => self.named_group(name)?,
            IdentityRef::UserPrimary => {
                let gid = self.primary_gid(scope.site_user)?;
                (gid, format!("primary group of {} ({})", scope.site_user, gid))
            }
            IdentityRef::RootPrimary => {
                let gid = self.primary_gid(SUPERUSER)?;
                (gid, format!("primary group of {} ({})", SUPERUSER, gid))
            }
        };
        Ok(ResolvedId { id, label })
    }

    fn named_group(&mut self, name: &str) -> Result<(u32, String)> {
        let gid = self.gid(name)?;
        Ok((gid, format!("{} ({})", name, gid)))
    }

    fn uid(&mut self, name: &str) -> Result<u32> {
        if let Some(uid) = self.users.get(name) {
            return Ok(*uid);
        }
        let uid = self.service.user_id(name)?.ok_or_else(|| Error::UnknownUser {
            name: name.to_string(),
        })?;
        tracing::debug!(user = name, uid, "Resolved user");
        self.users.insert(name.to_string(), uid);
        Ok(uid)
    }

    fn gid(&mut self, name: &str) -> Result<u32> {
        if let Some(gid) = self.groups.get(name) {
            return Ok(*gid);
        }
        let gid = self.service.group_id(name)?.ok_or_else(|| Error::UnknownGroup {
            name: name.to_string(),
        })?;
        tracing::debug!(group = name, gid, "Resolved group");
        self.groups.insert(name.to_string(), gid);
        Ok(gid)
    }

    fn primary_gid(&mut self, user: &str) -> Result<u32> {
        if let Some(gid) = self.primary_groups.get(user) {
            return Ok(*gid);
        }
        let gid = self
            .service
            .primary_group_id(user)?
            .ok_or_else(|| Error::UnknownUser {
                name: user.to_string(),
            })?;
        tracing::debug!(user, gid, "Resolved primary group");
        self.primary_groups.insert(user.to_string(), gid);
        Ok(gid)
    }
}
