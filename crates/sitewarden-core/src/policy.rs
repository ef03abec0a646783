//! Expected-identity resolution
//!
//! Every entity under a managed directory resolves to exactly one
//! [`PolicyRule`]. Inheritance is computed once per managed directory into a
//! [`ResolvedDirectory`]; the per-entity precedence then picks between the
//! top-level layer, the internal layer, and the special-rule overrides.
//!
//! Directory precedence (specials only with `allow_specials`):
//!
//! 1. the managed directory itself -> top-level layer
//! 2. ownership-only path or VCS metadata -> mode unchecked
//! 3. site open folder -> `0777`
//! 4. site-type open folder -> `0777`
//! 5. internal layer
//!
//! File precedence (specials only with `allow_specials`):
//!
//! 1. ownership-only path or VCS metadata -> mode unchecked
//! 2. site server file -> `0644`, web-server user and group
//! 3. site open folder -> `0666`
//! 4. site-type open folder -> `0666`
//! 5. site read-only -> `0444`
//! 6. site-type read-only -> `0444`
//! 7. internal layer

use sitewarden_fs::{EntityKind, NormalizedPath, VcsDir};

use crate::Result;
use crate::config::{Config, DirectoryRule, DirectoryStructure, IdentityRef, SiteConfig, SiteTypeConfig};
use crate::identity::{IdentityResolver, IdentityScope};
use crate::mode::FileMode;

/// Modes and owners every entity at one inheritance level starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub d_mode: String,
    pub f_mode: String,
    pub user: IdentityRef,
    pub group: IdentityRef,
}

impl Layer {
    fn mode_for(&self, kind: EntityKind) -> &str {
        match kind {
            EntityKind::Directory => &self.d_mode,
            EntityKind::File | EntityKind::Other => &self.f_mode,
        }
    }
}

/// A managed directory with both inheritance stages applied.
#[derive(Debug, Clone)]
pub struct ResolvedDirectory {
    pub name: String,
    /// Site-relative path of the directory (its name).
    pub path: NormalizedPath,
    pub allow_specials: bool,
    /// The directory itself: rule value, else root-level default.
    pub top: Layer,
    /// Everything beneath it: `contents` value, else the top-level value.
    pub internal: Layer,
}

impl ResolvedDirectory {
    pub fn new(name: &str, rule: &DirectoryRule, defaults: &DirectoryStructure) -> Self {
        let top = Layer {
            d_mode: rule.d_mode.clone().unwrap_or_else(|| defaults.d_mode.clone()),
            f_mode: rule.f_mode.clone().unwrap_or_else(|| defaults.f_mode.clone()),
            user: rule.user.clone().unwrap_or_else(|| defaults.user.clone()),
            group: rule.group.clone().unwrap_or_else(|| defaults.group.clone()),
        };
        let contents = &rule.contents;
        let internal = Layer {
            d_mode: contents.d_mode.clone().unwrap_or_else(|| top.d_mode.clone()),
            f_mode: contents.f_mode.clone().unwrap_or_else(|| top.f_mode.clone()),
            user: contents.user.clone().unwrap_or_else(|| top.user.clone()),
            group: contents.group.clone().unwrap_or_else(|| top.group.clone()),
        };

        Self {
            name: name.to_string(),
            path: NormalizedPath::relative(name),
            allow_specials: rule.allow_specials,
            top,
            internal,
        }
    }
}

/// The precedence rule that produced an expectation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PolicyRule {
    TopLevel,
    OwnershipOnly,
    ServerFile,
    SiteOpenFolder,
    TypeOpenFolder,
    SiteReadOnly,
    TypeReadOnly,
    Internal,
}

/// Expected identity before any id lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expectation {
    pub rule: PolicyRule,
    /// `None` when mode checking is disabled.
    pub mode: Option<String>,
    pub user: IdentityRef,
    pub group: IdentityRef,
}

impl Expectation {
    fn from_layer(rule: PolicyRule, layer: &Layer, kind: EntityKind) -> Self {
        Self {
            rule,
            mode: Some(layer.mode_for(kind).to_string()),
            user: layer.user.clone(),
            group: layer.group.clone(),
        }
    }

    fn with_mode(rule: PolicyRule, layer: &Layer, mode: Option<&str>) -> Self {
        Self {
            rule,
            mode: mode.map(str::to_string),
            user: layer.user.clone(),
            group: layer.group.clone(),
        }
    }
}

/// Fully resolved expected identity of one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveIdentity {
    pub rule: PolicyRule,
    /// `None` when mode checking is disabled.
    pub mode: Option<FileMode>,
    pub uid: u32,
    pub gid: u32,
    pub user_label: String,
    pub group_label: String,
}

/// Computes expected identities for the entities of one site.
#[derive(Debug, Clone)]
pub struct PolicyResolver<'a> {
    site: &'a SiteConfig,
    web_server: &'a str,
    ownership_only: Vec<NormalizedPath>,
    server_files: Vec<NormalizedPath>,
    site_open: Vec<NormalizedPath>,
    type_open: Vec<NormalizedPath>,
    site_read_only: Vec<NormalizedPath>,
    type_read_only: Vec<NormalizedPath>,
}

impl<'a> PolicyResolver<'a> {
    pub fn new(site: &'a SiteConfig, site_type: Option<&SiteTypeConfig>, web_server: &'a str) -> Self {
        let empty: &[String] = &[];

        Self {
            site,
            web_server,
            ownership_only: normalize_all(&site.ownership_only),
            server_files: normalize_all(&site.server_files),
            site_open: normalize_all(&site.open_folders),
            type_open: normalize_all(site_type.map_or(empty, |t| t.open_folders.as_slice())),
            site_read_only: normalize_all(&site.read_only),
            type_read_only: normalize_all(site_type.map_or(empty, |t| t.read_only.as_slice())),
        }
    }

    /// Build the resolver for a configured site.
    pub fn for_site(config: &'a Config, root: &str) -> Result<Self> {
        let site = config.site(root)?;
        let site_type = config.site_type_of(root, site)?;
        Ok(Self::new(site, site_type, &config.web_server))
    }

    /// Names the placeholders resolve to for this site.
    pub fn scope(&self) -> IdentityScope<'a> {
        IdentityScope {
            site_user: &self.site.user,
            web_server: self.web_server,
        }
    }

    /// Pick the single applicable rule for a site-relative path.
    pub fn expect(&self, dir: &ResolvedDirectory, rel: &NormalizedPath, kind: EntityKind) -> Expectation {
        if *rel == dir.path {
            return Expectation::from_layer(PolicyRule::TopLevel, &dir.top, kind);
        }

        let internal = &dir.internal;
        if !dir.allow_specials {
            return Expectation::from_layer(PolicyRule::Internal, internal, kind);
        }

        if self.is_ownership_only(rel) {
            return Expectation::with_mode(PolicyRule::OwnershipOnly, internal, None);
        }

        match kind {
            EntityKind::Directory => {
                if inside_any(rel, &self.site_open) {
                    Expectation::with_mode(PolicyRule::SiteOpenFolder, internal, Some(FileMode::OPEN_DIR))
                } else if inside_any(rel, &self.type_open) {
                    Expectation::with_mode(PolicyRule::TypeOpenFolder, internal, Some(FileMode::OPEN_DIR))
                } else {
                    Expectation::from_layer(PolicyRule::Internal, internal, kind)
                }
            }
            EntityKind::File | EntityKind::Other => {
                if self.server_files.contains(rel) {
                    Expectation {
                        rule: PolicyRule::ServerFile,
                        mode: Some(FileMode::SERVER_FILE.to_string()),
                        user: IdentityRef::WebServer,
                        group: IdentityRef::WebServer,
                    }
                } else if inside_any(rel, &self.site_open) {
                    Expectation::with_mode(PolicyRule::SiteOpenFolder, internal, Some(FileMode::OPEN_FILE))
                } else if inside_any(rel, &self.type_open) {
                    Expectation::with_mode(PolicyRule::TypeOpenFolder, internal, Some(FileMode::OPEN_FILE))
                } else if self.site_read_only.contains(rel) {
                    Expectation::with_mode(PolicyRule::SiteReadOnly, internal, Some(FileMode::READ_ONLY))
                } else if self.type_read_only.contains(rel) {
                    Expectation::with_mode(PolicyRule::TypeReadOnly, internal, Some(FileMode::READ_ONLY))
                } else {
                    Expectation::from_layer(PolicyRule::Internal, internal, kind)
                }
            }
        }
    }

    /// Validate the mode and look up the ids of an expectation.
    pub fn identify(&self, ids: &mut IdentityResolver, expectation: Expectation) -> Result<EffectiveIdentity> {
        let mode = expectation.mode.as_deref().map(FileMode::parse).transpose()?;
        let scope = self.scope();
        let user = ids.resolve_user(&expectation.user, scope)?;
        let group = ids.resolve_group(&expectation.group, scope)?;

        Ok(EffectiveIdentity {
            rule: expectation.rule,
            mode,
            uid: user.id,
            gid: group.id,
            user_label: user.label,
            group_label: group.label,
        })
    }

    /// [`expect`](Self::expect) followed by [`identify`](Self::identify).
    pub fn resolve(
        &self,
        ids: &mut IdentityResolver,
        dir: &ResolvedDirectory,
        rel: &NormalizedPath,
        kind: EntityKind,
    ) -> Result<EffectiveIdentity> {
        let expectation = self.expect(dir, rel, kind);
        self.identify(ids, expectation)
    }

    fn is_ownership_only(&self, rel: &NormalizedPath) -> bool {
        inside_any(rel, &self.ownership_only) || rel.segments().any(|segment| VcsDir::from_segment(segment).is_some())
    }
}

fn normalize_all(list: &[String]) -> Vec<NormalizedPath> {
    list.iter().map(|fragment| NormalizedPath::relative(fragment)).collect()
}

fn inside_any(rel: &NormalizedPath, prefixes: &[NormalizedPath]) -> bool {
    prefixes.iter().any(|prefix| rel.starts_with(prefix))
}
