//! Site traversal
//!
//! One site is processed in a fixed order: root entries, scratch
//! directories, then each managed directory by name. Within a managed
//! directory entries are visited children first, siblings by file name.

use std::path::{Path, PathBuf};

use sitewarden_fs::{NormalizedPath, io};
use walkdir::WalkDir;

use super::checker::EntityChecker;
use super::reaper::RetentionReaper;
use crate::config::{Config, DirectoryRule, SiteConfig};
use crate::event::Event;
use crate::identity::IdentityResolver;
use crate::policy::{PolicyResolver, ResolvedDirectory};
use crate::sink::EventSink;
use crate::{Error, Result};

/// What the walker does with one managed directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Provisioning {
    Required,
    /// Optional directory and whether the site wants it.
    Optional(bool),
}

/// Walks configured sites.
#[derive(Debug, Clone, Copy)]
pub struct DirectoryWalker<'c> {
    config: &'c Config,
    reaper: RetentionReaper,
}

impl<'c> DirectoryWalker<'c> {
    pub fn new(config: &'c Config, reaper: RetentionReaper) -> Self {
        Self { config, reaper }
    }

    /// Audit one site, reporting every discrepancy to `sink`.
    ///
    /// Configuration errors for the site (unknown site type, unsafe
    /// scratch path, unresolvable optional directory) are raised before
    /// the filesystem is touched.
    pub fn walk_site(&self, ids: &mut IdentityResolver, root: &str, sink: &mut dyn EventSink) -> Result<()> {
        let config = self.config;
        let structure = &config.directory_structure;
        let site = config.site(root)?;
        let site_type = config.site_type_of(root, site)?;
        let policy = PolicyResolver::new(site, site_type, &config.web_server);

        let empty: &[String] = &[];
        let keep_empty = site_type.map_or(empty, |t| t.keep_empty.as_slice());
        let scratch = keep_empty
            .iter()
            .map(|fragment| RetentionReaper::validate(structure, root, fragment))
            .collect::<Result<Vec<NormalizedPath>>>()?;

        let mut plan = Vec::with_capacity(structure.directories.len());
        for (name, rule) in &structure.directories {
            plan.push((name.as_str(), rule, provisioning(site, root, name, rule)?));
        }

        let site_root = NormalizedPath::new(root);
        let native_root = site_root.to_native();
        match io::try_stat(&native_root)? {
            Some(stat) if stat.kind == sitewarden_fs::EntityKind::Directory => {}
            _ => return Err(Error::SiteRootMissing { path: native_root }),
        }
        tracing::debug!(site = root, user = %site.user, "Auditing site");

        for name in io::list_names(&native_root)? {
            if !structure.directories.contains_key(&name) {
                sink.handle(&Event::UnknownRootEntry {
                    path: native_root.join(&name),
                })?;
            }
        }

        for fragment in keep_empty {
            self.reaper.reap(structure, &site_root, fragment, sink)?;
        }

        let scratch_roots: Vec<PathBuf> = scratch
            .iter()
            .map(|rel| site_root.join(rel.as_str()).to_native())
            .collect();
        let checker = EntityChecker::new(&policy, &site_root);

        for (name, rule, provisioning) in plan {
            let path = native_root.join(name);
            let present = io::try_stat(&path)?.is_some();

            match (provisioning, present) {
                (Provisioning::Required, false) => {
                    sink.handle(&Event::MissingRequiredDir { path })?;
                    continue;
                }
                (Provisioning::Optional(true), false) => {
                    sink.handle(&Event::MissingOptionalDir {
                        path,
                        option: option_name(rule),
                    })?;
                    continue;
                }
                (Provisioning::Optional(false), true) => {
                    sink.handle(&Event::UnallocatedOptionalDir {
                        path,
                        option: option_name(rule),
                    })?;
                    continue;
                }
                (Provisioning::Optional(false), false) => {
                    tracing::debug!(directory = name, "Optional directory not provisioned, skipping");
                    continue;
                }
                (Provisioning::Required | Provisioning::Optional(true), true) => {}
            }

            tracing::debug!(directory = name, "Walking managed directory");
            let resolved = ResolvedDirectory::new(name, rule, structure);
            let walker = WalkDir::new(&path)
                .follow_links(false)
                .follow_root_links(false)
                .contents_first(true)
                .sort_by_file_name();
            for entry in walker {
                let entry = entry?;
                if inside_scratch(entry.path(), &scratch_roots) {
                    continue;
                }
                checker.check(ids, &resolved, entry.path(), sink)?;
            }
        }
        Ok(())
    }
}

fn provisioning(site: &SiteConfig, root: &str, name: &str, rule: &DirectoryRule) -> Result<Provisioning> {
    let Some(option) = &rule.optional else {
        return Ok(Provisioning::Required);
    };
    site.option_flag(option)
        .or(rule.optional_default)
        .map(Provisioning::Optional)
        .ok_or_else(|| Error::UnresolvedOption {
            site: root.to_string(),
            directory: name.to_string(),
            option: option.clone(),
        })
}

fn option_name(rule: &DirectoryRule) -> String {
    rule.optional.clone().unwrap_or_default()
}

/// Strict descendants of a scratch root belong to the reaper.
fn inside_scratch(path: &Path, scratch_roots: &[PathBuf]) -> bool {
    scratch_roots
        .iter()
        .any(|scratch| path != scratch && path.starts_with(scratch))
}
