//! Auditor implementation

use chrono::{DateTime, TimeDelta, Utc};

use super::reaper::RetentionReaper;
use super::walker::DirectoryWalker;
use crate::config::Config;
use crate::identity::IdentityResolver;
use crate::sink::{Enforce, EventSink, Report};
use crate::Result;

/// Runs configured sites through an [`EventSink`].
///
/// The sink decides the outcome: [`Report`] only describes drift,
/// [`Enforce`] corrects it. Traversal and policy are identical either way.
///
/// Sites are processed in sorted order. The first fatal error aborts the
/// run; corrections already applied by an enforcing sink stay in place.
pub struct Auditor<'c> {
    config: &'c Config,
    ids: IdentityResolver,
    sites: Option<Vec<String>>,
    reaper: RetentionReaper,
}

impl<'c> Auditor<'c> {
    /// Create an auditor for every site in `config`.
    pub fn new(config: &'c Config, ids: IdentityResolver) -> Self {
        Self {
            config,
            ids,
            sites: None,
            reaper: RetentionReaper::new(),
        }
    }

    /// Restrict the run to the given site roots.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownSite`](crate::Error::UnknownSite) for a root the config does not declare.
    pub fn only_sites<I, S>(mut self, sites: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selected = Vec::new();
        for site in sites {
            let site = site.into();
            self.config.site(&site)?;
            selected.push(site);
        }
        selected.sort();
        selected.dedup();
        self.sites = Some(selected);
        Ok(self)
    }

    /// Override the scratch retention window.
    pub fn with_retention(mut self, max_age: TimeDelta) -> Self {
        self.reaper = self.reaper.with_max_age(max_age);
        self
    }

    /// Measure scratch ages from a fixed instant.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.reaper = self.reaper.at(now);
        self
    }

    /// Site roots this auditor will visit, in order.
    pub fn site_roots(&self) -> Vec<&str> {
        match &self.sites {
            Some(selected) => selected.iter().map(String::as_str).collect(),
            None => self.config.sites.keys().map(String::as_str).collect(),
        }
    }

    /// Audit every selected site.
    pub fn run(&mut self, sink: &mut dyn EventSink) -> Result<()> {
        let walker = DirectoryWalker::new(self.config, self.reaper);
        let roots: Vec<String> = self.site_roots().into_iter().map(str::to_string).collect();
        for root in &roots {
            walker.walk_site(&mut self.ids, root, sink)?;
        }
        tracing::debug!(sites = roots.len(), "Audit complete");
        Ok(())
    }
}

/// Report drift across all sites without changing anything.
pub fn audit(config: &Config, ids: IdentityResolver) -> Result<Report> {
    let mut report = Report::new();
    Auditor::new(config, ids).run(&mut report)?;
    Ok(report)
}

/// Correct drift across all sites and return the change log.
pub fn enforce(config: &Config, ids: IdentityResolver) -> Result<Report> {
    let mut sink = Enforce::new();
    Auditor::new(config, ids).run(&mut sink)?;
    Ok(sink.into_report())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::identity::StaticIdentities;
    use serde_json::json;

    fn config() -> Config {
        serde_json::from_value(json!({
            "web_server": "www-data",
            "directory_structure": {
                "d_mode": "0750", "f_mode": "0640",
                "user": "[user]", "group": "[user_primary]"
            },
            "sites": {
                "/srv/www/b": { "user": "b" },
                "/srv/www/a": { "user": "a" }
            }
        }))
        .unwrap()
    }

    #[test]
    fn sites_are_visited_in_sorted_order() {
        let config = config();
        let auditor = Auditor::new(&config, IdentityResolver::new(StaticIdentities::new()));
        assert_eq!(auditor.site_roots(), vec!["/srv/www/a", "/srv/www/b"]);

        let auditor = auditor.only_sites(["/srv/www/b", "/srv/www/b"]).unwrap();
        assert_eq!(auditor.site_roots(), vec!["/srv/www/b"]);
    }

    #[test]
    fn unknown_site_filter_is_rejected() {
        let config = config();
        let result =
            Auditor::new(&config, IdentityResolver::new(StaticIdentities::new())).only_sites(["/srv/www/c"]);
        assert!(matches!(result, Err(Error::UnknownSite { .. })));
    }
}
