//! Shared site layout and policy for the end-to-end tests

#![allow(dead_code)]

use serde_json::json;
use sitewarden_core::{Config, IdentityResolver, StaticIdentities};
use sitewarden_test_utils::SiteFixture;

/// Policy for a single WordPress-style site rooted at the fixture.
pub fn policy(site: &SiteFixture) -> Config {
    serde_json::from_value(json!({
        "web_server": "www-data",
        "directory_structure": {
            "d_mode": "0750", "f_mode": "0640",
            "user": "[user]", "group": "[user_primary]",
            "public_html": { "allow_specials": true },
            "logs": {},
            "tmp": { "optional": "tmp", "optional_default": false }
        },
        "site_types": {
            "wordpress": {
                "open_folders": ["public_html/wp-content/uploads"],
                "read_only": ["public_html/wp-config.php"],
                "keep_empty": ["public_html/wp-content/cache"]
            }
        },
        "sites": {
            (site.root_key()): {
                "user": "owner",
                "type": "wordpress",
                "open_folders": ["public_html/media"],
                "server_files": ["public_html/robots.txt"],
                "ownership_only": ["public_html/vendor"]
            }
        }
    }))
    .unwrap()
}

/// Identity table mapping the site user to whoever runs the tests.
///
/// The web server user gets `web_uid`; every group maps to the current gid.
pub fn identities(site: &SiteFixture, web_uid: u32) -> IdentityResolver {
    let (uid, gid) = site.current_ids();
    IdentityResolver::new(
        StaticIdentities::new()
            .with_user("owner", uid, gid)
            .with_user("www-data", web_uid, gid)
            .with_group("www-data", gid),
    )
}

/// Identity table under which a tidy site is fully compliant.
pub fn compliant_identities(site: &SiteFixture) -> IdentityResolver {
    identities(site, site.current_ids().0)
}

/// A site matching [`policy`] exactly.
pub fn tidy_site() -> SiteFixture {
    let site = SiteFixture::new();
    for dir in [
        "logs",
        "public_html",
        "public_html/vendor",
        "public_html/wp-content",
        "public_html/wp-content/cache",
    ] {
        site.dir(dir, 0o750);
    }
    for dir in ["public_html/media", "public_html/wp-content/uploads"] {
        site.dir(dir, 0o777);
    }
    site.file("logs/access.log", 0o640);
    site.file("public_html/index.php", 0o640);
    site.file("public_html/wp-config.php", 0o444);
    site.file("public_html/robots.txt", 0o644);
    site.file("public_html/vendor/autoload.php", 0o600);
    site
}

/// A tidy site with mode drift and stale scratch content.
pub fn drifted_site() -> SiteFixture {
    let site = tidy_site();
    site.chmod("public_html/index.php", 0o600);
    site.chmod("public_html/wp-config.php", 0o644);
    site.chmod("public_html/wp-content/uploads", 0o755);
    site.file("public_html/wp-content/uploads/photo.png", 0o644);
    site.dir("public_html/wp-content/cache/pages", 0o750);
    site.file("public_html/wp-content/cache/pages/home.html", 0o644);
    site.file("public_html/wp-content/cache/old.html", 0o644);
    site.file("public_html/wp-content/cache/new.html", 0o644);
    site.accessed_hours_ago("public_html/wp-content/cache/pages/home.html", 72);
    site.accessed_hours_ago("public_html/wp-content/cache/old.html", 30);
    site.accessed_hours_ago("public_html/wp-content/cache/new.html", 1);
    site
}
