//! Property tests for policy precedence

use proptest::prelude::*;
use sitewarden_core::config::Config;
use sitewarden_core::{PolicyResolver, PolicyRule, ResolvedDirectory};
use sitewarden_fs::{EntityKind, NormalizedPath};

fn config() -> Config {
    Config::parse_json(
        r#"{
        "web_server": "www-data",
        "directory_structure": {
            "d_mode": "0750", "f_mode": "0640",
            "user": "[user]", "group": "[user_primary]",
            "pub": { "allow_specials": true },
            "priv": {}
        },
        "site_types": {
            "t": { "open_folders": ["pub/b"], "read_only": ["pub/a/c"] }
        },
        "sites": {
            "/srv/www/s": {
                "user": "s", "type": "t",
                "open_folders": ["pub/a"],
                "read_only": ["pub/b/c", "pub/c"],
                "server_files": ["pub/a/b", "pub/c"],
                "ownership_only": ["pub/c/a"]
            }
        }
    }"#,
    )
    .unwrap()
}

fn kind() -> impl Strategy<Value = EntityKind> {
    prop_oneof![Just(EntityKind::File), Just(EntityKind::Directory)]
}

fn segments() -> impl Strategy<Value = Vec<&'static str>> {
    proptest::collection::vec(prop_oneof![Just("a"), Just("b"), Just("c"), Just(".git")], 0..4)
}

proptest! {
    #[test]
    fn test_every_path_resolves_to_one_valid_rule(
        top in prop_oneof![Just("pub"), Just("priv")],
        rest in segments(),
        kind in kind(),
    ) {
        let config = config();
        let structure = &config.directory_structure;
        let dir = ResolvedDirectory::new(top, &structure.directories[top], structure);
        let policy = PolicyResolver::for_site(&config, "/srv/www/s").unwrap();

        let mut rel = NormalizedPath::relative(top);
        for segment in &rest {
            rel = rel.join(segment);
        }
        let expectation = policy.expect(&dir, &rel, kind);

        // Deterministic
        prop_assert_eq!(&expectation, &policy.expect(&dir, &rel, kind));

        if rest.is_empty() {
            prop_assert_eq!(expectation.rule, PolicyRule::TopLevel);
        }
        if top == "priv" && !rest.is_empty() {
            prop_assert_eq!(expectation.rule, PolicyRule::Internal);
        }
        match expectation.rule {
            PolicyRule::OwnershipOnly => prop_assert!(expectation.mode.is_none()),
            _ => {
                let mode = expectation.mode.clone().unwrap();
                prop_assert_eq!(mode.len(), 4);
                prop_assert!(mode.chars().all(|c| c.is_digit(8)));
            }
        }
        if kind == EntityKind::Directory {
            prop_assert!(!matches!(
                expectation.rule,
                PolicyRule::ServerFile | PolicyRule::SiteReadOnly | PolicyRule::TypeReadOnly
            ));
        }
    }
}

#[test]
fn test_server_file_beats_open_folder_and_read_only() {
    let config = config();
    let structure = &config.directory_structure;
    let dir = ResolvedDirectory::new("pub", &structure.directories["pub"], structure);
    let policy = PolicyResolver::for_site(&config, "/srv/www/s").unwrap();

    let rule = |rel: &str| policy.expect(&dir, &NormalizedPath::relative(rel), EntityKind::File).rule;
    assert_eq!(rule("pub/a/b"), PolicyRule::ServerFile);
    assert_eq!(rule("pub/c"), PolicyRule::ServerFile);
    assert_eq!(rule("pub/a/c"), PolicyRule::SiteOpenFolder);
    assert_eq!(rule("pub/b/c"), PolicyRule::TypeOpenFolder);
    assert_eq!(rule("pub/c/a"), PolicyRule::OwnershipOnly);
    assert_eq!(rule("pub/c/a/.git"), PolicyRule::OwnershipOnly);
}
