//! End-to-end enforcement scenarios

mod common;

use common::{compliant_identities, drifted_site, identities, policy, tidy_site};
use pretty_assertions::assert_eq;
use sitewarden_core::{Auditor, Enforce, Error, EventKind, audit, enforce};
use sitewarden_test_utils::SiteFixture;

#[test]
fn test_open_folder_mode_is_corrected() {
    let site = tidy_site();
    site.file("public_html/media/a.jpg", 0o644);

    let changes = enforce(&policy(&site), compliant_identities(&site)).unwrap();

    assert_eq!(site.mode("public_html/media/a.jpg"), 0o666);
    assert_eq!(
        changes.lines(),
        [format!(
            "[mode] {}: changed 0644 -> 0666",
            site.path("public_html/media/a.jpg").display()
        )]
    );
}

#[test]
fn test_stale_scratch_entries_are_deleted() {
    let site = drifted_site();

    let changes = enforce(&policy(&site), compliant_identities(&site)).unwrap();

    assert!(!site.exists("public_html/wp-content/cache/old.html"));
    assert!(!site.exists("public_html/wp-content/cache/pages"));
    assert!(site.exists("public_html/wp-content/cache/new.html"));
    assert!(site.exists("public_html/wp-content/cache"));
    assert_eq!(changes.count(EventKind::KeepEmptyDeleted), 3);
}

#[test]
fn test_enforcement_converges_in_one_pass() {
    let site = drifted_site();
    site.file("notes.txt", 0o600);

    let first = enforce(&policy(&site), compliant_identities(&site)).unwrap();
    assert_eq!(first.count(EventKind::ModeError), 4);
    assert_eq!(first.count(EventKind::UnknownRootEntry), 1);

    let second = enforce(&policy(&site), compliant_identities(&site)).unwrap();
    assert_eq!(
        second.lines(),
        [format!(
            "[unknown_root_entry] {}: not a managed directory",
            site.path("notes.txt").display()
        )]
    );

    let report = audit(&policy(&site), compliant_identities(&site)).unwrap();
    assert_eq!(report.count(EventKind::ModeError), 0);
    assert_eq!(report.count(EventKind::KeepEmptyDeleted), 0);
}

#[test]
fn test_drift_free_site_converges_to_silence() {
    let site = drifted_site();

    enforce(&policy(&site), compliant_identities(&site)).unwrap();
    let second = enforce(&policy(&site), compliant_identities(&site)).unwrap();
    assert!(second.is_clean(), "unexpected: {:#?}", second.lines());
}

#[test]
fn test_server_file_owner_is_corrected_or_refused() {
    let site = tidy_site();
    let web_uid = if site.is_root() { 4242 } else { site.current_ids().0 + 1 };
    let previous = site.owner("public_html/robots.txt").0;

    let mut sink = Enforce::new();
    let result = Auditor::new(&policy(&site), identities(&site, web_uid)).run(&mut sink);

    if site.is_root() {
        result.unwrap();
        assert_eq!(site.owner("public_html/robots.txt").0, web_uid);
        assert_eq!(
            sink.report().lines(),
            [format!(
                "[owner] {}: changed {} -> www-data ({})",
                site.path("public_html/robots.txt").display(),
                previous,
                web_uid
            )]
        );
    } else {
        let err = result.unwrap_err();
        assert!(
            matches!(err, Error::Fs(sitewarden_fs::Error::Mutation { what: "owner", .. })),
            "got {:?}",
            err
        );
        assert_eq!(site.owner("public_html/robots.txt").0, previous);
    }
}

#[test]
fn test_symlinked_scratch_ancestor_keeps_outside_files() {
    let site = SiteFixture::new();
    let outside = SiteFixture::new();
    outside.dir("cache", 0o755);
    outside.file("cache/victim.dat", 0o644);
    outside.accessed_hours_ago("cache/victim.dat", 72);
    site.dir("logs", 0o750);
    site.dir("public_html", 0o750);
    site.symlink("public_html/wp-content", &outside.root().to_string_lossy());

    let changes = enforce(&policy(&site), compliant_identities(&site)).unwrap();

    assert!(outside.exists("cache/victim.dat"));
    assert_eq!(
        changes.lines(),
        [format!(
            "[unknown_entry] {}: neither a file nor a directory",
            site.path("public_html/wp-content").display()
        )]
    );
}
