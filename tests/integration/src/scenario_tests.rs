//! End-to-end audit scenarios
//!
//! Each test builds a real site tree, runs the full auditor over it with a
//! static identity table, and checks the reported events.

mod common;

use chrono::TimeDelta;
use common::{compliant_identities, drifted_site, identities, policy, tidy_site};
use pretty_assertions::assert_eq;
use sitewarden_core::{Auditor, Callbacks, Error, EventKind, Report, audit};
use sitewarden_test_utils::SiteFixture;
use std::cell::Cell;

fn report(site: &SiteFixture) -> Report {
    audit(&policy(site), compliant_identities(site)).unwrap()
}

#[test]
fn test_tidy_site_reports_nothing() {
    let site = tidy_site();
    let report = report(&site);
    assert!(report.is_clean(), "unexpected: {:#?}", report.lines());
}

#[test]
fn test_stray_file_at_site_root() {
    let site = tidy_site();
    site.file("notes.txt", 0o640);

    let report = report(&site);
    assert_eq!(
        report.lines(),
        [format!(
            "[unknown_root_entry] {}: not a managed directory",
            site.path("notes.txt").display()
        )]
    );
}

#[test]
fn test_required_directory_absent() {
    let site = tidy_site();
    std::fs::remove_dir_all(site.path("logs")).unwrap();

    let report = report(&site);
    assert_eq!(report.count(EventKind::MissingRequiredDir), 1);
    assert_eq!(report.total(), 1);
    assert!(report.lines()[0].contains(&*site.path("logs").to_string_lossy()));
}

#[test]
fn test_open_folder_file_with_restrictive_mode() {
    let site = tidy_site();
    site.file("public_html/media/a.jpg", 0o644);

    let report = report(&site);
    assert_eq!(
        report.lines(),
        [format!(
            "[mode_error] {}: mode should be 0666, found 0644",
            site.path("public_html/media/a.jpg").display()
        )]
    );
}

#[test]
fn test_backslash_filename_cannot_climb_out_of_the_site() {
    let site = tidy_site();
    site.file("public_html/..\\..\\..\\..\\..\\..\\..\\x", 0o600);

    let report = audit(&policy(&site), compliant_identities(&site)).unwrap();
    assert_eq!(
        report.lines(),
        [format!(
            "[mode_error] {}: mode should be 0640, found 0600",
            site.path("public_html/..\\..\\..\\..\\..\\..\\..\\x").display()
        )]
    );
}

#[test]
fn test_backslash_filename_does_not_borrow_a_special_rule() {
    let site = tidy_site();
    site.file("public_html/.git\\shell.php", 0o777);
    site.file("public_html/media\\x.php", 0o666);
    site.file("public_html/vendor\\y.php", 0o600);

    let report = report(&site);
    assert_eq!(report.count(EventKind::ModeError), 3);
    assert_eq!(report.total(), 3);
    assert!(
        report
            .lines()
            .iter()
            .all(|line| line.contains("mode should be 0640")),
        "unexpected: {:#?}",
        report.lines()
    );
}

#[test]
fn test_stale_scratch_file_is_listed_fresh_one_is_not() {
    let site = tidy_site();
    site.file("public_html/wp-content/cache/old.html", 0o644);
    site.file("public_html/wp-content/cache/new.html", 0o644);
    site.accessed_hours_ago("public_html/wp-content/cache/old.html", 30);
    site.accessed_hours_ago("public_html/wp-content/cache/new.html", 1);

    let report = report(&site);
    assert_eq!(report.count(EventKind::KeepEmptyDeleted), 1);
    assert_eq!(report.total(), 1);
    assert!(report.lines()[0].contains("cache/old.html"));
    assert!(site.exists("public_html/wp-content/cache/old.html"));
}

#[test]
fn test_retention_window_can_be_widened() {
    let site = drifted_site();

    let mut report = Report::new();
    Auditor::new(&policy(&site), compliant_identities(&site))
        .with_retention(TimeDelta::hours(48))
        .run(&mut report)
        .unwrap();

    let stale: Vec<&String> = report
        .lines()
        .iter()
        .filter(|line| line.starts_with("[keep_empty_deleted]"))
        .collect();
    assert_eq!(stale.len(), 1, "unexpected: {:#?}", report.lines());
    assert!(stale[0].contains("cache/pages/home.html"));
}

#[test]
fn test_server_file_owned_by_someone_else() {
    let site = tidy_site();
    let web_uid = site.current_ids().0 + 1;

    let report = audit(&policy(&site), identities(&site, web_uid)).unwrap();
    assert_eq!(report.count(EventKind::UserError), 1);
    assert_eq!(report.total(), 1);
    assert!(report.lines()[0].contains("robots.txt"));
    assert!(report.lines()[0].contains(&format!("www-data ({})", web_uid)));
}

#[test]
fn test_drifted_site_report_lists_every_discrepancy_in_visit_order() {
    let site = drifted_site();
    let report = report(&site);

    let tails: Vec<String> = report
        .lines()
        .iter()
        .map(|line| {
            let (tag, rest) = line.split_once(' ').unwrap();
            let rel = rest
                .strip_prefix(&*site.root().to_string_lossy())
                .unwrap()
                .split(':')
                .next()
                .unwrap()
                .to_string();
            format!("{} {}", tag, rel)
        })
        .collect();

    assert_eq!(
        tails,
        vec![
            "[keep_empty_deleted] /public_html/wp-content/cache/old.html",
            "[keep_empty_deleted] /public_html/wp-content/cache/pages/home.html",
            "[mode_error] /public_html/index.php",
            "[mode_error] /public_html/wp-config.php",
            "[mode_error] /public_html/wp-content/uploads/photo.png",
            "[mode_error] /public_html/wp-content/uploads",
        ]
    );
}

#[test]
fn test_report_run_never_mutates() {
    let site = drifted_site();
    site.file("notes.txt", 0o600);
    let before = site.stamps();

    let report = report(&site);
    assert!(!report.is_clean());
    assert_eq!(site.stamps(), before);
}

#[test]
fn test_unsafe_scratch_path_aborts_before_any_event() {
    let site = drifted_site();
    let mut config = policy(&site);
    config
        .site_types
        .get_mut("wordpress")
        .unwrap()
        .keep_empty = vec!["public_html/wp-content/cache".into(), "public_html/wp-content".into()];

    let seen = Cell::new(0usize);
    let result = {
        let mut sink = Callbacks::builder()
            .on(EventKind::KeepEmptyDeleted, |_| {
                seen.set(seen.get() + 1);
                Ok(())
            })
            .on(EventKind::ModeError, |_| {
                seen.set(seen.get() + 1);
                Ok(())
            })
            .build()
            .unwrap();
        Auditor::new(&config, compliant_identities(&site)).run(&mut sink)
    };

    assert!(matches!(result, Err(Error::UnsafeScratchPath { .. })), "got {:?}", result.err());
    assert_eq!(seen.get(), 0);
    assert!(site.exists("public_html/wp-content/cache/old.html"));
}

#[test]
fn test_callbacks_receive_typed_events() {
    let site = tidy_site();
    site.file("public_html/media/a.jpg", 0o600);
    site.file("notes.txt", 0o600);
    let config = policy(&site);

    let mut modes = Vec::new();
    let mut strays = Vec::new();
    {
        let mut sink = Callbacks::builder()
            .on(EventKind::ModeError, |event| {
                modes.push(event.path().to_path_buf());
                Ok(())
            })
            .on(EventKind::UnknownRootEntry, |event| {
                strays.push(event.path().to_path_buf());
                Ok(())
            })
            .build()
            .unwrap();
        Auditor::new(&config, compliant_identities(&site))
            .run(&mut sink)
            .unwrap();
    }

    assert_eq!(modes, vec![site.path("public_html/media/a.jpg")]);
    assert_eq!(strays, vec![site.path("notes.txt")]);
}

#[test]
fn test_site_filter_rejects_unknown_sites() {
    let site = tidy_site();
    let config = policy(&site);

    let result = Auditor::new(&config, compliant_identities(&site)).only_sites(["/srv/www/nowhere"]);
    assert!(matches!(result, Err(Error::UnknownSite { .. })));
}
