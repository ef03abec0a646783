//! [`SiteFixture`] builder for audit and enforcement scenarios.

use std::collections::BTreeMap;
use std::fs::{self, File, FileTimes};
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tempfile::TempDir;
use walkdir::WalkDir;

/// A temporary site root plus a sibling location for the config document.
///
/// Every directory and file is created with an explicit mode so tests do
/// not depend on the process umask.
///
/// # Example
///
/// ```rust,no_run
/// use sitewarden_test_utils::SiteFixture;
///
/// let site = SiteFixture::new();
/// site.dir("public_html", 0o755);
/// site.file("public_html/index.php", 0o644);
/// site.accessed_hours_ago("public_html/index.php", 30);
/// assert_eq!(site.mode("public_html/index.php"), 0o644);
/// ```
pub struct SiteFixture {
    temp_dir: TempDir,
    root: PathBuf,
}

/// Everything report mode must leave untouched on one entry.
///
/// Directory access times are left out: listing a directory may update
/// its atime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryStamp {
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub modified: SystemTime,
    pub accessed: Option<SystemTime>,
}

impl Default for SiteFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteFixture {
    /// Create an empty site root at `<tmp>/site`, mode `0750`.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("site");
        fs::create_dir(&root).unwrap();
        fs::set_permissions(&root, fs::Permissions::from_mode(0o750)).unwrap();
        Self { temp_dir, root }
    }

    /// The site root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The site root as the string used as its config key.
    pub fn root_key(&self) -> String {
        self.root.to_string_lossy().into_owned()
    }

    /// Absolute path of a site-relative path.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    /// Create a directory (and missing parents) and set its mode.
    pub fn dir(&self, rel: &str, mode: u32) -> PathBuf {
        let path = self.path(rel);
        fs::create_dir_all(&path).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
        path
    }

    /// Create a file (parents must exist) and set its mode.
    pub fn file(&self, rel: &str, mode: u32) -> PathBuf {
        let path = self.path(rel);
        fs::write(&path, rel.as_bytes()).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
        path
    }

    /// Change the mode of an existing entry.
    pub fn chmod(&self, rel: &str, mode: u32) {
        fs::set_permissions(self.path(rel), fs::Permissions::from_mode(mode)).unwrap();
    }

    /// Create a symbolic link at `rel` pointing to `target`.
    pub fn symlink(&self, rel: &str, target: &str) -> PathBuf {
        let path = self.path(rel);
        std::os::unix::fs::symlink(target, &path).unwrap();
        path
    }

    /// Backdate the access time of an entry.
    pub fn accessed_hours_ago(&self, rel: &str, hours: u64) {
        let when = SystemTime::now() - Duration::from_secs(hours * 3600);
        let file = File::open(self.path(rel)).unwrap();
        file.set_times(FileTimes::new().set_accessed(when)).unwrap();
    }

    /// Write the config document next to the site root and return its path.
    pub fn write_config(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    pub fn exists(&self, rel: &str) -> bool {
        fs::symlink_metadata(self.path(rel)).is_ok()
    }

    /// Low 12 mode bits of an entry.
    pub fn mode(&self, rel: &str) -> u32 {
        fs::symlink_metadata(self.path(rel)).unwrap().mode() & 0o7777
    }

    /// Owning uid and gid of an entry.
    pub fn owner(&self, rel: &str) -> (u32, u32) {
        let metadata = fs::symlink_metadata(self.path(rel)).unwrap();
        (metadata.uid(), metadata.gid())
    }

    /// Uid and gid new entries are created with.
    pub fn current_ids(&self) -> (u32, u32) {
        let metadata = fs::metadata(&self.root).unwrap();
        (metadata.uid(), metadata.gid())
    }

    /// True when the tests run as the superuser.
    pub fn is_root(&self) -> bool {
        self.current_ids().0 == 0
    }

    /// Stamp of every entry beneath the root, keyed by relative path.
    pub fn stamps(&self) -> BTreeMap<String, EntryStamp> {
        WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(false)
            .into_iter()
            .map(|entry| {
                let entry = entry.unwrap();
                let metadata = entry.path().symlink_metadata().unwrap();
                let rel = entry
                    .path()
                    .strip_prefix(&self.root)
                    .unwrap()
                    .to_string_lossy()
                    .into_owned();
                let stamp = EntryStamp {
                    mode: metadata.mode() & 0o7777,
                    uid: metadata.uid(),
                    gid: metadata.gid(),
                    modified: metadata.modified().unwrap(),
                    accessed: (!metadata.is_dir()).then(|| metadata.accessed().unwrap()),
                };
                (rel, stamp)
            })
            .collect()
    }
}
