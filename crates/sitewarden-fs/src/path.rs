//! Normalized path handling with segment-wise comparison

use std::path::{Component, Path, PathBuf};

/// A path normalized to forward slashes with `.` and `..` resolved.
///
/// Policy lists in the site configuration are matched against entity paths
/// by comparing whole segments, never by string prefix or pattern, so
/// `public_html/up` does not contain `public_html/uploads/a.jpg`.
///
/// Leading `..` segments of a relative path are dropped, which keeps any
/// config-supplied fragment inside the directory it is joined to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy();
        Self {
            inner: clean(&path_str),
        }
    }

    /// Create a site-relative path from a config fragment.
    ///
    /// Leading slashes are stripped so `/public_html/uploads` and
    /// `public_html/uploads` name the same entity.
    pub fn relative(fragment: &str) -> Self {
        let trimmed = fragment.trim_start_matches(['/', '\\']);
        Self::new(trimmed)
    }

    /// Build a relative path from the components of an on-disk path.
    ///
    /// Every component becomes one segment verbatim: a `\` stays part of the
    /// name and nothing is resolved. Returns `None` for absolute paths and
    /// for paths holding `..`.
    pub fn from_components(path: &Path) -> Option<Self> {
        let mut segments = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(name) => segments.push(name.to_string_lossy()),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        Some(Self {
            inner: segments.join("/"),
        })
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Join this path with a segment.
    pub fn join(&self, segment: &str) -> Self {
        let segment_normalized = segment.replace('\\', "/");
        let joined = if self.inner.is_empty() {
            segment_normalized
        } else if self.inner.ends_with('/') {
            format!("{}{}", self.inner, segment_normalized)
        } else {
            format!("{}/{}", self.inner, segment_normalized)
        };
        Self {
            inner: clean(&joined),
        }
    }

    /// Get the parent directory.
    pub fn parent(&self) -> Option<Self> {
        let trimmed = self.inner.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(idx) if idx > 0 => Some(Self {
                inner: trimmed[..idx].to_string(),
            }),
            Some(0) if trimmed.len() > 1 => Some(Self {
                inner: "/".to_string(),
            }),
            _ => None,
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        self.segments().last()
    }

    /// Iterate over the non-empty segments of the path.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.inner.split('/').filter(|s| !s.is_empty())
    }

    /// Number of segments in the path.
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// True if the path has no segments and is not rooted.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// True if the path is rooted at `/`.
    pub fn is_absolute(&self) -> bool {
        self.inner.starts_with('/')
    }

    /// Segment-wise prefix test. A path starts with itself.
    pub fn starts_with(&self, prefix: &NormalizedPath) -> bool {
        if self.is_absolute() != prefix.is_absolute() {
            return false;
        }
        let mut own = self.segments();
        prefix.segments().all(|segment| own.next() == Some(segment))
    }

    /// Path of `self` relative to `base`, if `base` is a segment-wise prefix.
    pub fn strip_prefix(&self, base: &NormalizedPath) -> Option<Self> {
        if !self.starts_with(base) {
            return None;
        }
        let rest: Vec<&str> = self.segments().skip(base.depth()).collect();
        Some(Self {
            inner: rest.join("/"),
        })
    }
}

fn clean(raw: &str) -> String {
    let unified = raw.replace('\\', "/");
    let network = unified.starts_with("//") && !unified.starts_with("///");
    let absolute = unified.starts_with('/');

    let mut parts: Vec<&str> = Vec::new();
    for part in unified.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }

    let body = parts.join("/");
    if network {
        format!("//{}", body)
    } else if absolute {
        format!("/{}", body)
    } else {
        body
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_match_is_segment_wise() {
        let folder = NormalizedPath::relative("public_html/up");
        let entity = NormalizedPath::relative("public_html/uploads/a.jpg");
        assert!(!entity.starts_with(&folder));

        let folder = NormalizedPath::relative("public_html/uploads");
        assert!(entity.starts_with(&folder));
        assert!(folder.starts_with(&folder));
    }

    #[test]
    fn absolute_and_relative_never_prefix_each_other() {
        let abs = NormalizedPath::new("/srv/site");
        let rel = NormalizedPath::new("srv/site/file");
        assert!(!rel.starts_with(&abs));
    }

    #[test]
    fn strip_prefix_yields_relative_remainder() {
        let root = NormalizedPath::new("/srv/www/example.com");
        let entity = NormalizedPath::new("/srv/www/example.com/public_html/index.php");
        let rel = entity.strip_prefix(&root).unwrap();
        assert_eq!(rel.as_str(), "public_html/index.php");
        assert!(!rel.is_absolute());

        assert_eq!(root.strip_prefix(&root).unwrap().as_str(), "");
        assert!(NormalizedPath::new("/srv/other").strip_prefix(&root).is_none());
    }

    #[test]
    fn relative_strips_leading_slash_and_dots() {
        assert_eq!(NormalizedPath::relative("/public_html/cache").as_str(), "public_html/cache");
        assert_eq!(NormalizedPath::relative("../../etc").as_str(), "etc");
        assert_eq!(NormalizedPath::relative("a/./b/../c").depth(), 2);
    }

    #[test]
    fn on_disk_names_keep_backslashes_and_dots() {
        let rel = NormalizedPath::from_components(Path::new("public_html/..\\..\\x")).unwrap();
        assert_eq!(rel.depth(), 2);
        assert_eq!(rel.file_name(), Some("..\\..\\x"));

        let rel = NormalizedPath::from_components(Path::new("public_html/.git\\shell.php")).unwrap();
        assert!(!rel.starts_with(&NormalizedPath::relative("public_html/.git")));

        assert!(NormalizedPath::from_components(Path::new("a/../b")).is_none());
        assert!(NormalizedPath::from_components(Path::new("/srv")).is_none());
    }

    #[test]
    fn parent_of_root_level_entry() {
        assert_eq!(NormalizedPath::new("/srv").parent().unwrap().as_str(), "/");
        assert!(NormalizedPath::new("/").parent().is_none());
        assert!(NormalizedPath::new("single").parent().is_none());
    }
}
