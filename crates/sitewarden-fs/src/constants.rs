//! Constants and enums for well-known filesystem names.

/// Version-control metadata directories.
///
/// Entities inside one of these are treated as ownership-only: their owner
/// and group are audited but their mode is left to the VCS tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VcsDir {
    /// The `.git` directory
    Git,
    /// The `.svn` directory
    Subversion,
    /// The `.hg` directory
    Mercurial,
}

impl VcsDir {
    /// Every known metadata directory.
    pub const ALL: [VcsDir; 3] = [Self::Git, Self::Subversion, Self::Mercurial];

    /// Get the string representation of the directory name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Git => ".git",
            Self::Subversion => ".svn",
            Self::Mercurial => ".hg",
        }
    }

    /// Match a single path segment against the known names.
    pub fn from_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|dir| dir.as_str() == segment)
    }
}

impl std::fmt::Display for VcsDir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
