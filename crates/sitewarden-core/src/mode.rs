//! Permission modes as they appear in the configuration

use std::str::FromStr;

use sitewarden_fs::io::MODE_BITS;

use crate::{Error, Result};

/// A validated permission mode.
///
/// Configuration spells modes as exactly four octal digits (`"0755"`); the
/// same form is used when rendering diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileMode(u32);

impl FileMode {
    /// Directories inside an open folder.
    pub const OPEN_DIR: &'static str = "0777";
    /// Files inside an open folder.
    pub const OPEN_FILE: &'static str = "0666";
    /// Files served directly by the web server.
    pub const SERVER_FILE: &'static str = "0644";
    /// Files on a read-only list.
    pub const READ_ONLY: &'static str = "0444";

    /// Parse a config mode string.
    pub fn parse(value: &str) -> Result<Self> {
        let invalid = || Error::InvalidMode {
            value: value.to_string(),
        };
        if value.len() != 4 || !value.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
            return Err(invalid());
        }
        u32::from_str_radix(value, 8).map(Self).map_err(|_| invalid())
    }

    /// Mode from raw `st_mode` bits; file-type bits are discarded.
    pub fn from_bits(bits: u32) -> Self {
        Self(bits & MODE_BITS)
    }

    pub fn bits(self) -> u32 {
        self.0
    }
}

impl FromStr for FileMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl std::fmt::Display for FileMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04o}", self.0)
    }
}
