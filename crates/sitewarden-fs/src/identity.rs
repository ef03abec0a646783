//! Lookups against the system user and group databases
//!
//! Thin wrappers over the reentrant `getpwnam_r` / `getgrnam_r` calls. The
//! scratch buffer starts at the size advertised by `sysconf` and doubles on
//! `ERANGE` up to [`MAX_BUFFER`].

use std::ffi::CString;

use crate::{Error, Result};

const DEFAULT_BUFFER: usize = 1024;
const MAX_BUFFER: usize = 1 << 20;

/// A `passwd` entry reduced to the ids sitewarden needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserEntry {
    pub uid: u32,
    /// Primary group.
    pub gid: u32,
}

/// A `group` entry reduced to its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupEntry {
    pub gid: u32,
}

/// Look up a user by name. `Ok(None)` means the name is unknown.
pub fn lookup_user(name: &str) -> Result<Option<UserEntry>> {
    let Ok(c_name) = CString::new(name) else {
        return Ok(None);
    };
    let mut buf_len = initial_buffer(libc::_SC_GETPW_R_SIZE_MAX);

    loop {
        let mut buf: Vec<libc::c_char> = vec![0; buf_len];
        // SAFETY: `passwd` is plain old data; an all-zero value is valid and
        // is fully overwritten by a successful call.
        let mut entry: libc::passwd = unsafe { std::mem::zeroed() };
        let mut result: *mut libc::passwd = std::ptr::null_mut();

        // SAFETY: every pointer refers to a live local and `buf.len()` is the
        // true capacity of `buf`.
        let rc = unsafe {
            libc::getpwnam_r(
                c_name.as_ptr(),
                &mut entry,
                buf.as_mut_ptr(),
                buf.len(),
                &mut result,
            )
        };

        match rc {
            0 if result.is_null() => return Ok(None),
            0 => {
                return Ok(Some(UserEntry {
                    uid: entry.pw_uid,
                    gid: entry.pw_gid,
                }));
            }
            libc::ERANGE if buf_len < MAX_BUFFER => {
                tracing::debug!(name, buf_len, "Lookup buffer too small, growing");
                buf_len *= 2;
            }
            // Some libcs report "not found" through these instead of a null result.
            libc::ENOENT | libc::ESRCH => return Ok(None),
            code => {
                tracing::warn!(name, code, buf_len, "Identity database lookup failed");
                return Err(Error::IdentityLookup {
                    name: name.to_string(),
                    source: std::io::Error::from_raw_os_error(code),
                });
            }
        }
    }
}

/// Look up a group by name. `Ok(None)` means the name is unknown.
pub fn lookup_group(name: &str) -> Result<Option<GroupEntry>> {
    let Ok(c_name) = CString::new(name) else {
        return Ok(None);
    };
    let mut buf_len = initial_buffer(libc::_SC_GETGR_R_SIZE_MAX);

    loop {
        let mut buf: Vec<libc::c_char> = vec![0; buf_len];
        // SAFETY: `group` is plain old data; see `lookup_user`.
        let mut entry: libc::group = unsafe { std::mem::zeroed() };
        let mut result: *mut libc::group = std::ptr::null_mut();

        // SAFETY: as in `lookup_user`.
        let rc = unsafe {
            libc::getgrnam_r(
                c_name.as_ptr(),
                &mut entry,
                buf.as_mut_ptr(),
                buf.len(),
                &mut result,
            )
        };

        match rc {
            0 if result.is_null() => return Ok(None),
            0 => return Ok(Some(GroupEntry { gid: entry.gr_gid })),
            libc::ERANGE if buf_len < MAX_BUFFER => {
                tracing::debug!(name, buf_len, "Lookup buffer too small, growing");
                buf_len *= 2;
            }
            libc::ENOENT | libc::ESRCH => return Ok(None),
            code => {
                tracing::warn!(name, code, buf_len, "Identity database lookup failed");
                return Err(Error::IdentityLookup {
                    name: name.to_string(),
                    source: std::io::Error::from_raw_os_error(code),
                });
            }
        }
    }
}

fn initial_buffer(key: libc::c_int) -> usize {
    // SAFETY: sysconf has no preconditions.
    let advertised = unsafe { libc::sysconf(key) };
    if advertised > 0 {
        advertised as usize
    } else {
        DEFAULT_BUFFER
    }
}
