//! User and group identity lookups.
//!
//! On unix these use the C library (`getgroups`, `getgrgid_r`,
//! `getpwuid_r`) so the answer reflects the current session exactly.
//! [`parse_group_list`] covers the `id -Gn` fallback.

use std::io;

/// Group names of the current process (supplementary plus effective primary).
#[cfg(unix)]
pub fn current_group_names() -> io::Result<Vec<String>> {
    // SAFETY: a zero-length query only returns the group count.
    let count = unsafe { libc::getgroups(0, std::ptr::null_mut()) };
    if count < 0 {
        return Err(io::Error::last_os_error());
    }

    let mut gids: Vec<libc::gid_t> = vec![0; count as usize];
    // SAFETY: the buffer holds exactly `count` entries.
    let filled = unsafe { libc::getgroups(count, gids.as_mut_ptr()) };
    if filled < 0 {
        return Err(io::Error::last_os_error());
    }
    gids.truncate(filled as usize);

    // SAFETY: getegid() cannot fail.
    let primary = unsafe { libc::getegid() };
    if !gids.contains(&primary) {
        gids.push(primary);
    }

    let mut names: Vec<String> = gids.into_iter().filter_map(group_name).collect();
    names.dedup();
    Ok(names)
}

#[cfg(not(unix))]
pub fn current_group_names() -> io::Result<Vec<String>> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "group lookup is only available on unix",
    ))
}

/// Login name of the real user id.
#[cfg(unix)]
pub fn current_user_name() -> Option<String> {
    // SAFETY: getuid() cannot fail.
    let uid = unsafe { libc::getuid() };
    let mut buf: Vec<libc::c_char> = vec![0; 1024];
    // SAFETY: passwd is plain data; zeroed is a valid initial value.
    let mut pwd: libc::passwd = unsafe { std::mem::zeroed() };
    let mut result: *mut libc::passwd = std::ptr::null_mut();

    loop {
        // SAFETY: all pointers reference live, correctly sized buffers.
        let rc = unsafe { libc::getpwuid_r(uid, &mut pwd, buf.as_mut_ptr(), buf.len(), &mut result) };
        if rc == libc::ERANGE && buf.len() < MAX_BUFFER {
            buf.resize(buf.len() * 2, 0);
            continue;
        }
        if rc != 0 || result.is_null() {
            return std::env::var("USER").ok();
        }
        // SAFETY: on success pw_name points into `buf` and is NUL-terminated.
        let name = unsafe { std::ffi::CStr::from_ptr(pwd.pw_name) };
        return Some(name.to_string_lossy().into_owned());
    }
}

#[cfg(not(unix))]
pub fn current_user_name() -> Option<String> {
    std::env::var("USERNAME")
        .or_else(|_| std::env::var("USER"))
        .ok()
}

#[cfg(unix)]
const MAX_BUFFER: usize = 1 << 20;

#[cfg(unix)]
fn group_name(gid: libc::gid_t) -> Option<String> {
    let mut buf: Vec<libc::c_char> = vec![0; 1024];
    // SAFETY: group is plain data; zeroed is a valid initial value.
    let mut grp: libc::group = unsafe { std::mem::zeroed() };
    let mut result: *mut libc::group = std::ptr::null_mut();

    loop {
        // SAFETY: all pointers reference live, correctly sized buffers.
        let rc = unsafe { libc::getgrgid_r(gid, &mut grp, buf.as_mut_ptr(), buf.len(), &mut result) };
        if rc == libc::ERANGE && buf.len() < MAX_BUFFER {
            buf.resize(buf.len() * 2, 0);
            continue;
        }
        if rc != 0 || result.is_null() {
            return None;
        }
        // SAFETY: on success gr_name points into `buf` and is NUL-terminated.
        let name = unsafe { std::ffi::CStr::from_ptr(grp.gr_name) };
        return Some(name.to_string_lossy().into_owned());
    }
}

/// Parse the output of `id -Gn` into group names.
pub fn parse_group_list(output: &str) -> Vec<String> {
    output.split_whitespace().map(String::from).collect()
}
