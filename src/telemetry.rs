//! Telemetry provider: disk space and network identity of the host.
//!
//! Queries are best-effort; a failed query yields `None` and the caller
//! reports partial data.

use std::net::Ipv4Addr;
use std::path::Path;

use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiskUsage {
    pub total: u64,
    pub used: u64,
    pub free: u64,
}

pub trait TelemetryProvider: Send + Sync {
    /// Space figures for the filesystem mounted at `mount`.
    fn disk_usage(&self, mount: &Path) -> Option<DiskUsage>;

    fn hostname(&self) -> Option<String>;

    /// First non-loopback IPv4 address, or a loopback one if that is all
    /// there is.
    fn ipv4_address(&self) -> Option<Ipv4Addr>;
}

/// Reads the figures from the running host through libc.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostTelemetry;

#[cfg(unix)]
impl TelemetryProvider for HostTelemetry {
    fn disk_usage(&self, mount: &Path) -> Option<DiskUsage> {
        use std::ffi::CString;
        use std::os::unix::ffi::OsStrExt;

        let c_path = CString::new(mount.as_os_str().as_bytes()).ok()?;
        // SAFETY: statvfs is plain old data and fully written on success.
        let mut vfs: libc::statvfs = unsafe { std::mem::zeroed() };
        let rc = unsafe { libc::statvfs(c_path.as_ptr(), &mut vfs) };
        if rc != 0 {
            return None;
        }

        let frsize = vfs.f_frsize as u64;
        let total = vfs.f_blocks as u64 * frsize;
        let free = vfs.f_bfree as u64 * frsize;
        Some(DiskUsage {
            total,
            used: total.saturating_sub(free),
            free,
        })
    }

    fn hostname(&self) -> Option<String> {
        let mut buf = [0u8; 256];
        // SAFETY: the length passed matches the buffer.
        let rc = unsafe { libc::gethostname(buf.as_mut_ptr().cast(), buf.len()) };
        if rc != 0 {
            return None;
        }
        let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
        if len == 0 {
            return None;
        }
        Some(String::from_utf8_lossy(&buf[..len]).into_owned())
    }

    fn ipv4_address(&self) -> Option<Ipv4Addr> {
        let mut ifaddr: *mut libc::ifaddrs = std::ptr::null_mut();
        // SAFETY: on success the list is released with freeifaddrs below.
        if unsafe { libc::getifaddrs(&mut ifaddr) } != 0 {
            return None;
        }

        let mut found = None;
        let mut cursor = ifaddr;
        while !cursor.is_null() {
            // SAFETY: cursor walks the list getifaddrs returned.
            let entry = unsafe { &*cursor };
            if !entry.ifa_addr.is_null() {
                let family = i32::from(unsafe { (*entry.ifa_addr).sa_family });
                if family == libc::AF_INET {
                    let sin = unsafe { &*(entry.ifa_addr as *const libc::sockaddr_in) };
                    let addr = Ipv4Addr::from(u32::from_be(sin.sin_addr.s_addr));
                    found = Some(addr);
                    if !addr.is_loopback() {
                        break;
                    }
                }
            }
            cursor = entry.ifa_next;
        }

        unsafe { libc::freeifaddrs(ifaddr) };
        found
    }
}

#[cfg(not(unix))]
impl TelemetryProvider for HostTelemetry {
    fn disk_usage(&self, _mount: &Path) -> Option<DiskUsage> {
        None
    }

    fn hostname(&self) -> Option<String> {
        None
    }

    fn ipv4_address(&self) -> Option<Ipv4Addr> {
        None
    }
}
