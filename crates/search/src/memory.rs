//! Process and system memory probes.
//!
//! The memory guard reads `/proc`, so the probes are effectively Linux-only;
//! on other platforms they return `None` and the guard never trips.

use std::fs;

/// Free system memory in kilobytes: unused memory plus file buffers and
/// reclaimable cache, the figure a system monitor reports as available.
pub fn free_memory_kb() -> Option<u64> {
    let meminfo = fs::read_to_string("/proc/meminfo").ok()?;
    let mut kbytes = 0u64;
    let mut found = false;
    for line in meminfo.lines() {
        let mut parts = line.split_whitespace();
        let Some(name) = parts.next() else { continue };
        if matches!(name, "MemFree:" | "Buffers:" | "Cached:") {
            kbytes += parts.next()?.parse::<u64>().ok()?;
            found = true;
            if name == "Cached:" {
                break;
            }
        }
    }
    found.then_some(kbytes)
}

/// Resident set size of the current process in kilobytes.
pub fn used_memory_kb() -> Option<u64> {
    let status = fs::read_to_string("/proc/self/status").ok()?;
    for line in status.lines() {
        if let Some(rest) = line.strip_prefix("VmRSS:") {
            return rest.split_whitespace().next()?.parse().ok();
        }
    }
    None
}
