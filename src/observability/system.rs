//! Process-level probes
//!
//! Uptime formatting and resident memory, used by `/health/detailed`.

use std::io;

/// Memory usage of the current process, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryUsage {
    pub resident_bytes: u64,
    pub virtual_bytes: u64,
}

/// Read memory usage from `/proc/self/statm`.
///
/// Returns an error on platforms without procfs; the caller degrades the
/// health payload instead of panicking.
pub fn memory_usage() -> io::Result<MemoryUsage> {
    #[cfg(target_os = "linux")]
    {
        let statm = std::fs::read_to_string("/proc/self/statm")?;
        let mut parts = statm.split_whitespace();
        let vsz_pages: u64 = parts
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "malformed statm"))?;
        let rss_pages: u64 = parts
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "malformed statm"))?;

        let page_size = 4096;
        Ok(MemoryUsage {
            resident_bytes: rss_pages * page_size,
            virtual_bytes: vsz_pages * page_size,
        })
    }

    #[cfg(not(target_os = "linux"))]
    {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "memory usage is only reported on linux",
        ))
    }
}

/// Format an uptime in seconds as `Nd Nh Nm Ns`.
///
/// Leading zero units are omitted; once a higher unit is non-zero every
/// lower unit prints. Seconds print when non-zero or when nothing else did.
///
/// 0 -> "0s", 90 -> "1m 30s", 3600 -> "1h 0m", 86461 -> "1d 0h 1m 1s"
pub fn format_uptime(total_seconds: u64) -> String {
    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;

    let mut parts = Vec::with_capacity(4);
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 || !parts.is_empty() {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 || !parts.is_empty() {
        parts.push(format!("{}m", minutes));
    }
    if seconds > 0 || parts.is_empty() {
        parts.push(format!("{}s", seconds));
    }

    parts.join(" ")
}
