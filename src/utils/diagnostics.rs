//! System Diagnostics
//!
//! Host information and real-time capability checks for `--diagnose` and
//! the startup log.

use std::fmt;

use sysinfo::System;
use tracing::info;

use crate::scheduler::realtime_priority_limit;

const RLIM_UNLIMITED: u64 = libc::RLIM_INFINITY as u64;

/// What this binary was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildInfo {
    /// Crate version
    pub version: &'static str,
    /// `git describe` of the source tree, or "unknown"
    pub revision: &'static str,
    /// Target triple
    pub target: &'static str,
    /// "debug" or "release"
    pub profile: &'static str,
}

impl BuildInfo {
    /// Values stamped at compile time
    pub const fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            revision: env!("LAMCO_MOTION_GIT_DESCRIBE"),
            target: env!("LAMCO_MOTION_TARGET"),
            profile: if cfg!(debug_assertions) {
                "debug"
            } else {
                "release"
            },
        }
    }

    /// Log the startup banner
    pub fn log_banner(&self) {
        info!("════════════════════════════════════════════════════════");
        info!("  lamco-motion v{}", self.version);
        info!("  Commit: {}", self.revision);
        info!("  Target: {} ({})", self.target, self.profile);
        info!("════════════════════════════════════════════════════════");
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lamco-motion {} ({}, {} {})",
            self.version, self.revision, self.target, self.profile
        )
    }
}

/// System information for diagnostics
#[derive(Debug, Clone)]
pub struct SystemInfo {
    /// Operating system name (e.g., "Linux", "Ubuntu")
    pub os_name: String,
    /// Operating system version string
    pub os_version: String,

    /// Kernel version string
    pub kernel_version: String,

    /// Number of logical CPU cores
    pub cpu_count: usize,

    /// Total system memory in megabytes
    pub total_memory_mb: u64,

    /// System hostname
    pub hostname: String,
}

impl SystemInfo {
    /// Gather system information
    pub fn gather() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();

        Self {
            os_name: System::name().unwrap_or_else(|| "Unknown".to_string()),
            os_version: System::os_version().unwrap_or_else(|| "Unknown".to_string()),
            kernel_version: System::kernel_version().unwrap_or_else(|| "Unknown".to_string()),
            cpu_count: sys.cpus().len(),
            total_memory_mb: sys.total_memory() / 1024 / 1024,
            hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
        }
    }

    /// Log system information
    pub fn log(&self) {
        info!("=== System Information ===");
        info!("  OS: {} {}", self.os_name, self.os_version);
        info!("  Kernel: {}", self.kernel_version);
        info!("  Hostname: {}", self.hostname);
        info!("  CPUs: {}", self.cpu_count);
        info!("  Memory: {} MB", self.total_memory_mb);
    }
}

/// What the process may do about its own scheduling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealtimeCapability {
    /// Soft `RLIMIT_RTPRIO`, when readable
    pub rtprio_limit: Option<u64>,
}

impl RealtimeCapability {
    /// Probe the current process
    pub fn detect() -> Self {
        Self {
            rtprio_limit: realtime_priority_limit(),
        }
    }

    /// Whether `priority` fits under the soft limit
    ///
    /// A privileged process can exceed the limit, so `false` is a hint.
    pub fn allows(&self, priority: i32) -> bool {
        match self.rtprio_limit {
            Some(limit) => priority > 0 && (priority as u64) <= limit,
            None => false,
        }
    }

    /// One-line summary
    pub fn summary(&self) -> String {
        match self.rtprio_limit {
            Some(0) => "RLIMIT_RTPRIO is 0 (SCHED_FIFO needs CAP_SYS_NICE)".to_string(),
            Some(RLIM_UNLIMITED) => "RLIMIT_RTPRIO unlimited".to_string(),
            Some(limit) => format!("RLIMIT_RTPRIO {} (SCHED_FIFO up to {})", limit, limit),
            None => "RLIMIT_RTPRIO unavailable".to_string(),
        }
    }
}

/// Full `--diagnose` output
#[derive(Debug, Clone)]
pub struct DiagnosticsReport {
    /// Host
    pub system: SystemInfo,
    /// Scheduling rights
    pub realtime: RealtimeCapability,
}

impl DiagnosticsReport {
    /// Gather everything
    pub fn gather() -> Self {
        Self {
            system: SystemInfo::gather(),
            realtime: RealtimeCapability::detect(),
        }
    }
}

impl fmt::Display for DiagnosticsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sys = &self.system;
        writeln!(f, "lamco-motion v{}", env!("CARGO_PKG_VERSION"))?;
        writeln!(f)?;
        writeln!(f, "System:")?;
        writeln!(f, "  OS:       {} {}", sys.os_name, sys.os_version)?;
        writeln!(f, "  Kernel:   {}", sys.kernel_version)?;
        writeln!(f, "  Hostname: {}", sys.hostname)?;
        writeln!(f, "  CPUs:     {}", sys.cpu_count)?;
        writeln!(f, "  Memory:   {} MB", sys.total_memory_mb)?;
        writeln!(f)?;
        writeln!(f, "Real-time scheduling:")?;
        writeln!(f, "  {}", self.realtime.summary())
    }
}

/// Log complete diagnostics on startup
pub fn log_startup_diagnostics() {
    info!("╔════════════════════════════════════════════════════════════╗");
    info!("║          Startup Diagnostics                              ║");
    info!("╚════════════════════════════════════════════════════════════╝");

    SystemInfo::gather().log();

    info!("=== Scheduling ===");
    info!("  {}", RealtimeCapability::detect().summary());

    info!("=== Build ===");
    info!("  Version: {}", env!("CARGO_PKG_VERSION"));
    #[cfg(debug_assertions)]
    info!("  Build: debug");
    #[cfg(not(debug_assertions))]
    info!("  Build: release");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_info_is_stamped() {
        let build = BuildInfo::current();
        assert_eq!(build.version, env!("CARGO_PKG_VERSION"));
        assert!(!build.revision.is_empty());
        assert!(!build.target.is_empty());
        assert!(build.to_string().starts_with("lamco-motion "));
        assert!(build.to_string().contains(build.target));
    }

    #[test]
    fn test_system_info_gather() {
        let info = SystemInfo::gather();
        assert!(!info.os_name.is_empty());
        assert!(info.cpu_count > 0);
    }

    #[test]
    fn test_capability_allows() {
        let none = RealtimeCapability { rtprio_limit: None };
        assert!(!none.allows(50));

        let zero = RealtimeCapability {
            rtprio_limit: Some(0),
        };
        assert!(!zero.allows(1));
        assert!(zero.summary().contains("CAP_SYS_NICE"));

        let some = RealtimeCapability {
            rtprio_limit: Some(60),
        };
        assert!(some.allows(50));
        assert!(!some.allows(70));
        assert!(!some.allows(0));
    }

    #[test]
    fn test_report_display() {
        let report = DiagnosticsReport::gather();
        let text = report.to_string();
        assert!(text.contains("Real-time scheduling"));
        assert!(text.contains("CPUs"));
    }
}
