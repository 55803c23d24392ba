//! Thread priority and CPU affinity
//!
//! Elevation is best effort. Each step that fails is logged and skipped; the
//! loop then runs at whatever priority it already had.
//!
//! On Linux the motion thread asks for `SCHED_FIFO` at the configured
//! priority, which normally needs `CAP_SYS_NICE` or a non-zero
//! `RLIMIT_RTPRIO`. Without either it falls back to the lowest nice value
//! the process may set.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::error::RealtimeError;

/// Real-time elevation settings for the motion thread
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Try to raise the motion thread's scheduling priority
    #[serde(default = "default_true")]
    pub elevate_priority: bool,

    /// `SCHED_FIFO` priority (1-99)
    #[serde(default = "default_rt_priority")]
    pub rt_priority: i32,

    /// Pin the motion thread to this core
    #[serde(default)]
    pub pin_cpu: Option<usize>,
}

fn default_true() -> bool {
    true
}
fn default_rt_priority() -> i32 {
    50
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            elevate_priority: true,
            rt_priority: default_rt_priority(),
            pin_cpu: None,
        }
    }
}

/// What elevation actually achieved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RealtimeReport {
    /// `SCHED_FIFO` priority in effect
    pub fifo_priority: Option<i32>,
    /// Nice value applied when FIFO was refused
    pub nice: Option<i32>,
    /// Core the thread is pinned to
    pub pinned_cpu: Option<usize>,
}

impl RealtimeReport {
    /// Whether any elevation took effect
    pub fn is_elevated(&self) -> bool {
        self.fifo_priority.is_some() || self.nice.is_some()
    }
}

/// Nice value tried when real-time scheduling is refused
const FALLBACK_NICE: i32 = -10;

/// Apply the configured elevation to the calling thread
pub fn elevate_current_thread(config: &RealtimeConfig) -> RealtimeReport {
    let mut report = RealtimeReport::default();

    if let Some(cpu) = config.pin_cpu {
        match pin_current_thread(cpu) {
            Ok(()) => {
                debug!("Motion thread pinned to CPU {}", cpu);
                report.pinned_cpu = Some(cpu);
            }
            Err(e) => warn!("{}; thread stays unpinned", e),
        }
    }

    if !config.elevate_priority {
        debug!("Priority elevation disabled by configuration");
        return report;
    }

    match set_realtime_priority(config.rt_priority) {
        Ok(()) => report.fifo_priority = Some(config.rt_priority),
        Err(e) => {
            warn!("{}; continuing at default priority", e);
            match set_nice(FALLBACK_NICE) {
                Ok(()) => report.nice = Some(FALLBACK_NICE),
                Err(e) => debug!("Nice fallback refused: {}", e),
            }
        }
    }

    info!(
        "Motion thread scheduling: fifo={:?}, nice={:?}, cpu={:?}",
        report.fifo_priority, report.nice, report.pinned_cpu
    );
    report
}

/// Pin the calling thread to one core
#[cfg(target_os = "linux")]
pub fn pin_current_thread(cpu: usize) -> Result<(), RealtimeError> {
    use nix::sched::{sched_setaffinity, CpuSet};
    use nix::unistd::Pid;

    let mut cpuset = CpuSet::new();
    cpuset.set(cpu).map_err(|_| RealtimeError::InvalidCpu(cpu))?;
    sched_setaffinity(Pid::from_raw(0), &cpuset).map_err(|errno| RealtimeError::Affinity {
        cpu,
        source: std::io::Error::from(errno),
    })
}

/// Pin the calling thread to one core
#[cfg(not(target_os = "linux"))]
pub fn pin_current_thread(_cpu: usize) -> Result<(), RealtimeError> {
    Err(RealtimeError::Unsupported("CPU affinity"))
}

/// Switch the calling thread to `SCHED_FIFO`
#[cfg(target_os = "linux")]
#[allow(unsafe_code)]
pub fn set_realtime_priority(priority: i32) -> Result<(), RealtimeError> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    // SAFETY: `param` is a valid sched_param for the duration of the call and
    // pid 0 addresses the calling thread.
    let ret = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if ret != 0 {
        return Err(RealtimeError::Priority {
            priority,
            source: std::io::Error::last_os_error(),
        });
    }
    Ok(())
}

/// Switch the calling thread to `SCHED_FIFO`
#[cfg(not(target_os = "linux"))]
pub fn set_realtime_priority(_priority: i32) -> Result<(), RealtimeError> {
    Err(RealtimeError::Unsupported("SCHED_FIFO"))
}

#[cfg(target_os = "linux")]
#[allow(unsafe_code)]
fn set_nice(nice: i32) -> Result<(), RealtimeError> {
    // SAFETY: plain syscall on the calling thread, no pointers involved.
    let ret = unsafe { libc::setpriority(libc::PRIO_PROCESS, 0, nice) };
    if ret != 0 {
        return Err(RealtimeError::Priority {
            priority: nice,
            source: std::io::Error::last_os_error(),
        });
    }
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn set_nice(_nice: i32) -> Result<(), RealtimeError> {
    Err(RealtimeError::Unsupported("setpriority"))
}

/// Soft `RLIMIT_RTPRIO` for this process, if it can be read
#[cfg(target_os = "linux")]
pub fn realtime_priority_limit() -> Option<u64> {
    use nix::sys::resource::{getrlimit, Resource};

    getrlimit(Resource::RLIMIT_RTPRIO)
        .ok()
        .map(|(soft, _hard)| soft as u64)
}

#[cfg(not(target_os = "linux"))]
pub fn realtime_priority_limit() -> Option<u64> {
    None
}
