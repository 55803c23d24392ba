//! Real-time setup errors

use thiserror::Error;

/// Failure to obtain low-jitter scheduling resources
///
/// Never fatal: the loop keeps running at default priority.
#[derive(Error, Debug)]
pub enum RealtimeError {
    /// CPU index outside the affinity mask range
    #[error("Invalid CPU index: {0}")]
    InvalidCpu(usize),

    /// Kernel rejected the affinity mask
    #[error("Failed to pin thread to CPU {cpu}: {source}")]
    Affinity {
        /// Requested core
        cpu: usize,
        /// Underlying errno
        #[source]
        source: std::io::Error,
    },

    /// Kernel rejected the scheduling policy
    #[error("Failed to set real-time priority {priority}: {source}")]
    Priority {
        /// Requested priority
        priority: i32,
        /// Underlying errno
        #[source]
        source: std::io::Error,
    },

    /// Platform has no such facility
    #[error("Not supported on this platform: {0}")]
    Unsupported(&'static str),
}
