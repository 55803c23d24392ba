//! Output delivery errors

use thiserror::Error;

/// Result type for sink and display calls
pub type Result<T> = std::result::Result<T, SinkError>;

/// Failure to deliver a displacement or status update
#[derive(Error, Debug)]
pub enum SinkError {
    /// Sink has been closed
    #[error("Sink disconnected")]
    Disconnected,

    /// Status could not be serialized
    #[error("Status serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What reached the sink during one multi-call move
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Calls the sink accepted
    pub calls: u32,
    /// Vertical pixels those calls moved the pointer
    pub pixels: u32,
}

/// A multi-call move that failed part way
///
/// `delivered` holds what the sink accepted before `source` stopped the move.
#[derive(Error, Debug)]
#[error("Move stopped after {} px: {source}", .delivered.pixels)]
pub struct PartialDelivery {
    /// Accepted before the failure
    pub delivered: Delivery,
    /// The failed call's error
    pub source: SinkError,
}
