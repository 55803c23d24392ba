//! Status reports handed to display adapters

use serde::Serialize;

use super::mode::MotionMode;

/// Presentable view of the control state
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatusReport {
    /// Master switch
    pub enabled: bool,
    /// Current sensitivity
    pub sensitivity: f64,
    /// Active synthesis mode
    pub mode: MotionMode,
}

impl StatusReport {
    /// Short label for the enabled flag
    pub fn state_label(&self) -> &'static str {
        if self.enabled {
            "ENABLED"
        } else {
            "DISABLED"
        }
    }
}

impl std::fmt::Display for StatusReport {
    // Seven decimals keeps the 0.00005 fine step visible.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} | Sensitivity: {:.7} | Mode: {}",
            self.state_label(),
            self.sensitivity,
            self.mode
        )
    }
}
