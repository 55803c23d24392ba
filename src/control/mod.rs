//! Shared control state
//!
//! The control surface written by the input collaborator and read by the
//! motion scheduler once per tick.
//!
//! # Concurrency
//!
//! Every field is an independent atomic. Mutations are plain stores, never a
//! dependent update spanning two fields, so readers need no lock. The
//! scheduler copies all fields into a [`ControlSnapshot`] at tick start and
//! works from that copy for the rest of the tick.
//!
//! ```text
//! Input sampler ──store──> ControlState <──snapshot()── MotionScheduler
//!                               │
//!                               └─refresh──> StatusDisplay
//! ```

mod mode;
mod state;
mod status;

pub use mode::MotionMode;
pub use state::{ControlSnapshot, ControlState};
pub use status::StatusReport;

/// Lowest accepted sensitivity
pub const SENSITIVITY_MIN: f64 = 0.0;

/// Highest accepted sensitivity
pub const SENSITIVITY_MAX: f64 = 20.0;

/// Sensitivity at startup when nothing else is configured
pub const DEFAULT_SENSITIVITY: f64 = 1.0551;

/// Default fine-adjustment step
pub const DEFAULT_FINE_STEP: f64 = 0.00005;

/// Clamp a sensitivity value into `[SENSITIVITY_MIN, SENSITIVITY_MAX]`.
///
/// Returns `None` for NaN, which has no nearest bound.
pub fn clamp_sensitivity(value: f64) -> Option<f64> {
    if value.is_nan() {
        return None;
    }
    Some(value.clamp(SENSITIVITY_MIN, SENSITIVITY_MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_bounds() {
        assert_eq!(clamp_sensitivity(-3.0), Some(0.0));
        assert_eq!(clamp_sensitivity(25.0), Some(20.0));
        assert_eq!(clamp_sensitivity(f64::INFINITY), Some(20.0));
        assert_eq!(clamp_sensitivity(f64::NEG_INFINITY), Some(0.0));
        assert_eq!(clamp_sensitivity(1.5), Some(1.5));
        assert_eq!(clamp_sensitivity(f64::NAN), None);
    }
}
