//! Motion synthesis core
//!
//! Turns a continuously varying target speed into whole-pixel moves without
//! long-run drift.
//!
//! # Speed Model
//!
//! ```text
//! speed  = sensitivity * MAX_SPEED          (px/s, MAX_SPEED = 40)
//! total  = remainder + speed * min(dt, cap)
//! pixels = floor(total)
//! remainder' = total - pixels               (0 <= remainder' < 1)
//! ```
//!
//! The fractional carry means quantization error never exceeds one pixel,
//! however the elapsed time is split into ticks.
//!
//! # Strategies
//!
//! - **Linear**: the model above, used by direct and curved modes.
//! - **Smoothed**: the increment is scaled by `1 + min(gain * remainder, max_boost)`.
//!   The boost is capped so the feedback term can never run away.
//! - **Curved**: the integer delta is expanded into absolute positions along a
//!   quadratic Bézier path, see [`curve`].

pub mod accumulator;
pub mod curve;

pub use accumulator::{
    integrate, Integration, Kinematics, MotionAccumulator, MotionConfig, SmoothingConfig,
};
pub use curve::{generate, BezierSegment, CurveConfig, CurvePath, Point2D};

/// Pixels per second at sensitivity 1.0
pub const MAX_SPEED_PX_PER_SEC: f64 = 40.0;

/// Upper bound on a single tick's `dt`, in seconds
///
/// A stalled thread (window drag, suspend) resumes with at most this much
/// motion instead of a burst.
pub const DT_CAP_SECS: f64 = 0.016;
