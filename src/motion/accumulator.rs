//! Fixed-timestep pixel accumulator

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{DT_CAP_SECS, MAX_SPEED_PX_PER_SEC};
use crate::control::{clamp_sensitivity, MotionMode, DEFAULT_SENSITIVITY};

/// Motion calibration and startup values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Pixels per second at sensitivity 1.0
    #[serde(default = "default_max_speed")]
    pub max_speed_px_per_sec: f64,

    /// Upper bound on one tick's elapsed time (ms)
    #[serde(default = "default_dt_cap_ms")]
    pub dt_cap_ms: f64,

    /// Sensitivity at startup
    #[serde(default = "default_sensitivity")]
    pub initial_sensitivity: f64,

    /// Synthesis mode at startup
    #[serde(default)]
    pub initial_mode: MotionMode,

    /// Largest relative move handed to the sink in one call (0 = unlimited)
    #[serde(default = "default_max_relative_step")]
    pub max_relative_step_px: u32,

    /// Start with motion enabled
    #[serde(default)]
    pub start_enabled: bool,
}

fn default_max_speed() -> f64 {
    MAX_SPEED_PX_PER_SEC
}
fn default_dt_cap_ms() -> f64 {
    DT_CAP_SECS * 1000.0
}
fn default_sensitivity() -> f64 {
    DEFAULT_SENSITIVITY
}
fn default_max_relative_step() -> u32 {
    5
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            max_speed_px_per_sec: default_max_speed(),
            dt_cap_ms: default_dt_cap_ms(),
            initial_sensitivity: default_sensitivity(),
            initial_mode: MotionMode::default(),
            max_relative_step_px: default_max_relative_step(),
            start_enabled: false,
        }
    }
}

/// Bounds for the smoothed-accelerating feedback term
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmoothingConfig {
    /// Boost per pixel of carried remainder
    #[serde(default = "default_feedback_gain")]
    pub feedback_gain: f64,

    /// Largest fractional speed boost
    #[serde(default = "default_max_boost")]
    pub max_boost: f64,
}

fn default_feedback_gain() -> f64 {
    0.01
}
fn default_max_boost() -> f64 {
    0.5
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            feedback_gain: default_feedback_gain(),
            max_boost: default_max_boost(),
        }
    }
}

impl SmoothingConfig {
    /// Speed multiplier for a given carry, in `[1, 1 + max_boost]`
    pub fn boost(&self, remainder: f64) -> f64 {
        1.0 + (self.feedback_gain * remainder).clamp(0.0, self.max_boost.max(0.0))
    }
}

/// Result of one integration step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Integration {
    /// Whole pixels to emit this tick
    pub pixels: u32,
    /// Fractional carry, `0 <= remainder < 1`
    pub remainder: f64,
}

/// Speed calibration and `dt` bound
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    /// Pixels per second at sensitivity 1.0
    pub max_speed: f64,
    /// Largest accepted `dt` (seconds)
    pub dt_cap: f64,
}

impl Default for Kinematics {
    fn default() -> Self {
        Self {
            max_speed: MAX_SPEED_PX_PER_SEC,
            dt_cap: DT_CAP_SECS,
        }
    }
}

impl Kinematics {
    /// Build from configuration
    pub fn from_config(config: &MotionConfig) -> Self {
        Self {
            max_speed: config.max_speed_px_per_sec,
            dt_cap: config.dt_cap_ms / 1000.0,
        }
    }

    /// Clamp `dt` into `[0, dt_cap]`
    pub fn bound_dt(&self, dt: f64) -> f64 {
        if dt.is_nan() || dt <= 0.0 {
            0.0
        } else {
            dt.min(self.dt_cap)
        }
    }

    /// Target speed in px/s
    pub fn speed(&self, sensitivity: f64) -> f64 {
        clamp_sensitivity(sensitivity).unwrap_or(0.0) * self.max_speed
    }

    /// Linear step: `remainder + speed * dt`
    pub fn integrate(&self, sensitivity: f64, dt: f64, remainder: f64) -> Integration {
        let increment = self.speed(sensitivity) * self.bound_dt(dt);
        split(sanitize_carry(remainder) + increment)
    }

    /// Smoothed step with a capped remainder feedback term
    pub fn integrate_smoothed(
        &self,
        sensitivity: f64,
        dt: f64,
        remainder: f64,
        smoothing: &SmoothingConfig,
    ) -> Integration {
        let carry = sanitize_carry(remainder);
        let increment = self.speed(sensitivity) * self.bound_dt(dt) * smoothing.boost(carry);
        split(carry + increment)
    }
}

fn sanitize_carry(remainder: f64) -> f64 {
    if remainder.is_finite() && remainder > 0.0 {
        remainder
    } else {
        0.0
    }
}

fn split(total: f64) -> Integration {
    let whole = total.floor();
    let remainder = total - whole;
    debug_assert!((0.0..1.0).contains(&remainder));
    Integration {
        pixels: whole as u32,
        remainder,
    }
}

/// One linear integration step with the default calibration
pub fn integrate(sensitivity: f64, dt: f64, remainder: f64) -> Integration {
    Kinematics::default().integrate(sensitivity, dt, remainder)
}

/// Accumulator owned by the motion scheduler
///
/// Carries the fractional pixel remainder from tick to tick.
#[derive(Debug, Clone)]
pub struct MotionAccumulator {
    kinematics: Kinematics,
    smoothing: SmoothingConfig,
    remainder: f64,
}

impl MotionAccumulator {
    /// Create an accumulator with zero carry
    pub fn new(kinematics: Kinematics, smoothing: SmoothingConfig) -> Self {
        Self {
            kinematics,
            smoothing,
            remainder: 0.0,
        }
    }

    /// Integrate one tick and return the whole pixels to emit
    pub fn step(&mut self, sensitivity: f64, dt: f64, mode: MotionMode) -> u32 {
        let result = match mode {
            MotionMode::Direct | MotionMode::Curved => {
                self.kinematics.integrate(sensitivity, dt, self.remainder)
            }
            MotionMode::SmoothedAccelerating => self.kinematics.integrate_smoothed(
                sensitivity,
                dt,
                self.remainder,
                &self.smoothing,
            ),
        };

        trace!(
            "Integrate: s={:.7}, dt={:.6}s, carry {:.4} -> {:.4}, pixels={}",
            sensitivity,
            dt,
            self.remainder,
            result.remainder,
            result.pixels
        );

        self.remainder = result.remainder;
        result.pixels
    }

    /// Drop the fractional carry
    pub fn reset(&mut self) {
        self.remainder = 0.0;
    }

    /// Current fractional carry
    pub fn remainder(&self) -> f64 {
        self.remainder
    }

    /// Calibration in use
    pub fn kinematics(&self) -> Kinematics {
        self.kinematics
    }
}

impl Default for MotionAccumulator {
    fn default() -> Self {
        Self::new(Kinematics::default(), SmoothingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_config() {
        let config = MotionConfig::default();
        assert_eq!(config.max_speed_px_per_sec, 40.0);
        assert_eq!(config.dt_cap_ms, 16.0);
        assert_eq!(config.max_relative_step_px, 5);
    }

    #[test]
    fn test_ten_ticks_at_unit_sensitivity() {
        let mut acc = MotionAccumulator::default();
        let mut emitted = Vec::new();
        let mut total = 0;
        for _ in 0..10 {
            let px = acc.step(1.0, 0.01, MotionMode::Direct);
            emitted.push(px);
            total += px;
        }
        assert_eq!(total, 4, "per-tick emissions: {:?}", emitted);
        assert!(emitted.iter().all(|&px| px <= 1));
    }

    #[test]
    fn test_dt_is_capped() {
        // A one-second stall moves at most 16ms worth.
        let result = integrate(10.0, 1.0, 0.0);
        assert_eq!(result.pixels, 6);
        assert!((result.remainder - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_negative_dt_is_zero() {
        let result = integrate(5.0, -0.5, 0.25);
        assert_eq!(result.pixels, 0);
        assert_eq!(result.remainder, 0.25);
    }

    #[test]
    fn test_zero_sensitivity_keeps_carry() {
        let result = integrate(0.0, 0.01, 0.7);
        assert_eq!(result.pixels, 0);
        assert_eq!(result.remainder, 0.7);
    }

    #[test]
    fn test_reset_drops_carry() {
        let mut acc = MotionAccumulator::default();
        acc.step(1.0, 0.01, MotionMode::Direct);
        assert!(acc.remainder() > 0.0);
        acc.reset();
        assert_eq!(acc.remainder(), 0.0);
    }

    #[test]
    fn test_smoothed_boost_is_capped() {
        let smoothing = SmoothingConfig {
            feedback_gain: 100.0,
            max_boost: 0.5,
        };
        assert_eq!(smoothing.boost(0.9), 1.5);
        assert_eq!(smoothing.boost(0.0), 1.0);

        let kin = Kinematics::default();
        let linear = kin.integrate(5.0, 0.01, 0.5);
        let smoothed = kin.integrate_smoothed(5.0, 0.01, 0.5, &smoothing);
        let linear_total = linear.pixels as f64 + linear.remainder;
        let smoothed_total = smoothed.pixels as f64 + smoothed.remainder;
        assert!(smoothed_total > linear_total);
        assert!(smoothed_total <= 0.5 + 2.0 * 1.5 + 1e-9);
    }

    #[test]
    fn test_smoothed_stays_bounded_over_long_runs() {
        let mut acc = MotionAccumulator::default();
        let mut total = 0u64;
        for _ in 0..10_000 {
            total += u64::from(acc.step(20.0, 0.016, MotionMode::SmoothedAccelerating));
            assert!(acc.remainder() < 1.0);
        }
        // 10_000 ticks * 12.8 px, at most 1.5x
        assert!(total as f64 <= 10_000.0 * 12.8 * 1.5 + 1.0);
        assert!(total as f64 >= 10_000.0 * 12.8 - 1.0);
    }

    proptest! {
        #[test]
        fn prop_no_drift(
            sensitivity in 0.0f64..=20.0,
            dts in proptest::collection::vec(0.0f64..=0.016, 1..400),
        ) {
            let mut acc = MotionAccumulator::default();
            let mut emitted: u64 = 0;
            for &dt in &dts {
                emitted += u64::from(acc.step(sensitivity, dt, MotionMode::Direct));
            }
            let elapsed: f64 = dts.iter().sum();
            let expected = (sensitivity * MAX_SPEED_PX_PER_SEC * elapsed).floor();
            prop_assert!((emitted as f64 - expected).abs() <= 1.0,
                "emitted {} expected {}", emitted, expected);
        }

        #[test]
        fn prop_remainder_bound(
            sensitivity in 0.0f64..=20.0,
            dt in -1.0f64..1.0,
            carry in 0.0f64..1.0,
        ) {
            let result = integrate(sensitivity, dt, carry);
            prop_assert!(result.remainder >= 0.0);
            prop_assert!(result.remainder < 1.0);
        }
    }
}
