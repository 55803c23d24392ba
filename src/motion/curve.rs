//! Curved path expansion
//!
//! Expands an integer vertical displacement into absolute cursor positions
//! along one quadratic Bézier segment:
//!
//! ```text
//! P(t) = (1-t)² * start + 2(1-t)t * control + t² * end,   t = i/steps, i = 1..=steps
//!
//! control = (start.x, start.y + delta/2 - bias)
//! end     = (start.x, start.y + delta)
//! ```
//!
//! The caller places the cursor at each point in turn with a short delay so
//! the curve is rendered rather than teleported.

use std::iter::FusedIterator;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Integer pixel position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point2D {
    /// Horizontal coordinate
    pub x: i32,
    /// Vertical coordinate
    pub y: i32,
}

impl Point2D {
    /// Create a point
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Point shifted by a delta, saturating at the coordinate range
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

impl std::fmt::Display for Point2D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Curved mode path shape and pacing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveConfig {
    /// Points generated per displacement
    #[serde(default = "default_steps")]
    pub steps: u32,

    /// Control point pulled back from the midpoint (pixels)
    #[serde(default = "default_control_bias")]
    pub control_bias_px: i32,

    /// Delay between consecutive points (microseconds)
    #[serde(default = "default_step_delay_us")]
    pub step_delay_us: u64,
}

fn default_steps() -> u32 {
    10
}
fn default_control_bias() -> i32 {
    DEFAULT_CONTROL_BIAS_PX
}
fn default_step_delay_us() -> u64 {
    1000
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            steps: default_steps(),
            control_bias_px: default_control_bias(),
            step_delay_us: default_step_delay_us(),
        }
    }
}

impl CurveConfig {
    /// Delay between consecutive points
    pub fn step_delay(&self) -> Duration {
        Duration::from_micros(self.step_delay_us)
    }
}

/// Default control point bias (pixels)
pub const DEFAULT_CONTROL_BIAS_PX: i32 = 5;

/// One quadratic Bézier segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BezierSegment {
    /// First point (not emitted)
    pub start: Point2D,
    /// Control point
    pub control: Point2D,
    /// Last point
    pub end: Point2D,
    /// Points emitted along the segment
    pub step_count: u32,
}

impl BezierSegment {
    /// Segment for a vertical displacement of `delta` pixels
    ///
    /// Returns `None` for a zero delta or zero steps.
    pub fn vertical(start: Point2D, delta: i32, steps: u32, bias: i32) -> Option<Self> {
        if delta == 0 || steps == 0 {
            return None;
        }
        Some(Self {
            start,
            control: start.offset(0, delta / 2 - bias),
            end: start.offset(0, delta),
            step_count: steps,
        })
    }

    /// Position at parameter `t`, rounded down to whole pixels
    ///
    /// Evaluated relative to `start` so an axis with no displacement stays
    /// exactly on its starting coordinate. The offset is floored, which
    /// matches truncating the absolute coordinate on a non-negative desktop.
    pub fn point_at(&self, t: f64) -> Point2D {
        let u = 1.0 - t;
        let weight_control = 2.0 * u * t;
        let weight_end = t * t;

        let axis = |start: i32, control: i32, end: i32| -> i32 {
            let c = f64::from(control) - f64::from(start);
            let e = f64::from(end) - f64::from(start);
            let offset = weight_control * c + weight_end * e;
            start.saturating_add(offset.floor() as i32)
        };

        Point2D {
            x: axis(self.start.x, self.control.x, self.end.x),
            y: axis(self.start.y, self.control.y, self.end.y),
        }
    }

    /// Lazy sequence of the segment's points
    pub fn into_path(self) -> CurvePath {
        CurvePath {
            segment: Some(self),
            next: 1,
        }
    }
}

/// Single-use iterator over a segment's points
///
/// Yields `step_count` points, the last one equal to `end`.
#[derive(Debug, Clone)]
pub struct CurvePath {
    segment: Option<BezierSegment>,
    next: u32,
}

impl CurvePath {
    /// A path with no points
    pub fn empty() -> Self {
        Self {
            segment: None,
            next: 1,
        }
    }
}

impl Iterator for CurvePath {
    type Item = Point2D;

    fn next(&mut self) -> Option<Self::Item> {
        let segment = self.segment.as_ref()?;
        if self.next > segment.step_count {
            self.segment = None;
            return None;
        }
        let t = f64::from(self.next) / f64::from(segment.step_count);
        self.next += 1;
        Some(segment.point_at(t))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match &self.segment {
            Some(segment) => (segment.step_count + 1).saturating_sub(self.next) as usize,
            None => 0,
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CurvePath {}

impl FusedIterator for CurvePath {}

/// Path for `vertical_delta` pixels from `start` with the default bias
///
/// A zero delta yields nothing.
pub fn generate(start: Point2D, vertical_delta: i32, steps: u32) -> CurvePath {
    generate_with_bias(start, vertical_delta, steps, DEFAULT_CONTROL_BIAS_PX)
}

/// Path for `vertical_delta` pixels from `start` with an explicit control bias
pub fn generate_with_bias(start: Point2D, vertical_delta: i32, steps: u32, bias: i32) -> CurvePath {
    BezierSegment::vertical(start, vertical_delta, steps, bias)
        .map(BezierSegment::into_path)
        .unwrap_or_else(CurvePath::empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_reference_curve() {
        let points: Vec<_> = generate(Point2D::new(100, 100), 20, 10).collect();

        assert_eq!(points.len(), 10);
        assert_eq!(points[9], Point2D::new(100, 120));
        assert!(points.iter().all(|p| p.x == 100));
        assert!(points.windows(2).all(|w| w[0].y <= w[1].y));
        assert_eq!(points[0], Point2D::new(100, 101));
    }

    #[test]
    fn test_small_delta_dips_above_start() {
        let points: Vec<_> = generate(Point2D::new(100, 100), 1, 10).collect();
        let ys: Vec<_> = points.iter().map(|p| p.y).collect();

        assert_eq!(ys, vec![99, 98, 97, 97, 97, 97, 98, 99, 99, 101]);
        assert!(points.iter().all(|p| p.x == 100));
    }

    #[test]
    fn test_dip_rounds_down() {
        // control sits 3 px above start
        let points: Vec<_> = generate(Point2D::new(0, 10), 4, 4).collect();
        let ys: Vec<_> = points.iter().map(|p| p.y).collect();

        assert_eq!(ys, vec![9, 9, 11, 14]);
    }

    #[test]
    fn test_control_point() {
        let seg = BezierSegment::vertical(Point2D::new(100, 100), 20, 10, 5).unwrap();
        assert_eq!(seg.control, Point2D::new(100, 105));
        assert_eq!(seg.end, Point2D::new(100, 120));
    }

    #[test]
    fn test_zero_steps_is_empty() {
        assert_eq!(generate(Point2D::new(0, 0), 15, 0).count(), 0);
    }

    #[test]
    fn test_path_is_single_use() {
        let mut path = generate(Point2D::new(0, 0), 4, 2);
        assert_eq!(path.len(), 2);
        assert!(path.next().is_some());
        assert!(path.next().is_some());
        assert!(path.next().is_none());
        assert!(path.next().is_none());
        assert_eq!(path.len(), 0);
    }

    #[test]
    fn test_step_delay() {
        let config = CurveConfig::default();
        assert_eq!(config.step_delay(), Duration::from_millis(1));
        assert_eq!(config.steps, 10);
    }

    proptest! {
        #[test]
        fn prop_zero_delta_is_empty(x in -5000i32..5000, y in -5000i32..5000, steps in 0u32..1000) {
            prop_assert_eq!(generate(Point2D::new(x, y), 0, steps).count(), 0);
        }

        #[test]
        fn prop_path_ends_at_target(
            x in 0i32..4000,
            y in 0i32..4000,
            delta in 1i32..500,
            steps in 1u32..64,
        ) {
            let points: Vec<_> = generate(Point2D::new(x, y), delta, steps).collect();
            prop_assert_eq!(points.len(), steps as usize);
            prop_assert_eq!(*points.last().unwrap(), Point2D::new(x, y + delta));
            prop_assert!(points.iter().all(|p| p.x == x));
        }

        #[test]
        fn prop_points_never_exceed_exact_curve(
            x in 0i32..4000,
            y in 20i32..4000,
            delta in 1i32..2 * DEFAULT_CONTROL_BIAS_PX,
            steps in 1u32..64,
        ) {
            let start = f64::from(y);
            let control = f64::from(y + delta / 2 - DEFAULT_CONTROL_BIAS_PX);
            let end = f64::from(y + delta);

            for (i, p) in generate(Point2D::new(x, y), delta, steps).enumerate() {
                let t = f64::from(i as u32 + 1) / f64::from(steps);
                let u = 1.0 - t;
                let exact = u * u * start + 2.0 * u * t * control + t * t * end;
                let py = f64::from(p.y);
                prop_assert!(py <= exact + 1e-9, "{} above {}", py, exact);
                prop_assert!(exact - py < 1.0 + 1e-9, "{} more than a pixel below {}", py, exact);
                prop_assert_eq!(p.x, x);
            }
        }
    }
}
