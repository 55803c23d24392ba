//! # lamco-motion
//!
//! Drift-free pointer motion synthesis at a fixed control rate.
//!
//! A held trigger and a scalar sensitivity are turned into a monotonic
//! stream of whole-pixel moves. The fractional part of each tick's travel
//! is carried to the next, so the long-run distance matches the commanded
//! speed to within one pixel no matter how the time is sliced.
//!
//! # Architecture
//!
//! ```text
//! lamco-motion
//!   ├─> Input Sampler    (commands → ControlState, ~10ms poll)
//!   ├─> ControlState     (per-field atomics, snapshot per tick)
//!   ├─> Motion Scheduler (fixed-cadence loop, real-time priority)
//!   │     ├─> MotionAccumulator (speed × dt + carry → whole pixels)
//!   │     └─> CurvePath         (quadratic Bézier for curved mode)
//!   └─> DisplacementSink / StatusDisplay (pluggable outputs)
//! ```
//!
//! # Data Flow
//!
//! **Control Path:** console → InputSampler → ControlState → StatusDisplay
//!
//! **Motion Path:** ControlState → MotionScheduler → MotionAccumulator → DisplacementSink

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Configuration
pub mod config;

/// Shared control state and its mutation surface
pub mod control;

/// Control input commands and the sampling loop
pub mod input;

/// Motion integration and curve generation
pub mod motion;

/// Displacement sinks and status displays
pub mod output;

/// Thread lifecycle for both loops
pub mod runtime;

/// Fixed-cadence motion loop and real-time setup
pub mod scheduler;

/// Utility functions
pub mod utils;
