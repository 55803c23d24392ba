//! Motion scheduling loop
//!
//! Drives the accumulator at a fixed cadence on a dedicated thread,
//! independent of the host event loop.
//!
//! # State Machine
//!
//! ```text
//!            enabled && trigger
//!   ┌──────┐ ─────────────────> ┌─────────────┐
//!   │ Idle │                    │ Integrating │
//!   └──────┘ <───────────────── └─────────────┘
//!            !enabled || !trigger
//! ```
//!
//! Both transitions zero the pixel remainder. The loop exits when the shared
//! `running` flag is cleared; that check happens once per tick.
//!
//! # Variants
//!
//! | Variant | Pacing | Latency | CPU |
//! |---------|--------|---------|-----|
//! | Deadline | `next = prev + period`, wait until `next` | ≤ 1 period | Low |
//! | FreeRunning | no deadline, `dt` from wall clock each pass | Lowest | High |
//!
//! The wait itself is an [`IdleStrategy`]: block in the kernel, or spin with
//! a yield hint.

mod error;
mod realtime;
mod runner;
mod stats;
mod timer;

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use error::RealtimeError;
pub use realtime::{
    elevate_current_thread, pin_current_thread, realtime_priority_limit,
    set_realtime_priority, RealtimeConfig, RealtimeReport,
};
pub use runner::{MotionScheduler, SchedulerPhase, TickOutcome};
pub use stats::TickStats;
pub use timer::TickTimer;

/// Loop pacing discipline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SchedulingVariant {
    /// Fixed deadlines one period apart
    #[default]
    Deadline,

    /// Back-to-back ticks, `dt` measured each pass
    FreeRunning,
}

impl std::fmt::Display for SchedulingVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deadline => write!(f, "deadline"),
            Self::FreeRunning => write!(f, "free-running"),
        }
    }
}

impl std::str::FromStr for SchedulingVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "deadline" | "paced" | "fixed" => Ok(Self::Deadline),
            "free" | "free_running" | "free-running" | "tight" => Ok(Self::FreeRunning),
            _ => Err(format!("Unknown scheduling variant: {}", s)),
        }
    }
}

/// How the loop waits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdleStrategy {
    /// Sleep in the kernel
    #[default]
    Block,

    /// Busy-poll with a yield hint
    Spin,
}

impl std::str::FromStr for IdleStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "block" | "sleep" => Ok(Self::Block),
            "spin" | "yield" | "busy" => Ok(Self::Spin),
            _ => Err(format!("Unknown idle strategy: {}", s)),
        }
    }
}

/// Scheduler cadence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Pacing discipline
    #[serde(default)]
    pub variant: SchedulingVariant,

    /// Tick period for deadline pacing (microseconds)
    #[serde(default = "default_tick_period_us")]
    pub tick_period_us: u64,

    /// Wait strategy
    #[serde(default)]
    pub idle_strategy: IdleStrategy,

    /// Free-running sleep while idle with the block strategy (microseconds)
    #[serde(default = "default_idle_sleep_us")]
    pub idle_sleep_us: u64,
}

fn default_tick_period_us() -> u64 {
    10_000
}
fn default_idle_sleep_us() -> u64 {
    1_000
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            variant: SchedulingVariant::default(),
            tick_period_us: default_tick_period_us(),
            idle_strategy: IdleStrategy::default(),
            idle_sleep_us: default_idle_sleep_us(),
        }
    }
}

impl SchedulerConfig {
    /// Tick period
    pub fn tick_period(&self) -> Duration {
        Duration::from_micros(self.tick_period_us)
    }

    /// Idle sleep for the free-running variant
    pub fn idle_sleep(&self) -> Duration {
        Duration::from_micros(self.idle_sleep_us)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_from_str() {
        assert_eq!(
            "deadline".parse::<SchedulingVariant>().unwrap(),
            SchedulingVariant::Deadline
        );
        assert_eq!(
            "free-running".parse::<SchedulingVariant>().unwrap(),
            SchedulingVariant::FreeRunning
        );
        assert!("sometimes".parse::<SchedulingVariant>().is_err());
        assert_eq!("busy".parse::<IdleStrategy>().unwrap(), IdleStrategy::Spin);
    }

    #[test]
    fn test_default_cadence() {
        let config = SchedulerConfig::default();
        assert_eq!(config.tick_period(), Duration::from_millis(10));
        assert_eq!(config.variant, SchedulingVariant::Deadline);
        assert_eq!(config.idle_strategy, IdleStrategy::Block);
    }
}
