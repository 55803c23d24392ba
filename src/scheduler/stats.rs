//! Scheduler statistics

use std::time::Duration;

use tracing::info;

/// Smoothing factor for the tick interval average
const INTERVAL_ALPHA: f64 = 0.1;

/// Counters kept by the motion loop
///
/// Updated in O(1) per tick with no allocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickStats {
    /// Ticks executed
    pub ticks: u64,
    /// Ticks spent integrating
    pub active_ticks: u64,
    /// Idle/integrating transitions
    pub transitions: u64,
    /// Pixels delivered to the sink
    pub pixels_emitted: u64,
    /// Successful sink calls
    pub sink_calls: u64,
    /// Displacements the sink failed to take
    pub dropped_moves: u64,
    /// Deadlines skipped after an overrun
    pub missed_deadlines: u64,
    /// Worst observed wake-up lateness
    pub max_wake_lateness: Duration,
    /// Exponential average of the interval between ticks (µs)
    pub avg_tick_interval_us: f64,
}

impl TickStats {
    /// Record one tick and the time since the previous one
    pub fn record_tick(&mut self, interval: Duration) {
        let us = interval.as_secs_f64() * 1_000_000.0;
        self.avg_tick_interval_us = if self.ticks == 0 {
            us
        } else {
            self.avg_tick_interval_us * (1.0 - INTERVAL_ALPHA) + us * INTERVAL_ALPHA
        };
        self.ticks += 1;
    }

    /// Record how late the loop woke relative to its deadline
    pub fn record_wake(&mut self, lateness: Duration) {
        if lateness > self.max_wake_lateness {
            self.max_wake_lateness = lateness;
        }
    }

    /// Fraction of ticks spent integrating
    pub fn duty_cycle(&self) -> f64 {
        if self.ticks == 0 {
            0.0
        } else {
            self.active_ticks as f64 / self.ticks as f64
        }
    }

    /// Log a summary at info level
    pub fn log_summary(&self) {
        info!("=== Motion Scheduler Statistics ===");
        info!("  Ticks: {} ({:.1}% active)", self.ticks, self.duty_cycle() * 100.0);
        info!("  Transitions: {}", self.transitions);
        info!(
            "  Pixels emitted: {} in {} sink calls",
            self.pixels_emitted, self.sink_calls
        );
        info!("  Dropped moves: {}", self.dropped_moves);
        info!("  Missed deadlines: {}", self.missed_deadlines);
        info!(
            "  Max wake lateness: {:.3} ms",
            self.max_wake_lateness.as_secs_f64() * 1000.0
        );
        info!("  Avg tick interval: {:.1} us", self.avg_tick_interval_us);
    }
}
