//! Tick timing

use std::time::{Duration, Instant};

/// Monotonic clock samples owned by the scheduler thread
#[derive(Debug, Clone)]
pub struct TickTimer {
    last_sample: Instant,
    next_deadline: Instant,
    period: Duration,
}

impl TickTimer {
    /// Start a timer whose first deadline is one period after `now`
    pub fn new(now: Instant, period: Duration) -> Self {
        Self {
            last_sample: now,
            next_deadline: now + period,
            period,
        }
    }

    /// Time since the previous sample; `now` becomes the new baseline
    pub fn sample(&mut self, now: Instant) -> Duration {
        let elapsed = now.saturating_duration_since(self.last_sample);
        self.last_sample = now;
        elapsed
    }

    /// Restart both the `dt` baseline and the deadline grid at `now`
    pub fn rebaseline(&mut self, now: Instant) {
        self.last_sample = now;
        self.next_deadline = now + self.period;
    }

    /// Deadline for the current tick
    pub fn next_deadline(&self) -> Instant {
        self.next_deadline
    }

    /// Tick period
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Move to the following deadline
    ///
    /// The new deadline is the previous one plus one period, so sleep
    /// overshoot never accumulates. Deadlines already in the past at `now`
    /// are skipped rather than replayed; returns how many were skipped.
    pub fn advance(&mut self, now: Instant) -> u64 {
        self.next_deadline += self.period;
        if self.next_deadline > now || self.period.is_zero() {
            return 0;
        }

        let behind = now.duration_since(self.next_deadline).as_nanos();
        let period_ns = self.period.as_nanos();
        let skipped = behind / period_ns + 1;
        let jump = u64::try_from(period_ns.saturating_mul(skipped)).unwrap_or(u64::MAX);
        self.next_deadline += Duration::from_nanos(jump);
        u64::try_from(skipped).unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIOD: Duration = Duration::from_millis(10);

    #[test]
    fn test_sample_measures_and_rebaselines() {
        let t0 = Instant::now();
        let mut timer = TickTimer::new(t0, PERIOD);
        assert_eq!(timer.sample(t0 + Duration::from_millis(7)), Duration::from_millis(7));
        assert_eq!(timer.sample(t0 + Duration::from_millis(9)), Duration::from_millis(2));
    }

    #[test]
    fn test_sample_never_negative() {
        let t0 = Instant::now();
        let mut timer = TickTimer::new(t0 + Duration::from_millis(5), PERIOD);
        assert_eq!(timer.sample(t0), Duration::ZERO);
    }

    #[test]
    fn test_deadlines_stay_on_grid() {
        let t0 = Instant::now();
        let mut timer = TickTimer::new(t0, PERIOD);

        // Late wake-ups inside the period do not shift the grid.
        assert_eq!(timer.advance(t0 + Duration::from_millis(13)), 0);
        assert_eq!(timer.next_deadline(), t0 + Duration::from_millis(20));
        assert_eq!(timer.advance(t0 + Duration::from_millis(21)), 0);
        assert_eq!(timer.next_deadline(), t0 + Duration::from_millis(30));
    }

    #[test]
    fn test_missed_deadlines_are_skipped() {
        let t0 = Instant::now();
        let mut timer = TickTimer::new(t0, PERIOD);

        let skipped = timer.advance(t0 + Duration::from_millis(55));
        assert_eq!(skipped, 4);
        assert_eq!(timer.next_deadline(), t0 + Duration::from_millis(60));
    }

    #[test]
    fn test_rebaseline() {
        let t0 = Instant::now();
        let mut timer = TickTimer::new(t0, PERIOD);
        let t1 = t0 + Duration::from_secs(3);
        timer.rebaseline(t1);
        assert_eq!(timer.next_deadline(), t1 + PERIOD);
        assert_eq!(timer.sample(t1 + Duration::from_millis(1)), Duration::from_millis(1));
    }
}
