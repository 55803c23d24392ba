//! The motion loop

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, trace};

use super::realtime::{elevate_current_thread, RealtimeConfig};
use super::stats::TickStats;
use super::timer::TickTimer;
use super::{IdleStrategy, SchedulerConfig, SchedulingVariant};
use crate::config::Config;
use crate::control::{ControlState, MotionMode};
use crate::motion::curve::generate_with_bias;
use crate::motion::{CurveConfig, Kinematics, MotionAccumulator};
use crate::output::{move_absolute_sequence, move_relative_chunked, DisplacementSink};

/// Loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerPhase {
    /// Trigger inactive or motion disabled
    Idle,
    /// Accumulating and emitting
    Integrating,
}

/// What one tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not engaged; remainder cleared
    Idle,
    /// Integrated, but less than a whole pixel is pending
    Pending,
    /// Pixels handed to the sink
    Emitted {
        /// Whole pixels this tick
        pixels: u32,
        /// Mode used for delivery
        mode: MotionMode,
    },
    /// Pixels were due but the sink refused them
    Dropped {
        /// Whole pixels lost this tick
        pixels: u32,
    },
}

impl TickOutcome {
    /// Whether the loop is idle after this tick
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// Fixed-cadence driver for the accumulator
///
/// Owns the remainder, the tick timer and the sink. Only the control state
/// is shared.
pub struct MotionScheduler {
    config: SchedulerConfig,
    realtime: RealtimeConfig,
    curve: CurveConfig,
    max_relative_step: u32,
    controls: Arc<ControlState>,
    sink: Box<dyn DisplacementSink>,
    accumulator: MotionAccumulator,
    timer: TickTimer,
    phase: SchedulerPhase,
    stats: TickStats,
}

impl MotionScheduler {
    /// Create a scheduler in the idle phase
    pub fn new(
        config: &Config,
        controls: Arc<ControlState>,
        sink: Box<dyn DisplacementSink>,
    ) -> Self {
        let accumulator = MotionAccumulator::new(
            Kinematics::from_config(&config.motion),
            config.smoothing.clone(),
        );
        let timer = TickTimer::new(Instant::now(), config.scheduler.tick_period());

        Self {
            config: config.scheduler.clone(),
            realtime: config.realtime.clone(),
            curve: config.curve.clone(),
            max_relative_step: config.motion.max_relative_step_px,
            controls,
            sink,
            accumulator,
            timer,
            phase: SchedulerPhase::Idle,
            stats: TickStats::default(),
        }
    }

    /// Current phase
    pub fn phase(&self) -> SchedulerPhase {
        self.phase
    }

    /// Fractional pixel carry
    pub fn remainder(&self) -> f64 {
        self.accumulator.remainder()
    }

    /// Statistics so far
    pub fn stats(&self) -> &TickStats {
        &self.stats
    }

    /// Restart the `dt` baseline and deadline grid at `now`
    pub fn rebaseline(&mut self, now: Instant) {
        self.timer.rebaseline(now);
    }

    /// Run one tick as of `now`
    ///
    /// Samples the clock and the controls, integrates when engaged and
    /// dispatches any whole pixels. Does not wait.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        let elapsed = self.timer.sample(now);
        self.stats.record_tick(elapsed);
        let snapshot = self.controls.snapshot();

        if !snapshot.is_engaged() {
            if self.phase == SchedulerPhase::Integrating {
                debug!("Integrating -> Idle");
                self.phase = SchedulerPhase::Idle;
                self.stats.transitions += 1;
            }
            self.accumulator.reset();
            return TickOutcome::Idle;
        }

        if self.phase == SchedulerPhase::Idle {
            debug!(
                "Idle -> Integrating (sensitivity {:.7}, {})",
                snapshot.sensitivity, snapshot.mode
            );
            self.phase = SchedulerPhase::Integrating;
            self.stats.transitions += 1;
            self.accumulator.reset();
        }
        self.stats.active_ticks += 1;

        let pixels = self.accumulator.step(
            snapshot.sensitivity,
            elapsed.as_secs_f64(),
            snapshot.mode,
        );
        if pixels == 0 {
            return TickOutcome::Pending;
        }

        let delivered = self.dispatch(pixels, snapshot.mode);
        self.stats.pixels_emitted += u64::from(delivered);
        if delivered >= pixels {
            TickOutcome::Emitted {
                pixels,
                mode: snapshot.mode,
            }
        } else {
            self.stats.dropped_moves += 1;
            TickOutcome::Dropped {
                pixels: pixels - delivered,
            }
        }
    }

    /// Hand `pixels` to the sink in the shape `mode` asks for
    ///
    /// Returns the pixels that reached the sink.
    fn dispatch(&mut self, pixels: u32, mode: MotionMode) -> u32 {
        let delivered = match mode {
            MotionMode::Curved => match self.sink.cursor_position() {
                Some(origin) => {
                    let path = generate_with_bias(
                        origin,
                        pixels as i32,
                        self.curve.steps,
                        self.curve.control_bias_px,
                    );
                    move_absolute_sequence(
                        self.sink.as_mut(),
                        origin,
                        path,
                        self.curve.step_delay(),
                    )
                }
                None => {
                    trace!("Sink has no cursor position, curved move sent as relative");
                    move_relative_chunked(self.sink.as_mut(), pixels, 0)
                }
            },
            MotionMode::Direct | MotionMode::SmoothedAccelerating => {
                move_relative_chunked(self.sink.as_mut(), pixels, self.max_relative_step)
            }
        };

        let delivery = match delivered {
            Ok(delivery) => delivery,
            Err(e) => {
                debug!(
                    "Dropped {} of {} px ({}): {}",
                    pixels.saturating_sub(e.delivered.pixels),
                    pixels,
                    mode,
                    e.source
                );
                e.delivered
            }
        };
        self.stats.sink_calls += u64::from(delivery.calls);
        delivery.pixels.min(pixels)
    }

    /// Run until the shared `running` flag clears
    ///
    /// Call on the thread that should carry the motion loop; elevation
    /// applies to the calling thread.
    pub fn run(mut self) -> TickStats {
        info!(
            "Motion scheduler starting: {} pacing, period {:?}, {:?} wait",
            self.config.variant,
            self.timer.period(),
            self.config.idle_strategy
        );
        let report = elevate_current_thread(&self.realtime);
        if !report.is_elevated() {
            debug!("Motion loop running at default priority");
        }

        self.timer.rebaseline(Instant::now());

        while self.controls.is_running() {
            let outcome = self.tick(Instant::now());
            match self.config.variant {
                SchedulingVariant::Deadline => self.wait_for_deadline(),
                SchedulingVariant::FreeRunning => self.free_run_pause(outcome),
            }
        }

        info!("Motion scheduler stopped");
        self.stats.log_summary();
        self.stats
    }

    fn wait_for_deadline(&mut self) {
        let deadline = self.timer.next_deadline();
        match self.config.idle_strategy {
            IdleStrategy::Block => {
                let now = Instant::now();
                if deadline > now {
                    std::thread::sleep(deadline - now);
                }
            }
            IdleStrategy::Spin => {
                while Instant::now() < deadline {
                    std::thread::yield_now();
                }
            }
        }

        let woke = Instant::now();
        self.stats
            .record_wake(woke.saturating_duration_since(deadline));
        let skipped = self.timer.advance(woke);
        if skipped > 0 {
            trace!("Skipped {} missed deadline(s)", skipped);
            self.stats.missed_deadlines += skipped;
        }
    }

    fn free_run_pause(&self, outcome: TickOutcome) {
        if !outcome.is_idle() {
            std::hint::spin_loop();
            return;
        }
        match self.config.idle_strategy {
            IdleStrategy::Block => std::thread::sleep(self.config.idle_sleep()),
            IdleStrategy::Spin => std::thread::yield_now(),
        }
    }
}

impl std::fmt::Debug for MotionScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MotionScheduler")
            .field("phase", &self.phase)
            .field("remainder", &self.accumulator.remainder())
            .field("variant", &self.config.variant)
            .field("stats", &self.stats)
            .finish()
    }
}
