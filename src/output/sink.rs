//! Displacement sinks

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::trace;

use super::error::{Delivery, PartialDelivery, Result};
use crate::motion::Point2D;

/// Consumer of synthesized pointer motion
///
/// Called only from the motion scheduler thread. Implementations must not
/// block for longer than a fraction of a tick.
#[cfg_attr(test, mockall::automock)]
pub trait DisplacementSink: Send {
    /// Move the pointer by a pixel delta
    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<()>;

    /// Place the pointer at an absolute position
    fn move_absolute(&mut self, point: Point2D) -> Result<()>;

    /// Current pointer position, if the sink can report one
    ///
    /// Curved motion needs an origin; sinks returning `None` receive a
    /// single relative move instead.
    fn cursor_position(&self) -> Option<Point2D>;
}

/// Deliver a vertical relative move as calls of at most `max_step` pixels
///
/// `max_step == 0` sends the whole move in one call. Stops at the first
/// failed call; the error carries the chunks already delivered.
pub fn move_relative_chunked(
    sink: &mut dyn DisplacementSink,
    dy: u32,
    max_step: u32,
) -> std::result::Result<Delivery, PartialDelivery> {
    let step = if max_step == 0 { dy } else { max_step };
    let mut delivered = Delivery::default();
    while delivered.pixels < dy {
        let chunk = (dy - delivered.pixels).min(step);
        if let Err(source) = sink.move_relative(0, chunk as i32) {
            return Err(PartialDelivery { delivered, source });
        }
        delivered.calls += 1;
        delivered.pixels += chunk;
    }
    Ok(delivered)
}

/// Place the pointer at each point in order, pausing `step_delay` between
/// consecutive points
///
/// Delivered pixels are the downward distance from `origin` to the last
/// point placed. Stops at the first failed call.
pub fn move_absolute_sequence(
    sink: &mut dyn DisplacementSink,
    origin: Point2D,
    points: impl IntoIterator<Item = Point2D>,
    step_delay: Duration,
) -> std::result::Result<Delivery, PartialDelivery> {
    let mut delivered = Delivery::default();
    for point in points {
        if delivered.calls > 0 && !step_delay.is_zero() {
            std::thread::sleep(step_delay);
        }
        if let Err(source) = sink.move_absolute(point) {
            return Err(PartialDelivery { delivered, source });
        }
        delivered.calls += 1;
        delivered.pixels = u32::try_from(point.y.saturating_sub(origin.y)).unwrap_or(0);
    }
    Ok(delivered)
}

/// A call received by a [`VirtualCursorSink`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkEvent {
    /// `move_relative`
    Relative {
        /// Horizontal delta
        dx: i32,
        /// Vertical delta
        dy: i32,
    },
    /// `move_absolute`
    Absolute(Point2D),
}

#[derive(Debug)]
struct CursorLog {
    position: Point2D,
    history: VecDeque<SinkEvent>,
    history_limit: usize,
    relative_pixels: i64,
    calls: u64,
}

impl CursorLog {
    fn record(&mut self, event: SinkEvent) {
        self.calls += 1;
        if self.history_limit == 0 {
            return;
        }
        self.history.push_back(event);
        while self.history.len() > self.history_limit {
            self.history.pop_front();
        }
    }
}

/// In-process pointer that applies moves to a tracked position
///
/// Serves as the headless sink for the binary and as the recording sink in
/// tests. Keeps at most `history_limit` calls.
#[derive(Debug)]
pub struct VirtualCursorSink {
    log: Arc<Mutex<CursorLog>>,
}

/// Read side of a [`VirtualCursorSink`] that stays usable after the sink
/// has moved to the scheduler thread
#[derive(Debug, Clone)]
pub struct VirtualCursorHandle {
    log: Arc<Mutex<CursorLog>>,
}

impl VirtualCursorSink {
    /// Create a sink positioned at `origin`
    pub fn new(origin: Point2D, history_limit: usize) -> Self {
        Self {
            log: Arc::new(Mutex::new(CursorLog {
                position: origin,
                history: VecDeque::with_capacity(history_limit.min(4096)),
                history_limit,
                relative_pixels: 0,
                calls: 0,
            })),
        }
    }

    /// Handle for inspecting the sink from another thread
    pub fn handle(&self) -> VirtualCursorHandle {
        VirtualCursorHandle {
            log: Arc::clone(&self.log),
        }
    }
}

impl DisplacementSink for VirtualCursorSink {
    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<()> {
        let mut log = self.log.lock();
        log.position = log.position.offset(dx, dy);
        log.relative_pixels += i64::from(dx.abs()) + i64::from(dy.abs());
        log.record(SinkEvent::Relative { dx, dy });
        trace!("Relative move ({}, {}) -> {}", dx, dy, log.position);
        Ok(())
    }

    fn move_absolute(&mut self, point: Point2D) -> Result<()> {
        let mut log = self.log.lock();
        log.position = point;
        log.record(SinkEvent::Absolute(point));
        trace!("Absolute move -> {}", point);
        Ok(())
    }

    fn cursor_position(&self) -> Option<Point2D> {
        Some(self.log.lock().position)
    }
}

impl VirtualCursorHandle {
    /// Current tracked position
    pub fn position(&self) -> Point2D {
        self.log.lock().position
    }

    /// Retained calls, oldest first
    pub fn events(&self) -> Vec<SinkEvent> {
        self.log.lock().history.iter().copied().collect()
    }

    /// Sum of `|dx| + |dy|` over all relative moves
    pub fn relative_pixels(&self) -> i64 {
        self.log.lock().relative_pixels
    }

    /// Total calls received
    pub fn calls(&self) -> u64 {
        self.log.lock().calls
    }
}
