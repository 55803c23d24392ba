//! Output collaborators
//!
//! The core emits two things: pixel displacement and status reports. Each
//! goes through a small capability trait so that every front end (console,
//! windowed, headless test harness) is a thin adapter rather than its own
//! copy of the motion loop.
//!
//! | Trait | Called from | Shapes |
//! |-------|-------------|--------|
//! | [`DisplacementSink`] | motion scheduler thread | relative `(dx, dy)`, absolute point |
//! | [`StatusDisplay`] | whichever context mutated the controls | [`StatusReport`](crate::control::StatusReport) |
//!
//! Delivery is fire-and-forget. A failed call is reported back as a
//! [`SinkError`] so the caller can count it, but nothing retries. Moves that
//! take several calls report what got through as a [`Delivery`].

mod display;
mod error;
mod sink;

pub use display::{
    ConsoleDisplay, JsonDisplay, RecordingDisplay, StatusDisplay, StatusFormat, TracingDisplay,
};
pub use error::{Delivery, PartialDelivery, Result, SinkError};
pub use sink::{
    move_absolute_sequence, move_relative_chunked, DisplacementSink, SinkEvent,
    VirtualCursorHandle, VirtualCursorSink,
};

#[cfg(test)]
pub(crate) use sink::MockDisplacementSink;
