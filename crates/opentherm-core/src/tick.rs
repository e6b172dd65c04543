//! Periodic tick source: the timer the link state machine rides on.
//!
//! Exactly one rate is ever armed at a time; the state machine itself
//! enforces that by only starting a timer as part of a mode
//! transition and always stopping the previous one first.

use crate::error::LinkError;

/// A source of periodic ticks at one of three mutually exclusive
/// rates. See `LinkConfig` for the nominal frequencies.
pub trait TickSource {
    /// ~5 kHz: one sample per Manchester quarter-cell while reading.
    fn start_read_timer(&mut self) -> Result<(), LinkError>;
    /// ~2.08 kHz: one half-cell per tick while writing.
    fn start_write_timer(&mut self) -> Result<(), LinkError>;
    /// ~1 kHz: one tick per millisecond while a LISTEN timeout is armed.
    fn start_timeout_timer(&mut self) -> Result<(), LinkError>;
    /// Disarm whichever timer is currently running. Idempotent.
    fn stop_timer(&mut self);
}
