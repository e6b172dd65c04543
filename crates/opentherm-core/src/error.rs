//! Ambient error type for the hosted adapters ([`crate::io::LineIo`],
//! [`crate::tick::TickSource`]) this core depends on.
//!
//! The codec and the state machine's own transition functions are
//! total and never return this type; it exists only at the hardware
//! boundary, where configuring a real peripheral can fail.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The line adapter could not be configured (e.g. arm/disarm the
    /// rising-edge notification).
    PinUnavailable,
    /// The tick source could not be armed at the requested rate.
    TimerUnavailable,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PinUnavailable => write!(f, "line adapter unavailable"),
            Self::TimerUnavailable => write!(f, "tick source unavailable"),
        }
    }
}

impl std::error::Error for LinkError {}
