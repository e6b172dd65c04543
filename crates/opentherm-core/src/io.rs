//! Line I/O adapter: the minimal digital-pin interface the state
//! machine drives. An integrator implements this over a real GPIO
//! peripheral; tests implement it over a shared in-memory cell.

use crate::error::LinkError;

/// A sampled or driven digital line level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    #[must_use]
    pub const fn from_bit(bit: u8) -> Self {
        if bit == 0 { Self::Low } else { Self::High }
    }

    #[must_use]
    pub const fn as_bit(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::High => 1,
        }
    }
}

/// A single bidirectional OpenTherm line.
///
/// `read_level`/`write_level` are called from the hot tick path and
/// must be constant-time and infallible, mirroring the source's bare
/// `digitalRead`/`digitalWrite`. Arming the rising-edge notification is
/// the one operation that can fail on a hosted peripheral, so it alone
/// returns a `Result`.
pub trait LineIo {
    fn read_level(&mut self) -> Level;
    fn write_level(&mut self, level: Level);
    fn enable_rising_edge_notify(&mut self) -> Result<(), LinkError>;
    fn disable_edge_notify(&mut self);
}
