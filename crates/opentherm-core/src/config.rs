//! Configuration surface for the link state machine.
//!
//! The original firmware hard-codes its three timer rates as register
//! constants per MCU family. This core keeps the nominal rates as
//! named constants but also exposes them as overridable data, for an
//! integrator whose timer divider cannot hit them exactly. None of
//! this changes the decode/encode algorithm itself.

/// Nominal read-sample rate: ~4 samples per Manchester half-cell.
pub const READ_SAMPLE_HZ: u32 = 5_000;
/// Nominal write-phase rate: slightly faster than the 500 us half-cell
/// so the mid-cell transition lands cleanly within the cell.
pub const WRITE_PHASE_HZ: u32 = 2_080;
/// Nominal LISTEN timeout tick rate.
pub const TIMEOUT_HZ: u32 = 1_000;

/// Overridable tick-source rates plus the default LISTEN timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkConfig {
    pub read_sample_hz: u32,
    pub write_phase_hz: u32,
    pub timeout_hz: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            read_sample_hz: READ_SAMPLE_HZ,
            write_phase_hz: WRITE_PHASE_HZ,
            timeout_hz: TIMEOUT_HZ,
        }
    }
}
