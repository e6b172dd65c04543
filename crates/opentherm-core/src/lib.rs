//! Hardware-agnostic OpenTherm 2.2 link layer.
//!
//! This crate is the bit-level core of a point-to-point OpenTherm
//! Manchester link: the 32-bit frame codec ([`frame`]), the message-ID
//! catalogue ([`ids`]), and the tick-driven state machine that turns a
//! raw digital line into framed [`Frame`] values ([`link`]).
//!
//! It owns no hardware. An integrator supplies a [`LineIo`] (the
//! digital pin) and a [`TickSource`] (the three timer rates the state
//! machine rides on) and drives [`LinkState`] from their interrupt or
//! polling context.
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod frame;
pub mod ids;
pub mod io;
pub mod link;
pub mod tick;

pub use config::LinkConfig;
pub use error::LinkError;
pub use frame::{even_parity, pack, unpack, Frame, MessageType};
pub use io::{Level, LineIo};
pub use link::{LinkState, Mode};
pub use tick::TickSource;
