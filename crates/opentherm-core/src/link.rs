//! The link state machine: a tick-driven, half-duplex Manchester
//! receiver/transmitter for a single OpenTherm frame at a time.
//!
//! `LinkState` owns a tick source for its whole lifetime and borrows a
//! line adapter for the duration of one `listen`/`send` activation.
//! Every public method and every handler takes `&mut LinkState`
//! exclusively: the borrow checker is the critical section. An
//! integrator wiring this behind a real interrupt still has to mask
//! that interrupt around any call into a `LinkState` made from
//! non-handler code, since the borrow checker cannot see a second,
//! concurrent hardware interrupt reentering the same `&mut`.

use crate::config::LinkConfig;
use crate::error::LinkError;
use crate::frame::{Frame, even_parity, pack, unpack};
use crate::io::{Level, LineIo};
use crate::tick::TickSource;

const STOP_BIT_POS: u8 = 33;

/// Current activity of a [`LinkState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Idle,
    Listen,
    Read,
    Received,
    Write,
    Sent,
    ErrorTimeout,
    /// Reachable only when the line/tick adapters fail to re-arm while
    /// recovering from a Manchester or parity violation (see
    /// `revert_to_listen`); the decode algorithm itself never enters
    /// it directly, since violations are recovered locally back into
    /// `Listen`.
    ErrorManchester,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClockPhase {
    /// First half of the current bit cell; a receive transition here
    /// is the candidate mid-cell (data-defining) transition. A write
    /// here drives the inverted bit value.
    First,
    /// Second half of the current bit cell.
    Second,
}

/// The OpenTherm link state machine. `P` is the line adapter type,
/// borrowed for the duration of an activation; `T` is the tick source,
/// owned for the lifetime of the `LinkState`.
pub struct LinkState<P: LineIo, T: TickSource> {
    tick: T,
    pin: Option<P>,
    mode: Mode,
    data: u32,
    bit_pos: u8,
    capture: u16,
    clock_phase: ClockPhase,
    active: bool,
    timeout_ticks: i32,
    callback: Option<Box<dyn FnOnce()>>,
    config: LinkConfig,
}

impl<P: LineIo, T: TickSource> LinkState<P, T> {
    #[must_use]
    pub fn new(tick: T, config: LinkConfig) -> Self {
        Self {
            tick,
            pin: None,
            mode: Mode::Idle,
            data: 0,
            bit_pos: 0,
            capture: 0,
            clock_phase: ClockPhase::First,
            active: false,
            timeout_ticks: -1,
            callback: None,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn bit_pos(&self) -> u8 {
        self.bit_pos
    }

    #[must_use]
    pub fn capture(&self) -> u16 {
        self.capture
    }

    #[must_use]
    pub fn timeout_ticks(&self) -> i32 {
        self.timeout_ticks
    }

    #[must_use]
    pub fn has_message(&self) -> bool {
        self.mode == Mode::Received
    }

    #[must_use]
    pub fn is_sent(&self) -> bool {
        self.mode == Mode::Sent
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.mode == Mode::Idle
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self.mode, Mode::ErrorTimeout | Mode::ErrorManchester)
    }

    /// When `mode() == Mode::Received`, unpacks and returns the held
    /// frame; repeatable until the next `listen`/`send`/`stop`.
    #[must_use]
    pub fn get_message(&self) -> Option<Frame> {
        (self.mode == Mode::Received).then(|| unpack(self.data))
    }

    /// Cancel any in-flight activity, arm the line for a rising edge
    /// and (if `timeout_ms > 0`) the timeout timer, and enter
    /// `Listen`. `timeout_ms <= 0` means no timeout.
    pub fn listen(
        &mut self,
        mut pin: P,
        timeout_ms: i32,
        callback: Option<Box<dyn FnOnce()>>,
    ) -> Result<(), LinkError> {
        self.stop();
        pin.enable_rising_edge_notify()?;
        self.timeout_ticks = timeout_ms;
        self.callback = callback;
        if timeout_ms > 0 {
            self.tick.start_timeout_timer()?;
        }
        self.pin = Some(pin);
        self.mode = Mode::Listen;
        self.active = true;
        log::debug!("listen armed (timeout_ms={timeout_ms})");
        Ok(())
    }

    /// Cancel any in-flight activity, pack and parity-correct `frame`,
    /// and start transmitting it.
    pub fn send(
        &mut self,
        pin: P,
        frame: &Frame,
        callback: Option<Box<dyn FnOnce()>>,
    ) -> Result<(), LinkError> {
        self.stop();
        self.data = pack(frame);
        self.bit_pos = STOP_BIT_POS;
        self.clock_phase = ClockPhase::First;
        self.callback = callback;
        self.tick.start_write_timer()?;
        self.pin = Some(pin);
        self.mode = Mode::Write;
        self.active = true;
        log::debug!("send armed (word=0x{:08x})", self.data);
        Ok(())
    }

    /// Disarm edge notify and timer, release the line, and return to
    /// `Idle`. Idempotent.
    pub fn stop(&mut self) {
        self.disarm();
        self.pin = None;
        self.callback = None;
        self.mode = Mode::Idle;
    }

    /// The edge handler: call from the rising-edge notification
    /// registered by `listen`. A no-op unless currently `Listen`.
    pub fn on_rising_edge(&mut self) {
        if self.mode != Mode::Listen {
            return;
        }
        self.disarm();
        self.data = 0;
        self.bit_pos = 0;
        self.capture = 1;
        self.clock_phase = ClockPhase::First;
        match self.tick.start_read_timer() {
            Ok(()) => {
                self.mode = Mode::Read;
                self.active = true;
                log::trace!("rising edge: listen -> read");
            }
            Err(_) => {
                log::error!("failed to start read timer on rising edge");
                self.mode = Mode::ErrorManchester;
                self.active = false;
            }
        }
    }

    /// The tick handler: call on every fire of whichever timer is
    /// currently armed.
    pub fn tick(&mut self) {
        match self.mode {
            Mode::Listen => self.tick_listen_timeout(),
            Mode::Read => self.tick_read(),
            Mode::Write => self.tick_write(),
            Mode::Idle | Mode::Received | Mode::Sent | Mode::ErrorTimeout | Mode::ErrorManchester => {}
        }
    }

    fn tick_listen_timeout(&mut self) {
        // Nested, rather than two sibling checks as in the upstream source:
        // a timeout of 0 or less means no timer is conceptually armed at
        // all, and must never itself satisfy the "== 0" test below.
        if self.timeout_ticks > 0 {
            self.timeout_ticks -= 1;
            if self.timeout_ticks == 0 {
                self.mode = Mode::ErrorTimeout;
                self.disarm();
                log::error!("listen timed out");
            }
        }
    }

    /// Manchester decode, one read-tick at a time. A literal
    /// translation of the upstream `_timerISR` read branch: `last`
    /// (the level observed in the half-cell that just ended) is
    /// committed as the data bit, not the freshly sampled `v`.
    fn tick_read(&mut self) {
        let v = self.read_pin();
        let last = (self.capture & 1) as u8;
        if v.as_bit() != last {
            if self.clock_phase == ClockPhase::First && self.capture > 0x0F {
                log::warn!("missing mid-cell transition, reverting to listen");
                self.revert_to_listen();
                return;
            }
            if self.clock_phase == ClockPhase::First || self.capture > 0x0F {
                if self.bit_pos == STOP_BIT_POS {
                    if last == 1 && even_parity(self.data) {
                        self.mode = Mode::Received;
                        self.disarm();
                        log::debug!("received frame (word=0x{:08x})", self.data);
                        self.fire_callback();
                    } else {
                        log::warn!("stop bit or parity check failed, reverting to listen");
                        self.revert_to_listen();
                    }
                    return;
                }
                self.data = (self.data << 1) | u32::from(last);
                self.bit_pos += 1;
                self.clock_phase = ClockPhase::Second;
                self.capture = 1;
            } else {
                // Cell-boundary transition between two equal-valued bits: not a
                // data point, just flips the expected half back to First.
                self.clock_phase = ClockPhase::First;
                self.capture = 1;
            }
        } else if self.capture > 0xFF {
            log::warn!("no transition for too long, reverting to listen");
            self.revert_to_listen();
            return;
        }
        self.capture = (self.capture << 1) | u16::from(v.as_bit());
    }

    /// Manchester encode, one write-tick at a time (one tick per
    /// half-cell).
    fn tick_write(&mut self) {
        let bit_value = if self.bit_pos == STOP_BIT_POS || self.bit_pos == 0 {
            true
        } else {
            let shift = self.bit_pos - 1;
            ((self.data >> shift) & 1) == 1
        };
        let line_high = match self.clock_phase {
            ClockPhase::First => !bit_value,
            ClockPhase::Second => bit_value,
        };
        self.write_pin(Level::from_bit(u8::from(line_high)));
        match self.clock_phase {
            ClockPhase::First => self.clock_phase = ClockPhase::Second,
            ClockPhase::Second => {
                if self.bit_pos == 0 {
                    self.mode = Mode::Sent;
                    self.disarm();
                    log::debug!("sent frame");
                    self.fire_callback();
                    return;
                }
                self.bit_pos -= 1;
                self.clock_phase = ClockPhase::First;
            }
        }
    }

    /// Recover from a Manchester or parity/stop-bit violation: keep
    /// the current pin, re-arm the edge notify and (if still armed)
    /// the timeout timer at its current remaining count — not reset
    /// to the original value, matching the upstream library's
    /// internal re-listen helper.
    fn revert_to_listen(&mut self) {
        self.disarm();
        self.data = 0;
        self.bit_pos = 0;
        let Some(pin) = self.pin.as_mut() else {
            self.mode = Mode::Idle;
            return;
        };
        match pin.enable_rising_edge_notify() {
            Ok(()) => {
                self.mode = Mode::Listen;
                self.active = true;
                if self.timeout_ticks > 0 && self.tick.start_timeout_timer().is_err() {
                    log::error!("failed to re-arm timeout timer reverting to listen");
                    self.mode = Mode::ErrorManchester;
                    self.active = false;
                }
            }
            Err(_) => {
                log::error!("failed to re-arm edge notify reverting to listen");
                self.mode = Mode::ErrorManchester;
            }
        }
    }

    fn disarm(&mut self) {
        if self.active {
            if let Some(pin) = self.pin.as_mut() {
                pin.disable_edge_notify();
            }
            self.tick.stop_timer();
            self.active = false;
        }
    }

    fn fire_callback(&mut self) {
        if let Some(cb) = self.callback.take() {
            cb();
        }
    }

    fn read_pin(&mut self) -> Level {
        match self.pin.as_mut() {
            Some(pin) => pin.read_level(),
            None => {
                log::error!("read_pin called with no pin armed");
                Level::Low
            }
        }
    }

    fn write_pin(&mut self, level: Level) {
        if let Some(pin) = self.pin.as_mut() {
            pin.write_level(level);
        } else {
            log::error!("write_pin called with no pin armed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::MessageType;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// A line level shared between a writer and a reader in the same
    /// process, standing in for the physical wire.
    #[derive(Clone)]
    struct SimLine {
        level: Rc<Cell<Level>>,
        edge_armed: Rc<Cell<bool>>,
    }

    impl SimLine {
        fn new() -> Self {
            Self {
                level: Rc::new(Cell::new(Level::Low)),
                edge_armed: Rc::new(Cell::new(false)),
            }
        }
    }

    impl LineIo for SimLine {
        fn read_level(&mut self) -> Level {
            self.level.get()
        }

        fn write_level(&mut self, level: Level) {
            self.level.set(level);
        }

        fn enable_rising_edge_notify(&mut self) -> Result<(), LinkError> {
            self.edge_armed.set(true);
            Ok(())
        }

        fn disable_edge_notify(&mut self) {
            self.edge_armed.set(false);
        }
    }

    /// A tick source that never fires on its own; the test drives
    /// `LinkState::tick`/`on_rising_edge` directly instead.
    #[derive(Default)]
    struct ManualTick;

    impl TickSource for ManualTick {
        fn start_read_timer(&mut self) -> Result<(), LinkError> {
            Ok(())
        }
        fn start_write_timer(&mut self) -> Result<(), LinkError> {
            Ok(())
        }
        fn start_timeout_timer(&mut self) -> Result<(), LinkError> {
            Ok(())
        }
        fn stop_timer(&mut self) {}
    }

    /// A fallible variant used to exercise the `ErrorManchester`
    /// hardware-failure path.
    struct FailingEdgeLine {
        fail_edge: bool,
    }

    impl LineIo for FailingEdgeLine {
        fn read_level(&mut self) -> Level {
            Level::Low
        }
        fn write_level(&mut self, _level: Level) {}
        fn enable_rising_edge_notify(&mut self) -> Result<(), LinkError> {
            if self.fail_edge {
                Err(LinkError::PinUnavailable)
            } else {
                Ok(())
            }
        }
        fn disable_edge_notify(&mut self) {}
    }

    fn new_link() -> LinkState<SimLine, ManualTick> {
        LinkState::new(ManualTick, LinkConfig::default())
    }

    /// Drive `tx` through a full `send()` of `frame`, recording every
    /// line level written, at one tick per half-cell. Exercises the
    /// encoder exactly as `tick_write` runs it; used to build a
    /// self-consistent input for the decoder tests below instead of a
    /// hand-derived sample table.
    fn encode_halves(frame: &Frame) -> Vec<Level> {
        let line = SimLine::new();
        let mut tx = new_link();
        tx.send(line.clone(), frame, None).expect("send armed");
        let mut halves = Vec::new();
        while tx.mode() != Mode::Sent {
            tx.tick();
            halves.push(line.level.get());
        }
        halves
    }

    /// Feed an encoder's half-cell sequence into a fresh receiver,
    /// simulating the rising edge at the first Low->High transition
    /// and then one read-tick per subsequent half.
    fn decode_halves(halves: &[Level]) -> LinkState<SimLine, ManualTick> {
        let line = SimLine::new();
        let mut rx = new_link();
        rx.listen(line.clone(), 0, None).expect("listen armed");

        let mut prev = Level::Low;
        let mut armed = false;
        for &level in halves {
            line.level.set(level);
            if !armed && prev == Level::Low && level == Level::High {
                rx.on_rising_edge();
                armed = true;
            } else if armed {
                rx.tick();
            }
            prev = level;
        }
        rx
    }

    #[test]
    fn e1_round_trip_read_data_room_temperature() {
        let frame = Frame::new(MessageType::ReadData, 24, 0x00, 0x00);
        let halves = encode_halves(&frame);
        let rx = decode_halves(&halves);
        assert!(rx.has_message());
        assert_eq!(rx.get_message(), Some(frame));
    }

    #[test]
    fn e7_round_trip_read_ack_with_value() {
        let frame = Frame::new(MessageType::ReadAck, 25, 0x41, 0x80);
        let halves = encode_halves(&frame);
        let rx = decode_halves(&halves);
        assert_eq!(rx.get_message(), Some(frame));
    }

    #[test]
    fn e4_listen_timeout_sets_error_without_callback() {
        let fired = Rc::new(RefCell::new(false));
        let fired_clone = Rc::clone(&fired);
        let line = SimLine::new();
        let mut rx = new_link();
        rx.listen(
            line,
            5,
            Some(Box::new(move || {
                *fired_clone.borrow_mut() = true;
            })),
        )
        .expect("listen armed");

        for _ in 0..5 {
            rx.tick();
        }

        assert!(rx.is_error());
        assert!(!rx.has_message());
        assert!(!*fired.borrow());
    }

    #[test]
    fn e5_parity_corrupted_frame_reverts_to_listen() {
        // 0x0018_0001 carries odd parity per the frame codec tests.
        let line = SimLine::new();
        let mut tx = new_link();
        // Bypass send()'s parity repair to transmit the corrupt word verbatim.
        tx.data = 0x0018_0001;
        tx.bit_pos = STOP_BIT_POS;
        tx.clock_phase = ClockPhase::First;
        tx.pin = Some(line.clone());
        tx.mode = Mode::Write;
        tx.active = true;

        let mut halves = Vec::new();
        while tx.mode() != Mode::Sent {
            tx.tick();
            halves.push(line.level.get());
        }

        let rx = decode_halves(&halves);
        assert!(!rx.has_message());
        assert_eq!(rx.mode(), Mode::Listen);
    }

    #[test]
    fn e6_manchester_violation_recovers_to_listen() {
        let line = SimLine::new();
        let mut rx = new_link();
        rx.listen(line.clone(), 0, None).expect("listen armed");
        rx.on_rising_edge();
        assert_eq!(rx.mode(), Mode::Read);

        // Hold the line steady past the 0xFF no-transition threshold.
        for _ in 0..260 {
            rx.tick();
        }
        assert_eq!(rx.mode(), Mode::Listen);

        // A subsequent valid frame is still received correctly.
        let frame = Frame::new(MessageType::ReadData, 24, 0x00, 0x00);
        let halves = encode_halves(&frame);
        let rx2 = decode_halves(&halves);
        assert_eq!(rx2.get_message(), Some(frame));
    }

    #[test]
    fn active_iff_mode_is_listen_read_or_write() {
        let line = SimLine::new();
        let mut link = new_link();
        assert!(!link.is_active());
        link.listen(line, 0, None).expect("listen armed");
        assert!(link.is_active());
        link.stop();
        assert!(!link.is_active());
    }

    #[test]
    fn stop_after_completion_leaves_no_pending_timer() {
        let frame = Frame::new(MessageType::ReadData, 24, 0x00, 0x00);
        let halves = encode_halves(&frame);
        let mut rx = decode_halves(&halves);
        assert!(rx.has_message());
        rx.stop();
        assert!(rx.is_idle());
        assert!(!rx.has_message());
        // Ticking an idle link is a no-op.
        rx.tick();
        assert!(rx.is_idle());
    }

    #[test]
    fn revert_degrades_to_error_manchester_when_edge_cannot_be_rearmed() {
        let mut rx: LinkState<FailingEdgeLine, ManualTick> =
            LinkState::new(ManualTick, LinkConfig::default());
        rx.listen(FailingEdgeLine { fail_edge: false }, 0, None)
            .expect("listen armed");
        rx.on_rising_edge();
        assert_eq!(rx.mode(), Mode::Read);

        if let Some(pin) = rx.pin.as_mut() {
            pin.fail_edge = true;
        }
        for _ in 0..260 {
            rx.tick();
        }
        assert_eq!(rx.mode(), Mode::ErrorManchester);
        assert!(rx.is_error());
    }
}
