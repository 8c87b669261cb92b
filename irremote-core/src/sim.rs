//! Host-side board simulator.
//!
//! `SimBoard` implements every hardware trait over a virtual microsecond
//! clock. Key presses are scripted up front; sleeping, carrier bursts and
//! spaces advance the clock, and every emitter or sleep call is recorded so
//! tests and the CLI can inspect the waveform that would have gone out.

use std::collections::VecDeque;
use std::vec::Vec;

use crate::frame::FRAME_BITS;
use crate::hal::{Emitter, Matrix, Power, Selector};
use crate::keytab::RawScanCode;
use crate::transmit::{Segment, CARRIER_PERIOD_US};

/// One scripted key press.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Press {
    pub code: RawScanCode,
    /// Earliest time the contact closes.
    pub at_us: u64,
    /// How long the contact stays closed.
    pub hold_us: u64,
}

/// Something the board was asked to do.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Woken from idle sleep by a key edge.
    KeyWake,
    /// Timed light sleep.
    Sleep(u32),
    Segment(Segment),
    /// Carrier timer stopped and cleared.
    CarrierStop,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TraceEntry {
    pub at_us: u64,
    pub event: Event,
}

/// The segments between two carrier stops.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimFrame {
    pub start_us: u64,
    pub segments: Vec<Segment>,
}

impl SimFrame {
    /// Recover the 14-bit word, or `None` if the segments are not a
    /// well-formed biphase frame.
    pub fn word(&self) -> Option<u16> {
        if self.segments.len() != 2 * FRAME_BITS {
            return None;
        }
        let mut word = 0u16;
        for pair in self.segments.chunks(2) {
            let bit = match (pair[0], pair[1]) {
                (Segment::Space(_), Segment::Mark(_)) => 1,
                (Segment::Mark(_), Segment::Space(_)) => 0,
                _ => return None,
            };
            word = (word << 1) | bit;
        }
        Some(word)
    }

    pub fn duration_us(&self) -> u32 {
        self.segments.iter().map(|s| s.duration_us()).sum()
    }
}

#[derive(Debug, Default)]
pub struct SimBoard {
    now: u64,
    script: VecDeque<Press>,
    current: Option<Press>,
    last_end: u64,
    selector: u8,
    rows: u8,
    parked: bool,
    charge: u8,
    wake_armed: bool,
    edge_latched: bool,
    trace: Vec<TraceEntry>,
}

impl SimBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the selector switches, `line1 << 1 | line0`.
    pub fn set_selector(&mut self, state: u8) {
        self.selector = state & 0x03;
    }

    /// Script a press at an absolute time.
    pub fn press_at(&mut self, at_us: u64, code: RawScanCode, hold_us: u64) {
        self.last_end = self.last_end.max(at_us + hold_us);
        self.script.push_back(Press { code, at_us, hold_us });
    }

    /// Script a press `gap_us` after the end of the previous scripted one.
    pub fn press_after(&mut self, gap_us: u64, code: RawScanCode, hold_us: u64) {
        self.press_at(self.last_end + gap_us, code, hold_us);
    }

    /// Presses not yet started.
    pub fn pending(&self) -> usize {
        self.script.len()
    }

    pub fn now_us(&self) -> u64 {
        self.now
    }

    pub fn trace(&self) -> &[TraceEntry] {
        &self.trace
    }

    /// Group the emitted segments into frames.
    pub fn frames(&self) -> Vec<SimFrame> {
        let mut frames = Vec::new();
        let mut current: Option<SimFrame> = None;
        for entry in &self.trace {
            match entry.event {
                Event::Segment(segment) => current
                    .get_or_insert_with(|| SimFrame {
                        start_us: entry.at_us,
                        segments: Vec::new(),
                    })
                    .segments
                    .push(segment),
                Event::CarrierStop => frames.extend(current.take()),
                _ => {}
            }
        }
        frames.extend(current);
        frames
    }

    /// Timed sleeps recorded in the trace.
    pub fn sleeps(&self) -> Vec<u32> {
        self.trace
            .iter()
            .filter_map(|e| match e.event {
                Event::Sleep(us) => Some(us),
                _ => None,
            })
            .collect()
    }

    fn key_down(&self) -> bool {
        match self.current {
            Some(p) => self.now >= p.at_us && self.now < p.at_us + p.hold_us,
            None => false,
        }
    }

    fn released(&self) -> bool {
        match self.current {
            Some(p) => self.now >= p.at_us + p.hold_us,
            None => false,
        }
    }

    fn record(&mut self, event: Event) {
        self.trace.push(TraceEntry {
            at_us: self.now,
            event,
        });
    }
}

impl Matrix for SimBoard {
    fn drive_rows(&mut self, mask: u8) {
        self.rows = mask;
    }

    fn discharge_columns(&mut self) {
        self.charge = 0;
    }

    fn read_columns(&mut self) -> u8 {
        if self.parked {
            return 0xFF;
        }
        let live = match self.current {
            Some(p) if self.key_down() && self.rows & (1 << p.code.row()) != 0 => p.code.columns(),
            _ => 0,
        };
        self.charge |= live;
        self.charge
    }

    fn park_columns(&mut self) {
        // Idle columns are pulled low, so driving them high is an edge.
        self.parked = true;
        self.edge_latched = true;
    }

    fn release_columns(&mut self) {
        if self.parked {
            self.edge_latched = true;
        }
        self.parked = false;
        self.charge = 0;
    }
}

impl Selector for SimBoard {
    fn read_selector(&mut self) -> u8 {
        self.selector
    }
}

impl Emitter for SimBoard {
    fn mark(&mut self, cycles: u16) {
        self.record(Event::Segment(Segment::Mark(cycles)));
        self.now += cycles as u64 * CARRIER_PERIOD_US as u64;
    }

    fn space(&mut self, micros: u16) {
        self.record(Event::Segment(Segment::Space(micros)));
        self.now += micros as u64;
    }

    fn stop(&mut self) {
        self.record(Event::CarrierStop);
    }
}

impl Power for SimBoard {
    fn arm_key_wake(&mut self) {
        self.edge_latched = false;
        self.wake_armed = true;
    }

    fn sleep_until_key(&mut self) {
        assert!(self.wake_armed, "idle sleep entered with the key wake disarmed");
        self.current = self.script.pop_front();
        if let Some(p) = self.current {
            self.now = self.now.max(p.at_us);
            self.record(Event::KeyWake);
            // One-shot handler: clear the flag and disarm.
            self.edge_latched = false;
            self.wake_armed = false;
        }
    }

    fn sleep_for(&mut self, micros: u32) {
        self.record(Event::Sleep(micros));
        self.now += micros as u64;
    }

    fn key_edge_latched(&mut self) -> bool {
        if self.released() {
            self.edge_latched = true;
        }
        self.edge_latched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;
    use crate::transmit::transmit;

    #[test]
    fn frames_decode_back_to_words() {
        let mut sim = SimBoard::new();
        transmit(&mut sim, Frame::from_word(0x3601));
        transmit(&mut sim, Frame::from_word(0x3E15));
        let words: Vec<Option<u16>> = sim.frames().iter().map(SimFrame::word).collect();
        assert_eq!(words, [Some(0x3601), Some(0x3E15)]);
    }

    #[test]
    fn clock_follows_segments() {
        let mut sim = SimBoard::new();
        sim.mark(32);
        sim.space(780);
        assert_eq!(sim.now_us(), 32 * 25 + 780);
    }

    #[test]
    fn key_is_down_only_inside_its_hold() {
        let mut sim = SimBoard::new();
        sim.press_at(1_000, RawScanCode::new(1, 0x2), 50_000);
        sim.arm_key_wake();
        sim.sleep_until_key();
        assert_eq!(sim.now_us(), 1_000);

        sim.drive_rows(0x3F);
        assert_eq!(sim.read_columns(), 0x2);
        assert!(!sim.key_edge_latched());

        sim.sleep_for(60_000);
        sim.discharge_columns();
        assert_eq!(sim.read_columns(), 0);
        assert!(sim.key_edge_latched());
    }

    #[test]
    fn undriven_row_reads_nothing() {
        let mut sim = SimBoard::new();
        sim.press_at(0, RawScanCode::new(4, 0x1), 10_000);
        sim.arm_key_wake();
        sim.sleep_until_key();
        sim.drive_rows(1 << 3);
        assert_eq!(sim.read_columns(), 0);
        sim.drive_rows(1 << 4);
        assert_eq!(sim.read_columns(), 0x1);
    }

    #[test]
    fn press_after_chains_from_previous_end() {
        let mut sim = SimBoard::new();
        sim.press_at(0, RawScanCode::new(0, 0x1), 100);
        sim.press_after(500, RawScanCode::new(0, 0x2), 100);
        assert_eq!(sim.pending(), 2);
        sim.arm_key_wake();
        sim.sleep_until_key();
        sim.arm_key_wake();
        sim.sleep_until_key();
        assert_eq!(sim.now_us(), 600);
        assert_eq!(sim.pending(), 0);
    }

    #[test]
    #[should_panic(expected = "disarmed")]
    fn idle_sleep_requires_armed_wake() {
        let mut sim = SimBoard::new();
        sim.sleep_until_key();
    }
}
