//! Biphase RC5 waveform generation.
//!
//! Each bit is two unequal segments: a `1` is a space followed by a short
//! burst of carrier, a `0` is a burst followed by a space. The segment
//! lengths differ between the two orders because the software overhead after
//! the second half of a bit is larger than after the first; the numbers below
//! already absorb that overhead and must not be rounded.

use crate::frame::Frame;
use crate::hal::Emitter;
use crate::log::trace;

/// Carrier period in microseconds (40 kHz).
pub const CARRIER_PERIOD_US: u16 = 25;
/// Carrier high time per period in microseconds.
pub const CARRIER_HIGH_US: u16 = 7;

/// Bit `1`: leading space.
pub const ONE_SPACE_US: u16 = 780;
/// Bit `1`: trailing carrier burst.
pub const ONE_MARK_CYCLES: u16 = 32;
/// Bit `0`: leading carrier burst.
pub const ZERO_MARK_CYCLES: u16 = 35;
/// Bit `0`: trailing space.
pub const ZERO_SPACE_US: u16 = 765;

/// One half of a bit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    /// Carrier on for this many carrier periods.
    Mark(u16),
    /// Output low for this many microseconds.
    Space(u16),
}

impl Segment {
    /// Nominal duration, before any instruction overhead.
    pub const fn duration_us(self) -> u32 {
        match self {
            Segment::Mark(cycles) => cycles as u32 * CARRIER_PERIOD_US as u32,
            Segment::Space(micros) => micros as u32,
        }
    }

    pub const fn is_mark(self) -> bool {
        matches!(self, Segment::Mark(_))
    }
}

/// The two segments for one bit value, in output order.
pub const fn bit_segments(bit: bool) -> [Segment; 2] {
    if bit {
        [Segment::Space(ONE_SPACE_US), Segment::Mark(ONE_MARK_CYCLES)]
    } else {
        [Segment::Mark(ZERO_MARK_CYCLES), Segment::Space(ZERO_SPACE_US)]
    }
}

/// Iterator over every segment of a frame.
pub fn segments(frame: Frame) -> impl Iterator<Item = Segment> {
    frame.bits().flat_map(bit_segments)
}

/// Send one frame, then stop the carrier timer.
pub fn transmit<E: Emitter>(emitter: &mut E, frame: Frame) {
    trace!("tx {}", frame);
    for segment in segments(frame) {
        match segment {
            Segment::Mark(cycles) => emitter.mark(cycles),
            Segment::Space(micros) => emitter.space(micros),
        }
    }
    emitter.stop();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FRAME_BITS;
    use std::vec::Vec;

    #[derive(Default)]
    struct Recorder {
        segments: Vec<Segment>,
        stops: usize,
    }

    impl Emitter for Recorder {
        fn mark(&mut self, cycles: u16) {
            self.segments.push(Segment::Mark(cycles));
        }

        fn space(&mut self, micros: u16) {
            self.segments.push(Segment::Space(micros));
        }

        fn stop(&mut self) {
            self.stops += 1;
        }
    }

    #[test]
    fn emits_two_segments_per_bit() {
        let frame = Frame::new(25, 0x13, true);
        let mut rec = Recorder::default();
        transmit(&mut rec, frame);

        assert_eq!(rec.segments.len(), 2 * FRAME_BITS);
        assert_eq!(rec.stops, 1);
        for (pair, bit) in rec.segments.chunks(2).zip(frame.bits()) {
            assert_eq!(pair, &bit_segments(bit));
        }
    }

    #[test]
    fn timing_table() {
        assert_eq!(
            bit_segments(true),
            [Segment::Space(780), Segment::Mark(32)]
        );
        assert_eq!(
            bit_segments(false),
            [Segment::Mark(35), Segment::Space(765)]
        );
    }

    #[test]
    fn start_bits_open_with_a_space() {
        // S1 is always 1, so every frame starts with the carrier off.
        let first = segments(Frame::new(0, 0, false)).next();
        assert_eq!(first, Some(Segment::Space(ONE_SPACE_US)));
    }

    #[test]
    fn nominal_bit_lengths() {
        assert_eq!(Segment::Mark(32).duration_us(), 800);
        let one: u32 = bit_segments(true).iter().map(|s| s.duration_us()).sum();
        let zero: u32 = bit_segments(false).iter().map(|s| s.duration_us()).sum();
        assert_eq!(one, 1580);
        assert_eq!(zero, 1640);
    }
}
