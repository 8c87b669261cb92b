//! RC5 frame assembly.
//!
//! The 14-bit word is, MSB first:
//!
//! ```text
//!  13  12   11   10..6     5..0
//! [S1][S2][ T ][address][command]
//! ```
//!
//! The word is kept shifted left by two so the transmitter can always read
//! bit 15 and shift.

use core::fmt;

use crate::board::BoardConfig;
use crate::hal::Selector;
use crate::keytab::KeyIndex;
use crate::log::debug;
use crate::TransFlags;

/// Bits sent per frame.
pub const FRAME_BITS: usize = 14;

const START_BITS: u16 = 0x3000;
const TOGGLE_BIT: u16 = 0x0800;
const ADDRESS_SHIFT: u16 = 6;
const ADDRESS_MASK: u16 = 0x1F;
const COMMAND_MASK: u16 = 0x3F;
/// Left shift that puts S1 in bit 15.
const ALIGN_SHIFT: u16 = 2;

/// One encoded RC5 frame, aligned for MSB-first transmission.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Frame(u16);

impl Frame {
    pub fn new(address: u8, command: u8, toggle: bool) -> Self {
        let mut word = START_BITS;
        word |= (address as u16 & ADDRESS_MASK) << ADDRESS_SHIFT;
        word |= command as u16 & COMMAND_MASK;
        if toggle {
            word |= TOGGLE_BIT;
        }
        Self(word << ALIGN_SHIFT)
    }

    /// Rebuild a frame from its 14-bit word.
    pub const fn from_word(word: u16) -> Self {
        Self((word & 0x3FFF) << ALIGN_SHIFT)
    }

    /// The 14-bit word as sent on air.
    pub const fn word(self) -> u16 {
        self.0 >> ALIGN_SHIFT
    }

    /// The word shifted so the first bit sent is bit 15.
    pub const fn aligned(self) -> u16 {
        self.0
    }

    pub const fn address(self) -> u8 {
        ((self.word() >> ADDRESS_SHIFT) & ADDRESS_MASK) as u8
    }

    pub const fn command(self) -> u8 {
        (self.word() & COMMAND_MASK) as u8
    }

    pub const fn toggle(self) -> bool {
        self.word() & TOGGLE_BIT != 0
    }

    /// The bits in transmission order.
    pub fn bits(self) -> Bits {
        Bits {
            value: self.0,
            remaining: FRAME_BITS as u8,
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:014b}", self.word())
    }
}

/// MSB-first iterator over the 14 bits of a [`Frame`].
#[derive(Clone, Debug)]
pub struct Bits {
    value: u16,
    remaining: u8,
}

impl Iterator for Bits {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        if self.remaining == 0 {
            return None;
        }
        let bit = self.value & 0x8000 != 0;
        self.value <<= 1;
        self.remaining -= 1;
        Some(bit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Bits {}

/// Build the frame for `key` with the current toggle state.
///
/// The selector lines are sampled on every call when the board uses them, so
/// flipping a switch while a key is held changes the address of the next
/// repeat.
pub fn encode<S: Selector>(
    key: KeyIndex,
    flags: &TransFlags,
    board: &BoardConfig,
    selector: &mut S,
) -> Frame {
    let state = if board.address_map.uses_selector() {
        selector.read_selector() & 0x03
    } else {
        0
    };
    let address = board.address_map.address(state);
    let frame = Frame::new(address, key.command(), flags.toggle);
    debug!(
        "key {} -> frame 0x{:04X} (addr {}, cmd 0x{:02X}, toggle {})",
        key,
        frame.word(),
        address,
        key.command(),
        flags.toggle
    );
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{DIP_SELECT, FIXED_ADDRESS};
    use std::vec::Vec;

    struct Dip(u8);

    impl Selector for Dip {
        fn read_selector(&mut self) -> u8 {
            self.0
        }
    }

    fn key(i: usize) -> KeyIndex {
        KeyIndex::new(i).unwrap()
    }

    #[test]
    fn layout_matches_packed_constants() {
        // Start bits 0x3000, address 24 = 0x0600, command 0x01.
        let frame = Frame::new(24, 0x01, false);
        assert_eq!(frame.word(), 0x3601);
        assert_eq!(frame.aligned(), 0x3601 << 2);

        let toggled = Frame::new(24, 0x01, true);
        assert_eq!(toggled.word(), 0x3E01);
    }

    #[test]
    fn selector_addresses_land_in_frame() {
        let expected = [0x3600, 0x3640, 0x3700, 0x36C0];
        let mut seen = Vec::new();
        for state in 0..4u8 {
            let frame = encode(key(0), &TransFlags::default(), &DIP_SELECT, &mut Dip(state));
            assert_eq!(frame.word() & !0x3F, expected[state as usize]);
            seen.push(frame.address());
        }
        assert_eq!(seen, [24, 25, 28, 27]);
    }

    #[test]
    fn fixed_board_ignores_selector() {
        for state in 0..4u8 {
            let frame = encode(key(5), &TransFlags::default(), &FIXED_ADDRESS, &mut Dip(state));
            assert_eq!(frame.address(), 24);
            assert_eq!(frame.command(), 0x06);
        }
    }

    #[test]
    fn command_comes_from_function_table() {
        for k in KeyIndex::all() {
            let frame = encode(k, &TransFlags::default(), &DIP_SELECT, &mut Dip(0));
            assert_eq!(frame.command(), crate::keytab::FUNCTION_TABLE[k.get()]);
        }
    }

    #[test]
    fn toggle_flag_sets_toggle_bit() {
        let flags = TransFlags {
            held_down: true,
            toggle: true,
        };
        let frame = encode(key(12), &flags, &DIP_SELECT, &mut Dip(3));
        assert!(frame.toggle());
        assert_eq!(frame.address(), 27);
        assert_eq!(frame.command(), 0x21);
    }

    #[test]
    fn bits_are_msb_first_and_fourteen_long() {
        let frame = Frame::from_word(0x3601);
        let bits: Vec<bool> = frame.bits().collect();
        assert_eq!(bits.len(), FRAME_BITS);
        assert_eq!(frame.bits().len(), FRAME_BITS);
        // 11 0 11000 000001
        let expected = [
            true, true, false, true, true, false, false, false, false, false, false, false,
            false, true,
        ];
        assert_eq!(bits, expected);
    }

    #[test]
    fn display_is_binary_word() {
        assert_eq!(std::format!("{}", Frame::from_word(0x3601)), "11011000000001");
    }
}
