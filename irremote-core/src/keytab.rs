//! Key position and command tables, and the resolver between them.
//!
//! A position code packs a scan result into one byte: the low nibble is the
//! row index, the high nibble is the bitmask of columns read on that row.
//! Index `i` in [`KEY_TABLE`] and [`FUNCTION_TABLE`] is the same physical key.

use core::fmt;

use crate::log::trace;
use crate::ErrorFlags;

/// Number of keys on the remote.
pub const NUM_KEYS: usize = 24;

/// Position code of every key, indexed by key identity.
pub static KEY_TABLE: [u8; NUM_KEYS] = [
    // Column 0
    0x10, 0x11, 0x12, 0x13, 0x14, 0x15,
    // Column 1
    0x20, 0x21, 0x22, 0x23, 0x24, 0x25,
    // Column 2
    0x40, 0x41, 0x42, 0x43, 0x44, 0x45,
    // Column 3
    0x80, 0x81, 0x82, 0x83, 0x84, 0x85,
];

/// RC5 command payload of every key, index-aligned with [`KEY_TABLE`].
pub static FUNCTION_TABLE: [u8; NUM_KEYS] = [
    0x01, 0x02, 0x03, 0x04, 0x05, 0x06,
    0x11, 0x12, 0x13, 0x14, 0x15, 0x16,
    0x21, 0x22, 0x23, 0x24, 0x25, 0x26,
    0x31, 0x32, 0x33, 0x34, 0x35, 0x36,
];

/// Raw result of one keypad sweep.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct RawScanCode(u8);

impl RawScanCode {
    pub const NONE: RawScanCode = RawScanCode(0);

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Code for a contact on `row` with `columns` asserted.
    pub const fn new(row: u8, columns: u8) -> Self {
        Self((row & 0x0F) | (columns << 4))
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn row(self) -> u8 {
        self.0 & 0x0F
    }

    pub const fn columns(self) -> u8 {
        self.0 >> 4
    }

    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// OR one row's result into the code.
    pub fn record(&mut self, row: u8, columns: u8) {
        self.0 |= row & 0x0F;
        self.0 |= columns << 4;
    }
}

impl fmt::Display for RawScanCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}

/// A resolved key, always in `0..NUM_KEYS`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyIndex(u8);

impl KeyIndex {
    pub const fn new(index: usize) -> Option<Self> {
        if index < NUM_KEYS {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    pub const fn get(self) -> usize {
        self.0 as usize
    }

    /// Position code the scanner produces for this key.
    pub fn position(self) -> RawScanCode {
        RawScanCode(KEY_TABLE[self.get()])
    }

    /// Command payload sent for this key.
    pub fn command(self) -> u8 {
        FUNCTION_TABLE[self.get()]
    }

    pub fn all() -> impl Iterator<Item = KeyIndex> {
        (0..NUM_KEYS as u8).map(KeyIndex)
    }
}

impl fmt::Display for KeyIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Find the key for a scan code.
///
/// Every entry is compared and the last match wins. When nothing matches,
/// `errors.no_match` is set and `None` is returned.
pub fn lookup(code: RawScanCode, errors: &mut ErrorFlags) -> Option<KeyIndex> {
    let mut found = None;
    for (i, &entry) in KEY_TABLE.iter().enumerate() {
        if entry == code.bits() {
            found = Some(KeyIndex(i as u8));
        }
    }

    if found.is_none() {
        errors.no_match = true;
    }
    trace!("lookup {} -> {:?}", code, found);
    found
}
