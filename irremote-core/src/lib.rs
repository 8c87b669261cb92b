//! Control core for a battery-powered RC5 infrared remote.
//!
//! This crate is `no_std`-compatible so it can be used by both the AVR
//! firmware and the native CLI tool. Everything that touches hardware goes
//! through the traits in [`hal`]; the firmware implements them with register
//! access, and [`sim::SimBoard`] implements them over a virtual clock.
//!
//! One press cycle runs:
//! idle sleep -> key wake -> debounce -> scan -> resolve -> encode ->
//! transmit -> retransmit decision -> (inter-frame delay, loop | idle).

#![no_std]

#[cfg(any(feature = "std", test))]
extern crate std;

#[cfg(feature = "log")]
mod log {
    pub use log::{debug, trace};
}

#[cfg(not(feature = "log"))]
mod log {
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }
    pub(crate) use debug;
    pub(crate) use trace;
}

pub mod board;
pub mod frame;
pub mod hal;
pub mod keytab;
pub mod remote;
pub mod retransmit;
pub mod scan;
#[cfg(feature = "std")]
pub mod sim;
pub mod transmit;

pub use board::{AddressMap, BoardConfig};
pub use frame::Frame;
pub use keytab::{KeyIndex, RawScanCode};
pub use remote::{Outcome, Remote};
pub use retransmit::Decision;
pub use transmit::Segment;

/// Debounce delay after the key wake interrupt, in microseconds.
pub const DEBOUNCE_US: u32 = 40_000;

/// Delay after every frame before the next one may start, in microseconds.
pub const INTER_FRAME_US: u32 = 89_000;

/// Flags that survive across the transmit/retransmit loop.
///
/// `toggle` also survives across presses; it is the only state a receiver
/// uses to tell a new press from a held key.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TransFlags {
    /// The key is still down for the current transmit loop.
    pub held_down: bool,
    /// RC5 toggle bit for the next frame.
    pub toggle: bool,
}

/// Per-cycle scan errors. Cleared when the next press cycle is prepared.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorFlags {
    /// The scan found no closed contact.
    pub no_key: bool,
    /// The scan code is not in the key table.
    pub no_match: bool,
}

impl ErrorFlags {
    pub const fn new() -> Self {
        Self {
            no_key: false,
            no_match: false,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn is_clear(&self) -> bool {
        !self.no_key && !self.no_match
    }
}
