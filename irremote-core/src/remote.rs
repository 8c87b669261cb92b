//! The press-cycle driver.
//!
//! `Remote` owns the board and all mutable state. Nothing else runs while a
//! cycle is in progress; interrupts only wake the processor, so the flags
//! need no locking.

use crate::board::BoardConfig;
use crate::frame::{self, Frame};
use crate::hal::Board;
use crate::keytab::{self, KeyIndex, RawScanCode};
use crate::log::debug;
use crate::retransmit::{self, Decision};
use crate::scan;
use crate::transmit;
use crate::{ErrorFlags, TransFlags, INTER_FRAME_US};

/// How one press cycle ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Woken, but the scan found no closed contact.
    NoKey,
    /// The scan code is not a known key. Nothing was sent.
    NoMatch(RawScanCode),
    /// `frames` copies of `frame` were sent for `key`.
    Sent {
        key: KeyIndex,
        frame: Frame,
        frames: u32,
    },
}

pub struct Remote<B> {
    board: B,
    config: &'static BoardConfig,
    trans: TransFlags,
    errors: ErrorFlags,
}

impl<B: Board> Remote<B> {
    pub fn new(board: B, config: &'static BoardConfig) -> Self {
        Self {
            board,
            config,
            trans: TransFlags::default(),
            errors: ErrorFlags::new(),
        }
    }

    pub fn config(&self) -> &'static BoardConfig {
        self.config
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    pub fn into_board(self) -> B {
        self.board
    }

    pub fn trans_flags(&self) -> TransFlags {
        self.trans
    }

    /// Errors from the most recent scan.
    pub fn error_flags(&self) -> ErrorFlags {
        self.errors
    }

    /// Serve key presses forever.
    pub fn run(&mut self) -> ! {
        loop {
            self.press_cycle();
        }
    }

    /// Sleep until a key edge, then handle that press to completion.
    pub fn press_cycle(&mut self) -> Outcome {
        self.set_for_press();
        self.board.sleep_until_key();
        debug!("key wake");
        let outcome = self.handle_press();
        debug!("cycle done: {:?}", outcome);
        outcome
    }

    /// Return the keypad to its idle configuration and arm the wake.
    fn set_for_press(&mut self) {
        self.board.release_columns();
        self.board.drive_rows(self.config.row_mask());
        self.board.arm_key_wake();
        self.errors.clear();
        self.trans.held_down = false;
    }

    fn handle_press(&mut self) -> Outcome {
        scan::debounce(&mut self.board);

        let code = scan::scan(&mut self.board, self.config, &mut self.errors);
        if self.errors.no_key {
            return Outcome::NoKey;
        }

        let key = match keytab::lookup(code, &mut self.errors) {
            Some(key) => key,
            None => return Outcome::NoMatch(code),
        };
        debug!("scan {} -> key {}", code, key);

        retransmit::setup_for_release(&mut self.board, &mut self.trans);

        let mut frames = 0;
        loop {
            let frame = frame::encode(key, &self.trans, self.config, &mut self.board);
            transmit::transmit(&mut self.board, frame);
            frames += 1;

            let decision = retransmit::test_retransmit(&mut self.board, self.config, &mut self.trans);
            self.board.sleep_for(INTER_FRAME_US);

            if decision == Decision::EndTransmit {
                return Outcome::Sent { key, frame, frames };
            }
        }
    }
}
