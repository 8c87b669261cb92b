//! Keypad sweep and the fixed debounce delay.

use crate::board::BoardConfig;
use crate::hal::{Matrix, Power};
use crate::keytab::RawScanCode;
use crate::log::trace;
use crate::{ErrorFlags, DEBOUNCE_US};

/// Sleep through contact bounce after the wake interrupt.
///
/// This is a plain delay; the keypad is not re-sampled afterwards.
pub fn debounce<P: Power>(power: &mut P) {
    power.sleep_for(DEBOUNCE_US);
}

/// Sweep every row once and build the raw position code.
///
/// Before each row is driven the column lines are discharged, otherwise a
/// key seen on the previous row can read again on this one. Every row that
/// shows a contact is ORed into the code. A zero result sets
/// `errors.no_key`. All rows are driven again on return so a release can be
/// sensed.
pub fn scan<M: Matrix>(matrix: &mut M, board: &BoardConfig, errors: &mut ErrorFlags) -> RawScanCode {
    let mut code = RawScanCode::NONE;

    for row in 0..board.rows {
        matrix.drive_rows(0);
        matrix.discharge_columns();
        matrix.drive_rows(1 << row);

        let columns = matrix.read_columns() & board.column_mask();
        if columns != 0 {
            trace!("row {} columns {:04b}", row, columns);
            code.record(row, columns);
        }
    }

    if code.is_none() {
        errors.no_key = true;
    }

    matrix.drive_rows(board.row_mask());
    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{DIP_SELECT, FIXED_ADDRESS};
    use crate::keytab::KeyIndex;
    use std::vec::Vec;

    /// A matrix with one closed key whose column lines keep their charge
    /// until discharged.
    struct Fake {
        key: Option<RawScanCode>,
        rows: u8,
        charge: u8,
        drives: Vec<u8>,
        discharges: usize,
    }

    impl Fake {
        fn new(key: Option<RawScanCode>) -> Self {
            Self {
                key,
                rows: 0,
                charge: 0,
                drives: Vec::new(),
                discharges: 0,
            }
        }
    }

    impl Matrix for Fake {
        fn drive_rows(&mut self, mask: u8) {
            self.rows = mask;
            self.drives.push(mask);
        }

        fn discharge_columns(&mut self) {
            self.charge = 0;
            self.discharges += 1;
        }

        fn read_columns(&mut self) -> u8 {
            let live = match self.key {
                Some(code) if self.rows & (1 << code.row()) != 0 => code.columns(),
                _ => 0,
            };
            self.charge |= live;
            self.charge
        }

        fn park_columns(&mut self) {}

        fn release_columns(&mut self) {}
    }

    #[test]
    fn every_key_scans_to_its_position() {
        for key in KeyIndex::all() {
            let mut fake = Fake::new(Some(key.position()));
            let mut errors = ErrorFlags::new();
            assert_eq!(scan(&mut fake, &DIP_SELECT, &mut errors), key.position());
            assert!(errors.is_clear());
        }
    }

    #[test]
    fn nothing_pressed_sets_no_key() {
        let mut fake = Fake::new(None);
        let mut errors = ErrorFlags::new();
        assert!(scan(&mut fake, &DIP_SELECT, &mut errors).is_none());
        assert!(errors.no_key);
        assert!(!errors.no_match);
    }

    #[test]
    fn rows_are_one_hot_then_all_driven() {
        let mut fake = Fake::new(None);
        scan(&mut fake, &DIP_SELECT, &mut ErrorFlags::new());

        let expected: Vec<u8> = (0..6)
            .flat_map(|row| [0, 1 << row])
            .chain([0x3F])
            .collect();
        assert_eq!(fake.drives, expected);
        assert_eq!(fake.discharges, 6);
    }

    #[test]
    fn discharge_prevents_carry_over() {
        // Key on row 0; without discharge its charge would also show on
        // rows 1..5 and OR the row bits into garbage.
        let key = KeyIndex::new(0).unwrap();
        let mut fake = Fake::new(Some(key.position()));
        let code = scan(&mut fake, &DIP_SELECT, &mut ErrorFlags::new());
        assert_eq!(code.bits(), 0x10);
    }

    #[test]
    fn unwired_column_is_masked() {
        // Column 3 does not exist on the fixed board.
        let mut fake = Fake::new(Some(RawScanCode::new(2, 0x8)));
        let mut errors = ErrorFlags::new();
        assert!(scan(&mut fake, &FIXED_ADDRESS, &mut errors).is_none());
        assert!(errors.no_key);
    }
}
