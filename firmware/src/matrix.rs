//! Key matrix and selector switch pins.
//!
//! Pin mapping on Teensy 2.0 (ATmega32U4):
//!   Rows (active-high outputs):            PD0-PD5
//!   Columns (inputs, external pull-downs): PB0-PB3 (PCINT0-PCINT3)
//!   Selector lines (inputs, pull-downs):   PF0 (line 0), PF1 (line 1)

use avr_device::atmega32u4::Peripherals;
use irremote_core::hal::{Matrix, Selector};

use crate::Teensy;

const ROW_PINS: u8 = 0x3F;
pub const COLUMN_PINS: u8 = 0x0F;
const SELECTOR_PINS: u8 = 0x03;

/// Initialize the keypad and selector pins: rows driven low, columns and
/// selector lines floating inputs (the board supplies the pull-downs).
pub fn init_gpio(dp: &Peripherals) {
    let portb = &dp.PORTB;
    let portd = &dp.PORTD;
    let portf = &dp.PORTF;

    portd.ddrd.modify(|r, w| unsafe { w.bits(r.bits() | ROW_PINS) });
    portd.portd.modify(|r, w| unsafe { w.bits(r.bits() & !ROW_PINS) });

    portb.ddrb.modify(|r, w| unsafe { w.bits(r.bits() & !COLUMN_PINS) });
    portb.portb.modify(|r, w| unsafe { w.bits(r.bits() & !COLUMN_PINS) });

    portf.ddrf.modify(|r, w| unsafe { w.bits(r.bits() & !SELECTOR_PINS) });
    portf.portf.modify(|r, w| unsafe { w.bits(r.bits() & !SELECTOR_PINS) });
}

impl Matrix for Teensy {
    fn drive_rows(&mut self, mask: u8) {
        self.dp
            .PORTD
            .portd
            .modify(|r, w| unsafe { w.bits((r.bits() & !ROW_PINS) | (mask & ROW_PINS)) });
    }

    fn discharge_columns(&mut self) {
        let portb = &self.dp.PORTB;
        portb.portb.modify(|r, w| unsafe { w.bits(r.bits() & !COLUMN_PINS) });
        portb.ddrb.modify(|r, w| unsafe { w.bits(r.bits() | COLUMN_PINS) });
        tiny_delay();
        portb.ddrb.modify(|r, w| unsafe { w.bits(r.bits() & !COLUMN_PINS) });
    }

    fn read_columns(&mut self) -> u8 {
        // Let the driven row reach the column inputs
        tiny_delay();
        self.dp.PORTB.pinb.read().bits() & COLUMN_PINS
    }

    fn park_columns(&mut self) {
        let portb = &self.dp.PORTB;
        portb.ddrb.modify(|r, w| unsafe { w.bits(r.bits() | COLUMN_PINS) });
        portb.portb.modify(|r, w| unsafe { w.bits(r.bits() | COLUMN_PINS) });
    }

    fn release_columns(&mut self) {
        let portb = &self.dp.PORTB;
        portb.portb.modify(|r, w| unsafe { w.bits(r.bits() & !COLUMN_PINS) });
        portb.ddrb.modify(|r, w| unsafe { w.bits(r.bits() & !COLUMN_PINS) });
    }
}

impl Selector for Teensy {
    fn read_selector(&mut self) -> u8 {
        self.dp.PORTF.pinf.read().bits() & SELECTOR_PINS
    }
}

/// Short delay for pin settling (~5us at 16MHz).
#[inline(always)]
fn tiny_delay() {
    for _ in 0..20u8 {
        unsafe { core::arch::asm!("nop") };
    }
}
