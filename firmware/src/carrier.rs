//! IR LED drive on PB5 (OC1A).
//!
//! Marks run Timer1 in fast PWM mode with ICR1 as TOP, giving the 40kHz
//! carrier on OC1A; every overflow is one carrier period. Spaces detach OC1A
//! so the pin falls back to its PORTB value (low) and time out in CTC mode.

use avr_device::atmega32u4::Peripherals;
use irremote_core::hal::Emitter;
use irremote_core::transmit::{CARRIER_HIGH_US, CARRIER_PERIOD_US};

use crate::power::{self, CS_DIV1, TIFR1_ALL, TOIE1, WGM12};
use crate::Teensy;

const IR_LED: u8 = 0x20;

/// Timer1 ticks per microsecond at 16MHz with no prescaler.
const TICKS_PER_US: u16 = 16;

const CARRIER_TOP: u16 = CARRIER_PERIOD_US * TICKS_PER_US - 1;
const CARRIER_COMPARE: u16 = CARRIER_HIGH_US * TICKS_PER_US - 1;

// TCCR1A / TCCR1B bits for mode 14 (fast PWM, TOP = ICR1), clear OC1A on match
const COM1A1: u8 = 0x80;
const WGM11: u8 = 0x02;
const WGM13: u8 = 0x10;

/// IR LED pin as output, held low.
pub fn init(dp: &Peripherals) {
    let portb = &dp.PORTB;
    portb.portb.modify(|r, w| unsafe { w.bits(r.bits() & !IR_LED) });
    portb.ddrb.modify(|r, w| unsafe { w.bits(r.bits() | IR_LED) });
    power::stop_timer(dp);
}

impl Emitter for Teensy {
    fn mark(&mut self, cycles: u16) {
        let tc1 = &self.dp.TC1;
        power::stop_timer(&self.dp);
        tc1.icr1.write(|w| unsafe { w.bits(CARRIER_TOP) });
        tc1.ocr1a.write(|w| unsafe { w.bits(CARRIER_COMPARE) });
        tc1.tifr1.write(|w| unsafe { w.bits(TIFR1_ALL) });
        tc1.timsk1.write(|w| unsafe { w.bits(TOIE1) });
        tc1.tccr1a.write(|w| unsafe { w.bits(COM1A1 | WGM11) });
        tc1.tccr1b.write(|w| unsafe { w.bits(WGM13 | WGM12 | CS_DIV1) });
        power::wait_ticks(&self.dp, cycles);
    }

    fn space(&mut self, micros: u16) {
        let top = (micros as u32 * TICKS_PER_US as u32).saturating_sub(1).min(0xFFFF);
        power::one_shot(&self.dp, CS_DIV1, top as u16);
    }

    fn stop(&mut self) {
        power::stop_timer(&self.dp);
        self.dp
            .PORTB
            .portb
            .modify(|r, w| unsafe { w.bits(r.bits() & !IR_LED) });
    }
}
