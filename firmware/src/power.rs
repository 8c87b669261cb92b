//! Sleep modes, wake interrupts and Timer1 waits.
//!
//! Idle between presses is power-down, left only through the column
//! pin-change interrupt. Every timed wait (debounce, inter-frame delay, each
//! half bit) runs Timer1 and sleeps in idle mode until enough Timer1
//! interrupts have been counted.

use core::cell::Cell;

use avr_device::atmega32u4::Peripherals;
use avr_device::interrupt::Mutex;
use irremote_core::hal::Power;

use crate::matrix::COLUMN_PINS;
use crate::Teensy;

// SMCR: SE plus the sleep mode select bits
const SLEEP_IDLE: u8 = 0x01;
const SLEEP_POWER_DOWN: u8 = 0x05;

// PCICR / PCIFR
const PCIE0: u8 = 0x01;
const PCIF0: u8 = 0x01;

// TCCR1B
pub const WGM12: u8 = 0x08;
pub const CS_DIV1: u8 = 0x01;
const CS_DIV64: u8 = 0x03;

// TIMSK1 / TIFR1
pub const TOIE1: u8 = 0x01;
pub const OCIE1A: u8 = 0x02;
pub const TIFR1_ALL: u8 = 0x2F;

/// Microseconds per Timer1 tick with the clk/64 prescaler.
const SLOW_TICK_US: u32 = 4;

/// Set by every Timer1 interrupt, consumed by `wait_ticks`.
static TIMER_TICK: Mutex<Cell<bool>> = Mutex::new(Cell::new(false));

#[avr_device::interrupt(atmega32u4)]
fn PCINT0() {
    // One-shot: stay disabled until the next press cycle re-arms it.
    let dp = unsafe { Peripherals::steal() };
    dp.EXINT.pcicr.write(|w| unsafe { w.bits(0) });
    dp.EXINT.pcifr.write(|w| unsafe { w.bits(PCIF0) });
}

#[avr_device::interrupt(atmega32u4)]
fn TIMER1_COMPA() {
    avr_device::interrupt::free(|cs| TIMER_TICK.borrow(cs).set(true));
}

#[avr_device::interrupt(atmega32u4)]
fn TIMER1_OVF() {
    avr_device::interrupt::free(|cs| TIMER_TICK.borrow(cs).set(true));
}

/// Turn the watchdog off; the bootloader may have left it running.
pub fn disable_watchdog(dp: &Peripherals) {
    dp.CPU.mcusr.modify(|r, w| unsafe { w.bits(r.bits() & !0x08) }); // WDRF
    dp.WDT.wdtcsr.write(|w| unsafe { w.bits(0x18) }); // WDCE | WDE
    dp.WDT.wdtcsr.write(|w| unsafe { w.bits(0) });
}

/// Power off every peripheral except Timer1 and the GPIO ports.
pub fn shut_down_unused(dp: &Peripherals) {
    // PRR0: TWI, Timer0, SPI, ADC
    dp.CPU.prr0.write(|w| unsafe { w.bits(0xA5) });
    // PRR1: USB, Timer4, Timer3, USART1
    dp.CPU.prr1.write(|w| unsafe { w.bits(0x99) });
    // Analog comparator off (ACD)
    dp.AC.acsr.write(|w| unsafe { w.bits(0x80) });
}

/// Sleep in `mode` until the next interrupt. Interrupts must be disabled by
/// the caller; they are enabled on return.
fn sleep(dp: &Peripherals, mode: u8) {
    dp.CPU.smcr.write(|w| unsafe { w.bits(mode) });
    // The instruction after `sei` always runs before a pending interrupt,
    // so a wake that fired after the caller's check is not lost.
    unsafe { core::arch::asm!("sei", "sleep") };
    dp.CPU.smcr.write(|w| unsafe { w.bits(0) });
}

fn take_tick() -> bool {
    avr_device::interrupt::free(|cs| TIMER_TICK.borrow(cs).replace(false))
}

/// Count `ticks` Timer1 interrupts, sleeping in idle mode between them.
pub fn wait_ticks(dp: &Peripherals, ticks: u16) {
    let mut remaining = ticks;
    while remaining > 0 {
        avr_device::interrupt::disable();
        if take_tick() {
            remaining -= 1;
            continue;
        }
        sleep(dp, SLEEP_IDLE);
    }
    unsafe { avr_device::interrupt::enable() };
}

/// Stop Timer1, detach OC1A and clear its interrupts.
pub fn stop_timer(dp: &Peripherals) {
    let tc1 = &dp.TC1;
    tc1.tccr1b.write(|w| unsafe { w.bits(0) });
    tc1.tccr1a.write(|w| unsafe { w.bits(0) });
    tc1.timsk1.write(|w| unsafe { w.bits(0) });
    tc1.tcnt1.write(|w| unsafe { w.bits(0) });
    tc1.tifr1.write(|w| unsafe { w.bits(TIFR1_ALL) });
    avr_device::interrupt::free(|cs| TIMER_TICK.borrow(cs).set(false));
}

/// Run Timer1 in CTC mode for one period of `top + 1` ticks at the given
/// clock select and wait for it.
pub fn one_shot(dp: &Peripherals, clock_select: u8, top: u16) {
    let tc1 = &dp.TC1;
    stop_timer(dp);
    tc1.ocr1a.write(|w| unsafe { w.bits(top) });
    tc1.timsk1.write(|w| unsafe { w.bits(OCIE1A) });
    tc1.tccr1b.write(|w| unsafe { w.bits(WGM12 | clock_select) });
    wait_ticks(dp, 1);
    stop_timer(dp);
}

impl Power for Teensy {
    fn arm_key_wake(&mut self) {
        let exint = &self.dp.EXINT;
        exint.pcmsk0.write(|w| unsafe { w.bits(COLUMN_PINS) });
        exint.pcifr.write(|w| unsafe { w.bits(PCIF0) });
        exint.pcicr.write(|w| unsafe { w.bits(PCIE0) });
    }

    fn sleep_until_key(&mut self) {
        loop {
            avr_device::interrupt::disable();
            // The handler clears PCIE0 when it runs
            if self.dp.EXINT.pcicr.read().bits() & PCIE0 == 0 {
                unsafe { avr_device::interrupt::enable() };
                return;
            }
            sleep(&self.dp, SLEEP_POWER_DOWN);
        }
    }

    fn sleep_for(&mut self, micros: u32) {
        let mut ticks = micros / SLOW_TICK_US;
        while ticks > 0 {
            let chunk = ticks.min(0x1_0000);
            one_shot(&self.dp, CS_DIV64, (chunk - 1) as u16);
            ticks -= chunk;
        }
    }

    fn key_edge_latched(&mut self) -> bool {
        self.dp.EXINT.pcifr.read().bits() & PCIF0 != 0
    }
}
