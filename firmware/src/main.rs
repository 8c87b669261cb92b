//! RC5 infrared remote firmware for ATmega32U4 (Teensy 2.0).
//!
//! The press-cycle logic lives in `irremote-core`; this crate only provides
//! the register-level board:
//! - 6x4 key matrix (rows PD0-PD5, columns PB0-PB3 with pin-change wake)
//! - address selector switches on PF0/PF1
//! - IR LED on PB5, driven by Timer1 (OC1A) for the 40kHz carrier
//! - power-down between presses, idle sleep during every timed wait

#![no_std]
#![no_main]
#![feature(abi_avr_interrupt)]
#![feature(asm_experimental_arch)]

mod carrier;
mod matrix;
mod power;

use avr_device::atmega32u4::Peripherals;
use irremote_core::board::{self, BoardConfig};
use irremote_core::Remote;

#[cfg(feature = "fixed-address")]
static BOARD: &BoardConfig = &board::FIXED_ADDRESS;
#[cfg(not(feature = "fixed-address"))]
static BOARD: &BoardConfig = &board::DIP_SELECT;

/// The Teensy and everything wired to it.
pub struct Teensy {
    dp: Peripherals,
}

/// Nothing to report a panic to; spin until reset.
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    loop {}
}

/// Bring up the board, then hand it to the press-cycle loop.
#[no_mangle]
pub extern "C" fn main() -> ! {
    let dp = unsafe { Peripherals::steal() };

    avr_device::interrupt::disable();
    power::disable_watchdog(&dp);

    // Disable clock prescaler (CLKPR), run at the full 16MHz
    dp.CPU.clkpr.write(|w| w.clkpce().set_bit());
    dp.CPU.clkpr.write(|w| unsafe { w.bits(0) });

    power::shut_down_unused(&dp);
    matrix::init_gpio(&dp);
    carrier::init(&dp);

    unsafe { avr_device::interrupt::enable() };

    let mut remote = Remote::new(Teensy { dp }, BOARD);
    remote.run()
}
