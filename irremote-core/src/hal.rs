//! Hardware seams.
//!
//! The firmware implements these with direct register access; the host
//! simulator implements them over a virtual clock. Every call that waits is
//! expected to sleep the processor, never spin.

/// Row drive and column sense lines of the key matrix.
///
/// Rows are active-high outputs. Columns are inputs with pull-downs, so a
/// closed key on a driven row reads as a set column bit.
pub trait Matrix {
    /// Drive exactly the rows in `mask` high, all other rows low.
    fn drive_rows(&mut self, mask: u8);

    /// Briefly drive the column lines low as outputs, then return them to
    /// inputs. Removes charge left on the lines by the previous row.
    fn discharge_columns(&mut self);

    /// Sample the column lines, bit `n` = column `n`.
    fn read_columns(&mut self) -> u8;

    /// Drive the column lines high as outputs while a key is held, so the
    /// closed contact does not draw current through a pull-down.
    fn park_columns(&mut self);

    /// Return the column lines to pulled-down inputs.
    fn release_columns(&mut self);
}

/// The two address selector lines.
pub trait Selector {
    /// Selector state as `line1 << 1 | line0`.
    fn read_selector(&mut self) -> u8;
}

/// Carrier-modulated IR emitter.
pub trait Emitter {
    /// Output the carrier for `cycles` carrier periods.
    fn mark(&mut self, cycles: u16);

    /// Hold the output low for `micros` microseconds.
    fn space(&mut self, micros: u16);

    /// Stop and clear the carrier timer; the output is left low.
    fn stop(&mut self);
}

/// Sleep states and wake sources.
pub trait Power {
    /// Clear any pending key edge and enable the key edge wake interrupt.
    fn arm_key_wake(&mut self);

    /// Enter the deepest sleep until the key edge interrupt fires. The
    /// interrupt disables itself, so it has to be re-armed before the next
    /// call.
    fn sleep_until_key(&mut self);

    /// Light sleep, woken only by the timer, for `micros` microseconds.
    fn sleep_for(&mut self, micros: u32);

    /// Whether a transition on a sense line has latched since the wake
    /// interrupt was last armed or last fired. The flag latches even while
    /// the interrupt itself is disabled.
    fn key_edge_latched(&mut self) -> bool;
}

/// Everything the press cycle needs from a board.
pub trait Board: Matrix + Selector + Emitter + Power {}

impl<T: Matrix + Selector + Emitter + Power> Board for T {}
