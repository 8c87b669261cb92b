//! Decide after each frame whether the key is still held.

use crate::board::BoardConfig;
use crate::hal::{Emitter, Matrix, Power};
use crate::log::debug;
use crate::TransFlags;

/// Result of the check that follows every frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    /// The key is held; send the same frame again after the inter-frame delay.
    Retransmit,
    /// The key was released; the toggle bit has been flipped.
    EndTransmit,
}

/// Park the column lines for the length of a hold and mark the key as held.
pub fn setup_for_release<M: Matrix>(matrix: &mut M, flags: &mut TransFlags) {
    matrix.park_columns();
    flags.held_down = true;
}

/// Sample the columns directly to see whether the key is still down.
///
/// Rows are still all driven from the end of the scan, so any closed key
/// shows on its column.
fn determine_release<M: Matrix>(matrix: &mut M, board: &BoardConfig, flags: &mut TransFlags) {
    matrix.release_columns();
    if matrix.read_columns() & board.column_mask() != 0 {
        setup_for_release(matrix, flags);
    } else {
        flags.held_down = false;
    }
}

/// Check for a release after a frame.
///
/// Without a latched sense-line edge the key is assumed held. With one, the
/// columns are re-sampled. Only a confirmed release stops the carrier timer
/// and flips the toggle bit, so every repeat of a held key carries the same
/// toggle value.
pub fn test_retransmit<B>(board: &mut B, config: &BoardConfig, flags: &mut TransFlags) -> Decision
where
    B: Matrix + Emitter + Power,
{
    if !board.key_edge_latched() {
        return Decision::Retransmit;
    }

    determine_release(board, config, flags);
    if flags.held_down {
        return Decision::Retransmit;
    }

    board.stop();
    flags.toggle = !flags.toggle;
    debug!("released, toggle -> {}", flags.toggle);
    Decision::EndTransmit
}
