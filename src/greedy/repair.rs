//! First-improvement local repair.
//!
//! # Algorithm
//!
//! Scans cartons in input order. For carton `i`:
//! 1. Try moving `i` to each wave `0..K` (other than its own) with room.
//! 2. Try swapping `i` with every carton `j > i` in a different wave, when
//!    both waves stay within capacity.
//!
//! The first move that strictly lowers the fragmentation score is applied
//! and the scan restarts from the first carton. Repair stops when a full
//! scan finds no improving move, when the iteration cap is reached (one
//! applied move = one iteration) or when the deadline passes. The deadline
//! is checked once per scan.
//!
//! Every applied move lowers the score by at least one, so the score after
//! repair never exceeds the score after construction.

use log::debug;
use std::time::Instant;

use super::WaveBoard;

/// A strictly improving move found by a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Improvement {
    Move { carton: usize, wave: usize },
    Swap { i: usize, j: usize },
}

/// Outcome of a repair pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RepairSummary {
    /// Applied moves (single moves plus swaps).
    pub iterations: u64,
    /// Applied single-carton moves.
    pub moves: u64,
    /// Applied pairwise swaps.
    pub swaps: u64,
    /// Stopped on the iteration cap or deadline rather than a local optimum.
    pub budget_hit: bool,
}

/// Runs first-improvement repair on a complete board.
pub(crate) fn repair(
    board: &mut WaveBoard<'_>,
    iteration_limit: u64,
    deadline: Option<Instant>,
) -> RepairSummary {
    let mut summary = RepairSummary::default();

    loop {
        if summary.iterations >= iteration_limit {
            summary.budget_hit = true;
            break;
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            summary.budget_hit = true;
            break;
        }

        match find_improvement(board) {
            Some(Improvement::Move { carton, wave }) => {
                board.relocate(carton, wave);
                summary.moves += 1;
            }
            Some(Improvement::Swap { i, j }) => {
                board.swap(i, j);
                summary.swaps += 1;
            }
            None => break,
        }
        summary.iterations += 1;
    }

    debug!(
        "repair: {} iterations ({} moves, {} swaps), budget hit: {}",
        summary.iterations, summary.moves, summary.swaps, summary.budget_hit
    );
    summary
}

fn find_improvement(board: &WaveBoard<'_>) -> Option<Improvement> {
    let instance = board.instance();
    let n = instance.carton_count();
    let k = instance.wave_count();

    for i in 0..n {
        for wave in 0..k {
            if board.move_fits(i, wave) && board.move_delta(i, wave) < 0 {
                return Some(Improvement::Move { carton: i, wave });
            }
        }
        for j in (i + 1)..n {
            if board.wave_of(i) == board.wave_of(j) {
                continue;
            }
            if board.swap_fits(i, j) && board.swap_delta(i, j) < 0 {
                return Some(Improvement::Swap { i, j });
            }
        }
    }
    None
}
