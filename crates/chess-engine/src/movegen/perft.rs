//! Leaf-node counting over the legal move tree.
//!
//! The totals for a handful of well-known positions are published, so any
//! disagreement points at a move generation bug.

use super::legal_moves;
use crate::board::Board;
use crate::history::MoveHistory;
use chess_core::Move;

/// Plays every legal move in turn, calls `visit` on the child position and
/// takes the move back again.
fn for_each_child(
    board: &mut Board,
    history: &mut MoveHistory,
    mut visit: impl FnMut(&Move, &mut Board, &mut MoveHistory),
) {
    let side = history.side_to_move();
    for m in legal_moves(board, history, side).iter() {
        board.apply(m);
        history.push(*m);
        visit(m, board, history);
        history.pop();
        board.undo_apply(m);
    }
}

/// Number of positions reachable in exactly `depth` plies.
///
/// `board` and `history` are left as they were found.
pub fn perft(board: &mut Board, history: &mut MoveHistory, depth: u32) -> u64 {
    match depth {
        0 => 1,
        1 => legal_moves(board, history, history.side_to_move()).len() as u64,
        _ => {
            let mut nodes = 0;
            for_each_child(board, history, |_, board, history| {
                nodes += perft(board, history, depth - 1);
            });
            nodes
        }
    }
}

/// Per-root-move subtotals, keyed by UCI notation and sorted.
pub fn perft_divide(board: &mut Board, history: &mut MoveHistory, depth: u32) -> Vec<(String, u64)> {
    let mut split = Vec::new();
    let below = depth.saturating_sub(1);
    for_each_child(board, history, |m, board, history| {
        split.push((m.to_uci(), perft(board, history, below)));
    });
    split.sort();
    split
}
