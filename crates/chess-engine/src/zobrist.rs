//! Position keys for repetition detection.
//!
//! A key XORs one random number per occupied (piece, square), plus numbers
//! for Black to move, each castling right and the en passant file. Two
//! positions that differ only in castling rights or the en passant target
//! get different keys.

use crate::board::Board;
use crate::history::CastlingRights;
use chess_core::{Color, Piece, Square};

const PIECE_KEYS: usize = 6 * 2 * 64;
const BLACK_TO_MOVE: usize = PIECE_KEYS;
const CASTLING: usize = BLACK_TO_MOVE + 1;
const EN_PASSANT: usize = CASTLING + 4;
const KEY_COUNT: usize = EN_PASSANT + 8;

/// splitmix64 from a fixed seed, evaluated at compile time.
const KEYS: [u64; KEY_COUNT] = {
    let mut keys = [0u64; KEY_COUNT];
    let mut state: u64 = 0x243F_6A88_85A3_08D3;
    let mut i = 0;
    while i < KEY_COUNT {
        state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        keys[i] = z ^ (z >> 31);
        i += 1;
    }
    keys
};

#[inline]
const fn piece_key(piece: Piece, square: Square) -> u64 {
    let slot = (piece.kind.index() * 2 + piece.color.index()) * 64 + square.index() as usize;
    KEYS[slot]
}

const fn castling_key(rights: CastlingRights) -> u64 {
    let mut key = 0;
    let mut bit = 0;
    while bit < 4 {
        if rights.raw() & (1 << bit) != 0 {
            key ^= KEYS[CASTLING + bit];
        }
        bit += 1;
    }
    key
}

/// Computes the key of a full position.
///
/// The en passant file is hashed whenever a target exists, whether or not
/// a capture is actually available.
pub fn position_key(
    board: &Board,
    side_to_move: Color,
    castling: CastlingRights,
    en_passant: Option<Square>,
) -> u64 {
    let mut key = board
        .pieces()
        .fold(castling_key(castling), |acc, (sq, piece)| acc ^ piece_key(piece, sq));
    if side_to_move == Color::Black {
        key ^= KEYS[BLACK_TO_MOVE];
    }
    if let Some(ep) = en_passant {
        key ^= KEYS[EN_PASSANT + ep.file().index() as usize];
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::PieceKind;
    use std::collections::HashSet;

    #[test]
    fn keys_are_distinct_and_nonzero() {
        let distinct: HashSet<u64> = KEYS.iter().copied().collect();
        assert_eq!(distinct.len(), KEY_COUNT);
        assert!(!distinct.contains(&0));
    }

    #[test]
    fn piece_slots_do_not_overlap() {
        let mut seen = HashSet::new();
        for kind in PieceKind::ALL {
            for color in Color::BOTH {
                for sq in Square::all() {
                    assert!(seen.insert(piece_key(Piece::new(kind, color), sq)));
                }
            }
        }
        assert_eq!(seen.len(), PIECE_KEYS);
    }

    #[test]
    fn position_key_depends_on_every_component() {
        let board = Board::initial();
        let base = position_key(&board, Color::White, CastlingRights::ALL, None);
        assert_eq!(
            base,
            position_key(&board, Color::White, CastlingRights::ALL, None)
        );
        assert_ne!(
            base,
            position_key(&board, Color::Black, CastlingRights::ALL, None)
        );
        assert_ne!(
            base,
            position_key(&board, Color::White, CastlingRights::new(0b0111), None)
        );
        assert_ne!(
            base,
            position_key(
                &board,
                Color::White,
                CastlingRights::ALL,
                Square::from_algebraic("e3")
            )
        );
    }

    #[test]
    fn transpositions_share_a_key() {
        let mut a = Board::initial();
        let mut b = Board::initial();
        let knight = Piece::new(PieceKind::Knight, Color::White);
        let (b1, c3) = (Square::B1, Square::from_algebraic("c3").unwrap());
        a.remove(b1);
        a.set(c3, knight);
        b.set(c3, knight);
        b.remove(b1);
        assert_eq!(
            position_key(&a, Color::Black, CastlingRights::ALL, None),
            position_key(&b, Color::Black, CastlingRights::ALL, None)
        );
    }
}
