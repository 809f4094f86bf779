//! Side to move.

use crate::Rank;
use std::fmt;

/// White moves first and plays up the board, from rank 1 towards rank 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    pub const BOTH: [Color; 2] = [Color::White, Color::Black];

    #[inline]
    pub const fn opposite(self) -> Self {
        Self::BOTH[1 - self as usize]
    }

    /// 0 for White, 1 for Black.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Rank delta of a single pawn push.
    #[inline]
    pub const fn pawn_direction(self) -> i8 {
        1 - 2 * self as i8
    }

    /// Rank `n` (0-7) counted from this side's edge of the board.
    #[inline]
    pub const fn relative_rank(self, n: u8) -> Rank {
        let index = match self {
            Color::White => n & 7,
            Color::Black => 7 - (n & 7),
        };
        Rank::ALL[index as usize]
    }

    #[inline]
    pub const fn back_rank(self) -> Rank {
        self.relative_rank(0)
    }

    /// Where this side's pawns stand before moving, and may double-push from.
    #[inline]
    pub const fn pawn_rank(self) -> Rank {
        self.relative_rank(1)
    }

    #[inline]
    pub const fn promotion_rank(self) -> Rank {
        self.relative_rank(7)
    }

    #[inline]
    pub const fn to_fen_char(self) -> char {
        ['w', 'b'][self as usize]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(["White", "Black"][self.index()])
    }
}
