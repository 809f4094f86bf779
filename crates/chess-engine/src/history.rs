//! Move history and the rights derived from it.
//!
//! Castling rights, the en passant target and the move counters are never
//! stored as mutable flags. They are recomputed from the [`Baseline`] of the
//! starting position plus the list of moves played since, so popping a move
//! off the history can never leave a stale flag behind.

use chess_core::{Color, Move, PieceKind, Square};

/// Castling rights flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const WHITE_KINGSIDE: u8 = 0b0001;
    pub const WHITE_QUEENSIDE: u8 = 0b0010;
    pub const BLACK_KINGSIDE: u8 = 0b0100;
    pub const BLACK_QUEENSIDE: u8 = 0b1000;
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    /// Creates new castling rights from flags.
    #[inline]
    pub const fn new(flags: u8) -> Self {
        CastlingRights(flags & 0b1111)
    }

    /// Parses the letters of a FEN castling field ("" or "-" for none).
    pub fn from_fen(letters: &str) -> Self {
        let mut flags = 0u8;
        for c in letters.chars() {
            flags |= match c {
                'K' => Self::WHITE_KINGSIDE,
                'Q' => Self::WHITE_QUEENSIDE,
                'k' => Self::BLACK_KINGSIDE,
                'q' => Self::BLACK_QUEENSIDE,
                _ => 0,
            };
        }
        CastlingRights(flags)
    }

    /// FEN castling field ("-" when empty).
    pub fn to_fen(self) -> String {
        if self.0 == 0 {
            return "-".to_string();
        }
        [
            (Self::WHITE_KINGSIDE, 'K'),
            (Self::WHITE_QUEENSIDE, 'Q'),
            (Self::BLACK_KINGSIDE, 'k'),
            (Self::BLACK_QUEENSIDE, 'q'),
        ]
        .iter()
        .filter(|(flag, _)| self.0 & flag != 0)
        .map(|(_, c)| *c)
        .collect()
    }

    /// Returns true if the given side can castle kingside.
    #[inline]
    pub const fn can_castle_kingside(self, color: Color) -> bool {
        (self.0 & Self::flag(color, true)) != 0
    }

    /// Returns true if the given side can castle queenside.
    #[inline]
    pub const fn can_castle_queenside(self, color: Color) -> bool {
        (self.0 & Self::flag(color, false)) != 0
    }

    /// Removes one castling right.
    #[inline]
    pub fn remove(&mut self, color: Color, kingside: bool) {
        self.0 &= !Self::flag(color, kingside);
    }

    /// Returns the raw flags.
    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    const fn flag(color: Color, kingside: bool) -> u8 {
        match (color, kingside) {
            (Color::White, true) => Self::WHITE_KINGSIDE,
            (Color::White, false) => Self::WHITE_QUEENSIDE,
            (Color::Black, true) => Self::BLACK_KINGSIDE,
            (Color::Black, false) => Self::BLACK_QUEENSIDE,
        }
    }
}

/// Home squares of the king and the relevant rook for one castling right.
pub(crate) const fn castling_homes(color: Color, kingside: bool) -> (Square, Square) {
    match (color, kingside) {
        (Color::White, true) => (Square::E1, Square::H1),
        (Color::White, false) => (Square::E1, Square::A1),
        (Color::Black, true) => (Square::E8, Square::H8),
        (Color::Black, false) => (Square::E8, Square::A8),
    }
}

/// State of the starting position that moves alone cannot reconstruct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Baseline {
    pub side_to_move: Color,
    /// Rights granted by the starting position.
    pub castling: CastlingRights,
    /// En passant target of the starting position.
    pub en_passant: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

impl Default for Baseline {
    fn default() -> Self {
        Baseline {
            side_to_move: Color::White,
            castling: CastlingRights::ALL,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }
}

/// Ordered log of applied moves.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MoveHistory {
    baseline: Baseline,
    moves: Vec<Move>,
}

impl MoveHistory {
    /// Creates an empty history starting from the given baseline.
    pub fn new(baseline: Baseline) -> Self {
        MoveHistory {
            baseline,
            moves: Vec::new(),
        }
    }

    /// Returns the starting baseline.
    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }

    /// Appends an applied move.
    pub fn push(&mut self, m: Move) {
        self.moves.push(m);
    }

    /// Removes and returns the most recent move.
    pub fn pop(&mut self) -> Option<Move> {
        self.moves.pop()
    }

    /// Returns the most recent move.
    pub fn last(&self) -> Option<&Move> {
        self.moves.last()
    }

    /// Drops every move, keeping the baseline.
    pub fn clear(&mut self) {
        self.moves.clear();
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn as_slice(&self) -> &[Move] {
        &self.moves
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.moves.iter()
    }

    /// Side to move after the recorded moves.
    pub fn side_to_move(&self) -> Color {
        if self.moves.len() % 2 == 0 {
            self.baseline.side_to_move
        } else {
            self.baseline.side_to_move.opposite()
        }
    }

    /// Castling rights still available.
    ///
    /// A right survives only if the baseline granted it and no recorded move
    /// started from or landed on the king's or the rook's home square. A rook
    /// that leaves and comes back has therefore lost the right for good.
    pub fn castling_rights(&self) -> CastlingRights {
        let mut rights = self.baseline.castling;
        for color in Color::BOTH {
            for kingside in [true, false] {
                let (king_home, rook_home) = castling_homes(color, kingside);
                let touched = self.moves.iter().any(|m| {
                    m.from == king_home
                        || m.to == king_home
                        || m.from == rook_home
                        || m.to == rook_home
                });
                if touched {
                    rights.remove(color, kingside);
                }
            }
        }
        rights
    }

    /// En passant target square: the square a pawn skipped on the
    /// immediately preceding move.
    pub fn en_passant_target(&self) -> Option<Square> {
        match self.moves.last() {
            None => self.baseline.en_passant,
            Some(m) if m.is_double_push() => m.from.offset(m.piece.color.pawn_direction(), 0),
            Some(_) => None,
        }
    }

    /// Plies since the last capture or pawn move.
    pub fn halfmove_clock(&self) -> u32 {
        let since_reset = self
            .moves
            .iter()
            .rev()
            .position(|m| m.piece.kind == PieceKind::Pawn || m.is_capture());
        match since_reset {
            Some(n) => n as u32,
            None => self.baseline.halfmove_clock + self.moves.len() as u32,
        }
    }

    /// Full move number, incremented after each Black move.
    pub fn fullmove_number(&self) -> u32 {
        let offset = match self.baseline.side_to_move {
            Color::White => 0,
            Color::Black => 1,
        };
        self.baseline.fullmove_number + ((self.moves.len() + offset) / 2) as u32
    }
}

impl<'a> IntoIterator for &'a MoveHistory {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter()
    }
}
