//! Piece placement.
//!
//! [`Board`] is a plain 64-entry mailbox. It knows how to apply and revert
//! the board delta of a [`Move`] and how to answer attack queries, but it
//! never checks legality; that is the move generator's job.

use crate::movegen::pattern;
use chess_core::{Color, File, Move, Piece, PieceKind, Rank, Square, SpecialMove};

/// Piece placement for all 64 squares.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    squares: [Option<Piece>; 64],
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

impl Board {
    /// Creates a board with no pieces.
    pub const fn empty() -> Self {
        Board {
            squares: [None; 64],
        }
    }

    /// Creates the standard starting placement.
    pub fn initial() -> Self {
        use PieceKind::*;
        const BACK: [PieceKind; 8] = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];
        let mut board = Self::empty();
        for color in Color::BOTH {
            for (file, kind) in File::ALL.into_iter().zip(BACK) {
                board.set(Square::new(file, color.back_rank()), Piece::new(kind, color));
                board.set(Square::new(file, color.pawn_rank()), Piece::new(Pawn, color));
            }
        }
        board
    }

    /// Creates a board from a list of placed pieces.
    pub fn from_pieces<I>(pieces: I) -> Self
    where
        I: IntoIterator<Item = (Square, Piece)>,
    {
        let mut board = Self::empty();
        for (sq, piece) in pieces {
            board.set(sq, piece);
        }
        board
    }

    /// Returns the piece on the given square, if any.
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.index() as usize]
    }

    /// Places a piece, returning whatever stood there before.
    #[inline]
    pub fn set(&mut self, sq: Square, piece: Piece) -> Option<Piece> {
        self.squares[sq.index() as usize].replace(piece)
    }

    /// Empties a square, returning its former occupant.
    #[inline]
    pub fn remove(&mut self, sq: Square) -> Option<Piece> {
        self.squares[sq.index() as usize].take()
    }

    /// Iterates all occupied squares from a1 to h8.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| self.piece_at(sq).map(|p| (sq, p)))
    }

    /// Iterates the pieces of one color.
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.pieces().filter(move |(_, p)| p.color == color)
    }

    /// Counts the pieces of the given kind and color.
    pub fn count(&self, kind: PieceKind, color: Color) -> usize {
        self.pieces_of(color).filter(|(_, p)| p.kind == kind).count()
    }

    /// Returns the square of the given color's king, if present.
    pub fn find_king(&self, color: Color) -> Option<Square> {
        let king = Piece::new(PieceKind::King, color);
        self.pieces().find(|&(_, p)| p == king).map(|(sq, _)| sq)
    }

    /// Returns the square of the given color's king.
    ///
    /// # Panics
    ///
    /// Panics if the king is missing; a position without one is a bug in
    /// whoever built or mutated the board.
    pub fn king_square(&self, color: Color) -> Square {
        match self.find_king(color) {
            Some(sq) => sq,
            None => panic!("board invariant violated: no {} king on the board", color),
        }
    }

    /// Returns true if any piece of `by_color` attacks `sq`.
    ///
    /// Walks every attacker pattern outward from the target square and looks
    /// for a matching piece at the end of it.
    pub fn is_square_attacked(&self, sq: Square, by_color: Color) -> bool {
        // A pawn attacks diagonally forward, so look one rank behind the target.
        let back = -by_color.pawn_direction();
        let pawn = Piece::new(PieceKind::Pawn, by_color);
        for d_file in [-1, 1] {
            if let Some(from) = sq.offset(back, d_file) {
                if self.piece_at(from) == Some(pawn) {
                    return true;
                }
            }
        }

        for kind in [
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Rook,
            PieceKind::Queen,
            PieceKind::King,
        ] {
            let attacker = Piece::new(kind, by_color);
            let pat = pattern(kind);
            for &(d_rank, d_file) in pat.steps {
                let mut cur = sq;
                while let Some(next) = cur.offset(d_rank, d_file) {
                    match self.piece_at(next) {
                        Some(p) if p == attacker => return true,
                        Some(_) => break,
                        None => {}
                    }
                    if !pat.slides {
                        break;
                    }
                    cur = next;
                }
            }
        }

        false
    }

    /// Returns true if the given color's king is attacked.
    pub fn is_in_check(&self, color: Color) -> bool {
        self.is_square_attacked(self.king_square(color), color.opposite())
    }

    /// Performs the board side of a move: relocates the mover (promoting it
    /// if required), removes the captured piece and relocates the castling
    /// rook.
    ///
    /// # Panics
    ///
    /// Panics if `m.from` is empty.
    pub fn apply(&mut self, m: &Move) {
        if self.remove(m.from).is_none() {
            panic!("board invariant violated: no piece on {} for {}", m.from, m);
        }
        if m.captured.is_some() {
            self.remove(m.capture_square());
        }
        let placed = match m.promotion {
            Some(kind) => Piece::new(kind, m.piece.color),
            None => m.piece,
        };
        self.set(m.to, placed);

        if let Some((rook_from, rook_to)) = castling_rook_squares(m.piece.color, m.special) {
            if let Some(rook) = self.remove(rook_from) {
                self.set(rook_to, rook);
            }
        }
    }

    /// Exact inverse of [`Board::apply`].
    pub fn undo_apply(&mut self, m: &Move) {
        if let Some((rook_from, rook_to)) = castling_rook_squares(m.piece.color, m.special) {
            if let Some(rook) = self.remove(rook_to) {
                self.set(rook_from, rook);
            }
        }

        self.remove(m.to);
        self.set(m.from, m.piece);
        if let Some(captured) = m.captured {
            self.set(m.capture_square(), captured);
        }
    }

    /// Piece placement field of a FEN string.
    pub fn placement_fen(&self) -> String {
        let mut fen = String::new();

        for rank in Rank::ALL.into_iter().rev() {
            let mut empty_count = 0;
            for file in File::ALL {
                if let Some(piece) = self.piece_at(Square::new(file, rank)) {
                    if empty_count > 0 {
                        fen.push_str(&empty_count.to_string());
                        empty_count = 0;
                    }
                    fen.push(piece.to_fen_char());
                } else {
                    empty_count += 1;
                }
            }
            if empty_count > 0 {
                fen.push_str(&empty_count.to_string());
            }
            if rank != Rank::R1 {
                fen.push('/');
            }
        }

        fen
    }
}

/// Rook relocation (from, to) for a castling move of the given color.
pub(crate) fn castling_rook_squares(color: Color, special: SpecialMove) -> Option<(Square, Square)> {
    match (special, color) {
        (SpecialMove::CastleKingside, Color::White) => Some((Square::H1, Square::F1)),
        (SpecialMove::CastleKingside, Color::Black) => Some((Square::H8, Square::F8)),
        (SpecialMove::CastleQueenside, Color::White) => Some((Square::A1, Square::D1)),
        (SpecialMove::CastleQueenside, Color::Black) => Some((Square::A8, Square::D8)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn white(kind: PieceKind) -> Piece {
        Piece::new(kind, Color::White)
    }

    fn black(kind: PieceKind) -> Piece {
        Piece::new(kind, Color::Black)
    }

    #[test]
    fn initial_placement() {
        let board = Board::initial();
        assert_eq!(board.piece_at(Square::E1), Some(white(PieceKind::King)));
        assert_eq!(board.piece_at(Square::D8), Some(black(PieceKind::Queen)));
        assert_eq!(board.piece_at(sq("e4")), None);
        assert_eq!(board.pieces().count(), 32);
        assert_eq!(board.count(PieceKind::Pawn, Color::Black), 8);
        assert_eq!(board.king_square(Color::Black), Square::E8);
        assert_eq!(
            board.placement_fen(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"
        );
    }

    #[test]
    #[should_panic(expected = "no White king")]
    fn missing_king_is_fatal() {
        Board::empty().king_square(Color::White);
    }

    #[test]
    fn attacks_from_startpos() {
        let board = Board::initial();
        assert!(board.is_square_attacked(sq("e3"), Color::White));
        assert!(board.is_square_attacked(sq("f3"), Color::White)); // knight g1
        assert!(!board.is_square_attacked(sq("e4"), Color::White));
        assert!(board.is_square_attacked(sq("c6"), Color::Black));
        assert!(!board.is_in_check(Color::White));
    }

    #[test]
    fn slider_attacks_stop_at_blockers() {
        let board = Board::from_pieces([
            (sq("a1"), white(PieceKind::Rook)),
            (sq("a4"), black(PieceKind::Pawn)),
            (sq("h8"), black(PieceKind::Bishop)),
        ]);
        assert!(board.is_square_attacked(sq("a3"), Color::White));
        assert!(board.is_square_attacked(sq("a4"), Color::White));
        assert!(!board.is_square_attacked(sq("a5"), Color::White));
        assert!(board.is_square_attacked(sq("b2"), Color::Black));
        assert!(!board.is_square_attacked(sq("a1"), Color::Black));
    }

    #[test]
    fn pawn_attacks_are_directional() {
        let board = Board::from_pieces([(sq("d4"), white(PieceKind::Pawn))]);
        assert!(board.is_square_attacked(sq("c5"), Color::White));
        assert!(board.is_square_attacked(sq("e5"), Color::White));
        assert!(!board.is_square_attacked(sq("c3"), Color::White));
        assert!(!board.is_square_attacked(sq("d5"), Color::White));
    }

    #[test]
    fn apply_and_undo_capture() {
        let mut board = Board::from_pieces([
            (sq("e4"), white(PieceKind::Pawn)),
            (sq("d5"), black(PieceKind::Knight)),
        ]);
        let before = board.clone();
        let m = Move::normal(
            sq("e4"),
            sq("d5"),
            white(PieceKind::Pawn),
            Some(black(PieceKind::Knight)),
        );
        board.apply(&m);
        assert_eq!(board.piece_at(sq("d5")), Some(white(PieceKind::Pawn)));
        assert_eq!(board.piece_at(sq("e4")), None);
        board.undo_apply(&m);
        assert_eq!(board, before);
    }

    #[test]
    fn apply_and_undo_en_passant() {
        let mut board = Board::from_pieces([
            (sq("e5"), white(PieceKind::Pawn)),
            (sq("d5"), black(PieceKind::Pawn)),
        ]);
        let before = board.clone();
        let m = Move {
            special: SpecialMove::EnPassant,
            ..Move::normal(
                sq("e5"),
                sq("d6"),
                white(PieceKind::Pawn),
                Some(black(PieceKind::Pawn)),
            )
        };
        board.apply(&m);
        assert_eq!(board.piece_at(sq("d6")), Some(white(PieceKind::Pawn)));
        assert_eq!(board.piece_at(sq("d5")), None);
        board.undo_apply(&m);
        assert_eq!(board, before);
    }

    #[test]
    fn apply_and_undo_castling() {
        let mut board = Board::from_pieces([
            (Square::E8, black(PieceKind::King)),
            (Square::A8, black(PieceKind::Rook)),
        ]);
        let before = board.clone();
        let m = Move {
            special: SpecialMove::CastleQueenside,
            ..Move::normal(Square::E8, Square::C8, black(PieceKind::King), None)
        };
        board.apply(&m);
        assert_eq!(board.piece_at(Square::C8), Some(black(PieceKind::King)));
        assert_eq!(board.piece_at(Square::D8), Some(black(PieceKind::Rook)));
        assert_eq!(board.piece_at(Square::A8), None);
        board.undo_apply(&m);
        assert_eq!(board, before);
    }

    #[test]
    fn apply_and_undo_promotion() {
        let mut board = Board::from_pieces([
            (sq("b7"), white(PieceKind::Pawn)),
            (sq("a8"), black(PieceKind::Rook)),
        ]);
        let before = board.clone();
        let m = Move {
            promotion: Some(PieceKind::Knight),
            special: SpecialMove::Promotion,
            ..Move::normal(
                sq("b7"),
                sq("a8"),
                white(PieceKind::Pawn),
                Some(black(PieceKind::Rook)),
            )
        };
        board.apply(&m);
        assert_eq!(board.piece_at(sq("a8")), Some(white(PieceKind::Knight)));
        board.undo_apply(&m);
        assert_eq!(board, before);
    }
}
