//! Move representation.
//!
//! A [`MoveRequest`] is what a caller asks for (from, to and an optional
//! promotion kind). A [`Move`] is what the engine applied: it carries the
//! moving piece, any captured piece and the special-move kind, which is
//! everything needed to undo it exactly.

use crate::{Color, Piece, PieceKind, Square};
use std::fmt;

/// Special move kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SpecialMove {
    /// Normal move (no special action).
    #[default]
    None,
    /// Kingside castling (O-O).
    CastleKingside,
    /// Queenside castling (O-O-O).
    CastleQueenside,
    /// En passant capture.
    EnPassant,
    /// Pawn promotion; the kind is in [`Move::promotion`].
    Promotion,
}

impl SpecialMove {
    /// Returns true if this is a castling move.
    #[inline]
    pub const fn is_castling(self) -> bool {
        matches!(self, SpecialMove::CastleKingside | SpecialMove::CastleQueenside)
    }
}

/// A chess move as applied to a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    /// The piece that moved, as it stood on `from`.
    pub piece: Piece,
    /// The piece removed by this move, including the en passant victim.
    pub captured: Option<Piece>,
    pub promotion: Option<PieceKind>,
    pub special: SpecialMove,
}

impl Move {
    /// Creates a quiet or capturing move with no special action.
    #[inline]
    pub const fn normal(from: Square, to: Square, piece: Piece, captured: Option<Piece>) -> Self {
        Move {
            from,
            to,
            piece,
            captured,
            promotion: None,
            special: SpecialMove::None,
        }
    }

    /// Color of the side making the move.
    #[inline]
    pub const fn color(&self) -> Color {
        self.piece.color
    }

    /// Returns true if a piece was removed by this move.
    #[inline]
    pub const fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    /// Returns true if this is a pawn advancing two ranks.
    pub const fn is_double_push(&self) -> bool {
        matches!(self.piece.kind, PieceKind::Pawn)
            && self.from.file().index() == self.to.file().index()
            && self.from.rank().index().abs_diff(self.to.rank().index()) == 2
    }

    /// Square the captured piece stood on.
    ///
    /// Equal to `to` except for en passant, where the victim sits beside the
    /// capturing pawn.
    pub fn capture_square(&self) -> Square {
        match self.special {
            SpecialMove::EnPassant => Square::new(self.to.file(), self.from.rank()),
            _ => self.to,
        }
    }

    /// Returns the request that identifies this move.
    #[inline]
    pub const fn request(&self) -> MoveRequest {
        MoveRequest {
            from: self.from,
            to: self.to,
            promotion: self.promotion,
        }
    }

    /// Returns the UCI notation for this move (e.g., "e2e4", "e7e8q").
    pub fn to_uci(&self) -> String {
        self.request().to_uci()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

/// A candidate move identified by its squares and promotion kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveRequest {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl MoveRequest {
    #[inline]
    pub const fn new(from: Square, to: Square) -> Self {
        MoveRequest {
            from,
            to,
            promotion: None,
        }
    }

    /// Returns a copy of this request carrying the given promotion kind.
    #[inline]
    pub const fn with_promotion(self, kind: PieceKind) -> Self {
        MoveRequest {
            promotion: Some(kind),
            ..self
        }
    }

    /// Returns the UCI notation for this request.
    pub fn to_uci(&self) -> String {
        match self.promotion {
            Some(kind) => format!("{}{}{}", self.from, self.to, kind.to_uci_char()),
            None => format!("{}{}", self.from, self.to),
        }
    }

    /// Parses a request from UCI notation.
    ///
    /// Only the syntax is checked; legality is up to the engine.
    pub fn from_uci(s: &str) -> Option<Self> {
        if !s.is_ascii() || s.len() < 4 || s.len() > 5 {
            return None;
        }
        let from = Square::from_algebraic(&s[0..2])?;
        let to = Square::from_algebraic(&s[2..4])?;
        let promotion = match s[4..].chars().next() {
            None => None,
            Some(c) => {
                let kind = PieceKind::from_san_char(c.to_ascii_uppercase())?;
                if !kind.is_promotion_target() {
                    return None;
                }
                Some(kind)
            }
        };
        Some(MoveRequest {
            from,
            to,
            promotion,
        })
    }
}

impl fmt::Display for MoveRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

impl From<Move> for MoveRequest {
    fn from(m: Move) -> Self {
        m.request()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{File, Rank};

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn move_uci() {
        let pawn = Piece::new(PieceKind::Pawn, Color::White);
        let m = Move::normal(sq("e2"), sq("e4"), pawn, None);
        assert_eq!(m.to_uci(), "e2e4");
        assert!(m.is_double_push());
        assert!(!m.is_capture());

        let promo = Move {
            promotion: Some(PieceKind::Knight),
            special: SpecialMove::Promotion,
            ..Move::normal(sq("e7"), sq("e8"), pawn, None)
        };
        assert_eq!(promo.to_uci(), "e7e8n");
        assert!(!promo.is_double_push());
    }

    #[test]
    fn en_passant_capture_square() {
        let m = Move {
            special: SpecialMove::EnPassant,
            ..Move::normal(
                sq("e5"),
                sq("d6"),
                Piece::new(PieceKind::Pawn, Color::White),
                Some(Piece::new(PieceKind::Pawn, Color::Black)),
            )
        };
        assert_eq!(m.capture_square(), Square::new(File::D, Rank::R5));
    }

    #[test]
    fn request_from_uci() {
        let r = MoveRequest::from_uci("e2e4").unwrap();
        assert_eq!(r.from, sq("e2"));
        assert_eq!(r.to, sq("e4"));
        assert_eq!(r.promotion, None);

        let promo = MoveRequest::from_uci("e7e8Q").unwrap();
        assert_eq!(promo.promotion, Some(PieceKind::Queen));
        assert_eq!(promo.to_uci(), "e7e8q");
    }

    #[test]
    fn request_from_uci_rejects_garbage() {
        assert!(MoveRequest::from_uci("invalid").is_none());
        assert!(MoveRequest::from_uci("e2e9").is_none());
        assert!(MoveRequest::from_uci("e2").is_none());
        assert!(MoveRequest::from_uci("e2e4qq").is_none());
        assert!(MoveRequest::from_uci("e7e8k").is_none());
        assert!(MoveRequest::from_uci("e7e8x").is_none());
        assert!(MoveRequest::from_uci("é2e4").is_none());
    }

    #[test]
    fn with_promotion() {
        let r = MoveRequest::new(sq("a7"), sq("a8")).with_promotion(PieceKind::Rook);
        assert_eq!(r.to_uci(), "a7a8r");
    }
}
