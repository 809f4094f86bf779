//! Game outcomes and material rules.

use crate::board::Board;
use chess_core::{Color, PieceKind, Square};
use std::fmt;

/// Result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameResult {
    /// The side to move is checkmated.
    Checkmate { winner: Color },
    /// The side to move has no legal move and is not in check.
    Stalemate,
    /// Drawn for the given reason.
    Draw(DrawReason),
    /// A clock ran out and the opponent can still mate.
    TimeForfeit { winner: Color },
    Resignation { winner: Color },
}

impl GameResult {
    /// Returns the winning color, or `None` for drawn results.
    pub const fn winner(self) -> Option<Color> {
        match self {
            GameResult::Checkmate { winner }
            | GameResult::TimeForfeit { winner }
            | GameResult::Resignation { winner } => Some(winner),
            GameResult::Stalemate | GameResult::Draw(_) => None,
        }
    }

    /// PGN-style score ("1-0", "0-1", "1/2-1/2").
    pub const fn score(self) -> &'static str {
        match self.winner() {
            Some(Color::White) => "1-0",
            Some(Color::Black) => "0-1",
            None => "1/2-1/2",
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::Checkmate { winner } => write!(f, "{} wins by checkmate", winner),
            GameResult::Stalemate => write!(f, "draw by stalemate"),
            GameResult::Draw(reason) => write!(f, "draw by {}", reason),
            GameResult::TimeForfeit { winner } => write!(f, "{} wins on time", winner),
            GameResult::Resignation { winner } => write!(f, "{} wins by resignation", winner),
        }
    }
}

/// Reason for a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawReason {
    /// Neither side can possibly mate.
    InsufficientMaterial,
    /// 100 halfmoves without pawn move or capture (claimed), or 150 (automatic).
    FiftyMove,
    /// Threefold repetition (claimed), or fivefold (automatic).
    Repetition,
    /// A clock ran out but the opponent has no mating material.
    TimeOut,
    Agreement,
}

impl fmt::Display for DrawReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DrawReason::InsufficientMaterial => "insufficient material",
            DrawReason::FiftyMove => "the fifty-move rule",
            DrawReason::Repetition => "repetition",
            DrawReason::TimeOut => "timeout vs insufficient material",
            DrawReason::Agreement => "agreement",
        };
        f.write_str(s)
    }
}

/// Current state of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameState {
    InProgress,
    /// In progress, with the side to move in check.
    Check,
    Finished(GameResult),
}

impl GameState {
    /// Returns true once the game has a result.
    pub const fn is_finished(self) -> bool {
        matches!(self, GameState::Finished(_))
    }
}

/// Halfmoves without progress after which a draw may be claimed.
pub const FIFTY_MOVE_CLAIM: u32 = 100;
/// Halfmoves without progress after which the game is drawn automatically.
pub const SEVENTY_FIVE_MOVE_LIMIT: u32 = 150;
/// Occurrences of a position after which a draw may be claimed.
pub const REPETITION_CLAIM: usize = 3;
/// Occurrences of a position after which the game is drawn automatically.
pub const REPETITION_LIMIT: usize = 5;

fn square_shade(sq: Square) -> u8 {
    (sq.rank().index() + sq.file().index()) % 2
}

/// Returns true if no sequence of legal moves can end in mate.
///
/// Covers K vs K, K+minor vs K, and any number of bishops that all stand on
/// squares of one shade.
pub fn is_insufficient_material(board: &Board) -> bool {
    let mut minors = 0;
    let mut bishop_shades = [false; 2];
    let mut knights = 0;

    for (sq, piece) in board.pieces() {
        match piece.kind {
            PieceKind::King => {}
            PieceKind::Pawn | PieceKind::Rook | PieceKind::Queen => return false,
            PieceKind::Knight => {
                minors += 1;
                knights += 1;
            }
            PieceKind::Bishop => {
                minors += 1;
                bishop_shades[square_shade(sq) as usize] = true;
            }
        }
    }

    if minors <= 1 {
        return true;
    }
    knights == 0 && !(bishop_shades[0] && bishop_shades[1])
}

/// Returns true if some sequence of legal moves lets `color` mate.
///
/// A pawn, rook or queen always can. A lone minor piece can only mate when
/// the opponent has other pieces left to block its own king. Against a
/// bare king two minors are needed, and bishops must stand on both shades.
pub fn has_mating_material(board: &Board, color: Color) -> bool {
    let mut minors = 0;
    let mut knights = 0;
    let mut bishop_shades = [false; 2];
    for (sq, piece) in board.pieces_of(color) {
        match piece.kind {
            PieceKind::Pawn | PieceKind::Rook | PieceKind::Queen => return true,
            PieceKind::Knight => {
                minors += 1;
                knights += 1;
            }
            PieceKind::Bishop => {
                minors += 1;
                bishop_shades[square_shade(sq) as usize] = true;
            }
            PieceKind::King => {}
        }
    }
    if minors == 0 {
        return false;
    }

    let bare_king = board
        .pieces_of(color.opposite())
        .all(|(_, piece)| piece.kind == PieceKind::King);
    if !bare_king {
        return true;
    }
    minors >= 2 && (knights > 0 || (bishop_shades[0] && bishop_shades[1]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::Piece;

    fn board(pieces: &[(&str, PieceKind, Color)]) -> Board {
        Board::from_pieces(pieces.iter().map(|&(s, kind, color)| {
            (Square::from_algebraic(s).unwrap(), Piece::new(kind, color))
        }))
    }

    const KINGS: [(&str, PieceKind, Color); 2] = [
        ("e1", PieceKind::King, Color::White),
        ("e8", PieceKind::King, Color::Black),
    ];

    fn with_kings(extra: &[(&str, PieceKind, Color)]) -> Board {
        let mut all = KINGS.to_vec();
        all.extend_from_slice(extra);
        board(&all)
    }

    #[test]
    fn bare_kings_are_insufficient() {
        assert!(is_insufficient_material(&with_kings(&[])));
    }

    #[test]
    fn single_minor_is_insufficient() {
        assert!(is_insufficient_material(&with_kings(&[(
            "c3",
            PieceKind::Knight,
            Color::White
        )])));
        assert!(is_insufficient_material(&with_kings(&[(
            "c3",
            PieceKind::Bishop,
            Color::Black
        )])));
    }

    #[test]
    fn same_shade_bishops_are_insufficient() {
        // c1 and f4 are both dark squares.
        assert!(is_insufficient_material(&with_kings(&[
            ("c1", PieceKind::Bishop, Color::White),
            ("f4", PieceKind::Bishop, Color::Black),
        ])));
        assert!(!is_insufficient_material(&with_kings(&[
            ("c1", PieceKind::Bishop, Color::White),
            ("f1", PieceKind::Bishop, Color::Black),
        ])));
    }

    #[test]
    fn heavy_pieces_and_pawns_are_sufficient() {
        assert!(!is_insufficient_material(&with_kings(&[(
            "a2",
            PieceKind::Pawn,
            Color::White
        )])));
        assert!(!is_insufficient_material(&with_kings(&[(
            "a1",
            PieceKind::Rook,
            Color::Black
        )])));
        assert!(!is_insufficient_material(&with_kings(&[
            ("b1", PieceKind::Knight, Color::White),
            ("g1", PieceKind::Knight, Color::White),
        ])));
    }

    #[test]
    fn mating_material() {
        let b = with_kings(&[
            ("a1", PieceKind::Rook, Color::White),
            ("c8", PieceKind::Bishop, Color::Black),
        ]);
        assert!(has_mating_material(&b, Color::White));
        // The rook can be forced to block its own king.
        assert!(has_mating_material(&b, Color::Black));

        let b = with_kings(&[
            ("c8", PieceKind::Bishop, Color::Black),
            ("b8", PieceKind::Knight, Color::Black),
        ]);
        assert!(has_mating_material(&b, Color::Black));
        assert!(!has_mating_material(&b, Color::White));
    }

    #[test]
    fn lone_minor_needs_something_to_block() {
        let knight = ("g1", PieceKind::Knight, Color::White);
        assert!(!has_mating_material(&with_kings(&[knight]), Color::White));
        assert!(has_mating_material(
            &with_kings(&[knight, ("e7", PieceKind::Pawn, Color::Black)]),
            Color::White
        ));
    }

    #[test]
    fn bishop_pair_against_bare_king() {
        let same_shade = [
            ("c1", PieceKind::Bishop, Color::White),
            ("e3", PieceKind::Bishop, Color::White),
        ];
        assert!(!has_mating_material(&with_kings(&same_shade), Color::White));

        let mut with_pawn = same_shade.to_vec();
        with_pawn.push(("a7", PieceKind::Pawn, Color::Black));
        assert!(has_mating_material(&with_kings(&with_pawn), Color::White));

        let both = [
            ("c1", PieceKind::Bishop, Color::White),
            ("f1", PieceKind::Bishop, Color::White),
        ];
        assert!(has_mating_material(&with_kings(&both), Color::White));
    }

    #[test]
    fn result_winner_and_score() {
        let mate = GameResult::Checkmate {
            winner: Color::Black,
        };
        assert_eq!(mate.winner(), Some(Color::Black));
        assert_eq!(mate.score(), "0-1");
        assert_eq!(GameResult::Stalemate.winner(), None);
        assert_eq!(GameResult::Draw(DrawReason::TimeOut).score(), "1/2-1/2");
        assert!(GameState::Finished(mate).is_finished());
        assert!(!GameState::Check.is_finished());
    }

    #[test]
    fn result_display() {
        let s = GameResult::Draw(DrawReason::Repetition).to_string();
        assert_eq!(s, "draw by repetition");
        let s = GameResult::TimeForfeit {
            winner: Color::White,
        }
        .to_string();
        assert!(s.contains("on time"));
    }
}
