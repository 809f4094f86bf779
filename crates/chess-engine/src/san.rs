//! Standard Algebraic Notation (SAN) parsing and generation.
//!
//! SAN is the standard way to record chess moves in human-readable form.
//! Examples: "e4", "Nf3", "Bxc6", "O-O", "e8=Q", "Nbd2", "R1e1"

use crate::board::Board;
use crate::history::MoveHistory;
use crate::movegen::legal_moves;
use chess_core::{File, Move, PieceKind, Rank, Square, SpecialMove};
use thiserror::Error;

/// Error type for SAN parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SanError {
    #[error("empty SAN string")]
    Empty,

    #[error("invalid SAN format: {0}")]
    InvalidFormat(String),

    #[error("no legal move matches: {0}")]
    NoMatchingMove(String),

    #[error("ambiguous move: {0}")]
    AmbiguousMove(String),
}

/// Converts a move to SAN notation.
///
/// `board` and `history` describe the position BEFORE the move, and the
/// move must be legal in it.
pub fn move_to_san(board: &Board, history: &MoveHistory, m: &Move) -> String {
    let mut san = String::new();

    match m.special {
        SpecialMove::CastleKingside => san.push_str("O-O"),
        SpecialMove::CastleQueenside => san.push_str("O-O-O"),
        _ => {
            let kind = m.piece.kind;
            if kind != PieceKind::Pawn {
                san.push(kind.to_san_char());
                san.push_str(&disambiguation(board, history, m));
            }

            if m.is_capture() {
                if kind == PieceKind::Pawn {
                    // Pawn captures include the source file
                    san.push(m.from.file().to_char());
                }
                san.push('x');
            }

            san.push_str(&m.to.to_algebraic());

            if let Some(promo) = m.promotion {
                san.push('=');
                san.push(promo.to_san_char());
            }
        }
    }

    san.push_str(check_suffix(board, history, m));
    san
}

/// Parses a SAN string and returns the corresponding legal move for the
/// side to move.
pub fn san_to_move(board: &Board, history: &MoveHistory, san: &str) -> Result<Move, SanError> {
    let san = san.trim();
    if san.is_empty() {
        return Err(SanError::Empty);
    }

    let stripped = san.trim_end_matches(['#', '+', '!', '?']);

    let moves = legal_moves(board, history, history.side_to_move());

    let castle = match stripped {
        "O-O" | "0-0" => Some(SpecialMove::CastleKingside),
        "O-O-O" | "0-0-0" => Some(SpecialMove::CastleQueenside),
        _ => None,
    };
    if let Some(special) = castle {
        return moves
            .iter()
            .find(|m| m.special == special)
            .copied()
            .ok_or_else(|| SanError::NoMatchingMove(san.to_string()));
    }

    let parsed = parse_components(stripped)?;

    let matching: Vec<Move> = moves
        .iter()
        .filter(|m| {
            m.to == parsed.to
                && m.piece.kind == parsed.kind
                && parsed.from_file.map_or(true, |f| m.from.file() == f)
                && parsed.from_rank.map_or(true, |r| m.from.rank() == r)
                && m.promotion == parsed.promotion
        })
        .copied()
        .collect();

    match matching.as_slice() {
        [] => Err(SanError::NoMatchingMove(san.to_string())),
        [m] => Ok(*m),
        _ => Err(SanError::AmbiguousMove(san.to_string())),
    }
}

/// Parsed components of a non-castling SAN string.
#[derive(Debug)]
struct ParsedSan {
    kind: PieceKind,
    from_file: Option<File>,
    from_rank: Option<Rank>,
    to: Square,
    promotion: Option<PieceKind>,
}

fn parse_components(san: &str) -> Result<ParsedSan, SanError> {
    let mut rest = san;

    // Piece letter (pawns have none)
    let kind = match rest.chars().next() {
        Some(c) if c.is_ascii_uppercase() => {
            let kind = PieceKind::from_san_char(c).ok_or_else(|| {
                SanError::InvalidFormat(format!("invalid piece character: {}", c))
            })?;
            rest = &rest[1..];
            kind
        }
        Some(_) => PieceKind::Pawn,
        None => return Err(SanError::Empty),
    };

    // Promotion suffix
    let promotion = match rest.split_once('=') {
        Some((head, promo)) => {
            let mut chars = promo.chars();
            let promo_kind = match (chars.next(), chars.next()) {
                (Some(c), None) => PieceKind::from_san_char(c),
                _ => None,
            }
            .filter(|k| k.is_promotion_target())
            .ok_or_else(|| {
                SanError::InvalidFormat(format!("invalid promotion piece: {}", san))
            })?;
            rest = head;
            Some(promo_kind)
        }
        None => None,
    };

    // Capture marker carries no information beyond the board.
    let body: Vec<char> = rest.chars().filter(|&c| c != 'x').collect();
    if body.len() < 2 || body.len() > 4 {
        return Err(SanError::InvalidFormat(san.to_string()));
    }

    let (disambig, dest) = body.split_at(body.len() - 2);
    let to = match (File::from_char(dest[0]), Rank::from_char(dest[1])) {
        (Some(file), Some(rank)) => Square::new(file, rank),
        _ => {
            return Err(SanError::InvalidFormat(format!(
                "invalid destination: {}",
                san
            )))
        }
    };

    let (from_file, from_rank) = match disambig {
        [] => (None, None),
        [c] => match (File::from_char(*c), Rank::from_char(*c)) {
            (Some(f), _) => (Some(f), None),
            (_, Some(r)) => (None, Some(r)),
            _ => {
                return Err(SanError::InvalidFormat(format!(
                    "invalid disambiguation: {}",
                    san
                )))
            }
        },
        [f, r] => match (File::from_char(*f), Rank::from_char(*r)) {
            (Some(f), Some(r)) => (Some(f), Some(r)),
            _ => {
                return Err(SanError::InvalidFormat(format!(
                    "invalid disambiguation: {}",
                    san
                )))
            }
        },
        _ => return Err(SanError::InvalidFormat(san.to_string())),
    };

    Ok(ParsedSan {
        kind,
        from_file,
        from_rank,
        to,
        promotion,
    })
}

/// Origin file, rank or square needed to tell `m` apart from other moves of
/// the same piece kind to the same destination.
fn disambiguation(board: &Board, history: &MoveHistory, m: &Move) -> String {
    let rivals: Vec<Move> = legal_moves(board, history, m.color())
        .into_iter()
        .filter(|o| o.to == m.to && o.piece == m.piece && o.from != m.from)
        .collect();

    if rivals.is_empty() {
        return String::new();
    }
    if rivals.iter().all(|o| o.from.file() != m.from.file()) {
        return m.from.file().to_string();
    }
    if rivals.iter().all(|o| o.from.rank() != m.from.rank()) {
        return m.from.rank().to_string();
    }
    m.from.to_algebraic()
}

fn check_suffix(board: &Board, history: &MoveHistory, m: &Move) -> &'static str {
    let mut after = board.clone();
    let mut history = history.clone();
    after.apply(m);
    history.push(*m);

    let them = m.color().opposite();
    if !after.is_in_check(them) {
        return "";
    }
    if legal_moves(&after, &history, them).is_empty() {
        "#"
    } else {
        "+"
    }
}
