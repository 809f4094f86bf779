//! FEN field syntax.
//!
//! [`FenParser`] only checks the structure of the six fields. Building a
//! board from them, and the semantic checks that need one (king counts,
//! pawns on back ranks), are done by the engine.

use crate::{Color, Piece, Square};
use thiserror::Error;

/// Errors that can occur when parsing FEN strings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("FEN needs 6 space-separated fields, found {0}")]
    InvalidPartCount(usize),

    #[error("bad piece placement: {0}")]
    InvalidPiecePlacement(String),

    #[error("side to move must be 'w' or 'b', found {0:?}")]
    InvalidActiveColor(String),

    #[error("bad castling field {0:?}")]
    InvalidCastlingRights(String),

    #[error("bad en passant field {0:?}")]
    InvalidEnPassantSquare(String),

    #[error("bad halfmove clock {0:?}")]
    InvalidHalfmoveClock(String),

    #[error("bad fullmove number {0:?}")]
    InvalidFullmoveNumber(String),

    #[error("illegal position: {0}")]
    IllegalPosition(String),
}

/// The six FEN fields, syntax-checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenParser {
    /// Occupied squares in reading order: rank 8 to rank 1, a to h.
    pub placement: Vec<(Square, Piece)>,
    pub active_color: Color,
    /// Castling letters as written, empty for "-".
    pub castling: String,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u32,
    /// Starts at 1.
    pub fullmove_number: u32,
}

impl FenParser {
    /// The standard starting position FEN.
    pub const STARTPOS: &'static str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    pub fn parse(fen: &str) -> Result<Self, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        let [placement, color, castling, en_passant, halfmove, fullmove] = fields[..] else {
            return Err(FenError::InvalidPartCount(fields.len()));
        };

        Ok(FenParser {
            placement: placement_field(placement)?,
            active_color: match color {
                "w" => Color::White,
                "b" => Color::Black,
                _ => return Err(FenError::InvalidActiveColor(color.to_string())),
            },
            castling: castling_field(castling)?,
            en_passant: en_passant_field(en_passant)?,
            halfmove_clock: halfmove
                .parse()
                .map_err(|_| FenError::InvalidHalfmoveClock(halfmove.to_string()))?,
            fullmove_number: fullmove
                .parse()
                .ok()
                .filter(|&n: &u32| n > 0)
                .ok_or_else(|| FenError::InvalidFullmoveNumber(fullmove.to_string()))?,
        })
    }
}

fn placement_field(field: &str) -> Result<Vec<(Square, Piece)>, FenError> {
    let bad = |msg: String| FenError::InvalidPiecePlacement(msg);
    let rows: Vec<&str> = field.split('/').collect();
    if rows.len() != 8 {
        return Err(bad(format!("{} ranks instead of 8", rows.len())));
    }

    let mut pieces = Vec::new();
    for (rank, row) in (0..8).rev().zip(rows) {
        let mut width = 0;
        for c in row.chars() {
            if let Some(run @ 1..=8) = c.to_digit(10) {
                width += run as i32;
                continue;
            }
            let piece =
                Piece::from_fen_char(c).ok_or_else(|| bad(format!("unknown piece {:?}", c)))?;
            let square = Square::from_coords(rank, width)
                .map_err(|_| bad(format!("rank {} overflows", rank + 1)))?;
            pieces.push((square, piece));
            width += 1;
        }
        if width != 8 {
            return Err(bad(format!("rank {} covers {} squares", rank + 1, width)));
        }
    }
    Ok(pieces)
}

fn castling_field(field: &str) -> Result<String, FenError> {
    if field == "-" {
        return Ok(String::new());
    }
    let valid = field
        .char_indices()
        .all(|(i, c)| "KQkq".contains(c) && !field[..i].contains(c));
    if valid {
        Ok(field.to_string())
    } else {
        Err(FenError::InvalidCastlingRights(field.to_string()))
    }
}

/// Targets only exist on rank 3 (after a White double push) or rank 6.
fn en_passant_field(field: &str) -> Result<Option<Square>, FenError> {
    if field == "-" {
        return Ok(None);
    }
    Square::from_algebraic(field)
        .filter(|sq| matches!(sq.rank().to_char(), '3' | '6'))
        .map(Some)
        .ok_or_else(|| FenError::InvalidEnPassantSquare(field.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PieceKind;

    const EMPTY: &str = "8/8/8/8/8/8/8/8";

    fn with_fields(rest: &str) -> Result<FenParser, FenError> {
        FenParser::parse(&format!("{} {}", EMPTY, rest))
    }

    #[test]
    fn startpos_fields() {
        let fen = FenParser::parse(FenParser::STARTPOS).unwrap();
        assert_eq!(fen.placement.len(), 32);
        assert_eq!(fen.placement[0], (Square::A8, Piece::new(PieceKind::Rook, Color::Black)));
        assert!(fen
            .placement
            .contains(&(Square::E1, Piece::new(PieceKind::King, Color::White))));
        assert_eq!(
            (fen.active_color, fen.castling.as_str(), fen.en_passant),
            (Color::White, "KQkq", None)
        );
        assert_eq!((fen.halfmove_clock, fen.fullmove_number), (0, 1));
    }

    #[test]
    fn extra_whitespace_is_ignored() {
        let fen = FenParser::parse("  4k3/8/8/8/4P3/8/8/4K3   b  -  e3  3  17 ").unwrap();
        assert_eq!(fen.active_color, Color::Black);
        assert_eq!(fen.en_passant, Square::from_algebraic("e3"));
        assert_eq!((fen.halfmove_clock, fen.fullmove_number), (3, 17));
    }

    #[test]
    fn field_count() {
        assert_eq!(
            FenParser::parse("garbage"),
            Err(FenError::InvalidPartCount(1))
        );
        assert_eq!(with_fields("w - - 0"), Err(FenError::InvalidPartCount(5)));
        assert_eq!(
            with_fields("w - - 0 1 extra"),
            Err(FenError::InvalidPartCount(7))
        );
    }

    #[test]
    fn placement_errors() {
        for placement in [
            "8/8/8/8/8/8/8",
            "8/8/8/8/8/8/8/8/8",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPXPPP/RNBQKBNR",
            "rnbqkbnrr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR",
            "44p/8/8/8/8/8/8/8",
            "7/8/8/8/8/8/8/8",
            "08/8/8/8/8/8/8/8",
            "9/8/8/8/8/8/8/8",
        ] {
            let fen = format!("{} w - - 0 1", placement);
            assert!(
                matches!(
                    FenParser::parse(&fen),
                    Err(FenError::InvalidPiecePlacement(_))
                ),
                "{}",
                placement
            );
        }
    }

    #[test]
    fn active_color_errors() {
        assert_eq!(
            with_fields("W - - 0 1"),
            Err(FenError::InvalidActiveColor("W".to_string()))
        );
    }

    #[test]
    fn castling_letters() {
        assert_eq!(with_fields("w Kq - 0 1").unwrap().castling, "Kq");
        assert_eq!(with_fields("w - - 0 1").unwrap().castling, "");
        for bad in ["XYZ", "KK", "KQkqK", "kx"] {
            assert_eq!(
                with_fields(&format!("w {} - 0 1", bad)),
                Err(FenError::InvalidCastlingRights(bad.to_string()))
            );
        }
    }

    #[test]
    fn en_passant_targets() {
        assert_eq!(
            with_fields("b - d6 0 1").unwrap().en_passant,
            Square::from_algebraic("d6")
        );
        for bad in ["abc", "x3", "e4", "e1"] {
            assert!(matches!(
                with_fields(&format!("w - {} 0 1", bad)),
                Err(FenError::InvalidEnPassantSquare(_))
            ));
        }
    }

    #[test]
    fn counters() {
        assert!(matches!(
            with_fields("w - - abc 1"),
            Err(FenError::InvalidHalfmoveClock(_))
        ));
        assert!(matches!(
            with_fields("w - - -1 1"),
            Err(FenError::InvalidHalfmoveClock(_))
        ));
        assert!(matches!(
            with_fields("w - - 0 0"),
            Err(FenError::InvalidFullmoveNumber(_))
        ));
        assert!(matches!(
            with_fields("w - - 0 one"),
            Err(FenError::InvalidFullmoveNumber(_))
        ));
    }

    #[test]
    fn messages_name_the_field() {
        assert_eq!(
            FenError::InvalidPartCount(3).to_string(),
            "FEN needs 6 space-separated fields, found 3"
        );
        assert!(FenError::InvalidCastlingRights("XYZ".to_string())
            .to_string()
            .contains("XYZ"));
    }
}
