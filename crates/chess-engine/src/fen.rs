//! FEN encoding and decoding of a board plus its move history.
//!
//! Decoding layers the semantic checks that need a board (king count, pawns
//! on back ranks, en passant plausibility, side not to move in check) on top
//! of the syntax checks done by [`FenParser`].

use crate::board::Board;
use crate::history::{castling_homes, Baseline, CastlingRights, MoveHistory};
use chess_core::{Color, FenError, FenParser, Piece, PieceKind, Rank, Square};

/// Encodes the position reached after `history` as a FEN string.
pub fn encode(board: &Board, history: &MoveHistory) -> String {
    let ep = history
        .en_passant_target()
        .map_or_else(|| "-".to_string(), |sq| sq.to_algebraic());
    format!(
        "{} {} {} {} {} {}",
        board.placement_fen(),
        history.side_to_move().to_fen_char(),
        history.castling_rights().to_fen(),
        ep,
        history.halfmove_clock(),
        history.fullmove_number(),
    )
}

/// Decodes a FEN string into a board and an empty history whose baseline
/// carries the non-placement fields.
///
/// Castling letters whose king or rook is not on its home square are
/// dropped rather than rejected.
pub fn decode(fen: &str) -> Result<(Board, MoveHistory), FenError> {
    let parsed = FenParser::parse(fen)?;
    let board = Board::from_pieces(parsed.placement.iter().copied());
    let side = parsed.active_color;

    for color in Color::BOTH {
        let kings = board.count(PieceKind::King, color);
        if kings != 1 {
            return Err(FenError::IllegalPosition(format!(
                "expected one {} king, found {}",
                color, kings
            )));
        }
    }

    if let Some((sq, _)) = board
        .pieces()
        .find(|(sq, p)| p.kind == PieceKind::Pawn && matches!(sq.rank(), Rank::R1 | Rank::R8))
    {
        return Err(FenError::IllegalPosition(format!("pawn on back rank at {}", sq)));
    }

    if let Some(ep) = parsed.en_passant {
        check_en_passant(&board, side, ep)?;
    }

    if board.is_in_check(side.opposite()) {
        return Err(FenError::IllegalPosition(format!(
            "{} is in check but it is {} to move",
            side.opposite(),
            side
        )));
    }

    let mut castling = CastlingRights::from_fen(&parsed.castling);
    for color in Color::BOTH {
        for kingside in [true, false] {
            let (king_home, rook_home) = castling_homes(color, kingside);
            let in_place = board.piece_at(king_home) == Some(Piece::new(PieceKind::King, color))
                && board.piece_at(rook_home) == Some(Piece::new(PieceKind::Rook, color));
            if !in_place {
                castling.remove(color, kingside);
            }
        }
    }

    let baseline = Baseline {
        side_to_move: side,
        castling,
        en_passant: parsed.en_passant,
        halfmove_clock: parsed.halfmove_clock,
        fullmove_number: parsed.fullmove_number,
    };

    Ok((board, MoveHistory::new(baseline)))
}

/// An en passant target must sit behind a pawn of the side that just moved,
/// with both the target and the pawn's origin square empty.
fn check_en_passant(board: &Board, side_to_move: Color, ep: Square) -> Result<(), FenError> {
    let pushed = side_to_move.opposite();
    let invalid = || FenError::InvalidEnPassantSquare(ep.to_algebraic());

    let expected_rank = match side_to_move {
        Color::White => Rank::R6,
        Color::Black => Rank::R3,
    };
    if ep.rank() != expected_rank {
        return Err(invalid());
    }

    let pawn_square = ep.offset(pushed.pawn_direction(), 0).ok_or_else(invalid)?;
    let origin = ep.offset(-pushed.pawn_direction(), 0).ok_or_else(invalid)?;
    let pawn_present = board.piece_at(pawn_square) == Some(Piece::new(PieceKind::Pawn, pushed));
    if !pawn_present || board.piece_at(ep).is_some() || board.piece_at(origin).is_some() {
        return Err(invalid());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(fen: &str) {
        let (board, history) = decode(fen).unwrap();
        assert_eq!(encode(&board, &history), fen);
    }

    #[test]
    fn startpos_roundtrip() {
        let (board, history) = decode(FenParser::STARTPOS).unwrap();
        assert_eq!(board, Board::initial());
        assert_eq!(history.castling_rights(), CastlingRights::ALL);
        assert_eq!(encode(&board, &history), FenParser::STARTPOS);
    }

    #[test]
    fn fixed_positions_roundtrip() {
        roundtrip("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3");
        roundtrip("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1");
        roundtrip("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1");
        roundtrip("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1");
    }

    #[test]
    fn rejects_king_count() {
        assert!(matches!(
            decode("8/8/8/8/8/8/8/8 w - - 0 1"),
            Err(FenError::IllegalPosition(_))
        ));
        assert!(matches!(
            decode("k7/8/8/8/8/8/8/KK6 w - - 0 1"),
            Err(FenError::IllegalPosition(_))
        ));
    }

    #[test]
    fn rejects_pawn_on_back_rank() {
        assert!(matches!(
            decode("k6P/8/8/8/8/8/8/K7 w - - 0 1"),
            Err(FenError::IllegalPosition(_))
        ));
        assert!(matches!(
            decode("k7/8/8/8/8/8/8/K6p b - - 0 1"),
            Err(FenError::IllegalPosition(_))
        ));
    }

    #[test]
    fn rejects_side_not_to_move_in_check() {
        // Black is in check from the rook but White is to move.
        assert!(matches!(
            decode("k7/8/8/8/8/8/8/R3K3 w - - 0 1"),
            Err(FenError::IllegalPosition(_))
        ));
        assert!(decode("k7/8/8/8/8/8/8/R3K3 b - - 0 1").is_ok());
    }

    #[test]
    fn rejects_implausible_en_passant() {
        // No black pawn on e5
        assert!(matches!(
            decode("4k3/8/8/8/8/8/8/4K3 w - e6 0 1"),
            Err(FenError::InvalidEnPassantSquare(_))
        ));
        // Target on the wrong side for the side to move
        assert!(matches!(
            decode("4k3/8/8/8/4P3/8/8/4K3 w - e3 0 1"),
            Err(FenError::InvalidEnPassantSquare(_))
        ));
        assert!(decode("4k3/8/8/8/4P3/8/8/4K3 b - e3 0 1").is_ok());
    }

    #[test]
    fn masks_castling_without_pieces_at_home() {
        // The h1 rook is missing, so K is dropped.
        let (board, history) = decode("r3k2r/8/8/8/8/8/8/R3K3 w KQkq - 0 1").unwrap();
        assert_eq!(history.castling_rights().to_fen(), "Qkq");
        assert_eq!(
            encode(&board, &history),
            "r3k2r/8/8/8/8/8/8/R3K3 w Qkq - 0 1"
        );
    }

    #[test]
    fn syntax_errors_pass_through() {
        assert!(matches!(
            decode("not a fen"),
            Err(FenError::InvalidPartCount(3))
        ));
    }
}
