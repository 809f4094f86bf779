//! Move generation.
//!
//! Piece movement is table driven: every non-pawn kind has a [`Pattern`] of
//! direction steps and a flag saying whether it slides. Pawns, castling and
//! en passant are handled by dedicated generators. Legal moves are the
//! pseudo-legal ones that do not leave the mover's king attacked.

pub mod perft;

use crate::board::Board;
use crate::history::{castling_homes, MoveHistory};
use chess_core::{Color, Move, MoveRequest, Piece, PieceKind, SpecialMove, Square};
use std::fmt;

/// Direction steps of one piece kind as (rank, file) deltas.
#[derive(Debug)]
pub struct Pattern {
    pub steps: &'static [(i8, i8)],
    /// Repeat each step until blocked.
    pub slides: bool,
}

const ORTHOGONAL: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONAL: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const ALL_DIRECTIONS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];
const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];

/// Indexed by [`PieceKind::index`]. Pawns have no table entry.
static PATTERNS: [Pattern; 6] = [
    Pattern {
        steps: &[],
        slides: false,
    },
    Pattern {
        steps: &KNIGHT_JUMPS,
        slides: false,
    },
    Pattern {
        steps: &DIAGONAL,
        slides: true,
    },
    Pattern {
        steps: &ORTHOGONAL,
        slides: true,
    },
    Pattern {
        steps: &ALL_DIRECTIONS,
        slides: true,
    },
    Pattern {
        steps: &ALL_DIRECTIONS,
        slides: false,
    },
];

/// Returns the movement pattern of a piece kind.
#[inline]
pub fn pattern(kind: PieceKind) -> &'static Pattern {
    &PATTERNS[kind.index()]
}

/// A growable list of moves.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct MoveList {
    moves: Vec<Move>,
}

impl MoveList {
    /// Typical upper bound on legal moves, used as the initial capacity.
    pub const TYPICAL_MAX: usize = 218;

    /// Creates an empty move list.
    pub fn new() -> Self {
        MoveList {
            moves: Vec::with_capacity(Self::TYPICAL_MAX),
        }
    }

    /// Adds a move to the list.
    #[inline]
    pub fn push(&mut self, m: Move) {
        self.moves.push(m);
    }

    /// Returns the number of moves.
    #[inline]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Returns true if the list is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Returns a slice of the moves.
    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves
    }

    /// Clears the move list.
    #[inline]
    pub fn clear(&mut self) {
        self.moves.clear();
    }

    /// Retains only moves for which the predicate returns true.
    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&Move) -> bool,
    {
        self.moves.retain(f);
    }

    /// Returns an iterator over the moves.
    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.moves.iter()
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.moves[index]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter()
    }
}

impl IntoIterator for MoveList {
    type Item = Move;
    type IntoIter = std::vec::IntoIter<Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.into_iter()
    }
}

impl fmt::Debug for MoveList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// Why a [`MoveRequest`] did not match a legal move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// No legal move has these squares and promotion kind.
    Illegal,
    /// The squares name a promotion but no kind was supplied.
    PromotionRequired,
}

/// Generates all legal moves for `color`.
pub fn legal_moves(board: &Board, history: &MoveHistory, color: Color) -> MoveList {
    let mut moves = pseudo_legal_moves(board, history, color);
    let mut scratch = board.clone();
    moves.retain(|m| {
        scratch.apply(m);
        let safe = !scratch.is_in_check(color);
        scratch.undo_apply(m);
        safe
    });
    moves
}

/// Generates the legal moves of the piece on `from`.
pub fn legal_moves_from(board: &Board, history: &MoveHistory, from: Square) -> MoveList {
    match board.piece_at(from) {
        Some(piece) => {
            let mut moves = legal_moves(board, history, piece.color);
            moves.retain(|m| m.from == from);
            moves
        }
        None => MoveList::new(),
    }
}

/// Generates moves that obey piece movement but may leave the king attacked.
pub fn pseudo_legal_moves(board: &Board, history: &MoveHistory, color: Color) -> MoveList {
    let mut moves = MoveList::new();

    for (from, piece) in board.pieces_of(color) {
        match piece.kind {
            PieceKind::Pawn => generate_pawn_moves(board, history, from, piece, &mut moves),
            kind => generate_pattern_moves(board, from, piece, pattern(kind), &mut moves),
        }
    }
    generate_castling_moves(board, history, color, &mut moves);

    moves
}

/// Walks a piece's pattern, stopping each ray at the first occupied square.
fn generate_pattern_moves(
    board: &Board,
    from: Square,
    piece: Piece,
    pat: &Pattern,
    moves: &mut MoveList,
) {
    for &(d_rank, d_file) in pat.steps {
        let mut cur = from;
        while let Some(to) = cur.offset(d_rank, d_file) {
            match board.piece_at(to) {
                None => moves.push(Move::normal(from, to, piece, None)),
                Some(target) => {
                    if target.color != piece.color {
                        moves.push(Move::normal(from, to, piece, Some(target)));
                    }
                    break;
                }
            }
            if !pat.slides {
                break;
            }
            cur = to;
        }
    }
}

fn generate_pawn_moves(
    board: &Board,
    history: &MoveHistory,
    from: Square,
    pawn: Piece,
    moves: &mut MoveList,
) {
    let us = pawn.color;
    let dir = us.pawn_direction();

    // Pushes
    if let Some(one) = from.offset(dir, 0) {
        if board.piece_at(one).is_none() {
            push_pawn_move(from, one, pawn, None, moves);
            if from.rank() == us.pawn_rank() {
                if let Some(two) = one.offset(dir, 0) {
                    if board.piece_at(two).is_none() {
                        moves.push(Move::normal(from, two, pawn, None));
                    }
                }
            }
        }
    }

    // Captures
    for d_file in [-1, 1] {
        if let Some(to) = from.offset(dir, d_file) {
            if let Some(target) = board.piece_at(to) {
                if target.color != us {
                    push_pawn_move(from, to, pawn, Some(target), moves);
                }
            }
        }
    }

    // En passant
    if let Some(ep) = history.en_passant_target() {
        let victim_square = Square::new(ep.file(), from.rank());
        let victim = Piece::new(PieceKind::Pawn, us.opposite());
        let diagonal = [-1, 1]
            .iter()
            .any(|&d_file| from.offset(dir, d_file) == Some(ep));
        if diagonal && board.piece_at(ep).is_none() && board.piece_at(victim_square) == Some(victim)
        {
            moves.push(Move {
                special: SpecialMove::EnPassant,
                ..Move::normal(from, ep, pawn, Some(victim))
            });
        }
    }
}

/// Pushes a pawn move, expanding it into one move per promotion kind when it
/// reaches the last rank.
fn push_pawn_move(
    from: Square,
    to: Square,
    pawn: Piece,
    captured: Option<Piece>,
    moves: &mut MoveList,
) {
    if to.rank() == pawn.color.promotion_rank() {
        for kind in PieceKind::PROMOTIONS {
            moves.push(Move {
                promotion: Some(kind),
                special: SpecialMove::Promotion,
                ..Move::normal(from, to, pawn, captured)
            });
        }
    } else {
        moves.push(Move::normal(from, to, pawn, captured));
    }
}

/// Generates castling moves whose right survives and whose path is clear
/// and unattacked.
fn generate_castling_moves(
    board: &Board,
    history: &MoveHistory,
    us: Color,
    moves: &mut MoveList,
) {
    let rights = history.castling_rights();
    let them = us.opposite();
    let king = Piece::new(PieceKind::King, us);
    let rook = Piece::new(PieceKind::Rook, us);

    for kingside in [true, false] {
        let allowed = if kingside {
            rights.can_castle_kingside(us)
        } else {
            rights.can_castle_queenside(us)
        };
        if !allowed {
            continue;
        }

        let (king_home, rook_home) = castling_homes(us, kingside);
        if board.piece_at(king_home) != Some(king) || board.piece_at(rook_home) != Some(rook) {
            continue;
        }

        // Squares strictly between king and rook must be empty.
        let step: i8 = if kingside { 1 } else { -1 };
        let mut between = king_home.offset(0, step);
        let mut clear = true;
        while let Some(sq) = between {
            if sq == rook_home {
                break;
            }
            if board.piece_at(sq).is_some() {
                clear = false;
                break;
            }
            between = sq.offset(0, step);
        }
        if !clear {
            continue;
        }

        // The king may not start in, pass through or land on an attacked square.
        let path = [
            Some(king_home),
            king_home.offset(0, step),
            king_home.offset(0, 2 * step),
        ];
        let safe = path
            .iter()
            .flatten()
            .all(|&sq| !board.is_square_attacked(sq, them));
        if !safe {
            continue;
        }

        if let Some(to) = king_home.offset(0, 2 * step) {
            let special = if kingside {
                SpecialMove::CastleKingside
            } else {
                SpecialMove::CastleQueenside
            };
            moves.push(Move {
                special,
                ..Move::normal(king_home, to, king, None)
            });
        }
    }
}

/// Finds the legal move a request names.
///
/// A request without a promotion kind for a promoting pawn move is answered
/// with [`Rejection::PromotionRequired`]; a kind supplied for a move that
/// does not promote is [`Rejection::Illegal`].
pub fn match_request(legal: &[Move], request: &MoveRequest) -> Result<Move, Rejection> {
    let mut candidates = legal
        .iter()
        .filter(|m| m.from == request.from && m.to == request.to)
        .peekable();

    let first = match candidates.peek() {
        Some(m) => **m,
        None => return Err(Rejection::Illegal),
    };

    match (first.special, request.promotion) {
        (SpecialMove::Promotion, None) => Err(Rejection::PromotionRequired),
        (SpecialMove::Promotion, Some(kind)) => candidates
            .find(|m| m.promotion == Some(kind))
            .copied()
            .ok_or(Rejection::Illegal),
        (_, Some(_)) => Err(Rejection::Illegal),
        (_, None) => Ok(first),
    }
}
