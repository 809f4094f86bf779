//! Core types for chess.
//!
//! This crate provides the value types shared by the rules engine and its
//! consumers:
//! - [`Piece`], [`PieceKind`] and [`Color`] for piece representation
//! - [`Square`], [`File`], and [`Rank`] for board coordinates
//! - [`Move`] for applied moves and [`MoveRequest`] for candidate moves
//! - FEN syntax parsing

mod color;
mod fen;
mod mov;
mod piece;
mod square;

pub use color::Color;
pub use fen::{FenError, FenParser};
pub use mov::{Move, MoveRequest, SpecialMove};
pub use piece::{Piece, PieceKind};
pub use square::{File, Rank, Square, SquareError};
