//! Chess rules engine.
//!
//! This crate provides:
//! - [`Board`] - mailbox piece placement with apply/undo of move deltas
//! - [`MoveHistory`] - applied moves plus the starting baseline; castling
//!   rights and en passant eligibility are derived from it
//! - [`movegen`] - table-driven legal move generation and perft
//! - [`Game`] - turn order, terminal detection, draws, undo and clocks
//! - [`san`] and [`fen`] - algebraic notation and FEN codecs
//! - [`GameLog`] - a replayable text record of a game
//!
//! # Example
//!
//! ```
//! use chess_engine::Game;
//! use chess_core::MoveRequest;
//!
//! let mut game = Game::new();
//! game.make_move(MoveRequest::from_uci("e2e4").unwrap()).unwrap();
//! game.apply_from_algebraic("e5").unwrap();
//! assert_eq!(game.legal_moves().len(), 29);
//! println!("Position after 1.e4 e5: {}", game.to_fen());
//! ```

mod board;
mod clock;
pub mod fen;
mod game;
mod history;
mod log;
pub mod movegen;
mod promotion;
pub mod rules;
pub mod san;
mod zobrist;

pub use board::Board;
pub use clock::{Clock, ClockStatus};
pub use game::{Game, GameError, MoveOutcome, PositionSnapshot};
pub use history::{Baseline, CastlingRights, MoveHistory};
pub use log::{GameLog, LogEntry, LogError};
pub use movegen::{legal_moves, legal_moves_from, pattern, MoveList, Pattern};
pub use promotion::{AutoQueen, FixedPromotion, PromotionSource};
pub use rules::{DrawReason, GameResult, GameState};
pub use san::{move_to_san, san_to_move, SanError};
pub use zobrist::position_key;
