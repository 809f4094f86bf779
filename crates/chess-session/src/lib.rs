//! Async game sessions on top of `chess-engine`.
//!
//! - [`GameActor`] / [`GameHandle`] - the single task that owns a game and
//!   the cloneable handle that sends it commands
//! - [`ClockDriver`] - periodic, pausable clock ticks routed through the actor
//! - [`ComputerOpponent`] and [`UciEngine`] - bounded, validated engine moves
//! - [`SessionConfig`] - `chess.toml` settings
//!
//! # Example
//!
//! ```no_run
//! use chess_engine::Game;
//! use chess_session::{ComputerOpponent, GameActor, UciEngine};
//! use std::time::Duration;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let (game, _task) = GameActor::spawn(Game::new(), None);
//! let mut engine = ComputerOpponent::new(UciEngine::spawn("stockfish").await?);
//! let snapshot = game.snapshot().await?;
//! let m = engine.suggest_move(&snapshot, Duration::from_millis(500)).await?;
//! game.make_move(m.request()).await?;
//! # Ok(())
//! # }
//! ```

mod actor;
mod clock_driver;
mod config;
mod opponent;
pub mod selfplay;

pub use actor::{ClockReading, Command, GameActor, GameHandle, SessionError};
pub use clock_driver::ClockDriver;
pub use config::{ConfigError, EngineConfig, PromotionPiece, SessionConfig};
pub use opponent::{ComputerOpponent, EngineFailure, MoveSearch, UciEngine};
pub use selfplay::SelfPlayEnd;
