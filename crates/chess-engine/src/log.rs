//! Persisted game log.
//!
//! The text format is line oriented:
//!
//! ```text
//! SAN
//! <starting FEN>
//! <san> <FEN after the move>
//! ...
//! ```
//!
//! Recording the FEN after every ply lets [`GameLog::replay`] detect a log
//! that no longer matches the moves it lists.

use crate::fen;
use crate::game::{Game, GameError};
use crate::history::MoveHistory;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Notation scheme identifier on the first line.
pub const SCHEME: &str = "SAN";

/// Errors from parsing or replaying a game log.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LogError {
    #[error("unsupported notation scheme: {0:?}")]
    UnsupportedScheme(String),

    #[error("game log has no starting position")]
    MissingStartFen,

    #[error("line {line}: expected '<move> <fen>', got {text:?}")]
    MalformedLine { line: usize, text: String },

    #[error("invalid starting position: {0}")]
    StartPosition(#[source] GameError),

    #[error("ply {ply}: {source}")]
    Move {
        ply: usize,
        #[source]
        source: GameError,
    },

    #[error("ply {ply}: expected position {expected}, replay produced {actual}")]
    FenMismatch {
        ply: usize,
        expected: String,
        actual: String,
    },
}

/// One recorded ply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub san: String,
    pub fen_after: String,
}

/// A recorded game: the starting position and every ply played from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameLog {
    pub start_fen: String,
    pub entries: Vec<LogEntry>,
}

impl GameLog {
    /// Records the moves of `game` so far.
    pub fn record(game: &Game) -> Self {
        let mut board = game.board().clone();
        for m in game.history().iter().rev() {
            board.undo_apply(m);
        }
        let mut history = MoveHistory::new(*game.history().baseline());

        let entries = game
            .history()
            .iter()
            .zip(game.san_moves())
            .map(|(m, san)| {
                board.apply(m);
                history.push(*m);
                LogEntry {
                    san: san.clone(),
                    fen_after: fen::encode(&board, &history),
                }
            })
            .collect();

        GameLog {
            start_fen: game.start_fen().to_string(),
            entries,
        }
    }

    /// Parses the text form.
    pub fn parse(text: &str) -> Result<Self, LogError> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty());

        match lines.next() {
            Some((_, SCHEME)) => {}
            Some((_, other)) => return Err(LogError::UnsupportedScheme(other.to_string())),
            None => return Err(LogError::UnsupportedScheme(String::new())),
        }

        let start_fen = lines
            .next()
            .map(|(_, l)| l.to_string())
            .ok_or(LogError::MissingStartFen)?;

        let entries = lines
            .map(|(line, text)| {
                text.split_once(' ')
                    .map(|(san, fen_after)| LogEntry {
                        san: san.to_string(),
                        fen_after: fen_after.trim().to_string(),
                    })
                    .ok_or_else(|| LogError::MalformedLine {
                        line,
                        text: text.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(GameLog { start_fen, entries })
    }

    /// Replays the log into a fresh game, checking every recorded position.
    pub fn replay(&self) -> Result<Game, LogError> {
        let mut game = Game::from_fen(&self.start_fen).map_err(LogError::StartPosition)?;
        for (i, entry) in self.entries.iter().enumerate() {
            let ply = i + 1;
            game.apply_from_algebraic(&entry.san)
                .map_err(|source| LogError::Move { ply, source })?;
            let actual = game.to_fen();
            if actual != entry.fen_after {
                return Err(LogError::FenMismatch {
                    ply,
                    expected: entry.fen_after.clone(),
                    actual,
                });
            }
        }
        Ok(game)
    }
}

impl FromStr for GameLog {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for GameLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", SCHEME)?;
        writeln!(f, "{}", self.start_fen)?;
        for entry in &self.entries {
            writeln!(f, "{} {}", entry.san, entry.fen_after)?;
        }
        Ok(())
    }
}
