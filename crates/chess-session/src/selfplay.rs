//! Computer vs computer games driven through a [`GameHandle`].

use crate::actor::{GameHandle, SessionError};
use crate::opponent::{ComputerOpponent, EngineFailure, MoveSearch};
use chess_core::Color;
use chess_engine::{GameError, GameResult, GameState};
use std::time::Duration;
use tracing::{info, warn};

/// How a self-play game stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelfPlayEnd {
    /// The game reached a result.
    Finished(GameResult),
    /// The side to move's engine failed and resigned.
    Forfeited { loser: Color, failure: EngineFailure },
    /// The ply limit was reached with the game still running.
    PlyLimit,
}

/// Plays `white` against `black` until the game ends or `max_plies` moves
/// have been made. Each engine gets `budget` per move.
///
/// An engine failure resigns the game for that side. A clock that runs out
/// while an engine is thinking ends the game before its move arrives.
pub async fn play<W, B>(
    game: &GameHandle,
    white: &mut ComputerOpponent<W>,
    black: &mut ComputerOpponent<B>,
    budget: Duration,
    max_plies: usize,
) -> Result<SelfPlayEnd, SessionError>
where
    W: MoveSearch,
    B: MoveSearch,
{
    for _ in 0..max_plies {
        let snapshot = game.snapshot().await?;
        if let GameState::Finished(result) = snapshot.state {
            return Ok(SelfPlayEnd::Finished(result));
        }

        let side = snapshot.side_to_move;
        let suggestion = match side {
            Color::White => white.suggest_move(&snapshot, budget).await,
            Color::Black => black.suggest_move(&snapshot, budget).await,
        };

        match suggestion {
            Ok(m) => match game.make_move(m.request()).await {
                Ok(outcome) => info!(%side, san = %outcome.san, "played"),
                Err(SessionError::Game(GameError::GameOver(result))) => {
                    return Ok(SelfPlayEnd::Finished(result));
                }
                Err(e) => return Err(e),
            },
            Err(failure) => {
                warn!(%side, error = %failure, "engine failed, resigning");
                return match game.resign().await {
                    Ok(_) => Ok(SelfPlayEnd::Forfeited {
                        loser: side,
                        failure,
                    }),
                    Err(SessionError::Game(GameError::GameOver(result))) => {
                        Ok(SelfPlayEnd::Finished(result))
                    }
                    Err(e) => Err(e),
                };
            }
        }
    }

    match game.state() {
        GameState::Finished(result) => Ok(SelfPlayEnd::Finished(result)),
        _ => Ok(SelfPlayEnd::PlyLimit),
    }
}
