//! Single-writer game actor.
//!
//! One task owns the [`Game`] and applies [`Command`]s from an mpsc mailbox
//! in arrival order. Before any command is applied, the time since the
//! previous one is charged to the running clock, so a move that arrives
//! after its side's time ran out is refused with the time result.

use chess_core::{Color, Move, MoveRequest, PieceKind};
use chess_engine::{
    FixedPromotion, Game, GameError, GameLog, GameResult, GameState, MoveOutcome,
    PositionSnapshot,
};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

const MAILBOX_CAPACITY: usize = 64;

/// Errors returned through a [`GameHandle`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("game actor has shut down")]
    Closed,

    #[error(transparent)]
    Game(#[from] GameError),
}

/// Remaining time on both clocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockReading {
    pub white: Duration,
    pub black: Duration,
    /// Side whose clock is running, if any.
    pub running: Option<Color>,
}

impl ClockReading {
    pub fn remaining(&self, color: Color) -> Duration {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }
}

type Reply<T> = oneshot::Sender<T>;

/// Messages accepted by the actor.
#[derive(Debug)]
pub enum Command {
    MakeMove {
        request: MoveRequest,
        reply: Reply<Result<MoveOutcome, GameError>>,
    },
    Undo {
        reply: Reply<Result<Move, GameError>>,
    },
    Reset {
        reply: Reply<()>,
    },
    Snapshot {
        reply: Reply<PositionSnapshot>,
    },
    /// Only charges elapsed time.
    Tick {
        reply: Reply<Option<GameResult>>,
    },
    StartClock {
        reply: Reply<()>,
    },
    PauseClocks {
        reply: Reply<()>,
    },
    ResumeClock {
        reply: Reply<()>,
    },
    Clocks {
        reply: Reply<Option<ClockReading>>,
    },
    ClaimDraw {
        reply: Reply<Result<GameResult, GameError>>,
    },
    AgreeDraw {
        reply: Reply<Result<GameResult, GameError>>,
    },
    Resign {
        reply: Reply<Result<GameResult, GameError>>,
    },
    Log {
        reply: Reply<GameLog>,
    },
}

/// Owner of the game state. Create one with [`GameActor::spawn`].
pub struct GameActor {
    game: Game,
    auto_promote: Option<FixedPromotion>,
    mailbox: mpsc::Receiver<Command>,
    state: watch::Sender<GameState>,
    /// When time was last charged to the clocks.
    charged_at: Instant,
}

impl GameActor {
    /// Spawns the actor task and returns a handle to it.
    ///
    /// With `auto_promote` set, a promoting move that arrives without a
    /// piece is completed with that piece instead of being rejected with
    /// [`GameError::PromotionRequired`].
    ///
    /// The task ends once every handle is dropped and yields the final game.
    pub fn spawn(game: Game, auto_promote: Option<PieceKind>) -> (GameHandle, JoinHandle<Game>) {
        let (commands, mailbox) = mpsc::channel(MAILBOX_CAPACITY);
        let (state, state_rx) = watch::channel(game.state());
        let actor = GameActor {
            game,
            auto_promote: auto_promote.map(FixedPromotion),
            mailbox,
            state,
            charged_at: Instant::now(),
        };
        let task = tokio::spawn(actor.run());
        (
            GameHandle {
                commands,
                state: state_rx,
            },
            task,
        )
    }

    async fn run(mut self) -> Game {
        info!(fen = %self.game.to_fen(), "game actor started");
        while let Some(command) = self.mailbox.recv().await {
            self.handle(command);
        }
        info!(plies = self.game.history().len(), "game actor stopped");
        self.game
    }

    fn handle(&mut self, command: Command) {
        let flagged = self.charge_clock();
        match command {
            Command::MakeMove { request, reply } => {
                let outcome = match self.auto_promote.as_mut() {
                    Some(source) => self.game.make_move_with(request, source),
                    None => self.game.make_move(request),
                };
                if let Err(e) = &outcome {
                    debug!(request = %request, error = %e, "move rejected");
                }
                self.respond(reply, outcome);
            }
            Command::Undo { reply } => {
                let undone = self.game.undo_last_move();
                self.respond(reply, undone);
            }
            Command::Reset { reply } => {
                self.game.reset_board();
                self.respond(reply, ());
            }
            Command::Snapshot { reply } => {
                self.respond(reply, self.game.snapshot());
            }
            Command::Tick { reply } => {
                self.respond(reply, flagged);
            }
            Command::StartClock { reply } => {
                self.game.start_clock();
                self.respond(reply, ());
            }
            Command::PauseClocks { reply } => {
                self.game.pause_clocks();
                self.respond(reply, ());
            }
            Command::ResumeClock { reply } => {
                self.game.resume_clock();
                self.respond(reply, ());
            }
            Command::Clocks { reply } => {
                self.respond(reply, self.clock_reading());
            }
            Command::ClaimDraw { reply } => {
                let result = self.game.claim_draw();
                self.respond(reply, result);
            }
            Command::AgreeDraw { reply } => {
                let result = self.game.agree_draw();
                self.respond(reply, result);
            }
            Command::Resign { reply } => {
                let result = self.game.resign();
                self.respond(reply, result);
            }
            Command::Log { reply } => {
                self.respond(reply, GameLog::record(&self.game));
            }
        }
    }

    /// Charges the time since the previous command to the running clock.
    fn charge_clock(&mut self) -> Option<GameResult> {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.charged_at);
        self.charged_at = now;
        let result = self.game.tick_clock(elapsed);
        if let Some(result) = result {
            info!(%result, "clock expired");
        }
        result
    }

    /// Publishes the new state, then answers the caller. A dropped receiver
    /// means the caller stopped waiting; the command still took effect.
    fn respond<T>(&self, reply: Reply<T>, value: T) {
        self.state.send_if_modified(|state| {
            let current = self.game.state();
            let changed = *state != current;
            *state = current;
            changed
        });
        let _ = reply.send(value);
    }

    fn clock_reading(&self) -> Option<ClockReading> {
        let white = self.game.clock(Color::White)?;
        let black = self.game.clock(Color::Black)?;
        let running = Color::BOTH
            .into_iter()
            .find(|&c| self.game.clock(c).map_or(false, |clock| clock.is_running()));
        Some(ClockReading {
            white: white.remaining(),
            black: black.remaining(),
            running,
        })
    }
}

/// Cloneable async front end to a [`GameActor`].
#[derive(Debug, Clone)]
pub struct GameHandle {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<GameState>,
}

impl GameHandle {
    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, SessionError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| SessionError::Closed)?;
        response.await.map_err(|_| SessionError::Closed)
    }

    pub async fn make_move(&self, request: MoveRequest) -> Result<MoveOutcome, SessionError> {
        Ok(self
            .request(|reply| Command::MakeMove { request, reply })
            .await??)
    }

    pub async fn undo(&self) -> Result<Move, SessionError> {
        Ok(self.request(|reply| Command::Undo { reply }).await??)
    }

    pub async fn reset(&self) -> Result<(), SessionError> {
        self.request(|reply| Command::Reset { reply }).await
    }

    pub async fn snapshot(&self) -> Result<PositionSnapshot, SessionError> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Charges the time since the last command to the running clock.
    /// Returns the result if the clock ran out.
    pub async fn tick(&self) -> Result<Option<GameResult>, SessionError> {
        self.request(|reply| Command::Tick { reply }).await
    }

    pub async fn start_clock(&self) -> Result<(), SessionError> {
        self.request(|reply| Command::StartClock { reply }).await
    }

    pub async fn pause_clocks(&self) -> Result<(), SessionError> {
        self.request(|reply| Command::PauseClocks { reply }).await
    }

    pub async fn resume_clock(&self) -> Result<(), SessionError> {
        self.request(|reply| Command::ResumeClock { reply }).await
    }

    /// Returns both clocks, or `None` for an untimed game.
    pub async fn clocks(&self) -> Result<Option<ClockReading>, SessionError> {
        self.request(|reply| Command::Clocks { reply }).await
    }

    pub async fn claim_draw(&self) -> Result<GameResult, SessionError> {
        Ok(self.request(|reply| Command::ClaimDraw { reply }).await??)
    }

    pub async fn agree_draw(&self) -> Result<GameResult, SessionError> {
        Ok(self.request(|reply| Command::AgreeDraw { reply }).await??)
    }

    /// Resigns for the side to move.
    pub async fn resign(&self) -> Result<GameResult, SessionError> {
        Ok(self.request(|reply| Command::Resign { reply }).await??)
    }

    pub async fn log(&self) -> Result<GameLog, SessionError> {
        self.request(|reply| Command::Log { reply }).await
    }

    /// Returns the state after the last processed command.
    pub fn state(&self) -> GameState {
        *self.state.borrow()
    }

    /// Subscribes to state changes (check, game end, reset).
    pub fn subscribe(&self) -> watch::Receiver<GameState> {
        self.state.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_engine::DrawReason;
    use tokio::time;

    fn req(uci: &str) -> MoveRequest {
        MoveRequest::from_uci(uci).unwrap()
    }

    #[tokio::test]
    async fn test_moves_and_undo_through_handle() {
        let (handle, task) = GameActor::spawn(Game::new(), None);

        let outcome = handle.make_move(req("e2e4")).await.unwrap();
        assert_eq!(outcome.san, "e4");
        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.side_to_move, Color::Black);
        assert_eq!(snapshot.legal_moves.len(), 20);

        let err = handle.make_move(req("e2e4")).await.unwrap_err();
        assert!(matches!(err, SessionError::Game(GameError::IllegalMove(_))));

        let undone = handle.undo().await.unwrap();
        assert_eq!(undone.request(), req("e2e4"));
        assert_eq!(
            handle.undo().await,
            Err(SessionError::Game(GameError::NothingToUndo))
        );

        drop(handle);
        let game = task.await.unwrap();
        assert!(game.history().is_empty());
    }

    #[tokio::test]
    async fn test_auto_promotion() {
        let game = Game::from_fen("8/P7/8/8/8/8/8/4K1k1 w - - 0 1").unwrap();
        let (handle, _task) = GameActor::spawn(game, Some(PieceKind::Knight));
        let outcome = handle.make_move(req("a7a8")).await.unwrap();
        assert_eq!(outcome.mv.promotion, Some(PieceKind::Knight));

        let game = Game::from_fen("8/P7/8/8/8/8/8/4K1k1 w - - 0 1").unwrap();
        let (handle, _task) = GameActor::spawn(game, None);
        assert!(matches!(
            handle.make_move(req("a7a8")).await,
            Err(SessionError::Game(GameError::PromotionRequired { .. }))
        ));
    }

    #[tokio::test]
    async fn test_state_watch_follows_game() {
        let (handle, _task) = GameActor::spawn(Game::new(), None);
        let mut states = handle.subscribe();
        assert_eq!(handle.state(), GameState::InProgress);

        for uci in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            handle.make_move(req(uci)).await.unwrap();
        }
        states.changed().await.unwrap();
        let mate = GameResult::Checkmate {
            winner: Color::Black,
        };
        assert_eq!(*states.borrow_and_update(), GameState::Finished(mate));

        handle.reset().await.unwrap();
        assert_eq!(handle.state(), GameState::InProgress);
    }

    #[tokio::test]
    async fn test_draw_and_resign_commands() {
        let (handle, _task) = GameActor::spawn(Game::new(), None);
        assert_eq!(
            handle.claim_draw().await,
            Err(SessionError::Game(GameError::CannotClaimDraw))
        );
        assert_eq!(
            handle.agree_draw().await,
            Ok(GameResult::Draw(DrawReason::Agreement))
        );
        assert!(matches!(
            handle.resign().await,
            Err(SessionError::Game(GameError::GameOver(_)))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_commands() {
        let game = Game::with_time_control(Duration::from_secs(5));
        let (handle, _task) = GameActor::spawn(game, None);

        time::advance(Duration::from_secs(1)).await;
        let reading = handle.clocks().await.unwrap().unwrap();
        assert_eq!(reading.running, None);
        assert_eq!(reading.white, Duration::from_secs(5));

        handle.start_clock().await.unwrap();
        time::advance(Duration::from_secs(2)).await;
        assert_eq!(handle.tick().await, Ok(None));
        let reading = handle.clocks().await.unwrap().unwrap();
        assert_eq!(reading.running, Some(Color::White));
        assert_eq!(reading.remaining(Color::White), Duration::from_secs(3));

        handle.pause_clocks().await.unwrap();
        time::advance(Duration::from_secs(10)).await;
        assert_eq!(handle.tick().await, Ok(None));
        handle.resume_clock().await.unwrap();
        time::advance(Duration::from_secs(3)).await;
        assert_eq!(
            handle.tick().await,
            Ok(Some(GameResult::TimeForfeit {
                winner: Color::Black
            }))
        );
        assert!(matches!(
            handle.make_move(req("e2e4")).await,
            Err(SessionError::Game(GameError::GameOver(_)))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_move_is_refused_without_a_tick() {
        let game = Game::with_time_control(Duration::from_millis(1000));
        let (handle, _task) = GameActor::spawn(game, None);
        handle.start_clock().await.unwrap();

        time::advance(Duration::from_millis(1150)).await;
        let flagged = GameResult::TimeForfeit {
            winner: Color::Black,
        };
        assert_eq!(
            handle.make_move(req("e2e4")).await,
            Err(SessionError::Game(GameError::GameOver(flagged)))
        );
        assert_eq!(handle.state(), GameState::Finished(flagged));
        let reading = handle.clocks().await.unwrap().unwrap();
        assert_eq!(reading.white, Duration::ZERO);
        assert_eq!(reading.black, Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_thinking_time_is_charged_to_the_mover() {
        let game = Game::with_time_control(Duration::from_secs(10));
        let (handle, _task) = GameActor::spawn(game, None);
        handle.start_clock().await.unwrap();

        time::advance(Duration::from_millis(790)).await;
        handle.make_move(req("e2e4")).await.unwrap();
        time::advance(Duration::from_millis(20)).await;
        handle.make_move(req("e7e5")).await.unwrap();

        let reading = handle.clocks().await.unwrap().unwrap();
        assert_eq!(reading.white, Duration::from_millis(9210));
        assert_eq!(reading.black, Duration::from_millis(9980));
        assert_eq!(reading.running, Some(Color::White));
    }

    #[tokio::test(start_paused = true)]
    async fn test_untimed_game_has_no_clocks() {
        let (handle, _task) = GameActor::spawn(Game::new(), None);
        assert_eq!(handle.clocks().await, Ok(None));
        time::advance(Duration::from_secs(1)).await;
        assert_eq!(handle.tick().await, Ok(None));
    }

    #[tokio::test]
    async fn test_closed_actor() {
        let (handle, task) = GameActor::spawn(Game::new(), None);
        task.abort();
        let _ = task.await;
        assert_eq!(handle.snapshot().await, Err(SessionError::Closed));
    }
}
