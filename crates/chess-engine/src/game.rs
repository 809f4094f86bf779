//! Full game management with history tracking.
//!
//! [`Game`] is the single owner of all mutable game state: the board, the
//! move history, the repetition keys, the two clocks and the result. Every
//! mutation either succeeds completely or returns an error and leaves the
//! state untouched.

use crate::board::Board;
use crate::clock::{Clock, ClockStatus};
use crate::fen;
use crate::history::MoveHistory;
use crate::movegen::{self, MoveList, Rejection};
use crate::promotion::PromotionSource;
use crate::rules::{
    has_mating_material, is_insufficient_material, DrawReason, GameResult, GameState,
    FIFTY_MOVE_CLAIM, REPETITION_CLAIM, REPETITION_LIMIT, SEVENTY_FIVE_MOVE_LIMIT,
};
use crate::san::{move_to_san, san_to_move, SanError};
use crate::zobrist::position_key;
use chess_core::{
    Color, FenError, FenParser, Move, MoveRequest, PieceKind, Square, SquareError, SpecialMove,
};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Error type for game operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error(transparent)]
    InvalidSquare(#[from] SquareError),

    #[error("illegal move: {0}")]
    IllegalMove(String),

    #[error("promotion piece required for {from}{to}")]
    PromotionRequired { from: Square, to: Square },

    #[error("game is over: {0}")]
    GameOver(GameResult),

    #[error("no move to undo")]
    NothingToUndo,

    #[error("malformed FEN: {0}")]
    MalformedFen(#[from] FenError),

    #[error("invalid SAN: {0}")]
    InvalidSan(#[from] SanError),

    #[error("cannot claim draw: conditions not met")]
    CannotClaimDraw,
}

/// What an accepted move did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    /// The applied move, including any captured piece.
    pub mv: Move,
    /// SAN of the move, with its check or mate suffix.
    pub san: String,
    /// The side now to move is in check.
    pub check: bool,
    pub checkmate: bool,
    /// Set when this move ended the game.
    pub result: Option<GameResult>,
}

/// Read-only view of a position handed to move choosers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionSnapshot {
    pub fen: String,
    pub side_to_move: Color,
    pub state: GameState,
    pub legal_moves: Vec<Move>,
}

impl PositionSnapshot {
    /// The legal move `request` names exactly, promotion piece included.
    pub fn find(&self, request: &MoveRequest) -> Option<&Move> {
        self.legal_moves.iter().find(|m| m.request() == *request)
    }

    pub fn is_legal(&self, request: &MoveRequest) -> bool {
        self.find(request).is_some()
    }
}

/// A complete chess game with history tracking.
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    history: MoveHistory,
    /// FEN the game started from.
    start_fen: String,
    /// SAN of every move in `history`.
    sans: Vec<String>,
    /// Position key after every ply, starting with the initial position.
    keys: Vec<u64>,
    time_control: Option<Duration>,
    clocks: Option<[Clock; 2]>,
    /// Clocks were started and not paused by the caller.
    clocks_on: bool,
    result: Option<GameResult>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Creates an untimed game from the standard starting position.
    pub fn new() -> Self {
        Self::from_parts(Board::initial(), MoveHistory::default(), FenParser::STARTPOS)
    }

    /// Creates a game from the starting position with `initial` time per side.
    pub fn with_time_control(initial: Duration) -> Self {
        let mut game = Self::new();
        game.set_time_control(Some(initial));
        game
    }

    /// Creates an untimed game from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, GameError> {
        let (board, history) = fen::decode(fen)?;
        Ok(Self::from_parts(board, history, fen))
    }

    fn from_parts(board: Board, history: MoveHistory, start_fen: &str) -> Self {
        let mut game = Game {
            board,
            history,
            start_fen: start_fen.split_whitespace().collect::<Vec<_>>().join(" "),
            sans: Vec::new(),
            keys: Vec::new(),
            time_control: None,
            clocks: None,
            clocks_on: false,
            result: None,
        };
        game.keys.push(game.current_key());
        // The starting position may already be over.
        game.check_game_end();
        game
    }

    /// Replaces the time control and resets both clocks to it.
    pub fn set_time_control(&mut self, time_control: Option<Duration>) {
        self.time_control = time_control;
        self.clocks = time_control.map(|t| [Clock::new(t), Clock::new(t)]);
        self.clocks_on = false;
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the move history.
    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    /// Returns the SAN of every move played, in order.
    pub fn san_moves(&self) -> &[String] {
        &self.sans
    }

    /// Returns the FEN the game started from.
    pub fn start_fen(&self) -> &str {
        &self.start_fen
    }

    pub fn side_to_move(&self) -> Color {
        self.history.side_to_move()
    }

    /// Returns the game result if the game is over.
    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    /// Returns true if the game has ended.
    pub fn is_game_over(&self) -> bool {
        self.result.is_some()
    }

    pub fn state(&self) -> GameState {
        match self.result {
            Some(result) => GameState::Finished(result),
            None if self.is_check() => GameState::Check,
            None => GameState::InProgress,
        }
    }

    /// Returns true if the side to move is in check.
    pub fn is_check(&self) -> bool {
        self.board.is_in_check(self.side_to_move())
    }

    /// Returns all legal moves for the side to move.
    pub fn legal_moves(&self) -> MoveList {
        movegen::legal_moves(&self.board, &self.history, self.side_to_move())
    }

    /// Returns the legal moves of the piece on `from`, for either color.
    pub fn legal_moves_from(&self, from: Square) -> MoveList {
        movegen::legal_moves_from(&self.board, &self.history, from)
    }

    /// Like [`Game::legal_moves_from`] for raw (rank, file) coordinates.
    pub fn legal_moves_at(&self, rank: i32, file: i32) -> Result<MoveList, GameError> {
        let from = Square::from_coords(rank, file)?;
        Ok(self.legal_moves_from(from))
    }

    /// Returns true if the request names a legal castling move.
    pub fn is_castling(&self, request: &MoveRequest) -> bool {
        self.special_kind(request)
            .map_or(false, |special| special.is_castling())
    }

    /// Returns true if the request names a legal en passant capture.
    pub fn is_en_passant(&self, request: &MoveRequest) -> bool {
        self.special_kind(request) == Some(SpecialMove::EnPassant)
    }

    /// Returns true if the request names a legal promoting pawn move.
    pub fn is_promotion(&self, request: &MoveRequest) -> bool {
        self.special_kind(request) == Some(SpecialMove::Promotion)
    }

    fn special_kind(&self, request: &MoveRequest) -> Option<SpecialMove> {
        self.legal_moves_from(request.from)
            .iter()
            .find(|m| m.to == request.to)
            .map(|m| m.special)
    }

    /// Plies since the last capture or pawn move.
    pub fn halfmove_clock(&self) -> u32 {
        self.history.halfmove_clock()
    }

    /// Returns the current full move number.
    pub fn fullmove_number(&self) -> u32 {
        self.history.fullmove_number()
    }

    /// Counts how many times the current position has occurred.
    pub fn position_count(&self) -> usize {
        match self.keys.last() {
            Some(current) => self.keys.iter().filter(|&k| k == current).count(),
            None => 0,
        }
    }

    /// Returns the current position as a FEN string.
    pub fn to_fen(&self) -> String {
        fen::encode(&self.board, &self.history)
    }

    /// Captures an immutable view of the current position.
    pub fn snapshot(&self) -> PositionSnapshot {
        PositionSnapshot {
            fen: self.to_fen(),
            side_to_move: self.side_to_move(),
            state: self.state(),
            legal_moves: self.legal_moves().into_iter().collect(),
        }
    }

    /// Makes the move named by `request` for the side to move.
    pub fn make_move(&mut self, request: MoveRequest) -> Result<MoveOutcome, GameError> {
        if let Some(result) = self.result {
            return Err(GameError::GameOver(result));
        }

        let legal = self.legal_moves();
        let m = movegen::match_request(legal.as_slice(), &request).map_err(|rejection| {
            match rejection {
                Rejection::Illegal => GameError::IllegalMove(request.to_uci()),
                Rejection::PromotionRequired => GameError::PromotionRequired {
                    from: request.from,
                    to: request.to,
                },
            }
        })?;

        Ok(self.commit(m))
    }

    /// Makes a move, asking `source` for the piece when a promotion kind is
    /// needed and the request does not carry one.
    pub fn make_move_with(
        &mut self,
        request: MoveRequest,
        source: &mut dyn PromotionSource,
    ) -> Result<MoveOutcome, GameError> {
        match self.make_move(request) {
            Err(GameError::PromotionRequired { from, to }) => {
                let mut kind = source.choose_promotion(self.side_to_move(), from, to);
                if !kind.is_promotion_target() {
                    kind = PieceKind::Queen;
                }
                self.make_move(request.with_promotion(kind))
            }
            other => other,
        }
    }

    /// Makes a move given in UCI notation ("e2e4", "e7e8q").
    pub fn make_move_uci(&mut self, uci: &str) -> Result<MoveOutcome, GameError> {
        let request = MoveRequest::from_uci(uci)
            .ok_or_else(|| GameError::IllegalMove(format!("invalid UCI: {}", uci)))?;
        self.make_move(request)
    }

    /// Makes a move given in SAN. This is the replay entry point for
    /// recorded games.
    pub fn apply_from_algebraic(&mut self, san: &str) -> Result<MoveOutcome, GameError> {
        if let Some(result) = self.result {
            return Err(GameError::GameOver(result));
        }
        let m = san_to_move(&self.board, &self.history, san)?;
        Ok(self.commit(m))
    }

    /// Generates SAN for a legal move in the current position.
    pub fn move_to_san(&self, m: &Move) -> String {
        move_to_san(&self.board, &self.history, m)
    }

    /// Parses SAN and returns the corresponding move.
    pub fn san_to_move(&self, san: &str) -> Result<Move, SanError> {
        san_to_move(&self.board, &self.history, san)
    }

    /// Applies a move known to be legal.
    fn commit(&mut self, m: Move) -> MoveOutcome {
        let san = move_to_san(&self.board, &self.history, &m);
        let mover = m.color();

        self.board.apply(&m);
        self.history.push(m);
        self.sans.push(san.clone());
        self.keys.push(self.current_key());

        if let Some(clocks) = self.clocks.as_mut() {
            clocks[mover.index()].pause();
            clocks[mover.opposite().index()].resume();
            self.clocks_on = true;
        }

        debug!(mv = %m, san = %san, "applied move");

        let result = self.check_game_end().or_else(|| self.flag_if_out_of_time());
        MoveOutcome {
            mv: m,
            san,
            check: self.is_check(),
            checkmate: matches!(result, Some(GameResult::Checkmate { .. })),
            result,
        }
    }

    /// Takes back the last move, also after the game has ended.
    ///
    /// Time already consumed is not refunded. If the clocks were running the
    /// clock of the side that is to move again restarts.
    pub fn undo_last_move(&mut self) -> Result<Move, GameError> {
        let m = self.history.pop().ok_or(GameError::NothingToUndo)?;
        self.board.undo_apply(&m);
        self.sans.pop();
        self.keys.pop();
        self.result = None;

        let side = self.side_to_move();
        let clocks_on = self.clocks_on;
        if let Some(clocks) = self.clocks.as_mut() {
            clocks[side.opposite().index()].pause();
            if clocks_on {
                clocks[side.index()].resume();
            }
        }

        debug!(mv = %m, "undid move");
        self.flag_if_out_of_time();
        Ok(m)
    }

    /// Restores the standard starting position, clears history and result and
    /// resets the clocks to the configured time control.
    pub fn reset_board(&mut self) {
        let time_control = self.time_control;
        *self = Self::new();
        self.set_time_control(time_control);
        debug!("board reset");
    }

    /// Returns true if a draw can be claimed (threefold repetition or 50-move rule).
    pub fn can_claim_draw(&self) -> bool {
        self.result.is_none()
            && (self.position_count() >= REPETITION_CLAIM
                || self.halfmove_clock() >= FIFTY_MOVE_CLAIM)
    }

    /// Claims a draw if conditions are met.
    pub fn claim_draw(&mut self) -> Result<GameResult, GameError> {
        if let Some(result) = self.result {
            return Err(GameError::GameOver(result));
        }
        let reason = if self.position_count() >= REPETITION_CLAIM {
            DrawReason::Repetition
        } else if self.halfmove_clock() >= FIFTY_MOVE_CLAIM {
            DrawReason::FiftyMove
        } else {
            return Err(GameError::CannotClaimDraw);
        };
        Ok(self.finish(GameResult::Draw(reason)))
    }

    /// Ends the game as a draw by agreement.
    pub fn agree_draw(&mut self) -> Result<GameResult, GameError> {
        if let Some(result) = self.result {
            return Err(GameError::GameOver(result));
        }
        Ok(self.finish(GameResult::Draw(DrawReason::Agreement)))
    }

    /// Resigns the game for the side to move.
    pub fn resign(&mut self) -> Result<GameResult, GameError> {
        if let Some(result) = self.result {
            return Err(GameError::GameOver(result));
        }
        let winner = self.side_to_move().opposite();
        Ok(self.finish(GameResult::Resignation { winner }))
    }

    /// Returns the clock of one side, if the game is timed.
    pub fn clock(&self, color: Color) -> Option<&Clock> {
        self.clocks.as_ref().map(|c| &c[color.index()])
    }

    pub fn time_control(&self) -> Option<Duration> {
        self.time_control
    }

    /// Starts the side to move's clock. Untimed or finished games ignore it.
    pub fn start_clock(&mut self) {
        self.resume_clock();
    }

    /// Stops both clocks until [`Game::resume_clock`].
    pub fn pause_clocks(&mut self) {
        if let Some(clocks) = self.clocks.as_mut() {
            clocks.iter_mut().for_each(Clock::pause);
        }
        self.clocks_on = false;
    }

    /// Restarts the side to move's clock.
    pub fn resume_clock(&mut self) {
        if self.result.is_some() {
            return;
        }
        let side = self.side_to_move();
        if let Some(clocks) = self.clocks.as_mut() {
            clocks[side.opposite().index()].pause();
            clocks[side.index()].resume();
            self.clocks_on = true;
        }
        self.flag_if_out_of_time();
    }

    /// Deducts `elapsed` from the running clock.
    ///
    /// Returns the result if this tick ran the clock out: the side whose time
    /// expired loses, or the game is drawn if the opponent cannot mate.
    pub fn tick_clock(&mut self, elapsed: Duration) -> Option<GameResult> {
        if self.result.is_some() {
            return None;
        }
        let side = self.side_to_move();
        let clock = self.clocks.as_mut().map(|c| &mut c[side.index()])?;
        if clock.tick(elapsed) != ClockStatus::Expired {
            return None;
        }

        let result = self.time_out(side);
        Some(self.finish(result))
    }

    /// Result when `loser` runs out of time.
    fn time_out(&self, loser: Color) -> GameResult {
        let winner = loser.opposite();
        if has_mating_material(&self.board, winner) {
            GameResult::TimeForfeit { winner }
        } else {
            GameResult::Draw(DrawReason::TimeOut)
        }
    }

    /// Ends the game when the side to move is handed an empty clock, which
    /// happens when a move or a take-back returns the turn to a side that
    /// already ran out.
    fn flag_if_out_of_time(&mut self) -> Option<GameResult> {
        if self.result.is_some() || !self.clocks_on {
            return None;
        }
        let side = self.side_to_move();
        if !self.clock(side).map_or(false, Clock::is_expired) {
            return None;
        }
        let result = self.time_out(side);
        Some(self.finish(result))
    }

    /// Counts leaf nodes of the legal move tree from the current position.
    pub fn perft(&self, depth: u32) -> u64 {
        let mut board = self.board.clone();
        let mut history = self.history.clone();
        movegen::perft::perft(&mut board, &mut history, depth)
    }

    /// [`perft`](Self::perft) split by root move, in UCI order.
    pub fn perft_divide(&self, depth: u32) -> Vec<(String, u64)> {
        let mut board = self.board.clone();
        let mut history = self.history.clone();
        movegen::perft::perft_divide(&mut board, &mut history, depth)
    }

    fn current_key(&self) -> u64 {
        position_key(
            &self.board,
            self.history.side_to_move(),
            self.history.castling_rights(),
            self.history.en_passant_target(),
        )
    }

    /// Detects automatic game ends after a move or on load.
    fn check_game_end(&mut self) -> Option<GameResult> {
        let side = self.side_to_move();
        let result = if self.legal_moves().is_empty() {
            if self.board.is_in_check(side) {
                GameResult::Checkmate {
                    winner: side.opposite(),
                }
            } else {
                GameResult::Stalemate
            }
        } else if self.position_count() >= REPETITION_LIMIT {
            GameResult::Draw(DrawReason::Repetition)
        } else if self.halfmove_clock() >= SEVENTY_FIVE_MOVE_LIMIT {
            GameResult::Draw(DrawReason::FiftyMove)
        } else if is_insufficient_material(&self.board) {
            GameResult::Draw(DrawReason::InsufficientMaterial)
        } else {
            return None;
        };
        Some(self.finish(result))
    }

    fn finish(&mut self, result: GameResult) -> GameResult {
        self.result = Some(result);
        if let Some(clocks) = self.clocks.as_mut() {
            clocks.iter_mut().for_each(Clock::pause);
        }
        info!(%result, plies = self.history.len(), "game over");
        result
    }
}
