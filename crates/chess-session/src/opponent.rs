//! Computer opponents.
//!
//! [`MoveSearch`] is the boundary to anything that picks moves from a FEN.
//! [`UciEngine`] implements it over a UCI engine subprocess.
//! [`ComputerOpponent`] bounds each search with a deadline and only hands
//! back moves that are legal in the position it was asked about.

use chess_core::{Move, MoveRequest};
use chess_engine::PositionSnapshot;
use std::future::Future;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::time;
use tracing::{debug, info, warn};

/// Why a computer opponent produced no move.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineFailure {
    /// The search did not finish within its budget plus grace.
    #[error("engine exceeded its time budget")]
    Timeout,
    /// The engine answered with something that is not a legal move.
    #[error("engine suggested an illegal move: {0:?}")]
    IllegalSuggestion(String),
    /// The engine process failed, exited or closed its pipes.
    #[error("engine unresponsive: {0}")]
    Unresponsive(String),
}

impl From<std::io::Error> for EngineFailure {
    fn from(e: std::io::Error) -> Self {
        EngineFailure::Unresponsive(e.to_string())
    }
}

/// Something that picks a move for a position.
pub trait MoveSearch: Send {
    /// Searches `fen` for about `budget` and returns the chosen move in UCI
    /// notation.
    fn search(
        &mut self,
        fen: &str,
        budget: Duration,
    ) -> impl Future<Output = Result<String, EngineFailure>> + Send;
}

/// A UCI engine running as a child process.
pub struct UciEngine {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    /// Engine name from `id name`, empty if it sent none.
    pub name: String,
    /// A `go` was sent and its `bestmove` has not been read yet.
    searching: bool,
}

impl UciEngine {
    /// Spawns the engine at `path` and completes the UCI handshake.
    pub async fn spawn(path: impl AsRef<Path>) -> Result<Self, EngineFailure> {
        let path = path.as_ref();
        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EngineFailure::Unresponsive(format!("{}: {}", path.display(), e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineFailure::Unresponsive("stdin not captured".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineFailure::Unresponsive("stdout not captured".to_string()))?;

        let mut engine = UciEngine {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            name: String::new(),
            searching: false,
        };
        engine.init().await?;
        info!(engine = %engine.name, path = %path.display(), "engine ready");
        Ok(engine)
    }

    async fn send(&mut self, cmd: &str) -> Result<(), EngineFailure> {
        debug!(cmd, "to engine");
        self.stdin.write_all(cmd.as_bytes()).await?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await?;
        Ok(())
    }

    async fn read_line(&mut self) -> Result<String, EngineFailure> {
        match self.stdout.next_line().await? {
            Some(line) => Ok(line.trim().to_string()),
            None => Err(EngineFailure::Unresponsive(
                "engine closed its output".to_string(),
            )),
        }
    }

    async fn init(&mut self) -> Result<(), EngineFailure> {
        self.send("uci").await?;
        loop {
            let line = self.read_line().await?;
            if let Some(name) = line.strip_prefix("id name ") {
                self.name = name.to_string();
            }
            if line == "uciok" {
                break;
            }
        }
        self.sync().await
    }

    /// Sends `isready` and discards output up to `readyok`.
    async fn sync(&mut self) -> Result<(), EngineFailure> {
        self.send("isready").await?;
        while self.read_line().await? != "readyok" {}
        Ok(())
    }

    /// Sends `quit` and waits for the process to exit.
    pub async fn quit(mut self) -> Result<(), EngineFailure> {
        self.send("quit").await?;
        self.child.wait().await?;
        Ok(())
    }
}

impl MoveSearch for UciEngine {
    fn search(
        &mut self,
        fen: &str,
        budget: Duration,
    ) -> impl Future<Output = Result<String, EngineFailure>> + Send {
        async move {
            if self.searching {
                // A search abandoned on timeout: stop it and drop its bestmove.
                self.send("stop").await?;
                self.sync().await?;
                self.searching = false;
            }

            self.send(&format!("position fen {}", fen)).await?;
            self.send(&format!("go movetime {}", budget.as_millis())).await?;
            self.searching = true;
            loop {
                let line = self.read_line().await?;
                if let Some(rest) = line.strip_prefix("bestmove") {
                    self.searching = false;
                    return Ok(rest.split_whitespace().next().unwrap_or("").to_string());
                }
            }
        }
    }
}

/// Bounded, validated access to a [`MoveSearch`].
pub struct ComputerOpponent<S> {
    search: S,
    grace: Duration,
}

impl<S: MoveSearch> ComputerOpponent<S> {
    /// Slack on top of the budget for process and pipe latency.
    pub const DEFAULT_GRACE: Duration = Duration::from_millis(500);

    pub fn new(search: S) -> Self {
        ComputerOpponent {
            search,
            grace: Self::DEFAULT_GRACE,
        }
    }

    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn into_inner(self) -> S {
        self.search
    }

    /// Asks for a move in `snapshot`, waiting at most `budget` plus grace.
    ///
    /// A timed out search is dropped. The returned move is always one of
    /// `snapshot.legal_moves`.
    pub async fn suggest_move(
        &mut self,
        snapshot: &PositionSnapshot,
        budget: Duration,
    ) -> Result<Move, EngineFailure> {
        let search = self.search.search(&snapshot.fen, budget);
        let text = match time::timeout(budget + self.grace, search).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                warn!(error = %e, fen = %snapshot.fen, "engine failed");
                return Err(e);
            }
            Err(_) => {
                warn!(?budget, fen = %snapshot.fen, "engine timed out");
                return Err(EngineFailure::Timeout);
            }
        };

        match MoveRequest::from_uci(&text).and_then(|request| snapshot.find(&request)) {
            Some(m) => Ok(*m),
            None => {
                warn!(suggestion = %text, fen = %snapshot.fen, "engine suggested illegal move");
                Err(EngineFailure::IllegalSuggestion(text))
            }
        }
    }
}
