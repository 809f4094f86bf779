//! chess-session - replay recorded games and run engine self-play.

use anyhow::Context;
use chess_engine::{Game, GameLog, GameState};
use chess_session::selfplay::{self, SelfPlayEnd};
use chess_session::{ClockDriver, ComputerOpponent, GameActor, SessionConfig, UciEngine};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "chess-session")]
#[command(about = "Replay recorded games and run engine self-play")]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = "chess.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a game log and print the final position
    Replay {
        /// Game log file
        log: PathBuf,
    },
    /// Play the configured engine against itself
    Selfplay {
        /// Starting position (defaults to the standard start)
        #[arg(long)]
        fen: Option<String>,

        /// Stop after this many plies
        #[arg(long, default_value = "300")]
        max_plies: usize,

        /// Write the game log here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    let config = SessionConfig::load_from(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    match cli.command {
        Commands::Replay { log } => replay(&log),
        Commands::Selfplay {
            fen,
            max_plies,
            output,
        } => selfplay(&config, fen.as_deref(), max_plies, output).await,
    }
}

fn replay(path: &Path) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let game = text.parse::<GameLog>()?.replay()?;

    println!("{}", game.san_moves().join(" "));
    println!("{}", game.to_fen());
    match game.state() {
        GameState::Finished(result) => println!("{} ({})", result, result.score()),
        GameState::Check => println!("{} to move, in check", game.side_to_move()),
        GameState::InProgress => println!("{} to move", game.side_to_move()),
    }
    Ok(())
}

async fn selfplay(
    config: &SessionConfig,
    fen: Option<&str>,
    max_plies: usize,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let engine = config.engine()?;
    let mut game = match fen {
        Some(fen) => Game::from_fen(fen)?,
        None => Game::new(),
    };
    game.set_time_control(config.time_control());

    let mut white = ComputerOpponent::new(UciEngine::spawn(&engine.path).await?);
    let mut black = ComputerOpponent::new(UciEngine::spawn(&engine.path).await?);

    let (handle, task) = GameActor::spawn(game, Some(config.auto_promote.kind()));
    handle.start_clock().await?;
    let driver = ClockDriver::spawn(handle.clone(), config.tick_interval());

    let end = selfplay::play(
        &handle,
        &mut white,
        &mut black,
        engine.move_time(),
        max_plies,
    )
    .await?;
    driver.shutdown().await;

    match &end {
        SelfPlayEnd::Finished(result) => tracing::info!("Game over: {}", result),
        SelfPlayEnd::Forfeited { loser, failure } => {
            tracing::info!("{} forfeited: {}", loser, failure)
        }
        SelfPlayEnd::PlyLimit => tracing::info!("Stopped after {} plies", max_plies),
    }

    let log = handle.log().await?.to_string();
    drop(handle);
    task.await?;

    match output {
        Some(path) => std::fs::write(&path, log)
            .with_context(|| format!("writing {}", path.display()))?,
        None => print!("{}", log),
    }

    for engine in [white.into_inner(), black.into_inner()] {
        if let Err(e) = engine.quit().await {
            tracing::warn!("Engine did not quit cleanly: {}", e);
        }
    }
    Ok(())
}
