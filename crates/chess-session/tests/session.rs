//! Integration tests for chess-session: whole games through the actor.

use chess_engine::{Game, GameLog, GameState};
use chess_session::selfplay::{self, SelfPlayEnd};
use chess_session::{ClockDriver, ComputerOpponent, EngineFailure, GameActor, MoveSearch};
use std::future::Future;
use std::time::Duration;

/// Plays the first legal move in generation order.
struct FirstLegal;

impl MoveSearch for FirstLegal {
    fn search(
        &mut self,
        fen: &str,
        _budget: Duration,
    ) -> impl Future<Output = Result<String, EngineFailure>> + Send {
        let answer = Game::from_fen(fen)
            .map_err(|e| EngineFailure::Unresponsive(e.to_string()))
            .and_then(|game| {
                game.legal_moves()
                    .iter()
                    .next()
                    .map(|m| m.to_uci())
                    .ok_or_else(|| EngineFailure::IllegalSuggestion("(none)".to_string()))
            });
        async move { answer }
    }
}

#[tokio::test(start_paused = true)]
async fn test_selfplay_log_replays() {
    let game = Game::with_time_control(Duration::from_secs(60));
    let (handle, task) = GameActor::spawn(game, None);
    handle.start_clock().await.unwrap();
    let driver = ClockDriver::spawn(handle.clone(), Duration::from_millis(100));

    let mut white = ComputerOpponent::new(FirstLegal);
    let mut black = ComputerOpponent::new(FirstLegal);
    let end = selfplay::play(
        &handle,
        &mut white,
        &mut black,
        Duration::from_millis(10),
        40,
    )
    .await
    .unwrap();
    driver.shutdown().await;

    let log = handle.log().await.unwrap();
    match end {
        SelfPlayEnd::PlyLimit => assert_eq!(log.entries.len(), 40),
        SelfPlayEnd::Finished(result) => assert_eq!(handle.state(), GameState::Finished(result)),
        SelfPlayEnd::Forfeited { failure, .. } => panic!("engine failed: {}", failure),
    }

    let text = log.to_string();
    drop(handle);
    let played = task.await.unwrap();

    let replayed = text.parse::<GameLog>().unwrap().replay().unwrap();
    assert_eq!(replayed.to_fen(), played.to_fen());
    assert_eq!(replayed.board(), played.board());
}

#[tokio::test]
async fn test_handles_share_one_game() {
    let (first, _task) = GameActor::spawn(Game::new(), None);
    let second = first.clone();

    let a = tokio::spawn({
        let h = first.clone();
        async move { h.make_move(chess_core::MoveRequest::from_uci("e2e4").unwrap()).await }
    });
    let b = tokio::spawn({
        let h = second.clone();
        async move { h.make_move(chess_core::MoveRequest::from_uci("d2d4").unwrap()).await }
    });
    let (a, b) = (a.await.unwrap(), b.await.unwrap());

    // Both were White moves; only the first to reach the mailbox is accepted.
    assert!(a.is_ok() ^ b.is_ok());
    let snapshot = second.snapshot().await.unwrap();
    assert_eq!(snapshot.side_to_move, chess_core::Color::Black);
}
