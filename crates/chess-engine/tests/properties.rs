//! Property tests over random playouts.

use chess_core::FenParser;
use chess_engine::Game;
use proptest::prelude::*;

/// Plays the move picked by each index until the game ends or the
/// choices run out, returning the FEN before every ply.
fn playout(game: &mut Game, choices: &[usize]) -> Vec<String> {
    let mut fens = Vec::new();
    for &choice in choices {
        if game.is_game_over() {
            break;
        }
        let legal = game.legal_moves();
        let m = legal[choice % legal.len()];
        fens.push(game.to_fen());
        let mover = game.side_to_move();
        game.make_move(m.request()).unwrap();
        assert!(
            !game.board().is_in_check(mover),
            "{} left its own king in check after {}",
            mover,
            m
        );
    }
    fens
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn undo_retraces_every_position(choices in prop::collection::vec(any::<usize>(), 1..80)) {
        let mut game = Game::new();
        let fens = playout(&mut game, &choices);

        for expected in fens.iter().rev() {
            game.undo_last_move().unwrap();
            prop_assert_eq!(&game.to_fen(), expected);
        }
        prop_assert_eq!(game.to_fen(), FenParser::STARTPOS);
        prop_assert!(game.undo_last_move().is_err());
    }

    #[test]
    fn fen_reload_preserves_position(choices in prop::collection::vec(any::<usize>(), 1..80)) {
        let mut game = Game::new();
        playout(&mut game, &choices);

        let fen = game.to_fen();
        let reloaded = Game::from_fen(&fen).unwrap();
        prop_assert_eq!(reloaded.to_fen(), fen);
        prop_assert_eq!(reloaded.side_to_move(), game.side_to_move());
        prop_assert_eq!(reloaded.legal_moves().len(), game.legal_moves().len());
    }

    #[test]
    fn san_of_every_legal_move_parses_back(choices in prop::collection::vec(any::<usize>(), 0..40)) {
        let mut game = Game::new();
        playout(&mut game, &choices);

        for m in game.legal_moves().iter() {
            let san = game.move_to_san(m);
            prop_assert_eq!(game.san_to_move(&san).unwrap(), *m);
        }
    }
}
