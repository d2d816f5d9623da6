//! Integration tests for tak-rust
//!
//! Whole-engine properties checked over seeded random playouts, plus the
//! concrete positions the rules are easiest to get wrong on.

use std::io::Cursor;

use tak_rust::board::{Board, GameResult, square};
use tak_rust::command::Command;
use tak_rust::constants::{BLACK, N, PIECE_CAP, PIECE_FLAT, SQUARES, WHITE};
use tak_rust::eval::{material, road_distance, road_distances};
use tak_rust::movegen::{Move, Template};
use tak_rust::player::SearchPlayer;
use tak_rust::protocol::PipeEngine;
use tak_rust::search::Searcher;

// =============================================================================
// Helpers
// =============================================================================

/// Boards visited by a random game from the opening, the last one included.
fn random_game(seed: u64, max_plies: usize) -> Vec<Board> {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut board = Board::new();
    let mut seen = vec![board.clone()];

    for _ in 0..max_plies {
        if board.is_terminal() {
            break;
        }
        let moves = board.legal_moves();
        if moves.is_empty() {
            break;
        }
        moves[rng.usize(..moves.len())].apply(&mut board);
        seen.push(board.clone());
    }
    seen
}

/// Play a human command, panicking if it is not legal.
fn play(board: &Board, command: &str) -> Move {
    command
        .parse::<Command>()
        .and_then(|cmd| cmd.resolve(board))
        .unwrap_or_else(|err| panic!("{command}: {err}"))
}

/// A position past the opening with white to move.
fn midgame() -> Board {
    let mut board = Board::new();
    board.move_number = 8;
    board.turn = WHITE;
    board
}

// =============================================================================
// Properties over random playouts
// =============================================================================

#[test]
fn test_apply_revert_is_identity() {
    for seed in 0..4 {
        for board in random_game(seed, 60) {
            let mut scratch = board.clone();
            for mv in board.legal_moves() {
                mv.apply(&mut scratch);
                assert_ne!(scratch, board, "{mv} changed nothing");
                mv.revert(&mut scratch);
                assert_eq!(scratch, board, "{mv} did not revert on {}", board.to_tbg());
            }
        }
    }
}

#[test]
fn test_nested_apply_revert_is_identity() {
    for board in random_game(5, 40).into_iter().step_by(8) {
        let mut scratch = board.clone();
        for mv in board.legal_moves() {
            mv.apply(&mut scratch);
            let child = scratch.clone();
            for reply in child.legal_moves() {
                reply.apply(&mut scratch);
                reply.revert(&mut scratch);
                assert_eq!(scratch, child, "{mv} then {reply}");
            }
            mv.revert(&mut scratch);
            assert_eq!(scratch, board, "{mv}");
        }
    }
}

#[test]
fn test_legal_moves_pass_can_apply() {
    for seed in 10..14 {
        for board in random_game(seed, 60) {
            for mv in board.legal_moves() {
                assert!(mv.template().can_apply(&board), "{mv} on {}", board.to_tbg());
                assert_eq!(mv.board_hash, board.hash());
            }
        }
    }
}

#[test]
fn test_encoding_roundtrip_on_reachable_boards() {
    for seed in 20..24 {
        for board in random_game(seed, 80) {
            let text = board.to_tbg();
            assert_eq!(Board::from_tbg(&text), Ok(board), "{text}");
        }
    }
}

#[test]
fn test_road_implies_win() {
    for seed in 30..40 {
        for board in random_game(seed, 200) {
            let white = road_distance(&board, WHITE) == 0;
            let black = road_distance(&board, BLACK) == 0;
            if white || black {
                assert!(board.is_terminal());
            }
            match (white, black) {
                (true, false) => assert_eq!(board.winner(), WHITE),
                (false, true) => assert_eq!(board.winner(), BLACK),
                (true, true) => assert_eq!(board.winner(), -board.turn),
                (false, false) => {}
            }
        }
    }
}

#[test]
fn test_random_games_end() {
    // A full board or an empty reserve always ends the game, so random
    // games never run out of moves before they are decided.
    for seed in 40..44 {
        let game = random_game(seed, 2000);
        let last = game.last().unwrap();
        assert!(last.is_terminal(), "stuck at {}", last.to_tbg());
    }
}

#[test]
fn test_search_picks_legal_moves() {
    let mut searcher = Searcher::with_seed(2, 9);
    for board in random_game(50, 30).into_iter().step_by(5) {
        let outcome = searcher.pick_best_move(&board);
        match outcome.best_move {
            Some(mv) => assert!(board.legal_moves().contains(&mv)),
            None => assert!(board.is_terminal()),
        }
    }
}

// =============================================================================
// Concrete scenarios
// =============================================================================

#[test]
fn test_opening_places_only_opponent_flats() {
    let board = Board::new();
    let moves = board.legal_moves();
    assert_eq!(moves.len(), SQUARES);

    let mut scratch = board.clone();
    for mv in moves {
        assert!(matches!(
            mv.template(),
            Template::Place { piece: PIECE_FLAT, .. }
        ));
        mv.apply(&mut scratch);
        let placed = scratch.stacks.iter().find(|st| !st.is_empty()).unwrap();
        assert_eq!(placed.top(), BLACK * PIECE_FLAT);
        mv.revert(&mut scratch);
    }
}

#[test]
fn test_capstone_carries_two_right() {
    let mut board = midgame();
    let origin = square(0, 1);
    for _ in 0..3 {
        board.place(origin, PIECE_FLAT);
    }
    board.place(origin, PIECE_CAP);
    let before = board.clone();

    let mv = play(&board, "split A2r2");
    mv.apply(&mut board);
    assert_eq!(board.stacks[origin].size(), 2);
    assert_eq!(board.stacks[origin].top(), PIECE_FLAT);
    let target = square(1, 1);
    assert_eq!(board.stacks[target].size(), 2);
    assert_eq!(board.stacks[target].top(), PIECE_CAP);
    assert_eq!(board.stacks[target].color_at(0), WHITE);

    mv.revert(&mut board);
    assert_eq!(board, before);
}

#[test]
fn test_capstone_spreads_two_squares() {
    let mut board = midgame();
    let origin = square(0, 1);
    for _ in 0..3 {
        board.place(origin, PIECE_FLAT);
    }
    board.place(origin, PIECE_CAP);
    let before = board.clone();

    let mv = play(&board, "split A2r11");
    mv.apply(&mut board);
    assert_eq!(board.stacks[origin].size(), 2);
    assert_eq!(board.stacks[square(1, 1)].top(), PIECE_FLAT);
    assert_eq!(board.stacks[square(2, 1)].size(), 1);
    assert_eq!(board.stacks[square(2, 1)].top(), PIECE_CAP);

    mv.revert(&mut board);
    assert_eq!(board, before);
}

#[test]
fn test_horizontal_road_wins() {
    let mut board = midgame();
    for x in 0..N {
        let piece = if x == N / 2 { PIECE_CAP } else { PIECE_FLAT };
        board.place(square(x, 3), piece);
    }
    board.place(square(0, 0), -PIECE_FLAT);

    assert_eq!(road_distances(&board, WHITE).horizontal, 0);
    assert!(board.is_terminal());
    assert_eq!(board.game_result(), Some(GameResult::WhiteWin));
    assert_eq!(board.winner(), WHITE);
}

#[test]
fn test_reserve_exhaustion_counts_flat_tops() {
    let mut board = midgame();
    board.reserves = [0, 0];
    // Checkerboard: nothing is connected, so nobody has a road.
    for y in 0..5 {
        for x in 0..5 {
            let color = if (x + y) % 2 == 0 { WHITE } else { BLACK };
            board.place(square(x, y), color * PIECE_FLAT);
        }
    }

    assert_eq!(board.flat_counts(), [13, 12]);
    assert_eq!(board.winner(), WHITE);
}

#[test]
fn test_material_grows_with_flats() {
    let mut board = midgame();
    board.place(square(2, 2), -PIECE_FLAT);
    board.place(square(N - 1, N - 1), -PIECE_CAP);

    let mut last = material(&board);
    for sq in [0, 1, 2, N, 2 * N + 1, SQUARES - 2] {
        board.place(sq, PIECE_FLAT);
        let now = material(&board);
        assert!(now > last, "placing on {sq}: {now} <= {last}");
        last = now;
    }
}

#[test]
fn test_command_and_catalog_agree() {
    for seed in 60..63 {
        for board in random_game(seed, 40) {
            let mut scratch = board.clone();
            for mv in board.legal_moves() {
                let cmd: Command = mv.to_string().parse().unwrap();
                mv.apply(&mut scratch);
                assert_eq!(cmd.play(&board), Ok(scratch.clone()), "{mv}");
                mv.revert(&mut scratch);
            }
        }
    }
}

// =============================================================================
// Pipe protocol
// =============================================================================

#[test]
fn test_pipe_engine_plays_a_game() {
    let mut engine = PipeEngine::new(SearchPlayer::new(Searcher::with_seed(1, 17)));
    let mut board = Board::new();

    for ply in 0..6 {
        let mut out = Vec::new();
        let input = format!("{}\n", board.to_tbg());
        engine.run_with(Cursor::new(input), &mut out).unwrap();

        let reply = String::from_utf8(out).unwrap();
        let next = Board::from_tbg(reply.trim()).unwrap();
        assert_eq!(next.move_number, ply + 1);
        assert!(board.successor_hashes().contains(&next.hash()));
        board = next;
    }
    assert_eq!(engine.answered(), 6);
}

#[test]
fn test_pipe_engine_echoes_decided_position() {
    let mut board = midgame();
    for x in 0..N {
        board.place(square(x, 0), PIECE_FLAT);
    }
    board.reserves[0] -= N as u8;
    let text = board.to_tbg();

    let mut out = Vec::new();
    let mut engine = PipeEngine::new(SearchPlayer::new(Searcher::with_seed(1, 0)));
    engine
        .run_with(Cursor::new(format!("{text}\n")), &mut out)
        .unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), format!("{text}\n"));
}
