use std::sync::{Arc, Mutex};

use mailbox_chess::game_state::chess_types::{Color, PieceId, PieceKind, Square};
use mailbox_chess::game_state::events::{GameEvent, Recording};
use mailbox_chess::game_state::game_state::{Game, GameStatus};
use mailbox_chess::game_state::piece_record::PieceRecord;
use mailbox_chess::game_state::position::Position;
use mailbox_chess::utils::algebraic::algebraic_to_square;

fn sq(name: &str) -> Square {
    algebraic_to_square(name).expect("test squares are valid")
}

fn pawn(color: Color, column: u8) -> PieceId {
    PieceId::new(color, PieceKind::Pawn, column)
}

fn play(game: &mut Game, moves: &[(PieceId, &str)]) {
    for (piece, to) in moves {
        assert!(
            game.attempt_move(*piece, sq(to)).expect("position should stay consistent"),
            "{piece} to {to} should be legal"
        );
    }
}

fn custom_game(records: Vec<PieceRecord>, turn: Color) -> Game {
    let position = Position::from_records(records).expect("layout should load");
    Game::with_effects(position, turn, Recording::new()).expect("game should build")
}

#[test]
fn fools_mate_ends_in_checkmate_for_black() {
    let mut game = Game::new_standard().expect("standard game should build");
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    game.subscribe(Box::new(move |event| {
        if let Ok(mut log) = sink.lock() {
            log.push(event.clone());
        }
    }));

    play(
        &mut game,
        &[
            (pawn(Color::Light, 6), "f3"),
            (pawn(Color::Dark, 5), "e5"),
            (pawn(Color::Light, 7), "g4"),
            (PieceId::new(Color::Dark, PieceKind::Queen, 0), "h4"),
        ],
    );

    assert_eq!(game.status(), GameStatus::Checkmate);
    assert_eq!(game.winner(), Some(Color::Dark));
    assert!(game.in_check());
    assert!(game.all_legal_moves().expect("generation should run").is_empty());

    let log = events.lock().expect("event log should be readable");
    let tail = &log[log.len() - 4..];
    assert_eq!(
        tail[0],
        GameEvent::PieceMoved {
            piece: PieceId::new(Color::Dark, PieceKind::Queen, 0),
            from: sq("d8"),
            to: sq("h4"),
            castling: false,
        }
    );
    assert_eq!(tail[1], GameEvent::TurnChanged { turn: Color::Light });
    assert_eq!(tail[2], GameEvent::CheckAsserted { color: Color::Light });
    assert!(matches!(
        tail[3],
        GameEvent::CheckmateDeclared { winner: Color::Dark, .. }
    ));
    assert_eq!(
        log.iter()
            .filter(|e| matches!(e, GameEvent::CheckmateDeclared { .. }))
            .count(),
        1
    );

    // Finished games reject further input.
    assert!(!game
        .attempt_move(PieceId::king(Color::Light), sq("f2"))
        .expect("position should stay consistent"));
}

#[test]
fn moving_a_rook_revokes_castling_on_that_side_only() {
    let mut game = Game::new_standard().expect("standard game should build");
    let rook = PieceId::king_side_rook(Color::Light);
    play(
        &mut game,
        &[
            (PieceId::new(Color::Light, PieceKind::Knight, 2), "f3"),
            (pawn(Color::Dark, 1), "a6"),
            (pawn(Color::Light, 5), "e3"),
            (pawn(Color::Dark, 1), "a5"),
            (PieceId::new(Color::Light, PieceKind::Bishop, 2), "e2"),
            (pawn(Color::Dark, 1), "a4"),
            (rook, "g1"),
            (pawn(Color::Dark, 2), "b6"),
            (rook, "h1"),
            (pawn(Color::Dark, 2), "b5"),
        ],
    );

    let king = PieceId::king(Color::Light);
    assert!(!game
        .legal_moves(king)
        .expect("generation should run")
        .contains(&sq("g1")));
    assert!(!game.attempt_move(king, sq("g1")).expect("position should stay consistent"));

    let king_record = game.piece_by_identity(king).expect("king is on the board");
    assert!(king_record.can_castle);
    assert_eq!(king_record.square, sq("e1"));
    let other_rook = game
        .piece_by_identity(PieceId::queen_side_rook(Color::Light))
        .expect("a-rook is on the board");
    assert!(other_rook.can_castle);
    let moved_rook = game.piece_by_identity(rook).expect("h-rook is on the board");
    assert!(!moved_rook.can_castle);
}

#[test]
fn promoted_pawn_moves_like_a_queen() {
    let mut game = custom_game(
        vec![
            PieceRecord::new(PieceId::king(Color::Light), sq("e1")),
            PieceRecord::new(pawn(Color::Light, 1), sq("a7")),
            PieceRecord::new(PieceId::king(Color::Dark), sq("h5")),
        ],
        Color::Light,
    );

    play(&mut game, &[(pawn(Color::Light, 1), "a8")]);
    let queen_id = PieceId::new(Color::Light, PieceKind::Queen, 1);
    let queen = game.piece_by_identity(queen_id).expect("pawn became a queen");
    assert_eq!(queen.color(), Color::Light);
    assert_eq!(queen.square, sq("a8"));
    assert!(game.piece_by_identity(pawn(Color::Light, 1)).is_none());
    assert!(game.last_move().is_some_and(|record| record.is_promotion));

    play(&mut game, &[(PieceId::king(Color::Dark), "g5")]);
    let targets = game.legal_moves(queen_id).expect("generation should run");
    // Rank, file and long diagonal from a8, seven squares each.
    assert_eq!(targets.len(), 21);
    for name in ["h8", "a1", "h1", "d5"] {
        assert!(targets.contains(&sq(name)), "queen should reach {name}");
    }
}

#[test]
fn own_piece_blocks_the_bishop_diagonal() {
    let mut game = custom_game(
        vec![
            PieceRecord::new(PieceId::king(Color::Light), sq("a1")),
            PieceRecord::new(PieceId::new(Color::Light, PieceKind::Bishop, 1), sq("d4")),
            PieceRecord::new(pawn(Color::Light, 5), sq("e5")),
            PieceRecord::new(PieceId::king(Color::Dark), sq("h8")),
        ],
        Color::Light,
    );

    let mut targets = game
        .legal_moves(PieceId::new(Color::Light, PieceKind::Bishop, 1))
        .expect("generation should run");
    targets.sort_unstable();
    let mut expected: Vec<Square> = ["b2", "c3", "c5", "b6", "a7", "e3", "f2", "g1"]
        .into_iter()
        .map(sq)
        .collect();
    expected.sort_unstable();
    assert_eq!(targets, expected);

    // In the opening every bishop is boxed in.
    let mut opening = Game::new_standard().expect("standard game should build");
    let boxed = opening
        .legal_moves(PieceId::new(Color::Light, PieceKind::Bishop, 1))
        .expect("generation should run");
    assert!(boxed.is_empty());
}

#[test]
fn out_of_turn_and_unknown_requests_are_rejected() {
    let mut game = Game::new_standard().expect("standard game should build");
    assert!(!game
        .attempt_move(pawn(Color::Dark, 5), sq("e5"))
        .expect("position should stay consistent"));
    assert!(!game
        .attempt_move(PieceId::new(Color::Light, PieceKind::Queen, 3), sq("d3"))
        .expect("position should stay consistent"));
    assert!(!game
        .attempt_move(pawn(Color::Light, 5), sq("e5"))
        .expect("position should stay consistent"));
    assert_eq!(game.turn(), Color::Light);
    assert!(game.history().is_empty());
}
