use super::*;

fn play(env: &mut ChessEnv, moves: &[&str]) -> ApplyOutcome {
    let mut last = None;
    for mv in moves {
        last = Some(env.apply_move(&MoveToken::from_uci(mv)).unwrap());
    }
    last.unwrap()
}

#[test]
fn start_position_has_twenty_moves() {
    let env = ChessEnv::new();
    let legal = env.legal_moves();
    assert_eq!(legal.len(), 20);
    assert!(legal.contains(&MoveToken::from_uci("e2e4")));
    assert!(legal.contains(&MoveToken::from_uci("g1f3")));
    assert!(!env.is_terminal());
    assert_eq!(env.current_observation().0, Side::White);
}

#[test]
fn board_snapshot_matches_start_position() {
    let env = ChessEnv::new();
    assert_eq!(env.board(), BoardSnapshot::startpos());
}

#[test]
fn applied_moves_extend_transcript() {
    let mut env = ChessEnv::new();
    play(&mut env, &["e2e4", "e7e5"]);

    let (side, transcript) = env.current_observation();
    assert_eq!(side, Side::White);
    let window = HistoryWindow::extract(&transcript, 5, env.first_side());
    assert_eq!(window.render(), "White: [e2e4]\nBlack: [e7e5]");
}

#[test]
fn illegal_move_is_rejected_without_state_change() {
    let mut env = ChessEnv::new();
    let err = env.apply_move(&MoveToken::from_uci("e2e5")).unwrap_err();
    assert!(matches!(err, ArenaError::IllegalMove { .. }));
    assert_eq!(env.board(), BoardSnapshot::startpos());
}

#[test]
fn fools_mate_ends_the_game() {
    let mut env = ChessEnv::new();
    let outcome = play(&mut env, &["f2f3", "e7e5", "g2g4", "d8h4"]);

    assert!(outcome.is_terminal);
    assert!(env.is_terminal());
    assert!(env.legal_moves().is_empty());
    assert_eq!(env.result().unwrap().winner, Some(Side::Black));

    let closing = env.close();
    assert_eq!(closing.rewards.get(&0), Some(&-1));
    assert_eq!(closing.rewards.get(&1), Some(&1));
    assert!(closing.reason.contains("checkmate"));

    assert_eq!(
        env.apply_move(&MoveToken::from_uci("a2a3")).unwrap_err(),
        ArenaError::GameOver
    );
}

#[test]
fn castling_uses_king_destination() {
    let env = ChessEnv::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    let legal = env.legal_moves();
    assert!(legal.contains(&MoveToken::from_uci("e1g1")));
    assert!(legal.contains(&MoveToken::from_uci("e1c1")));
    assert!(!legal.contains(&MoveToken::from_uci("e1h1")));
}

#[test]
fn castling_token_can_be_applied() {
    let mut env = ChessEnv::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    env.apply_move(&MoveToken::from_uci("e1g1")).unwrap();
    let board = env.board();
    assert_eq!(board.piece_at(6), Some(Piece::new(Side::White, PieceKind::King)));
    assert_eq!(board.piece_at(5), Some(Piece::new(Side::White, PieceKind::Rook)));
}

#[test]
fn promotions_are_listed_per_piece() {
    let env = ChessEnv::from_fen("8/4P3/8/8/8/8/k7/4K3 w - - 0 1").unwrap();
    let legal = env.legal_moves();
    for promo in ["e7e8q", "e7e8r", "e7e8b", "e7e8n"] {
        assert!(legal.contains(&MoveToken::from_uci(promo)), "missing {promo}");
    }
}

#[test]
fn stalemate_is_terminal_draw() {
    let mut env = ChessEnv::from_fen("k7/2K5/1Q6/8/8/8/8/8 b - - 0 1").unwrap();
    assert!(env.is_terminal());
    let closing = env.close();
    assert_eq!(closing.rewards.get(&0), Some(&0));
    assert_eq!(closing.rewards.get(&1), Some(&0));
    assert_eq!(closing.reason, "stalemate");
}

#[test]
fn bare_kings_are_insufficient_material() {
    let env = ChessEnv::from_fen("8/8/8/4k3/8/4K3/8/8 w - - 0 1").unwrap();
    assert!(env.is_terminal());
    assert!(env.result().unwrap().reason.contains("insufficient material"));
}

#[test]
fn fifty_move_rule_is_a_draw() {
    let env = ChessEnv::from_fen("8/8/8/4k3/8/4K3/8/R7 w - - 100 60").unwrap();
    assert!(env.is_terminal());
    assert!(env.result().unwrap().reason.contains("fifty-move"));
}

#[test]
fn threefold_repetition_is_a_draw() {
    let mut env = ChessEnv::new();
    let outcome = play(
        &mut env,
        &["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8"],
    );
    assert!(outcome.is_terminal);
    assert!(outcome.info.contains("threefold repetition"));
}

#[test]
fn unfinished_game_closes_with_zero_rewards() {
    let mut env = ChessEnv::new();
    play(&mut env, &["e2e4"]);
    let closing = env.close();
    assert_eq!(closing.rewards.values().copied().collect::<Vec<_>>(), vec![0, 0]);
}

#[test]
fn reset_restores_start_position() {
    let mut env = ChessEnv::new();
    play(&mut env, &["e2e4", "e7e5"]);
    let transcript = env.reset();
    assert_eq!(transcript.lines().count(), 1);
    assert_eq!(env.board(), BoardSnapshot::startpos());
}

#[test]
fn invalid_fen_is_reported() {
    assert!(matches!(
        ChessEnv::from_fen("not a fen"),
        Err(ArenaError::InvalidFen(_))
    ));
}

#[test]
fn fen_with_black_to_move_starts_with_black() {
    let mut env =
        ChessEnv::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1").unwrap();
    assert_eq!(env.first_side(), Side::Black);
    play(&mut env, &["e7e5", "g1f3"]);

    let (side, transcript) = env.current_observation();
    assert_eq!(side, Side::Black);
    assert_eq!(env.first_side(), Side::Black);
    let window = HistoryWindow::extract(&transcript, 5, env.first_side());
    assert_eq!(window.render(), "Black: [e7e5]\nWhite: [g1f3]");
}
