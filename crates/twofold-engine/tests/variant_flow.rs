//! End-to-end engine scenarios: full games driven through `Game::submit`
//! exercising the variant's coupling rules.

use twofold_engine::{
    Board, BoardName, BoardOutcome, Color, Game, Move, MoveError, Piece, PieceId, PieceKind,
    Scenario, Square, Winner,
};

fn mv(from: (u8, u8), to: (u8, u8)) -> Move {
    Move::new(Square::at(from.0, from.1), Square::at(to.0, to.1))
}

fn place(board: &mut Board, row: u8, col: u8, kind: PieceKind, color: Color, num: u8) {
    board.set(Square::at(row, col), Some(Piece::spawn(kind, color, num)));
}

// -------------------------------------------------------------------------
// Scholar's mate on Main. Black's replies all land on Secondary (the
// phase toggles after every non-checking move), so Black's Main position
// never moves and Qxf7 is mate.
// -------------------------------------------------------------------------
#[test]
fn test_scholars_mate_on_main_ends_game() {
    let mut game = Game::new();

    game.submit(Color::White, BoardName::Main, &mv((6, 4), (4, 4)))
        .unwrap(); // e2-e4
    game.submit(Color::Black, BoardName::Secondary, &mv((1, 4), (3, 4)))
        .unwrap(); // e7-e5 on the other board
    game.submit(Color::White, BoardName::Main, &mv((7, 5), (4, 2)))
        .unwrap(); // Bf1-c4
    game.submit(Color::Black, BoardName::Secondary, &mv((0, 1), (2, 2)))
        .unwrap(); // Nb8-c6
    game.submit(Color::White, BoardName::Main, &mv((7, 3), (3, 7)))
        .unwrap(); // Qd1-h5
    game.submit(Color::Black, BoardName::Secondary, &mv((0, 6), (2, 5)))
        .unwrap(); // Ng8-f6

    let outcome = game
        .submit(Color::White, BoardName::Main, &mv((3, 7), (1, 5)))
        .unwrap(); // Qh5xf7#

    assert!(outcome.finished);
    assert_eq!(outcome.notation, "Q1(h5-f7)xp6#");
    assert!(game.game_over);
    assert_eq!(game.winner, Some(Winner::White));
    assert_eq!(game.board(BoardName::Main).outcome, BoardOutcome::WhiteWins);
    assert_eq!(game.board(BoardName::Secondary).outcome, BoardOutcome::Active);

    // The mated board's capture mirrored: p6 is gone from Secondary too.
    let p6 = PieceId::new(PieceKind::Pawn, 6);
    assert!(game
        .board(BoardName::Secondary)
        .find_piece(Color::Black, p6)
        .is_none());

    // No further moves are accepted.
    let err = game
        .submit(Color::Black, BoardName::Secondary, &mv((1, 0), (2, 0)))
        .unwrap_err();
    assert_eq!(err, MoveError::GameOver);
}

// -------------------------------------------------------------------------
// Capture mirror: a Main capture of id n1 removes the Secondary piece
// with id n1, wherever it stands.
// -------------------------------------------------------------------------
#[test]
fn test_main_capture_removes_same_id_from_secondary() {
    let mut game = Game::new();
    // Park black's n1 where White's knight can take it on Main.
    let n1 = PieceId::new(PieceKind::Knight, 1);
    let from = game
        .board(BoardName::Main)
        .find_piece(Color::Black, n1)
        .unwrap();
    let knight = game.board_mut(BoardName::Main).take(from).unwrap();
    game.board_mut(BoardName::Main)
        .set(Square::at(5, 0), Some(knight));

    game.submit(Color::White, BoardName::Main, &mv((7, 1), (5, 0)))
        .unwrap(); // Nb1xa3

    assert!(game
        .board(BoardName::Main)
        .find_piece(Color::Black, n1)
        .is_none());
    assert!(game
        .board(BoardName::Secondary)
        .find_piece(Color::Black, n1)
        .is_none());
    // Secondary lost exactly that one piece.
    assert_eq!(
        game.board(BoardName::Secondary).pieces(Color::Black).count(),
        15
    );
}

// -------------------------------------------------------------------------
// En passant mirrors both ways: a Secondary en-passant capture removes
// the pawn from Main by id as well.
// -------------------------------------------------------------------------
#[test]
fn test_secondary_en_passant_mirrors_to_main() {
    let mut game = Scenario::EnPassantReady.install();

    game.submit(Color::White, BoardName::Secondary, &mv((3, 4), (2, 3)))
        .unwrap(); // e5xd6 e.p.

    let p4 = PieceId::new(PieceKind::Pawn, 4);
    assert!(game
        .board(BoardName::Secondary)
        .find_piece(Color::Black, p4)
        .is_none());
    assert!(game
        .board(BoardName::Main)
        .find_piece(Color::Black, p4)
        .is_none());
    assert!(game.moves[0].contains("e.p."));
    assert!(game.moves[0].starts_with("s:"));
}

#[test]
fn test_main_en_passant_mirrors_to_secondary() {
    let mut main = Board::empty();
    place(&mut main, 3, 4, PieceKind::Pawn, Color::White, 5);
    place(&mut main, 3, 3, PieceKind::Pawn, Color::Black, 4);
    place(&mut main, 7, 4, PieceKind::King, Color::White, 1);
    place(&mut main, 0, 4, PieceKind::King, Color::Black, 1);
    main.en_passant_target = Some(Square::at(2, 3));
    let mut game = Game::from_boards(main, Board::initial(), Color::White, BoardName::Main);

    game.submit(Color::White, BoardName::Main, &mv((3, 4), (2, 3)))
        .unwrap();

    let p4 = PieceId::new(PieceKind::Pawn, 4);
    assert!(game
        .board(BoardName::Secondary)
        .find_piece(Color::Black, p4)
        .is_none());
}

// -------------------------------------------------------------------------
// Check gating: a checking move on Main pins Black to Main; a move on
// Secondary is rejected with the expected board attached; a legal
// response clears the gate.
// -------------------------------------------------------------------------
#[test]
fn test_check_gating_round_trip() {
    // White rook a7 slides to c7 and checks the black king on c8.
    let mut main = Board::empty();
    place(&mut main, 1, 0, PieceKind::Rook, Color::White, 1);
    place(&mut main, 7, 4, PieceKind::King, Color::White, 1);
    place(&mut main, 0, 2, PieceKind::King, Color::Black, 1);
    let mut game = Game::from_boards(main, Board::initial(), Color::White, BoardName::Main);

    let outcome = game
        .submit(Color::White, BoardName::Main, &mv((1, 0), (1, 2)))
        .unwrap();
    assert_eq!(outcome.delivered_check, Some(BoardName::Main));
    assert_eq!(game.responding_to_check_on, Some(BoardName::Main));
    assert_eq!(game.active_phase, BoardName::Main);
    assert_eq!(game.turn, Color::Black);

    let err = game
        .submit(Color::Black, BoardName::Secondary, &mv((1, 4), (3, 4)))
        .unwrap_err();
    assert_eq!(err, MoveError::MustRespondToCheckOn(BoardName::Main));
    assert_eq!(err.expected_board(), Some(BoardName::Main));

    // The king takes the undefended rook.
    game.submit(Color::Black, BoardName::Main, &mv((0, 2), (1, 2)))
        .unwrap();
    assert_eq!(game.responding_to_check_on, None);
    assert_eq!(game.turn, Color::White);
}

// -------------------------------------------------------------------------
// Castling once per game per side: castling on one board clears both
// rights on both boards, and later attempts are rejected.
// -------------------------------------------------------------------------
#[test]
fn test_castling_once_across_boards() {
    let mut secondary = Board::empty();
    place(&mut secondary, 7, 4, PieceKind::King, Color::White, 1);
    place(&mut secondary, 7, 7, PieceKind::Rook, Color::White, 2);
    place(&mut secondary, 7, 0, PieceKind::Rook, Color::White, 1);
    place(&mut secondary, 0, 4, PieceKind::King, Color::Black, 1);
    let mut game = Game::from_boards(
        Board::initial(),
        secondary,
        Color::White,
        BoardName::Secondary,
    );

    let outcome = game
        .submit(Color::White, BoardName::Secondary, &mv((7, 4), (7, 6)))
        .unwrap();
    assert_eq!(outcome.notation, "s:O-O");

    // Rights are gone for White on both boards.
    for board in [BoardName::Main, BoardName::Secondary] {
        assert!(!game.board(board).castling.white.king_side);
        assert!(!game.board(board).castling.white.queen_side);
    }

    // Force White onto Main with a clear back rank and try again.
    for col in [1u8, 2, 3, 5, 6] {
        game.board_mut(BoardName::Main).take(Square::at(7, col));
    }
    game.turn = Color::White;
    game.active_phase = BoardName::Main;

    let err = game
        .submit(Color::White, BoardName::Main, &mv((7, 4), (7, 6)))
        .unwrap_err();
    assert_eq!(err, MoveError::PathBlocked);
    let err = game
        .submit(Color::White, BoardName::Main, &mv((7, 4), (7, 2)))
        .unwrap_err();
    assert_eq!(err, MoveError::PathBlocked);
}

// -------------------------------------------------------------------------
// Stalemate freezes one board while play continues on the other; a later
// mate on the remaining board wins the game.
// -------------------------------------------------------------------------
#[test]
fn test_stalemate_freezes_board_then_mate_wins() {
    // Main: Qd7-c7 will stalemate the cornered black king.
    let mut main = Board::empty();
    place(&mut main, 0, 0, PieceKind::King, Color::Black, 1);
    place(&mut main, 2, 0, PieceKind::King, Color::White, 1);
    place(&mut main, 1, 3, PieceKind::Queen, Color::White, 1);

    // Secondary: rook-roller mate is one Kg8 shuffle away.
    let mut secondary = Board::empty();
    place(&mut secondary, 0, 7, PieceKind::King, Color::Black, 1);
    place(&mut secondary, 2, 6, PieceKind::King, Color::White, 1);
    place(&mut secondary, 7, 0, PieceKind::Rook, Color::White, 1);

    let mut game = Game::from_boards(main, secondary, Color::White, BoardName::Main);

    game.submit(Color::White, BoardName::Main, &mv((1, 3), (1, 2)))
        .unwrap(); // Qd7-c7, stalemate on Main
    assert_eq!(
        game.board(BoardName::Main).outcome,
        BoardOutcome::DrawStalemate
    );
    assert!(!game.game_over);
    assert_eq!(game.active_phase, BoardName::Secondary);

    game.submit(Color::Black, BoardName::Secondary, &mv((0, 7), (0, 6)))
        .unwrap(); // Kh8-g8 (the only square)
    // Main is frozen, so White stays on Secondary.
    assert_eq!(game.active_phase, BoardName::Secondary);

    let outcome = game
        .submit(Color::White, BoardName::Secondary, &mv((7, 0), (0, 0)))
        .unwrap(); // Ra1-a8#
    assert!(outcome.finished);
    assert_eq!(game.winner, Some(Winner::White));
    assert_eq!(
        game.board(BoardName::Secondary).outcome,
        BoardOutcome::WhiteWins
    );
}

// -------------------------------------------------------------------------
// Both boards stalemated: the game is a draw.
// -------------------------------------------------------------------------
#[test]
fn test_double_stalemate_is_draw() {
    let mut main = Board::empty();
    place(&mut main, 0, 0, PieceKind::King, Color::Black, 1);
    place(&mut main, 2, 0, PieceKind::King, Color::White, 1);
    place(&mut main, 1, 3, PieceKind::Queen, Color::White, 1);
    let mut game = Game::from_boards(main, Board::initial(), Color::White, BoardName::Main);
    game.board_mut(BoardName::Secondary).outcome = BoardOutcome::DrawStalemate;

    game.submit(Color::White, BoardName::Main, &mv((1, 3), (1, 2)))
        .unwrap();

    assert!(game.game_over);
    assert_eq!(game.winner, Some(Winner::Draw));
    assert_eq!(
        game.board(BoardName::Main).outcome,
        BoardOutcome::DrawStalemate
    );
}

// -------------------------------------------------------------------------
// Reset voting: one vote changes nothing on the boards; the second
// restores the start state.
// -------------------------------------------------------------------------
#[test]
fn test_reset_vote_needs_both_sides() {
    let mut game = Game::new();
    game.submit(Color::White, BoardName::Main, &mv((6, 4), (4, 4)))
        .unwrap();
    let before = game.clone();

    assert!(!game.vote_reset(Color::White));
    assert!(game.reset_votes.white && !game.reset_votes.black);
    assert_eq!(game.board(BoardName::Main), before.board(BoardName::Main));
    assert_eq!(game.moves.len(), 1);

    assert!(game.vote_reset(Color::Black));
    assert_eq!(game, Game::new());
    assert!(game.moves.is_empty());
}
