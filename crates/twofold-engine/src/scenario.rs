//! Preset game states for the administrative debug endpoint and tests.
//!
//! Installing a preset is the only non-move path that mutates a game;
//! the HTTP route that exposes it is compiled out of release builds.

use std::str::FromStr;

use crate::board::{Board, BoardOutcome, Square};
use crate::game::{BoardName, Game, Winner};
use crate::piece::{Color, Piece, PieceKind};

/// The named presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// White has already mated on Main; the game is over.
    Checkmate,
    /// Black to move on Main with no legal move and no check.
    Stalemate,
    /// Black in check on Main and pinned there.
    InCheck,
    /// A white pawn one step from promotion on Main.
    Promotion,
    /// White king and rooks at home with a clear back rank on Main.
    CastlingReady,
    /// A white pawn on Secondary may capture en passant this ply.
    EnPassantReady,
}

impl Scenario {
    pub const ALL: [Scenario; 6] = [
        Scenario::Checkmate,
        Scenario::Stalemate,
        Scenario::InCheck,
        Scenario::Promotion,
        Scenario::CastlingReady,
        Scenario::EnPassantReady,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Checkmate => "checkmate",
            Self::Stalemate => "stalemate",
            Self::InCheck => "in-check",
            Self::Promotion => "promotion",
            Self::CastlingReady => "castling-ready",
            Self::EnPassantReady => "en-passant-ready",
        }
    }

    /// Builds the preset game, normalized onto a playable phase.
    pub fn install(self) -> Game {
        let game = match self {
            Self::Checkmate => {
                // Back-rank mate: Ra8#, the black king cornered by Kh6.
                let mut main = Board::empty();
                place(&mut main, 0, 7, PieceKind::King, Color::Black, 1);
                place(&mut main, 2, 7, PieceKind::King, Color::White, 1);
                place(&mut main, 0, 0, PieceKind::Rook, Color::White, 1);
                let mut game =
                    Game::from_boards(main, Board::initial(), Color::Black, BoardName::Main);
                game.board_mut(BoardName::Main).outcome = BoardOutcome::WhiteWins;
                game.game_over = true;
                game.winner = Some(Winner::White);
                game
            }
            Self::Stalemate => {
                // Black king boxed in the corner by king and queen,
                // not in check.
                let mut main = Board::empty();
                place(&mut main, 0, 0, PieceKind::King, Color::Black, 1);
                place(&mut main, 2, 0, PieceKind::King, Color::White, 1);
                place(&mut main, 1, 2, PieceKind::Queen, Color::White, 1);
                Game::from_boards(main, Board::initial(), Color::Black, BoardName::Main)
            }
            Self::InCheck => {
                // Rook on the back rank checks the cornered black king.
                let mut main = Board::empty();
                place(&mut main, 0, 0, PieceKind::King, Color::Black, 1);
                place(&mut main, 0, 7, PieceKind::Rook, Color::White, 1);
                place(&mut main, 7, 4, PieceKind::King, Color::White, 1);
                let mut game =
                    Game::from_boards(main, Board::initial(), Color::Black, BoardName::Main);
                game.responding_to_check_on = Some(BoardName::Main);
                game
            }
            Self::Promotion => {
                let mut main = Board::empty();
                place(&mut main, 1, 0, PieceKind::Pawn, Color::White, 1);
                place(&mut main, 7, 4, PieceKind::King, Color::White, 1);
                place(&mut main, 0, 4, PieceKind::King, Color::Black, 1);
                Game::from_boards(main, Board::initial(), Color::White, BoardName::Main)
            }
            Self::CastlingReady => {
                let mut main = Board::empty();
                place(&mut main, 7, 4, PieceKind::King, Color::White, 1);
                place(&mut main, 7, 0, PieceKind::Rook, Color::White, 1);
                place(&mut main, 7, 7, PieceKind::Rook, Color::White, 2);
                place(&mut main, 0, 4, PieceKind::King, Color::Black, 1);
                Game::from_boards(main, Board::initial(), Color::White, BoardName::Main)
            }
            Self::EnPassantReady => {
                // On Secondary, Black just double-pushed d7-d5 past the
                // white e5 pawn; Main still has both pawns in place so
                // the en-passant mirror can be exercised.
                let mut secondary = Board::empty();
                place(&mut secondary, 3, 4, PieceKind::Pawn, Color::White, 5);
                place(&mut secondary, 3, 3, PieceKind::Pawn, Color::Black, 4);
                place(&mut secondary, 7, 4, PieceKind::King, Color::White, 1);
                place(&mut secondary, 0, 4, PieceKind::King, Color::Black, 1);
                secondary.en_passant_target = Some(Square::at(2, 3));
                Game::from_boards(
                    Board::initial(),
                    secondary,
                    Color::White,
                    BoardName::Secondary,
                )
            }
        };
        let mut game = game;
        game.normalize_phase();
        game
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sc| sc.name() == s)
            .ok_or_else(|| format!("unknown scenario: {s:?}"))
    }
}

fn place(board: &mut Board, row: u8, col: u8, kind: PieceKind, color: Color, num: u8) {
    board.set(Square::at(row, col), Some(Piece::spawn(kind, color, num)));
}
