//! The full game snapshot sent in `game_state` / `game_update` /
//! `game_reset` broadcasts.
//!
//! The snapshot is loss-free: serializing a [`Game`] and reloading the
//! result reconstructs an identical game. Boards are 8×8 grids of cell
//! labels (`"P3"`, `"n2"`, `null`); the per-board legality state
//! (castling rights, en-passant target) rides along keyed by board.

use serde::{Deserialize, Serialize};

use crate::board::{Board, BoardOutcome, CastlingRights, Square};
use crate::game::{BoardName, Game, ResetVotes, Winner};
use crate::piece::{Color, Piece};

/// A value tracked separately for each board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerBoard<T> {
    pub main: T,
    pub secondary: T,
}

/// The snapshot shape of §6: board grids, turn/phase, move history,
/// outcomes, check gating, and the reset votes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    #[serde(rename = "mainBoard")]
    pub main_board: Vec<Vec<Option<String>>>,
    #[serde(rename = "secondaryBoard")]
    pub secondary_board: Vec<Vec<Option<String>>>,
    pub turn: Color,
    pub active_board_phase: BoardName,
    pub moves: Vec<String>,
    #[serde(default)]
    pub winner: Option<Winner>,
    pub game_over: bool,
    pub main_board_outcome: BoardOutcome,
    pub secondary_board_outcome: BoardOutcome,
    pub is_responding_to_check_on_board: Option<BoardName>,
    pub en_passant_target: PerBoard<Option<Square>>,
    pub castling_rights: PerBoard<CastlingRights>,
    pub reset_votes: ResetVotes,
}

impl From<&Game> for GameSnapshot {
    fn from(game: &Game) -> Self {
        let main = game.board(BoardName::Main);
        let secondary = game.board(BoardName::Secondary);
        Self {
            main_board: encode_cells(main),
            secondary_board: encode_cells(secondary),
            turn: game.turn,
            active_board_phase: game.active_phase,
            moves: game.moves.clone(),
            winner: game.winner,
            game_over: game.game_over,
            main_board_outcome: main.outcome,
            secondary_board_outcome: secondary.outcome,
            is_responding_to_check_on_board: game.responding_to_check_on,
            en_passant_target: PerBoard {
                main: main.en_passant_target,
                secondary: secondary.en_passant_target,
            },
            castling_rights: PerBoard {
                main: main.castling,
                secondary: secondary.castling,
            },
            reset_votes: game.reset_votes,
        }
    }
}

impl TryFrom<&GameSnapshot> for Game {
    type Error = String;

    fn try_from(snap: &GameSnapshot) -> Result<Self, Self::Error> {
        let main = decode_board(
            &snap.main_board,
            snap.castling_rights.main,
            snap.en_passant_target.main,
            snap.main_board_outcome,
        )?;
        let secondary = decode_board(
            &snap.secondary_board,
            snap.castling_rights.secondary,
            snap.en_passant_target.secondary,
            snap.secondary_board_outcome,
        )?;

        let mut game = Game::from_boards(main, secondary, snap.turn, snap.active_board_phase);
        game.moves = snap.moves.clone();
        game.winner = snap.winner;
        game.game_over = snap.game_over;
        game.responding_to_check_on = snap.is_responding_to_check_on_board;
        game.reset_votes = snap.reset_votes;
        Ok(game)
    }
}

fn encode_cells(board: &Board) -> Vec<Vec<Option<String>>> {
    (0..8u8)
        .map(|row| {
            (0..8u8)
                .map(|col| board.piece_at(Square::at(row, col)).map(|p| p.label()))
                .collect()
        })
        .collect()
}

fn decode_board(
    cells: &[Vec<Option<String>>],
    castling: CastlingRights,
    en_passant_target: Option<Square>,
    outcome: BoardOutcome,
) -> Result<Board, String> {
    if cells.len() != 8 || cells.iter().any(|row| row.len() != 8) {
        return Err("board grid must be 8x8".into());
    }

    let mut board = Board::empty();
    for (row, cols) in cells.iter().enumerate() {
        for (col, cell) in cols.iter().enumerate() {
            if let Some(label) = cell {
                let piece = Piece::from_label(label)
                    .ok_or_else(|| format!("unknown piece label: {label:?}"))?;
                board.set(Square::at(row as u8, col as u8), Some(piece));
            }
        }
    }
    board.castling = castling;
    board.en_passant_target = en_passant_target;
    board.outcome = outcome;
    Ok(board)
}
