//! Per-board legality: self-check filtering, castling, en passant,
//! promotion, check/checkmate/stalemate classification, and move
//! application.
//!
//! Legality is decided by simulating the candidate move on a by-value
//! copy of the board and asking [`movegen::attacks_square`] whether the
//! mover's king ends up attacked.

use serde::{Deserialize, Serialize};

use crate::board::{Board, Square};
use crate::error::MoveError;
use crate::movegen::{self, attacks_square, pseudo_legal_moves};
use crate::piece::{Color, Piece, PieceKind};

/// What one board reports about a side after classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardStatus {
    Active,
    Checkmate,
    Stalemate,
}

/// Which way a king castles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CastleSide {
    Kingside,
    Queenside,
}

/// A move as the engine sees it: origin, destination, and the promotion
/// choice when the move pushes a pawn to the last rank. Castling and en
/// passant are recognized from the board state, never from client flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    pub fn promoting(from: Square, to: Square, kind: PieceKind) -> Self {
        Self {
            from,
            to,
            promotion: Some(kind),
        }
    }
}

/// What actually happened when a move was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveEffects {
    /// The piece removed from play, if any (en passant included).
    pub captured: Option<Piece>,
    pub castled: Option<CastleSide>,
    pub en_passant: bool,
    pub promoted: Option<PieceKind>,
}

/// Returns `true` when `side`'s king is attacked.
pub fn is_in_check(board: &Board, side: Color) -> bool {
    match board.find_king(side) {
        Some(king) => attacks_square(board, king, side.opponent()),
        None => false,
    }
}

/// All legal destinations for the piece at `from`, playing as `side`:
/// pseudo-legal moves that don't leave the king attacked, plus castling.
pub fn legal_moves(board: &Board, from: Square, side: Color) -> Vec<Square> {
    let Some(piece) = board.piece_at(from) else {
        return Vec::new();
    };
    if piece.color != side {
        return Vec::new();
    }

    let mut moves: Vec<Square> = pseudo_legal_moves(board, from)
        .into_iter()
        .filter(|&to| !simulate(board, from, to).map_or(true, |b| is_in_check(&b, side)))
        .collect();

    if piece.kind == PieceKind::King {
        moves.extend(castling_targets(board, from, side));
    }
    moves
}

/// Returns `true` when `side` has at least one legal move anywhere.
pub fn has_any_legal_move(board: &Board, side: Color) -> bool {
    let squares: Vec<Square> = board.pieces(side).map(|(sq, _)| sq).collect();
    squares
        .into_iter()
        .any(|from| !legal_moves(board, from, side).is_empty())
}

/// Classifies `side`'s situation on this board.
pub fn classify(board: &Board, side: Color) -> BoardStatus {
    if has_any_legal_move(board, side) {
        BoardStatus::Active
    } else if is_in_check(board, side) {
        BoardStatus::Checkmate
    } else {
        BoardStatus::Stalemate
    }
}

/// Applies `mv` for `side`, returning the new board and what happened.
///
/// The input board is untouched; rejection leaves no trace. Errors carry
/// the most specific reason we can diagnose so clients get a usable
/// `move_error`.
pub fn apply_move(
    board: &Board,
    side: Color,
    mv: &Move,
) -> Result<(Board, MoveEffects), MoveError> {
    let piece = match board.piece_at(mv.from) {
        Some(p) if p.color == side => p,
        _ => return Err(MoveError::NoSuchPiece),
    };

    if !legal_moves(board, mv.from, side).contains(&mv.to) {
        return Err(rejection_reason(board, side, mv));
    }

    let mut next = *board;
    let mut effects = MoveEffects::default();

    let castled = piece.kind == PieceKind::King
        && mv.from.col() == 4
        && mv.to.row() == mv.from.row()
        && mv.from.col().abs_diff(mv.to.col()) == 2;

    let en_passant = piece.kind == PieceKind::Pawn
        && mv.from.col() != mv.to.col()
        && board.is_empty(mv.to)
        && board.en_passant_target == Some(mv.to);

    // Remove whatever is captured before the mover lands.
    if en_passant {
        // The captured pawn stands one rank behind the destination from
        // the capturer's perspective.
        let standing = mv
            .to
            .offset(-movegen::pawn_direction(side), 0)
            .expect("en passant capture square is on the board");
        effects.captured = next.take(standing);
        effects.en_passant = true;
    } else {
        effects.captured = next.take(mv.to);
    }

    // Move the piece, promoting if it reaches the last rank.
    let mut moved = piece;
    if piece.kind == PieceKind::Pawn && mv.to.row() == movegen::promotion_row(side) {
        let choice = mv.promotion.ok_or(MoveError::PromotionRequired)?;
        if !choice.is_promotion_choice() {
            return Err(MoveError::PromotionRequired);
        }
        moved.promote_to(choice);
        effects.promoted = Some(choice);
    }
    next.take(mv.from);
    next.set(mv.to, Some(moved));

    // Castling: the rook jumps to the square the king crossed.
    if castled {
        let row = mv.from.row();
        let (rook_from, rook_to, side_kind) = if mv.to.col() == 6 {
            (Square::at(row, 7), Square::at(row, 5), CastleSide::Kingside)
        } else {
            (Square::at(row, 0), Square::at(row, 3), CastleSide::Queenside)
        };
        let rook = next.take(rook_from);
        next.set(rook_to, rook);
        effects.castled = Some(side_kind);
    }

    update_castling_rights(&mut next, side, piece, mv, effects.captured);

    // The en-passant window is single-ply: set only on a double push,
    // cleared by every other move.
    next.en_passant_target = if piece.kind == PieceKind::Pawn
        && mv.from.row().abs_diff(mv.to.row()) == 2
    {
        mv.from.offset(movegen::pawn_direction(side), 0)
    } else {
        None
    };

    Ok((next, effects))
}

/// Simulates moving `from` → `to` without validation, handling the
/// en-passant removal so check detection sees the true resulting board.
fn simulate(board: &Board, from: Square, to: Square) -> Option<Board> {
    let piece = board.piece_at(from)?;
    let mut next = *board;
    if piece.kind == PieceKind::Pawn
        && from.col() != to.col()
        && board.is_empty(to)
        && board.en_passant_target == Some(to)
    {
        let standing = to.offset(-movegen::pawn_direction(piece.color), 0)?;
        next.take(standing);
    }
    next.take(from);
    next.set(to, Some(piece));
    Some(next)
}

/// Castling destinations for the king at `from`, honoring every gate:
/// surviving rights, rook in place, empty path, and no attacked square
/// under, through, or onto.
fn castling_targets(board: &Board, from: Square, side: Color) -> Vec<Square> {
    let home_row = match side {
        Color::White => 7,
        Color::Black => 0,
    };
    if from != Square::at(home_row, 4) || is_in_check(board, side) {
        return Vec::new();
    }

    let rights = *board.castling.side(side);
    let enemy = side.opponent();
    let mut targets = Vec::new();

    let rook_ok = |col: u8| {
        board
            .piece_at(Square::at(home_row, col))
            .is_some_and(|p| p.kind == PieceKind::Rook && p.color == side)
    };

    if rights.king_side
        && rook_ok(7)
        && [5u8, 6].iter().all(|&c| board.is_empty(Square::at(home_row, c)))
        && [5u8, 6]
            .iter()
            .all(|&c| !attacks_square(board, Square::at(home_row, c), enemy))
    {
        targets.push(Square::at(home_row, 6));
    }

    if rights.queen_side
        && rook_ok(0)
        && [1u8, 2, 3]
            .iter()
            .all(|&c| board.is_empty(Square::at(home_row, c)))
        && [2u8, 3]
            .iter()
            .all(|&c| !attacks_square(board, Square::at(home_row, c), enemy))
    {
        targets.push(Square::at(home_row, 2));
    }

    targets
}

/// Clears castling rights for kings and rooks that moved, and for rooks
/// captured on their home corners.
fn update_castling_rights(
    board: &mut Board,
    side: Color,
    piece: Piece,
    mv: &Move,
    captured: Option<Piece>,
) {
    match piece.kind {
        PieceKind::King => board.castling.clear(side),
        PieceKind::Rook => {
            let home_row = match side {
                Color::White => 7,
                Color::Black => 0,
            };
            if mv.from == Square::at(home_row, 0) {
                board.castling.side_mut(side).queen_side = false;
            }
            if mv.from == Square::at(home_row, 7) {
                board.castling.side_mut(side).king_side = false;
            }
        }
        _ => {}
    }

    if let Some(taken) = captured {
        if taken.kind == PieceKind::Rook {
            let their_row = match taken.color {
                Color::White => 7,
                Color::Black => 0,
            };
            if mv.to == Square::at(their_row, 0) {
                board.castling.side_mut(taken.color).queen_side = false;
            }
            if mv.to == Square::at(their_row, 7) {
                board.castling.side_mut(taken.color).king_side = false;
            }
        }
    }
}

/// Diagnoses why `mv` is not legal, preferring the most specific reason.
fn rejection_reason(board: &Board, side: Color, mv: &Move) -> MoveError {
    match board.piece_at(mv.to) {
        Some(target) if target.color == side => return MoveError::DestinationBlocked,
        _ => {}
    }
    if !pseudo_legal_moves(board, mv.from).contains(&mv.to) {
        // Covers blocked rays, castling without rights or through pieces,
        // and plain impossible piece movement.
        return MoveError::PathBlocked;
    }
    match simulate(board, mv.from, mv.to) {
        Some(after) if is_in_check(&after, side) => MoveError::MovesIntoCheck,
        _ => MoveError::PathBlocked,
    }
}
