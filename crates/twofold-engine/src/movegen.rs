//! Pseudo-legal move generation and attack tests (per-piece, no
//! self-check filtering — that lives in [`crate::rules`]).
//!
//! Attack tests never recurse through legality filtering, which is what
//! keeps "does moving here leave my king attacked?" from looping.

use crate::board::{Board, Square};
use crate::piece::{Color, Piece, PieceKind};

pub const ROOK_DIRS: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
pub const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

const KNIGHT_HOPS: [(i8, i8); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];

const KING_STEPS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Row delta a pawn of this color advances by. White sits on rows 6–7 and
/// advances toward row 0.
pub fn pawn_direction(color: Color) -> i8 {
    match color {
        Color::White => -1,
        Color::Black => 1,
    }
}

/// The rank a pawn of this color double-pushes from.
pub fn pawn_start_row(color: Color) -> u8 {
    match color {
        Color::White => 6,
        Color::Black => 1,
    }
}

/// The rank a pawn of this color promotes on.
pub fn promotion_row(color: Color) -> u8 {
    match color {
        Color::White => 0,
        Color::Black => 7,
    }
}

/// All pseudo-legal destination squares for the piece at `from`.
///
/// Pseudo-legal means piece-movement rules only: self-check exposure is
/// not considered, and castling is produced by the rules layer, not here.
pub fn pseudo_legal_moves(board: &Board, from: Square) -> Vec<Square> {
    let Some(piece) = board.piece_at(from) else {
        return Vec::new();
    };
    match piece.kind {
        PieceKind::Pawn => pawn_moves(board, from, piece.color),
        PieceKind::Knight => step_moves(board, from, piece.color, &KNIGHT_HOPS),
        PieceKind::King => step_moves(board, from, piece.color, &KING_STEPS),
        PieceKind::Rook => sliding_moves(board, from, piece.color, &ROOK_DIRS),
        PieceKind::Bishop => sliding_moves(board, from, piece.color, &BISHOP_DIRS),
        PieceKind::Queen => {
            let mut moves = sliding_moves(board, from, piece.color, &ROOK_DIRS);
            moves.extend(sliding_moves(board, from, piece.color, &BISHOP_DIRS));
            moves
        }
    }
}

fn pawn_moves(board: &Board, from: Square, color: Color) -> Vec<Square> {
    let mut moves = Vec::new();
    let dir = pawn_direction(color);

    // Forward pushes: one step, and two from the starting rank when both
    // squares are empty.
    if let Some(one) = from.offset(dir, 0) {
        if board.is_empty(one) {
            moves.push(one);
            if from.row() == pawn_start_row(color) {
                if let Some(two) = from.offset(2 * dir, 0) {
                    if board.is_empty(two) {
                        moves.push(two);
                    }
                }
            }
        }
    }

    // Diagonal captures, including onto the en-passant target.
    for dc in [-1, 1] {
        if let Some(to) = from.offset(dir, dc) {
            match board.piece_at(to) {
                Some(target) if target.color != color => moves.push(to),
                None if board.en_passant_target == Some(to) => moves.push(to),
                _ => {}
            }
        }
    }

    moves
}

fn step_moves(
    board: &Board,
    from: Square,
    color: Color,
    offsets: &[(i8, i8)],
) -> Vec<Square> {
    offsets
        .iter()
        .filter_map(|&(dr, dc)| from.offset(dr, dc))
        .filter(|&to| {
            board
                .piece_at(to)
                .map_or(true, |target| target.color != color)
        })
        .collect()
}

fn sliding_moves(
    board: &Board,
    from: Square,
    color: Color,
    dirs: &[(i8, i8)],
) -> Vec<Square> {
    let mut moves = Vec::new();
    for &(dr, dc) in dirs {
        let mut sq = from;
        while let Some(next) = sq.offset(dr, dc) {
            match board.piece_at(next) {
                None => {
                    moves.push(next);
                    sq = next;
                }
                Some(target) => {
                    if target.color != color {
                        moves.push(next);
                    }
                    break;
                }
            }
        }
    }
    moves
}

/// Returns `true` when any piece of `by` attacks `target`.
///
/// Pawn attacks are the diagonals only — forward pushes never attack.
pub fn attacks_square(board: &Board, target: Square, by: Color) -> bool {
    board
        .pieces(by)
        .any(|(sq, piece)| attack_squares(board, sq, piece).contains(&target))
}

fn attack_squares(board: &Board, from: Square, piece: Piece) -> Vec<Square> {
    match piece.kind {
        PieceKind::Pawn => {
            let dir = pawn_direction(piece.color);
            [-1, 1]
                .into_iter()
                .filter_map(|dc| from.offset(dir, dc))
                .collect()
        }
        _ => pseudo_legal_moves(board, from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Piece;

    fn place(board: &mut Board, row: u8, col: u8, kind: PieceKind, color: Color, num: u8) {
        board.set(Square::at(row, col), Some(Piece::spawn(kind, color, num)));
    }

    #[test]
    fn test_pawn_single_and_double_push_from_start() {
        let board = Board::initial();
        let moves = pseudo_legal_moves(&board, Square::at(6, 4));
        assert!(moves.contains(&Square::at(5, 4)));
        assert!(moves.contains(&Square::at(4, 4)));
        assert_eq!(moves.len(), 2);
    }

    #[test]
    fn test_pawn_double_push_blocked_by_intermediate() {
        let mut board = Board::initial();
        place(&mut board, 5, 4, PieceKind::Knight, Color::Black, 1);
        let moves = pseudo_legal_moves(&board, Square::at(6, 4));
        assert!(moves.is_empty());
    }

    #[test]
    fn test_pawn_captures_diagonally_only() {
        let mut board = Board::empty();
        place(&mut board, 4, 4, PieceKind::Pawn, Color::White, 5);
        place(&mut board, 3, 3, PieceKind::Pawn, Color::Black, 4);
        place(&mut board, 3, 4, PieceKind::Pawn, Color::Black, 5);

        let moves = pseudo_legal_moves(&board, Square::at(4, 4));
        // Forward blocked by the enemy pawn; diagonal capture available.
        assert_eq!(moves, vec![Square::at(3, 3)]);
    }

    #[test]
    fn test_pawn_en_passant_target_is_capturable() {
        let mut board = Board::empty();
        place(&mut board, 3, 4, PieceKind::Pawn, Color::White, 5);
        place(&mut board, 3, 3, PieceKind::Pawn, Color::Black, 4);
        board.en_passant_target = Some(Square::at(2, 3));

        let moves = pseudo_legal_moves(&board, Square::at(3, 4));
        assert!(moves.contains(&Square::at(2, 3)));
    }

    #[test]
    fn test_knight_jumps_over_pieces_but_not_onto_friends() {
        let board = Board::initial();
        let moves = pseudo_legal_moves(&board, Square::at(7, 6));
        assert_eq!(moves.len(), 2);
        assert!(moves.contains(&Square::at(5, 5)));
        assert!(moves.contains(&Square::at(5, 7)));
    }

    #[test]
    fn test_rook_ray_stops_on_capture() {
        let mut board = Board::empty();
        place(&mut board, 4, 0, PieceKind::Rook, Color::White, 1);
        place(&mut board, 4, 5, PieceKind::Pawn, Color::Black, 1);

        let moves = pseudo_legal_moves(&board, Square::at(4, 0));
        assert!(moves.contains(&Square::at(4, 5)));
        assert!(!moves.contains(&Square::at(4, 6)));
    }

    #[test]
    fn test_rook_ray_stops_before_friendly() {
        let mut board = Board::empty();
        place(&mut board, 4, 0, PieceKind::Rook, Color::White, 1);
        place(&mut board, 4, 5, PieceKind::Pawn, Color::White, 1);

        let moves = pseudo_legal_moves(&board, Square::at(4, 0));
        assert!(moves.contains(&Square::at(4, 4)));
        assert!(!moves.contains(&Square::at(4, 5)));
    }

    #[test]
    fn test_queen_covers_rook_and_bishop_rays() {
        let mut board = Board::empty();
        place(&mut board, 4, 4, PieceKind::Queen, Color::White, 1);
        let moves = pseudo_legal_moves(&board, Square::at(4, 4));
        // 14 rook squares + 13 bishop squares from e4 on an empty board.
        assert_eq!(moves.len(), 27);
    }

    #[test]
    fn test_attacks_square_pawn_diagonals_not_pushes() {
        let mut board = Board::empty();
        place(&mut board, 4, 4, PieceKind::Pawn, Color::White, 5);

        assert!(attacks_square(&board, Square::at(3, 3), Color::White));
        assert!(attacks_square(&board, Square::at(3, 5), Color::White));
        // The push square is not attacked.
        assert!(!attacks_square(&board, Square::at(3, 4), Color::White));
    }

    #[test]
    fn test_attacks_square_sliding_blocked() {
        let mut board = Board::empty();
        place(&mut board, 0, 0, PieceKind::Rook, Color::Black, 1);
        place(&mut board, 0, 3, PieceKind::Pawn, Color::Black, 1);

        assert!(attacks_square(&board, Square::at(0, 2), Color::Black));
        // The friendly pawn blocks the ray beyond it.
        assert!(!attacks_square(&board, Square::at(0, 5), Color::Black));
    }
}
