//! Single-board state: the 8×8 mailbox plus the ancillary state legality
//! depends on (castling rights, en-passant target, per-board outcome).
//!
//! Row 0 is Black's back rank, row 7 is White's. The board is a plain
//! `Copy` value so legality checks can simulate moves on a by-value copy
//! without sharing substructure.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::piece::{Color, Piece, PieceId, PieceKind};

// ---------------------------------------------------------------------------
// Square
// ---------------------------------------------------------------------------

/// A board coordinate. Serialized on the wire as `[row, col]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "[u8; 2]", into = "[u8; 2]")]
pub struct Square {
    row: u8,
    col: u8,
}

impl Square {
    /// Creates a square; returns `None` when off the board.
    pub fn new(row: u8, col: u8) -> Option<Self> {
        (row < 8 && col < 8).then_some(Self { row, col })
    }

    /// Creates a square from known-in-range coordinates.
    ///
    /// # Panics
    /// Panics when off the board — use only with literal coordinates.
    pub fn at(row: u8, col: u8) -> Self {
        Self::new(row, col).expect("coordinates out of range")
    }

    pub fn row(self) -> u8 {
        self.row
    }

    pub fn col(self) -> u8 {
        self.col
    }

    /// Offsets this square, returning `None` when the result leaves the board.
    pub fn offset(self, dr: i8, dc: i8) -> Option<Self> {
        let row = self.row as i8 + dr;
        let col = self.col as i8 + dc;
        if (0..8).contains(&row) && (0..8).contains(&col) {
            Some(Self {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    /// Iterates every square on the board, row by row.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..8u8).flat_map(|row| (0..8u8).map(move |col| Square { row, col }))
    }
}

impl TryFrom<[u8; 2]> for Square {
    type Error = String;

    fn try_from(value: [u8; 2]) -> Result<Self, Self::Error> {
        Square::new(value[0], value[1])
            .ok_or_else(|| format!("coordinates out of range: {value:?}"))
    }
}

impl From<Square> for [u8; 2] {
    fn from(sq: Square) -> Self {
        [sq.row, sq.col]
    }
}

/// Algebraic display: `(row 6, col 4)` prints as `e2`.
impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            char::from(b'a' + self.col),
            8 - self.row
        )
    }
}

// ---------------------------------------------------------------------------
// Castling rights
// ---------------------------------------------------------------------------

/// One side's castling rights. Serialized as `{"K": bool, "Q": bool}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideRights {
    #[serde(rename = "K")]
    pub king_side: bool,
    #[serde(rename = "Q")]
    pub queen_side: bool,
}

impl SideRights {
    fn none() -> Self {
        Self {
            king_side: false,
            queen_side: false,
        }
    }
}

/// Castling rights for both sides. Monotonically non-increasing within a
/// game: once a right is cleared it is never re-asserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastlingRights {
    #[serde(rename = "White")]
    pub white: SideRights,
    #[serde(rename = "Black")]
    pub black: SideRights,
}

impl CastlingRights {
    pub fn all() -> Self {
        let both = SideRights {
            king_side: true,
            queen_side: true,
        };
        Self {
            white: both,
            black: both,
        }
    }

    pub fn side(&self, color: Color) -> &SideRights {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    pub fn side_mut(&mut self, color: Color) -> &mut SideRights {
        match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }

    /// Clears both rights for one side.
    pub fn clear(&mut self, color: Color) {
        *self.side_mut(color) = SideRights::none();
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Per-board terminal status. A non-`Active` board is frozen: no further
/// moves are accepted on it, though the capture mirror may still remove
/// pieces from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardOutcome {
    Active,
    WhiteWins,
    BlackWins,
    DrawStalemate,
}

impl BoardOutcome {
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    /// The win outcome for the given side.
    pub fn win_for(color: Color) -> Self {
        match color {
            Color::White => Self::WhiteWins,
            Color::Black => Self::BlackWins,
        }
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// One 8×8 board with its legality state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    cells: [[Option<Piece>; 8]; 8],
    pub castling: CastlingRights,
    /// The square a pawn could capture to on the next ply, set only for
    /// the single ply following a double pawn push.
    pub en_passant_target: Option<Square>,
    pub outcome: BoardOutcome,
}

impl Board {
    /// An empty board with full castling rights (used by scenario setups).
    pub fn empty() -> Self {
        Self {
            cells: [[None; 8]; 8],
            castling: CastlingRights::all(),
            en_passant_target: None,
            outcome: BoardOutcome::Active,
        }
    }

    /// The standard start position with stable piece ids: back ranks
    /// `R1 N1 B1 Q1 K1 B2 N2 R2`, pawns `P1`–`P8` left to right.
    pub fn initial() -> Self {
        use PieceKind::*;

        let mut board = Self::empty();
        let back_rank = [
            (Rook, 1),
            (Knight, 1),
            (Bishop, 1),
            (Queen, 1),
            (King, 1),
            (Bishop, 2),
            (Knight, 2),
            (Rook, 2),
        ];
        for (col, (kind, num)) in back_rank.into_iter().enumerate() {
            let col = col as u8;
            board.set(Square::at(0, col), Some(Piece::spawn(kind, Color::Black, num)));
            board.set(Square::at(7, col), Some(Piece::spawn(kind, Color::White, num)));
        }
        for col in 0..8u8 {
            board.set(
                Square::at(1, col),
                Some(Piece::spawn(Pawn, Color::Black, col + 1)),
            );
            board.set(
                Square::at(6, col),
                Some(Piece::spawn(Pawn, Color::White, col + 1)),
            );
        }
        board
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.cells[sq.row() as usize][sq.col() as usize]
    }

    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        self.cells[sq.row() as usize][sq.col() as usize] = piece;
    }

    /// Removes and returns the piece at `sq`.
    pub fn take(&mut self, sq: Square) -> Option<Piece> {
        self.cells[sq.row() as usize][sq.col() as usize].take()
    }

    pub fn is_empty(&self, sq: Square) -> bool {
        self.piece_at(sq).is_none()
    }

    /// Iterates all pieces of one color with their squares.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| {
            self.piece_at(sq)
                .filter(|p| p.color == color)
                .map(|p| (sq, p))
        })
    }

    /// Finds the king of the given color.
    pub fn find_king(&self, color: Color) -> Option<Square> {
        self.pieces(color)
            .find(|(_, p)| p.kind == PieceKind::King)
            .map(|(sq, _)| sq)
    }

    /// Finds the piece with the given stable id.
    pub fn find_piece(&self, color: Color, id: PieceId) -> Option<Square> {
        self.pieces(color)
            .find(|(_, p)| p.id == id)
            .map(|(sq, _)| sq)
    }

    /// Removes the piece with the given id, returning where it stood.
    /// Used by the cross-board capture mirror; absence is not an error.
    pub fn remove_by_id(&mut self, color: Color, id: PieceId) -> Option<Square> {
        let sq = self.find_piece(color, id)?;
        self.take(sq);
        Some(sq)
    }
}
