//! Piece identity: kind, color, and the stable per-piece id.
//!
//! Every piece carries a [`PieceId`] assigned at game start and never
//! changed afterwards — this is what makes the cross-board capture mirror
//! well-defined. Two knights are `N1` and `N2`, the eight pawns `P1`–`P8`.
//! A promoted pawn changes its [`PieceKind`] but keeps its pawn id.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// Returns the other side.
    pub fn opponent(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::White => write!(f, "White"),
            Self::Black => write!(f, "Black"),
        }
    }
}

/// The six chess piece kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
}

impl PieceKind {
    /// The uppercase letter used in cell encodings and move notation.
    pub fn letter(self) -> char {
        match self {
            Self::Pawn => 'P',
            Self::Rook => 'R',
            Self::Knight => 'N',
            Self::Bishop => 'B',
            Self::Queen => 'Q',
            Self::King => 'K',
        }
    }

    /// Parses an (uppercase) encoding letter.
    pub fn from_letter(c: char) -> Option<Self> {
        match c {
            'P' => Some(Self::Pawn),
            'R' => Some(Self::Rook),
            'N' => Some(Self::Knight),
            'B' => Some(Self::Bishop),
            'Q' => Some(Self::Queen),
            'K' => Some(Self::King),
            _ => None,
        }
    }

    /// Returns `true` for the kinds a pawn may promote to.
    pub fn is_promotion_choice(self) -> bool {
        !matches!(self, Self::Pawn | Self::King)
    }
}

/// Stable identity of a piece within one color: the kind it spawned as
/// plus a 1-based ordinal (`N1`, `N2`, `P1`–`P8`).
///
/// The spawn kind never changes, even across promotion — the id is a
/// label, not the piece's current movement behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceId {
    spawn_kind: PieceKind,
    num: u8,
}

impl PieceId {
    pub fn new(spawn_kind: PieceKind, num: u8) -> Self {
        Self { spawn_kind, num }
    }

    pub fn spawn_kind(self) -> PieceKind {
        self.spawn_kind
    }

    pub fn num(self) -> u8 {
        self.num
    }
}

/// A piece on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    /// Current kind; changes only on promotion.
    pub kind: PieceKind,
    pub color: Color,
    /// Stable identity; never changes.
    pub id: PieceId,
}

impl Piece {
    /// Creates a freshly spawned piece whose id matches its kind.
    pub fn spawn(kind: PieceKind, color: Color, num: u8) -> Self {
        Self {
            kind,
            color,
            id: PieceId::new(kind, num),
        }
    }

    /// Promotes this piece in place, keeping its id.
    pub fn promote_to(&mut self, kind: PieceKind) {
        self.kind = kind;
    }

    /// The wire label: id letter cased by color, ordinal, and — for a
    /// promoted pawn — the promoted kind's letter (`"P3"`, `"n2"`, `"P3Q"`).
    pub fn label(&self) -> String {
        let mut s = String::with_capacity(3);
        s.push(cased(self.id.spawn_kind.letter(), self.color));
        s.push(char::from(b'0' + self.id.num));
        if self.kind != self.id.spawn_kind {
            s.push(cased(self.kind.letter(), self.color));
        }
        s
    }

    /// Parses a wire label back into a piece.
    pub fn from_label(label: &str) -> Option<Self> {
        let mut chars = label.chars();
        let first = chars.next()?;
        let color = if first.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let spawn_kind = PieceKind::from_letter(first.to_ascii_uppercase())?;
        let num = chars.next()?.to_digit(10)? as u8;
        if num == 0 {
            return None;
        }
        let kind = match chars.next() {
            None => spawn_kind,
            Some(c) => {
                let promoted = PieceKind::from_letter(c.to_ascii_uppercase())?;
                if spawn_kind != PieceKind::Pawn || !promoted.is_promotion_choice() {
                    return None;
                }
                promoted
            }
        };
        if chars.next().is_some() {
            return None;
        }
        Some(Self {
            kind,
            color,
            id: PieceId::new(spawn_kind, num),
        })
    }
}

fn cased(letter: char, color: Color) -> char {
    match color {
        Color::White => letter,
        Color::Black => letter.to_ascii_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_round_trip_plain_pieces() {
        let n2 = Piece::spawn(PieceKind::Knight, Color::Black, 2);
        assert_eq!(n2.label(), "n2");
        assert_eq!(Piece::from_label("n2"), Some(n2));

        let p5 = Piece::spawn(PieceKind::Pawn, Color::White, 5);
        assert_eq!(p5.label(), "P5");
        assert_eq!(Piece::from_label("P5"), Some(p5));
    }

    #[test]
    fn test_label_keeps_pawn_id_across_promotion() {
        let mut p3 = Piece::spawn(PieceKind::Pawn, Color::White, 3);
        p3.promote_to(PieceKind::Queen);
        assert_eq!(p3.label(), "P3Q");

        let parsed = Piece::from_label("P3Q").unwrap();
        assert_eq!(parsed.kind, PieceKind::Queen);
        assert_eq!(parsed.id, PieceId::new(PieceKind::Pawn, 3));
        assert_eq!(parsed, p3);
    }

    #[test]
    fn test_from_label_rejects_garbage() {
        assert!(Piece::from_label("").is_none());
        assert!(Piece::from_label("X1").is_none());
        assert!(Piece::from_label("P0").is_none());
        assert!(Piece::from_label("P12").is_none());
        // Only pawns promote, and never to king or pawn.
        assert!(Piece::from_label("N1Q").is_none());
        assert!(Piece::from_label("P1K").is_none());
        assert!(Piece::from_label("P1P").is_none());
    }

    #[test]
    fn test_color_opponent() {
        assert_eq!(Color::White.opponent(), Color::Black);
        assert_eq!(Color::Black.opponent(), Color::White);
    }

    #[test]
    fn test_promotion_choices() {
        assert!(PieceKind::Queen.is_promotion_choice());
        assert!(PieceKind::Knight.is_promotion_choice());
        assert!(!PieceKind::King.is_promotion_choice());
        assert!(!PieceKind::Pawn.is_promotion_choice());
    }
}
