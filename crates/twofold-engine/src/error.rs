//! Move rejection reasons surfaced to clients as `move_error`.

use crate::game::BoardName;

/// Why a submitted move was rejected. The game state is unchanged in
/// every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("not your turn")]
    NotYourTurn,

    #[error("wrong board: expected {expected}, got {actual}")]
    WrongBoard {
        expected: BoardName,
        actual: BoardName,
    },

    #[error("you must respond to check on the {0} board")]
    MustRespondToCheckOn(BoardName),

    /// No piece at the starting square, or it isn't the mover's piece,
    /// or it doesn't match the piece the client claims to be moving.
    #[error("no such piece at the starting square")]
    NoSuchPiece,

    #[error("illegal move: your king would be in check")]
    MovesIntoCheck,

    #[error("destination square is blocked")]
    DestinationBlocked,

    #[error("path is blocked")]
    PathBlocked,

    #[error("game is already over")]
    GameOver,

    #[error("promotion requires an explicit piece choice")]
    PromotionRequired,
}

impl MoveError {
    /// The board the mover was expected to play on, when the rejection
    /// names one (used for the `expectedBoard` field of `move_error`).
    pub fn expected_board(&self) -> Option<BoardName> {
        match self {
            Self::WrongBoard { expected, .. } => Some(*expected),
            Self::MustRespondToCheckOn(board) => Some(*board),
            _ => None,
        }
    }

    /// The board the mover actually played on, when the rejection names one.
    pub fn actual_board(&self) -> Option<BoardName> {
        match self {
            Self::WrongBoard { actual, .. } => Some(*actual),
            _ => None,
        }
    }
}
