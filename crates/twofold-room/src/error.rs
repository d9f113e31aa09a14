//! Error types for the room layer.

use crate::RoomId;

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// `create_lobby` targeted an id that is already taken.
    #[error("room {0} already exists")]
    AlreadyExists(RoomId),

    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// Both seats are taken; spectators are not supported.
    #[error("room {0} is full")]
    Full(RoomId),

    /// The session is already a member of this room.
    #[error("already in room {0}")]
    AlreadyInRoom(RoomId),

    /// The session is not a member of this room.
    #[error("not a member of room {0}")]
    NotInRoom(RoomId),

    /// The room's actor is gone or its mailbox closed.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}
