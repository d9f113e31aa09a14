//! Unified error type for the server crate.

use twofold_protocol::ProtocolError;
use twofold_room::RoomError;
use twofold_session::SessionError;
use twofold_transport::TransportError;

use crate::history::HistoryError;

/// Top-level error wrapping each layer's error type. The `#[from]`
/// conversions let `?` lift sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum TwofoldError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Room(#[from] RoomError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
