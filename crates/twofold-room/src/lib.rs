//! Room layer for the Twofold Chess server.
//!
//! Each room is an actor: a Tokio task owning one [`twofold_engine::Game`]
//! and the member/seat table, fed by an mpsc mailbox. The
//! [`RoomRegistry`] is the process-wide index of rooms plus their lobby
//! metadata (host, privacy, creation time).

use serde::{Deserialize, Serialize};

mod config;
mod error;
mod registry;
mod room;

pub use config::{RoomConfig, RoomId};
pub use error::RoomError;
pub use registry::{list_lobbies, sweep_candidates, RoomRegistry};
pub use room::{PlayerSender, RoomHandle, RoomStatus};

/// A finished game on its way to the history sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub room: String,
    pub winner: String,
    /// Final main-board grid (or whatever the legacy `finish_game`
    /// client sent); stored verbatim.
    pub board: serde_json::Value,
    pub moves: Vec<String>,
}
