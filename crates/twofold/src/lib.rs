//! # Twofold
//!
//! Authoritative server for Twofold Chess: a chess variant on two
//! coupled boards, played over a WebSocket event channel with rooms,
//! reconnects, reset voting, and a small HTTP surface.
//!
//! Rules live in `twofold-engine`; this crate wires the engine to the
//! network: per-connection handlers, per-room actors, sessions with a
//! reconnect grace window, and the history sink.
//!
//! ```rust,no_run
//! use twofold::{MemoryHistoryStore, TwofoldServerBuilder};
//!
//! # async fn run() -> Result<(), twofold::TwofoldError> {
//! let server = TwofoldServerBuilder::new()
//!     .ws_addr("0.0.0.0:8080")
//!     .http_addr("0.0.0.0:3000")
//!     .build(MemoryHistoryStore::new())
//!     .await?;
//! server.run().await
//! # }
//! ```

#![allow(async_fn_in_trait)]

mod error;
mod handler;
mod history;
mod http;
mod server;

pub use error::TwofoldError;
pub use history::{HistoryError, HistoryStore, MemoryHistoryStore};
pub use server::{ServerConfig, TwofoldServer, TwofoldServerBuilder};

/// Re-exports everything needed to embed or test the server.
pub mod prelude {
    pub use crate::{
        HistoryError, HistoryStore, MemoryHistoryStore, ServerConfig, TwofoldError,
        TwofoldServer, TwofoldServerBuilder,
    };

    pub use twofold_engine::{
        BoardName, BoardOutcome, Color, Game, GameSnapshot, MoveError, Scenario, Square, Winner,
    };
    pub use twofold_protocol::{
        ClientEvent, Codec, JsonCodec, LobbyEntry, MoveRequest, ProtocolError, PromotionChoice,
        ServerEvent,
    };
    pub use twofold_room::{GameRecord, RoomConfig, RoomError, RoomId};
    pub use twofold_session::{SessionConfig, SessionError, SessionId, SessionManager};
    pub use twofold_transport::{
        Connection, ConnectionId, Incoming, Transport, TransportError, WebSocketTransport,
    };
}
