//! Wire protocol for the Twofold Chess server.
//!
//! This crate defines the language clients and the server speak:
//!
//! - **Events** ([`ClientEvent`], [`ServerEvent`]) — every message that
//!   travels over the WebSocket channel, tagged by its `event` field.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those events are
//!   converted to and from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong doing so.
//!
//! The protocol layer sits between transport (raw frames) and the room
//! layer (game semantics): it knows shapes, not rules.

mod codec;
mod error;
mod events;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use events::{ClientEvent, LobbyEntry, MoveRequest, PromotionChoice, ServerEvent};
