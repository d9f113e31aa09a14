//! Session layer for the Twofold Chess server.
//!
//! Tracks who is connected, keeps disconnected identities alive for a
//! grace window so a network blip doesn't cost a player their seat, and
//! rebinds rejoining usernames to their prior identity.

mod error;
mod manager;
mod session;

pub use error::SessionError;
pub use manager::{Registration, SessionManager};
pub use session::{Session, SessionConfig, SessionId, SessionState};
