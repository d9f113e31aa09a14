//! Session types: the server's record of one connected client.

use std::fmt;
use std::time::{Duration, Instant};

/// Server-assigned identifier for one socket connection's session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0)
    }
}

/// Configuration for session behavior.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long a disconnected player keeps their identity (and with it
    /// their seat color in any room) before the session expires.
    pub reconnect_grace: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reconnect_grace: Duration::from_secs(30),
        }
    }
}

/// The lifecycle state of a session.
///
/// ```text
///   Connected ──(disconnect)──► Disconnected ──(grace elapsed)──► Expired
///       ▲                            │
///       └───────(rejoin by username)─┘
/// ```
#[derive(Debug, Clone)]
pub enum SessionState {
    Connected,
    /// The socket dropped at `since`; a rejoin under the same username
    /// within the grace window rebinds to this identity.
    Disconnected { since: Instant },
    /// Grace elapsed; awaiting cleanup.
    Expired,
}

/// One client's session.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    /// The self-reported identity used for reconnect rebinding and room
    /// seat restoration. There is no authentication layer — the history
    /// viewer's OAuth is outside this server.
    pub username: String,
    pub state: SessionState,
}
