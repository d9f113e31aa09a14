//! Room configuration and identifiers.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A room's identifier: the client-chosen string from the `join` /
/// `create_lobby` events.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Configuration applied to every room.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// How long a disconnected player's seat color is held for a rejoin
    /// under the same username.
    pub reconnect_grace: Duration,

    /// Rooms idle longer than this are garbage-collected.
    pub idle_timeout: Duration,

    /// Empty rooms linger this long before the sweeper removes them,
    /// so a freshly created lobby survives until its host connects.
    pub empty_room_linger: Duration,

    /// Chat messages longer than this are rejected.
    pub max_chat_len: usize,

    /// Command mailbox size per room actor.
    pub channel_size: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            reconnect_grace: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(30 * 60),
            empty_room_linger: Duration::from_secs(60),
            max_chat_len: 500,
            channel_size: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_config_defaults() {
        let config = RoomConfig::default();
        assert_eq!(config.reconnect_grace, Duration::from_secs(30));
        assert_eq!(config.idle_timeout, Duration::from_secs(1800));
        assert_eq!(config.max_chat_len, 500);
    }

    #[test]
    fn test_room_id_display_and_serde() {
        let id = RoomId::from("room-7");
        assert_eq!(id.to_string(), "room-7");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"room-7\"");
    }
}
