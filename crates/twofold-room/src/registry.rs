//! Room registry: the process-wide map of rooms and their lobby
//! metadata.
//!
//! Writes (create/remove) take the registry's lock briefly; the lobby
//! listing works on cloned handles so room actors are queried without
//! holding it. Room mutation itself never goes through here — handles
//! talk straight to the actors.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::mpsc;

use twofold_protocol::LobbyEntry;

use crate::room::spawn_room;
use crate::{GameRecord, RoomConfig, RoomError, RoomHandle, RoomId};

/// Lobby metadata kept alongside each room handle.
#[derive(Debug, Clone)]
struct LobbyMeta {
    host: String,
    is_private: bool,
    created_at_ms: u64,
}

struct RoomEntry {
    handle: RoomHandle,
    meta: LobbyMeta,
}

/// Creates, tracks, and expires rooms.
pub struct RoomRegistry {
    rooms: HashMap<RoomId, RoomEntry>,
    config: RoomConfig,
    history: mpsc::UnboundedSender<GameRecord>,
}

impl RoomRegistry {
    pub fn new(config: RoomConfig, history: mpsc::UnboundedSender<GameRecord>) -> Self {
        Self {
            rooms: HashMap::new(),
            config,
            history,
        }
    }

    /// Creates a room explicitly (the `create_lobby` event).
    pub fn create(
        &mut self,
        id: RoomId,
        host: &str,
        is_private: bool,
    ) -> Result<RoomHandle, RoomError> {
        if self.rooms.contains_key(&id) {
            return Err(RoomError::AlreadyExists(id));
        }
        Ok(self.insert(id, host, is_private))
    }

    /// Returns the room, creating a public one on first reference —
    /// `join` and `get_game_state` both create rooms lazily.
    pub fn get_or_create(&mut self, id: &RoomId, host: &str) -> RoomHandle {
        if let Some(entry) = self.rooms.get(id) {
            return entry.handle.clone();
        }
        self.insert(id.clone(), host, false)
    }

    pub fn get(&self, id: &RoomId) -> Option<RoomHandle> {
        self.rooms.get(id).map(|entry| entry.handle.clone())
    }

    /// Removes a room and shuts its actor down.
    pub async fn remove(&mut self, id: &RoomId, notify: bool) -> Result<(), RoomError> {
        let entry = self
            .rooms
            .remove(id)
            .ok_or_else(|| RoomError::NotFound(id.clone()))?;
        let _ = entry.handle.shutdown(notify).await;
        tracing::info!(room_id = %id, "room removed");
        Ok(())
    }

    /// Handles (with privacy flags) for the lobby listing; the caller
    /// queries the actors without holding the registry lock.
    pub fn lobby_candidates(&self) -> Vec<(RoomHandle, bool, String, u64)> {
        self.rooms
            .values()
            .map(|entry| {
                (
                    entry.handle.clone(),
                    entry.meta.is_private,
                    entry.meta.host.clone(),
                    entry.meta.created_at_ms,
                )
            })
            .collect()
    }

    /// All handles, for the sweeper.
    pub fn handles(&self) -> Vec<RoomHandle> {
        self.rooms.values().map(|e| e.handle.clone()).collect()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    fn insert(&mut self, id: RoomId, host: &str, is_private: bool) -> RoomHandle {
        let handle = spawn_room(id.clone(), self.config.clone(), self.history.clone());
        self.rooms.insert(
            id.clone(),
            RoomEntry {
                handle: handle.clone(),
                meta: LobbyMeta {
                    host: host.to_string(),
                    is_private,
                    created_at_ms: now_ms(),
                },
            },
        );
        tracing::info!(room_id = %id, host, is_private, "room created");
        handle
    }
}

/// Builds the `lobby_list` payload: public rooms with a free seat.
/// Rooms that fail to respond (shutting down) are skipped.
pub async fn list_lobbies(candidates: Vec<(RoomHandle, bool, String, u64)>) -> Vec<LobbyEntry> {
    let mut entries = Vec::new();
    for (handle, is_private, host, created_at_ms) in candidates {
        if is_private {
            continue;
        }
        if let Ok(status) = handle.status().await {
            if status.member_count < 2 {
                entries.push(LobbyEntry {
                    room: handle.room_id().0.clone(),
                    host,
                    is_private,
                    created_at: created_at_ms,
                });
            }
        }
    }
    entries
}

/// Which rooms the sweeper should drop: empty past the linger window,
/// or idle past the timeout.
pub async fn sweep_candidates(handles: Vec<RoomHandle>, config: &RoomConfig) -> Vec<RoomId> {
    let mut expired = Vec::new();
    for handle in handles {
        if let Ok(status) = handle.status().await {
            let empty_too_long =
                status.member_count == 0 && status.idle_for > config.empty_room_linger;
            let idle_too_long = status.idle_for > config.idle_timeout;
            if empty_too_long || idle_too_long {
                expired.push(status.room_id);
            }
        }
    }
    expired
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
