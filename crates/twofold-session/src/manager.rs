//! The session manager: tracks every live and recently-dropped session.
//!
//! Responsibilities:
//! - register a session when a client first joins under a username
//! - keep disconnected sessions around for the reconnect grace window,
//!   so a network blip doesn't cost a player their seat
//! - rebind a rejoining username to its prior identity within the window
//! - expire and clean up sessions that never came back
//!
//! # Concurrency note
//!
//! `SessionManager` is not thread-safe by itself — it is owned by the
//! server state behind a single async mutex. Keeping it a plain
//! `HashMap` here avoids hidden locking.

use std::collections::HashMap;

use crate::{Session, SessionConfig, SessionError, SessionId, SessionState};

/// How a `register` call resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// A brand-new identity.
    Fresh,
    /// The username was disconnected within the grace window and has
    /// been rebound to this new session id.
    Rebound,
}

/// Registry of all sessions, indexed by id and by username.
pub struct SessionManager {
    sessions: HashMap<SessionId, Session>,
    /// Username → current session id. Kept in sync with `sessions`;
    /// this is what makes reconnect rebinding O(1).
    by_username: HashMap<String, SessionId>,
    config: SessionConfig,
}

impl SessionManager {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: HashMap::new(),
            by_username: HashMap::new(),
            config,
        }
    }

    /// Registers `id` under `username`.
    ///
    /// A username whose previous session dropped within the grace window
    /// is rebound (returns [`Registration::Rebound`]); an expired or
    /// absent one gets a fresh identity.
    ///
    /// # Errors
    /// [`SessionError::AlreadyConnected`] when the username is bound to
    /// a session that is still connected.
    pub fn register(
        &mut self,
        id: SessionId,
        username: &str,
    ) -> Result<Registration, SessionError> {
        let mut registration = Registration::Fresh;

        if let Some(&old_id) = self.by_username.get(username) {
            // Same socket re-joining (e.g. switching rooms) is a no-op.
            if old_id == id {
                return Ok(Registration::Fresh);
            }
            let old = self
                .sessions
                .get(&old_id)
                .expect("username index points at a live entry");
            match &old.state {
                SessionState::Connected => {
                    return Err(SessionError::AlreadyConnected(username.to_string()));
                }
                SessionState::Disconnected { since }
                    if since.elapsed() <= self.config.reconnect_grace =>
                {
                    registration = Registration::Rebound;
                }
                _ => {}
            }
            self.sessions.remove(&old_id);
        }

        self.sessions.insert(
            id,
            Session {
                id,
                username: username.to_string(),
                state: SessionState::Connected,
            },
        );
        self.by_username.insert(username.to_string(), id);

        match registration {
            Registration::Fresh => tracing::info!(%id, username, "session registered"),
            Registration::Rebound => {
                tracing::info!(%id, username, "session rebound after reconnect")
            }
        }
        Ok(registration)
    }

    /// Marks a session disconnected, starting its grace window.
    ///
    /// Unknown ids are fine — a socket may drop before ever joining.
    pub fn disconnect(&mut self, id: SessionId) {
        if let Some(session) = self.sessions.get_mut(&id) {
            session.state = SessionState::Disconnected {
                since: std::time::Instant::now(),
            };
            tracing::info!(%id, username = %session.username, "session disconnected, grace window started");
        }
    }

    /// Removes a session outright (explicit leave, no grace).
    pub fn remove(&mut self, id: SessionId) -> Result<(), SessionError> {
        let session = self
            .sessions
            .remove(&id)
            .ok_or(SessionError::NotFound(id))?;
        self.by_username.remove(&session.username);
        Ok(())
    }

    /// Expires disconnected sessions past the grace window, returning
    /// the usernames whose identities are now gone for good. Call
    /// periodically; follow with [`Self::cleanup_expired`].
    pub fn expire_stale(&mut self) -> Vec<String> {
        let grace = self.config.reconnect_grace;
        let mut expired = Vec::new();
        for session in self.sessions.values_mut() {
            if let SessionState::Disconnected { since } = &session.state {
                if since.elapsed() > grace {
                    session.state = SessionState::Expired;
                    expired.push(session.username.clone());
                    tracing::info!(
                        id = %session.id,
                        username = %session.username,
                        "session expired"
                    );
                }
            }
        }
        expired
    }

    /// Drops all expired sessions and their username bindings.
    pub fn cleanup_expired(&mut self) {
        self.sessions.retain(|_, session| {
            if matches!(session.state, SessionState::Expired) {
                self.by_username.remove(&session.username);
                false
            } else {
                true
            }
        });
    }

    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    pub fn find_by_username(&self, username: &str) -> Option<&Session> {
        self.by_username
            .get(username)
            .and_then(|id| self.sessions.get(id))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    //! Lifecycle tests. Time-dependent behavior is driven by config, not
    //! sleeps: a zero grace window expires immediately, an hour-long one
    //! never expires within a test.

    use std::time::Duration;

    use super::*;

    fn manager_with_instant_expiry() -> SessionManager {
        SessionManager::new(SessionConfig {
            reconnect_grace: Duration::ZERO,
        })
    }

    fn manager_with_long_grace() -> SessionManager {
        SessionManager::new(SessionConfig {
            reconnect_grace: Duration::from_secs(3600),
        })
    }

    fn sid(id: u64) -> SessionId {
        SessionId(id)
    }

    #[test]
    fn test_register_new_username_is_fresh() {
        let mut mgr = manager_with_long_grace();
        let reg = mgr.register(sid(1), "ada").unwrap();
        assert_eq!(reg, Registration::Fresh);

        let session = mgr.get(sid(1)).unwrap();
        assert!(matches!(session.state, SessionState::Connected));
        assert_eq!(session.username, "ada");
    }

    #[test]
    fn test_register_same_id_twice_is_noop() {
        let mut mgr = manager_with_long_grace();
        mgr.register(sid(1), "ada").unwrap();
        let reg = mgr.register(sid(1), "ada").unwrap();
        assert_eq!(reg, Registration::Fresh);
        assert_eq!(mgr.len(), 1);
    }

    #[test]
    fn test_register_connected_username_is_rejected() {
        let mut mgr = manager_with_long_grace();
        mgr.register(sid(1), "ada").unwrap();
        let err = mgr.register(sid(2), "ada").unwrap_err();
        assert!(matches!(err, SessionError::AlreadyConnected(u) if u == "ada"));
    }

    #[test]
    fn test_rejoin_within_grace_rebinds() {
        let mut mgr = manager_with_long_grace();
        mgr.register(sid(1), "ada").unwrap();
        mgr.disconnect(sid(1));

        let reg = mgr.register(sid(2), "ada").unwrap();
        assert_eq!(reg, Registration::Rebound);

        // The old id is gone; the username points at the new one.
        assert!(mgr.get(sid(1)).is_none());
        assert_eq!(mgr.find_by_username("ada").unwrap().id, sid(2));
        assert_eq!(mgr.len(), 1);
    }

    #[test]
    fn test_rejoin_after_grace_is_fresh() {
        let mut mgr = manager_with_instant_expiry();
        mgr.register(sid(1), "ada").unwrap();
        mgr.disconnect(sid(1));
        // Grace is zero, so the identity is already stale.

        let reg = mgr.register(sid(2), "ada").unwrap();
        assert_eq!(reg, Registration::Fresh);
    }

    #[test]
    fn test_disconnect_unknown_id_is_silent() {
        let mut mgr = manager_with_long_grace();
        mgr.disconnect(sid(99));
        assert!(mgr.is_empty());
    }

    #[test]
    fn test_remove_drops_username_binding() {
        let mut mgr = manager_with_long_grace();
        mgr.register(sid(1), "ada").unwrap();
        mgr.remove(sid(1)).unwrap();

        assert!(mgr.is_empty());
        assert!(mgr.find_by_username("ada").is_none());
        assert!(matches!(
            mgr.remove(sid(1)),
            Err(SessionError::NotFound(_))
        ));
    }

    #[test]
    fn test_expire_stale_reports_usernames() {
        let mut mgr = manager_with_instant_expiry();
        mgr.register(sid(1), "ada").unwrap();
        mgr.register(sid(2), "bob").unwrap();
        mgr.disconnect(sid(1));

        let expired = mgr.expire_stale();
        assert_eq!(expired, vec!["ada".to_string()]);

        // Bob is untouched.
        assert!(matches!(
            mgr.get(sid(2)).unwrap().state,
            SessionState::Connected
        ));
    }

    #[test]
    fn test_expire_stale_respects_grace() {
        let mut mgr = manager_with_long_grace();
        mgr.register(sid(1), "ada").unwrap();
        mgr.disconnect(sid(1));
        assert!(mgr.expire_stale().is_empty());
    }

    #[test]
    fn test_cleanup_removes_expired_and_keeps_live() {
        let mut mgr = manager_with_instant_expiry();
        mgr.register(sid(1), "ada").unwrap();
        mgr.register(sid(2), "bob").unwrap();
        mgr.disconnect(sid(1));
        mgr.expire_stale();

        assert_eq!(mgr.len(), 2);
        mgr.cleanup_expired();
        assert_eq!(mgr.len(), 1);
        assert!(mgr.get(sid(1)).is_none());
        assert!(mgr.find_by_username("ada").is_none());
        assert!(mgr.get(sid(2)).is_some());
    }

    #[test]
    fn test_full_lifecycle_disconnect_then_rebind() {
        // The reconnect scenario the grace window exists for: wifi blip,
        // fresh socket, same username, seat preserved upstream.
        let mut mgr = manager_with_long_grace();
        mgr.register(sid(1), "ada").unwrap();
        mgr.disconnect(sid(1));
        assert!(matches!(
            mgr.get(sid(1)).unwrap().state,
            SessionState::Disconnected { .. }
        ));

        let reg = mgr.register(sid(7), "ada").unwrap();
        assert_eq!(reg, Registration::Rebound);
        assert!(matches!(
            mgr.get(sid(7)).unwrap().state,
            SessionState::Connected
        ));
    }
}
