//! Error types for the session layer.

use crate::SessionId;

/// Errors that can occur during session management.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session exists under this id.
    #[error("session {0} not found")]
    NotFound(SessionId),

    /// The username is already bound to a live connection. One socket
    /// per identity; a second browser must pick another name.
    #[error("username {0:?} already has an active session")]
    AlreadyConnected(String),
}
