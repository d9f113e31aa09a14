//! Error types for the transport layer.

/// Errors that can occur accepting, reading, or writing connections.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("accept failed: {0}")]
    AcceptFailed(std::io::Error),

    #[error("send failed: {0}")]
    SendFailed(std::io::Error),

    #[error("receive failed: {0}")]
    ReceiveFailed(std::io::Error),

    #[error("connection closed: {0}")]
    ConnectionClosed(String),
}
