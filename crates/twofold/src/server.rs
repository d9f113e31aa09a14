//! `TwofoldServer` builder and server loop.
//!
//! Ties the layers together: transport → protocol → session → room,
//! plus the axum HTTP surface, the history worker, and the periodic
//! sweeper that expires stale sessions and idle rooms.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::net::TcpListener;
use tokio::sync::{mpsc, Mutex};

use twofold_protocol::JsonCodec;
use twofold_room::{sweep_candidates, GameRecord, RoomConfig, RoomRegistry};
use twofold_session::{SessionConfig, SessionManager};
use twofold_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::history::{run_history_worker, HistoryStore};
use crate::http;
use crate::TwofoldError;

/// Server-wide configuration with the documented defaults.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// WebSocket bind address.
    pub ws_addr: String,
    /// HTTP surface bind address.
    pub http_addr: String,
    pub session: SessionConfig,
    pub room: RoomConfig,
    /// How often the server pings each socket.
    pub ping_interval: Duration,
    /// A socket silent (no data, no pong) past this window is evicted.
    pub socket_timeout: Duration,
    /// Cadence of the session/room sweeper.
    pub sweep_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ws_addr: "127.0.0.1:8080".to_string(),
            http_addr: "127.0.0.1:3000".to_string(),
            session: SessionConfig::default(),
            room: RoomConfig::default(),
            ping_interval: Duration::from_secs(20),
            socket_timeout: Duration::from_secs(60),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl ServerConfig {
    /// Defaults overridden from `TWOFOLD_WS_ADDR` / `TWOFOLD_HTTP_ADDR`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(addr) = std::env::var("TWOFOLD_WS_ADDR") {
            config.ws_addr = addr;
        }
        if let Ok(addr) = std::env::var("TWOFOLD_HTTP_ADDR") {
            config.http_addr = addr;
        }
        config
    }
}

/// Shared server state, one per process, cloned into every task as an
/// `Arc`. Cross-room state (sessions, the registry) sits behind async
/// mutexes held only for map operations — never across room I/O, so the
/// lobby path cannot block a room's move path.
pub(crate) struct ServerState<H: HistoryStore> {
    pub(crate) sessions: Mutex<SessionManager>,
    pub(crate) rooms: Mutex<RoomRegistry>,
    pub(crate) history: Arc<H>,
    pub(crate) codec: JsonCodec,
    pub(crate) config: ServerConfig,
    pub(crate) started_at: Instant,
}

/// Builder for configuring and starting a server.
///
/// ```rust,ignore
/// let server = TwofoldServer::builder()
///     .ws_addr("0.0.0.0:8080")
///     .http_addr("0.0.0.0:3000")
///     .build(MemoryHistoryStore::new())
///     .await?;
/// server.run().await
/// ```
pub struct TwofoldServerBuilder {
    config: ServerConfig,
}

impl TwofoldServerBuilder {
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn ws_addr(mut self, addr: &str) -> Self {
        self.config.ws_addr = addr.to_string();
        self
    }

    pub fn http_addr(mut self, addr: &str) -> Self {
        self.config.http_addr = addr.to_string();
        self
    }

    /// Binds both listeners and assembles the server around the given
    /// history store.
    pub async fn build<H: HistoryStore>(
        self,
        history: H,
    ) -> Result<TwofoldServer<H>, TwofoldError> {
        let transport = WebSocketTransport::bind(&self.config.ws_addr).await?;
        let http_listener = TcpListener::bind(&self.config.http_addr).await?;

        let (history_tx, history_rx) = mpsc::unbounded_channel::<GameRecord>();

        let state = Arc::new(ServerState {
            sessions: Mutex::new(SessionManager::new(self.config.session.clone())),
            rooms: Mutex::new(RoomRegistry::new(self.config.room.clone(), history_tx)),
            history: Arc::new(history),
            codec: JsonCodec,
            config: self.config,
            started_at: Instant::now(),
        });

        Ok(TwofoldServer {
            transport,
            http_listener,
            history_rx,
            state,
        })
    }
}

impl Default for TwofoldServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Twofold Chess server.
pub struct TwofoldServer<H: HistoryStore> {
    transport: WebSocketTransport,
    http_listener: TcpListener,
    history_rx: mpsc::UnboundedReceiver<GameRecord>,
    state: Arc<ServerState<H>>,
}

impl<H: HistoryStore> TwofoldServer<H> {
    pub fn builder() -> TwofoldServerBuilder {
        TwofoldServerBuilder::new()
    }

    /// The bound WebSocket address (useful with port 0 in tests).
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// The bound HTTP address.
    pub fn http_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.http_listener.local_addr()
    }

    /// Runs the server: HTTP surface, history worker, sweeper, and the
    /// WebSocket accept loop. Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), TwofoldError> {
        let router = http::router(Arc::clone(&self.state));
        let http_listener = self.http_listener;
        tokio::spawn(async move {
            if let Err(e) = axum::serve(http_listener, router).await {
                tracing::error!(error = %e, "http server stopped");
            }
        });

        tokio::spawn(run_history_worker(
            Arc::clone(&self.state.history),
            self.history_rx,
        ));

        tokio::spawn(run_sweeper(Arc::clone(&self.state)));

        tracing::info!("twofold server running");
        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

/// Periodically expires stale sessions and garbage-collects idle or
/// empty rooms. Room actors are queried outside the registry lock.
async fn run_sweeper<H: HistoryStore>(state: Arc<ServerState<H>>) {
    let mut interval = tokio::time::interval(state.config.sweep_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        interval.tick().await;

        {
            let mut sessions = state.sessions.lock().await;
            let expired = sessions.expire_stale();
            sessions.cleanup_expired();
            if !expired.is_empty() {
                tracing::info!(count = expired.len(), "expired stale sessions");
            }
        }

        let (handles, config) = {
            let rooms = state.rooms.lock().await;
            (rooms.handles(), rooms.config().clone())
        };
        let dead = sweep_candidates(handles, &config).await;
        if !dead.is_empty() {
            let mut rooms = state.rooms.lock().await;
            for id in dead {
                let _ = rooms.remove(&id, true).await;
            }
        }
    }
}
