//! Per-connection handler: event decode, session binding, room routing.
//!
//! Each accepted socket gets its own task running [`handle_connection`],
//! plus a dedicated writer task. All outbound traffic for the socket —
//! room broadcasts and direct replies alike — funnels through one
//! unbounded channel into the writer, so per-socket send order is the
//! enqueue order and every event is sent at most once.
//!
//! Liveness: the server pings on an interval; any inbound frame
//! (data or pong) refreshes the window, and a socket silent past
//! `socket_timeout` is evicted.

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Instant;

use tokio::sync::mpsc;

use twofold_protocol::{ClientEvent, Codec, ServerEvent};
use twofold_room::{list_lobbies, RoomId};
use twofold_session::SessionId;
use twofold_transport::{Connection, Incoming, WebSocketConnection};

use crate::history::HistoryStore;
use crate::server::ServerState;
use crate::TwofoldError;

/// Drop guard ensuring disconnect cleanup runs even if the handler
/// panics. `Drop` is synchronous, so the async work is spawned.
struct SessionGuard<H: HistoryStore> {
    session_id: SessionId,
    state: Arc<ServerState<H>>,
    current_room: Arc<StdMutex<Option<RoomId>>>,
}

impl<H: HistoryStore> Drop for SessionGuard<H> {
    fn drop(&mut self) {
        let session_id = self.session_id;
        let state = Arc::clone(&self.state);
        let room = self.current_room.lock().expect("room slot poisoned").clone();
        tokio::spawn(async move {
            if let Some(room_id) = room {
                if let Some(handle) = state.rooms.lock().await.get(&room_id) {
                    let _ = handle.disconnected(session_id).await;
                }
            }
            state.sessions.lock().await.disconnect(session_id);
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<H: HistoryStore>(
    conn: WebSocketConnection,
    state: Arc<ServerState<H>>,
) -> Result<(), TwofoldError> {
    let conn = Arc::new(conn);
    let session_id = SessionId(conn.id().into_inner());
    tracing::debug!(conn_id = %conn.id(), %session_id, "handling new connection");

    // Writer task: the only place this socket is written to.
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<ServerEvent>();
    let writer = {
        let conn = Arc::clone(&conn);
        let codec = state.codec;
        tokio::spawn(async move {
            while let Some(event) = out_rx.recv().await {
                let bytes = match codec.encode(&event) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::error!(error = %e, "failed to encode outbound event");
                        continue;
                    }
                };
                if conn.send(&bytes).await.is_err() {
                    break;
                }
            }
        })
    };

    let current_room = Arc::new(StdMutex::new(None::<RoomId>));
    let _guard = SessionGuard {
        session_id,
        state: Arc::clone(&state),
        current_room: Arc::clone(&current_room),
    };

    let mut ping = tokio::time::interval(state.config.ping_interval);
    ping.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut last_seen = Instant::now();

    loop {
        tokio::select! {
            _ = ping.tick() => {
                if last_seen.elapsed() > state.config.socket_timeout {
                    tracing::info!(%session_id, "socket silent past timeout, evicting");
                    break;
                }
                if conn.ping().await.is_err() {
                    break;
                }
            }
            incoming = conn.recv() => match incoming {
                Ok(Some(Incoming::Pong)) => {
                    last_seen = Instant::now();
                }
                Ok(Some(Incoming::Data(data))) => {
                    last_seen = Instant::now();
                    match state.codec.decode::<ClientEvent>(&data) {
                        Ok(event) => {
                            handle_event(&state, session_id, &out_tx, &current_room, event)
                                .await;
                        }
                        Err(e) => {
                            tracing::debug!(%session_id, error = %e, "undecodable event");
                            let _ = out_tx.send(ServerEvent::Error {
                                message: format!("invalid event: {e}"),
                            });
                        }
                    }
                }
                Ok(None) => {
                    tracing::info!(%session_id, "connection closed cleanly");
                    break;
                }
                Err(e) => {
                    tracing::debug!(%session_id, error = %e, "recv error");
                    break;
                }
            }
        }
    }

    writer.abort();
    // _guard drops here → room notified, session enters its grace window.
    Ok(())
}

/// Routes one decoded client event.
async fn handle_event<H: HistoryStore>(
    state: &Arc<ServerState<H>>,
    session_id: SessionId,
    out: &mpsc::UnboundedSender<ServerEvent>,
    current_room: &Arc<StdMutex<Option<RoomId>>>,
    event: ClientEvent,
) {
    match event {
        ClientEvent::Join { username, room } => {
            let registration = state
                .sessions
                .lock()
                .await
                .register(session_id, &username);
            if let Err(e) = registration {
                let _ = out.send(ServerEvent::Error {
                    message: e.to_string(),
                });
                return;
            }

            let room_id = RoomId(room);

            // One room at a time: switching rooms leaves the old one.
            let previous = current_room.lock().expect("room slot poisoned").clone();
            if let Some(prev) = previous.filter(|prev| *prev != room_id) {
                if let Some(handle) = state.rooms.lock().await.get(&prev) {
                    let _ = handle.leave(session_id).await;
                }
            }

            let handle = state
                .rooms
                .lock()
                .await
                .get_or_create(&room_id, &username);
            match handle.join(session_id, username.clone(), out.clone()).await {
                Ok(color) => {
                    *current_room.lock().expect("room slot poisoned") = Some(room_id.clone());
                    tracing::info!(%session_id, %username, room = %room_id, %color, "joined room");
                }
                Err(e) => {
                    let _ = out.send(ServerEvent::Error {
                        message: e.to_string(),
                    });
                }
            }
        }

        ClientEvent::CreateLobby {
            room_id,
            host,
            is_private,
        } => {
            let result =
                state
                    .rooms
                    .lock()
                    .await
                    .create(RoomId(room_id), &host, is_private);
            if let Err(e) = result {
                let _ = out.send(ServerEvent::Error {
                    message: e.to_string(),
                });
            }
        }

        ClientEvent::GetLobbies => {
            // Snapshot the candidates under the lock, query the room
            // actors without it.
            let candidates = state.rooms.lock().await.lobby_candidates();
            let lobbies = list_lobbies(candidates).await;
            let _ = out.send(ServerEvent::LobbyList { lobbies });
        }

        ClientEvent::LeaveLobby { room_id, .. } => {
            let room_id = RoomId(room_id);
            let handle = state.rooms.lock().await.get(&room_id);
            if let Some(handle) = handle {
                let _ = handle.leave(session_id).await;
                // Close the room once the last member is gone.
                if let Ok(status) = handle.status().await {
                    if status.member_count == 0 {
                        let _ = state.rooms.lock().await.remove(&room_id, false).await;
                    }
                }
            }
            let mut slot = current_room.lock().expect("room slot poisoned");
            if slot.as_ref() == Some(&room_id) {
                *slot = None;
            }
        }

        ClientEvent::Move {
            room,
            board_type,
            mv,
        } => {
            let handle = state.rooms.lock().await.get(&RoomId(room));
            match handle {
                Some(handle) => {
                    if handle.submit_move(session_id, board_type, mv).await.is_err() {
                        let _ = out.send(ServerEvent::Error {
                            message: "room is unavailable".into(),
                        });
                    }
                }
                None => {
                    let _ = out.send(ServerEvent::MoveError {
                        message: "room not found".into(),
                        expected_board: None,
                        actual_board: None,
                    });
                }
            }
        }

        ClientEvent::Reset { room } => {
            route(state, out, &room, |handle| async move {
                handle.reset(Some(session_id)).await
            })
            .await;
        }

        ClientEvent::VoteReset { room, color } => {
            route(state, out, &room, |handle| async move {
                handle.vote_reset(session_id, color).await
            })
            .await;
        }

        // The sender name is taken from room membership, not the
        // payload — clients don't get to speak as someone else.
        ClientEvent::ChatMessage { room, message, .. } => {
            route(state, out, &room, |handle| async move {
                handle.chat(session_id, message).await
            })
            .await;
        }

        ClientEvent::FinishGame {
            room,
            winner,
            board,
            moves,
        } => {
            route(state, out, &room, |handle| async move {
                handle.finish_game(winner, board, moves).await
            })
            .await;
        }

        ClientEvent::GetGameState { room } => {
            // Like the original's state endpoint, this lazily creates
            // the room so a fresh client always gets a playable game.
            let handle = state.rooms.lock().await.get_or_create(&RoomId(room), "");
            match handle.snapshot().await {
                Ok(snapshot) => {
                    let _ = out.send(ServerEvent::GameState {
                        snapshot: Box::new(snapshot),
                    });
                }
                Err(e) => {
                    let _ = out.send(ServerEvent::Error {
                        message: e.to_string(),
                    });
                }
            }
        }
    }
}

/// Looks up a room and runs `op` against it, reporting lookup and
/// delivery failures back on the caller's socket.
async fn route<H, F, Fut>(
    state: &Arc<ServerState<H>>,
    out: &mpsc::UnboundedSender<ServerEvent>,
    room: &str,
    op: F,
) where
    H: HistoryStore,
    F: FnOnce(twofold_room::RoomHandle) -> Fut,
    Fut: std::future::Future<Output = Result<(), twofold_room::RoomError>>,
{
    let handle = state.rooms.lock().await.get(&RoomId::from(room));
    match handle {
        Some(handle) => {
            if let Err(e) = op(handle).await {
                let _ = out.send(ServerEvent::Error {
                    message: e.to_string(),
                });
            }
        }
        None => {
            let _ = out.send(ServerEvent::Error {
                message: format!("room {room:?} not found"),
            });
        }
    }
}
