//! Room actor: an isolated Tokio task owning one game and its members.
//!
//! All mutation of a room's [`Game`] and member table happens inside one
//! task, fed by an mpsc mailbox — per-room serialization without shared
//! locks. Chat rides the same mailbox, so chat and moves observe a
//! single total order per room. Broadcast fan-out happens after the
//! state change, so every member sees the same post-commit snapshot
//! sequence.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, oneshot};

use twofold_engine::{BoardName, Color, Game, GameSnapshot, Scenario};
use twofold_protocol::{MoveRequest, ServerEvent};
use twofold_session::SessionId;

use crate::{GameRecord, RoomConfig, RoomError, RoomId};

/// Channel sender delivering outbound events to one member's socket.
pub type PlayerSender = mpsc::UnboundedSender<ServerEvent>;

/// A seated member.
#[derive(Debug, Clone)]
struct Member {
    username: String,
    color: Color,
}

/// Snapshot of room metadata for the lobby list and the sweeper.
#[derive(Debug, Clone)]
pub struct RoomStatus {
    pub room_id: RoomId,
    pub member_count: usize,
    pub game_over: bool,
    pub idle_for: Duration,
}

/// Commands sent to a room actor through its mailbox.
pub(crate) enum RoomCommand {
    Join {
        session: SessionId,
        username: String,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<Color, RoomError>>,
    },
    Leave {
        session: SessionId,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    /// The socket dropped; hold the seat color for the grace window.
    Disconnected {
        session: SessionId,
    },
    Move {
        session: SessionId,
        board: BoardName,
        request: MoveRequest,
    },
    /// `by: None` is the administrative HTTP reset — unconditional.
    Reset {
        by: Option<SessionId>,
    },
    VoteReset {
        session: SessionId,
        color: Color,
    },
    Chat {
        session: SessionId,
        message: String,
    },
    /// Push the current snapshot to one member.
    SendState {
        session: SessionId,
    },
    GetSnapshot {
        reply: oneshot::Sender<GameSnapshot>,
    },
    InstallScenario {
        scenario: Scenario,
        reply: oneshot::Sender<()>,
    },
    FinishGame {
        winner: String,
        board: serde_json::Value,
        moves: Vec<String>,
    },
    Status {
        reply: oneshot::Sender<RoomStatus>,
    },
    Shutdown {
        notify: bool,
    },
}

/// Handle to a running room actor. Cheap to clone.
#[derive(Clone, Debug)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub async fn join(
        &self,
        session: SessionId,
        username: String,
        sender: PlayerSender,
    ) -> Result<Color, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Join {
            session,
            username,
            sender,
            reply: reply_tx,
        })
        .await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?
    }

    pub async fn leave(&self, session: SessionId) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Leave {
            session,
            reply: reply_tx,
        })
        .await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?
    }

    pub async fn disconnected(&self, session: SessionId) -> Result<(), RoomError> {
        self.send(RoomCommand::Disconnected { session }).await
    }

    pub async fn submit_move(
        &self,
        session: SessionId,
        board: BoardName,
        request: MoveRequest,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::Move {
            session,
            board,
            request,
        })
        .await
    }

    pub async fn reset(&self, by: Option<SessionId>) -> Result<(), RoomError> {
        self.send(RoomCommand::Reset { by }).await
    }

    pub async fn vote_reset(&self, session: SessionId, color: Color) -> Result<(), RoomError> {
        self.send(RoomCommand::VoteReset { session, color }).await
    }

    pub async fn chat(&self, session: SessionId, message: String) -> Result<(), RoomError> {
        self.send(RoomCommand::Chat { session, message }).await
    }

    pub async fn send_state(&self, session: SessionId) -> Result<(), RoomError> {
        self.send(RoomCommand::SendState { session }).await
    }

    pub async fn snapshot(&self) -> Result<GameSnapshot, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::GetSnapshot { reply: reply_tx }).await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }

    pub async fn install_scenario(&self, scenario: Scenario) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::InstallScenario {
            scenario,
            reply: reply_tx,
        })
        .await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }

    pub async fn finish_game(
        &self,
        winner: String,
        board: serde_json::Value,
        moves: Vec<String>,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::FinishGame {
            winner,
            board,
            moves,
        })
        .await
    }

    pub async fn status(&self) -> Result<RoomStatus, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Status { reply: reply_tx }).await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }

    pub async fn shutdown(&self, notify: bool) -> Result<(), RoomError> {
        self.send(RoomCommand::Shutdown { notify }).await
    }

    async fn send(&self, cmd: RoomCommand) -> Result<(), RoomError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }
}

/// The room actor state. Lives inside its own Tokio task.
struct RoomActor {
    room_id: RoomId,
    config: RoomConfig,
    game: Game,
    members: HashMap<SessionId, Member>,
    senders: HashMap<SessionId, PlayerSender>,
    /// Seat colors of recently disconnected usernames, held for the
    /// grace window so a rejoin gets the same color back.
    recent_colors: HashMap<String, (Color, Instant)>,
    history: mpsc::UnboundedSender<GameRecord>,
    receiver: mpsc::Receiver<RoomCommand>,
    last_activity: Instant,
    /// Set after an internal invariant violation; the room then refuses
    /// all further moves instead of crashing the process.
    poisoned: bool,
}

impl RoomActor {
    async fn run(mut self) {
        tracing::info!(room_id = %self.room_id, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    session,
                    username,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(session, username, sender);
                    let _ = reply.send(result);
                }
                RoomCommand::Leave { session, reply } => {
                    let _ = reply.send(self.handle_leave(session));
                }
                RoomCommand::Disconnected { session } => {
                    self.handle_disconnected(session);
                }
                RoomCommand::Move {
                    session,
                    board,
                    request,
                } => {
                    self.handle_move(session, board, &request);
                }
                RoomCommand::Reset { by } => {
                    self.handle_reset(by);
                }
                RoomCommand::VoteReset { session, color } => {
                    self.handle_vote_reset(session, color);
                }
                RoomCommand::Chat { session, message } => {
                    self.handle_chat(session, message);
                }
                RoomCommand::SendState { session } => {
                    self.send_to(session, self.state_event());
                }
                RoomCommand::GetSnapshot { reply } => {
                    let _ = reply.send(GameSnapshot::from(&self.game));
                }
                RoomCommand::InstallScenario { scenario, reply } => {
                    self.handle_install_scenario(scenario);
                    let _ = reply.send(());
                }
                RoomCommand::FinishGame {
                    winner,
                    board,
                    moves,
                } => {
                    self.handle_finish_game(winner, board, moves);
                }
                RoomCommand::Status { reply } => {
                    let _ = reply.send(RoomStatus {
                        room_id: self.room_id.clone(),
                        member_count: self.members.len(),
                        game_over: self.game.game_over,
                        idle_for: self.last_activity.elapsed(),
                    });
                }
                RoomCommand::Shutdown { notify } => {
                    if notify {
                        self.broadcast(ServerEvent::RoomDeleted {
                            room: self.room_id.0.clone(),
                        });
                    }
                    break;
                }
            }
        }

        tracing::info!(room_id = %self.room_id, "room actor stopped");
    }

    fn handle_join(
        &mut self,
        session: SessionId,
        username: String,
        sender: PlayerSender,
    ) -> Result<Color, RoomError> {
        self.touch();
        if self.members.contains_key(&session) {
            return Err(RoomError::AlreadyInRoom(self.room_id.clone()));
        }

        // A rejoin within the grace window gets its old seat back, as
        // long as nobody claimed it meanwhile.
        let restored = self
            .recent_colors
            .get(&username)
            .filter(|(_, at)| at.elapsed() <= self.config.reconnect_grace)
            .map(|(color, _)| *color)
            .filter(|color| !self.color_taken(*color));

        let color = match restored {
            Some(color) => color,
            None => {
                if !self.color_taken(Color::White) {
                    Color::White
                } else if !self.color_taken(Color::Black) {
                    Color::Black
                } else {
                    return Err(RoomError::Full(self.room_id.clone()));
                }
            }
        };
        self.recent_colors.remove(&username);

        self.members.insert(
            session,
            Member {
                username: username.clone(),
                color,
            },
        );
        self.senders.insert(session, sender);

        tracing::info!(
            room_id = %self.room_id,
            %session,
            %username,
            color = %color,
            members = self.members.len(),
            "player joined"
        );

        self.broadcast_except(
            session,
            ServerEvent::PlayerJoined {
                color: Some(color),
                username: username.clone(),
            },
        );
        // The joiner always gets the authoritative snapshot.
        self.send_to(session, self.state_event());

        // Second seat filled: announce game start, each member with
        // their own color.
        if self.members.len() == 2 {
            let starts: Vec<(SessionId, ServerEvent)> = self
                .members
                .iter()
                .map(|(sid, member)| {
                    (
                        *sid,
                        ServerEvent::GameStart {
                            color: member.color,
                            username: member.username.clone(),
                        },
                    )
                })
                .collect();
            for (sid, event) in starts {
                self.send_to(sid, event);
            }
        }

        Ok(color)
    }

    fn handle_leave(&mut self, session: SessionId) -> Result<(), RoomError> {
        self.touch();
        let member = self
            .members
            .remove(&session)
            .ok_or(RoomError::NotInRoom(self.room_id.clone()))?;
        self.senders.remove(&session);
        // An explicit leave frees the seat for good.
        self.recent_colors.remove(&member.username);

        tracing::info!(
            room_id = %self.room_id,
            %session,
            username = %member.username,
            "player left"
        );
        self.broadcast(ServerEvent::PlayerLeft {
            username: member.username,
        });
        Ok(())
    }

    fn handle_disconnected(&mut self, session: SessionId) {
        let Some(member) = self.members.remove(&session) else {
            return;
        };
        self.senders.remove(&session);
        self.recent_colors
            .insert(member.username.clone(), (member.color, Instant::now()));

        tracing::info!(
            room_id = %self.room_id,
            %session,
            username = %member.username,
            color = %member.color,
            "player disconnected, seat held for grace window"
        );
        self.broadcast(ServerEvent::PlayerDisconnected {
            username: member.username,
        });
    }

    fn handle_move(&mut self, session: SessionId, board: BoardName, request: &MoveRequest) {
        self.touch();
        let Some(member) = self.members.get(&session) else {
            tracing::warn!(room_id = %self.room_id, %session, "move from non-member, ignoring");
            return;
        };

        if self.poisoned {
            self.send_to(
                session,
                ServerEvent::Error {
                    message: "room is unavailable after an internal error".into(),
                },
            );
            return;
        }
        if let Err(violation) = self.game.integrity() {
            tracing::error!(
                room_id = %self.room_id,
                %violation,
                state = ?GameSnapshot::from(&self.game),
                "game invariant violated, poisoning room"
            );
            self.poisoned = true;
            self.broadcast(ServerEvent::Error {
                message: "internal error: game state is corrupt, room is frozen".into(),
            });
            return;
        }

        // With a single member the local player drives both sides;
        // otherwise the seat color is authoritative.
        let color = if self.members.len() >= 2 {
            member.color
        } else {
            self.game.turn
        };

        if !self
            .game
            .piece_label_matches(board, request.from, &request.piece)
        {
            self.send_to(
                session,
                ServerEvent::MoveError {
                    message: twofold_engine::MoveError::NoSuchPiece.to_string(),
                    expected_board: None,
                    actual_board: None,
                },
            );
            return;
        }

        match self.game.submit(color, board, &request.to_move()) {
            Ok(outcome) => {
                tracing::info!(
                    room_id = %self.room_id,
                    %session,
                    board = %board,
                    notation = %outcome.notation,
                    finished = outcome.finished,
                    "move accepted"
                );
                self.broadcast(ServerEvent::GameUpdate {
                    snapshot: Box::new(GameSnapshot::from(&self.game)),
                });
                if outcome.finished {
                    self.emit_history_record();
                }
            }
            Err(reason) => {
                tracing::debug!(
                    room_id = %self.room_id,
                    %session,
                    board = %board,
                    %reason,
                    "move rejected"
                );
                self.send_to(
                    session,
                    ServerEvent::MoveError {
                        message: reason.to_string(),
                        expected_board: reason.expected_board(),
                        actual_board: reason.actual_board(),
                    },
                );
            }
        }
    }

    fn handle_reset(&mut self, by: Option<SessionId>) {
        self.touch();
        match by {
            // Administrative reset (HTTP) is unconditional.
            None => self.do_reset(),
            Some(session) => {
                let Some(member) = self.members.get(&session) else {
                    return;
                };
                if self.members.len() < 2 {
                    // Local game: immediate, unilateral.
                    self.do_reset();
                } else {
                    let color = member.color;
                    self.record_vote(color);
                }
            }
        }
    }

    fn handle_vote_reset(&mut self, session: SessionId, color: Color) {
        self.touch();
        if !self.members.contains_key(&session) {
            return;
        }
        self.record_vote(color);
    }

    fn record_vote(&mut self, color: Color) {
        if self.game.vote_reset(color) {
            tracing::info!(room_id = %self.room_id, "both sides voted, game reset");
            self.broadcast(ServerEvent::GameReset {
                snapshot: Box::new(GameSnapshot::from(&self.game)),
            });
        } else {
            self.broadcast(ServerEvent::ResetVotesUpdate {
                votes: self.game.reset_votes,
            });
        }
    }

    fn do_reset(&mut self) {
        self.game.reset();
        self.poisoned = false;
        self.broadcast(ServerEvent::GameReset {
            snapshot: Box::new(GameSnapshot::from(&self.game)),
        });
    }

    fn handle_chat(&mut self, session: SessionId, message: String) {
        self.touch();
        let Some(member) = self.members.get(&session) else {
            return;
        };
        if message.len() > self.config.max_chat_len {
            self.send_to(
                session,
                ServerEvent::Error {
                    message: format!(
                        "message too long (max {} bytes)",
                        self.config.max_chat_len
                    ),
                },
            );
            return;
        }
        // Content is relayed uninterpreted, to everyone including the
        // sender, in mailbox order.
        self.broadcast(ServerEvent::ChatMessage {
            sender: member.username.clone(),
            message,
        });
    }

    fn handle_install_scenario(&mut self, scenario: Scenario) {
        self.touch();
        self.game = scenario.install();
        self.poisoned = false;
        tracing::info!(
            room_id = %self.room_id,
            scenario = scenario.name(),
            "debug scenario installed"
        );
        self.broadcast(ServerEvent::GameUpdate {
            snapshot: Box::new(GameSnapshot::from(&self.game)),
        });
    }

    fn handle_finish_game(
        &mut self,
        winner: String,
        board: serde_json::Value,
        moves: Vec<String>,
    ) {
        self.touch();
        let record = GameRecord {
            room: self.room_id.0.clone(),
            winner,
            board,
            moves,
        };
        if self.history.send(record).is_err() {
            tracing::warn!(room_id = %self.room_id, "history sink gone, record dropped");
        }
        self.do_reset();
    }

    /// Queues the finished game for persistence. Fire-and-forget: the
    /// move is already committed, a sink failure must not undo it.
    fn emit_history_record(&self) {
        let snapshot = GameSnapshot::from(&self.game);
        let winner = self
            .game
            .winner
            .map(|w| format!("{w:?}"))
            .unwrap_or_else(|| "Draw".into());
        let record = GameRecord {
            room: self.room_id.0.clone(),
            winner,
            board: serde_json::to_value(&snapshot.main_board).unwrap_or_default(),
            moves: snapshot.moves,
        };
        if self.history.send(record).is_err() {
            tracing::warn!(room_id = %self.room_id, "history sink gone, record dropped");
        }
    }

    fn state_event(&self) -> ServerEvent {
        ServerEvent::GameState {
            snapshot: Box::new(GameSnapshot::from(&self.game)),
        }
    }

    fn color_taken(&self, color: Color) -> bool {
        self.members.values().any(|m| m.color == color)
    }

    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    fn broadcast(&self, event: ServerEvent) {
        for sender in self.senders.values() {
            let _ = sender.send(event.clone());
        }
    }

    fn broadcast_except(&self, excluded: SessionId, event: ServerEvent) {
        for (sid, sender) in &self.senders {
            if *sid != excluded {
                let _ = sender.send(event.clone());
            }
        }
    }

    /// Sends to one member; silently drops when the socket is gone.
    fn send_to(&self, session: SessionId, event: ServerEvent) {
        if let Some(sender) = self.senders.get(&session) {
            let _ = sender.send(event);
        }
    }
}

/// Spawns a new room actor task and returns its handle.
pub(crate) fn spawn_room(
    room_id: RoomId,
    config: RoomConfig,
    history: mpsc::UnboundedSender<GameRecord>,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.channel_size);

    let actor = RoomActor {
        room_id: room_id.clone(),
        config,
        game: Game::new(),
        members: HashMap::new(),
        senders: HashMap::new(),
        recent_colors: HashMap::new(),
        history,
        receiver: rx,
        last_activity: Instant::now(),
        poisoned: false,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
