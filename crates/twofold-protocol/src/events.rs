//! The event vocabulary spoken between clients and the server.
//!
//! Every WebSocket frame carries one JSON object tagged by its `event`
//! field, e.g. `{"event": "join", "username": "ada", "room": "r1"}`.
//! The enums below are the single source of truth for that contract;
//! the serde attributes pin the exact wire names.

use serde::{Deserialize, Serialize};

use twofold_engine::{BoardName, Color, GameSnapshot, Move, PieceKind, ResetVotes, Square};

// ---------------------------------------------------------------------------
// Move payload
// ---------------------------------------------------------------------------

/// The promotion choice as clients send it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromotionChoice {
    Q,
    R,
    B,
    N,
}

impl From<PromotionChoice> for PieceKind {
    fn from(choice: PromotionChoice) -> Self {
        match choice {
            PromotionChoice::Q => PieceKind::Queen,
            PromotionChoice::R => PieceKind::Rook,
            PromotionChoice::B => PieceKind::Bishop,
            PromotionChoice::N => PieceKind::Knight,
        }
    }
}

/// A move as submitted by a client.
///
/// Only `from`, `to`, `piece`, and `promotion` matter to the server.
/// `captured`, `castle`, and `en_passant` are advisory — the engine
/// recomputes all of them from its own authoritative state, and any
/// client-supplied board snapshot is ignored outright.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub from: Square,
    pub to: Square,
    /// The id label of the piece the client believes it is moving
    /// (`"P5"`); rejected when it doesn't match the server's board.
    pub piece: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub castle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub en_passant: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PromotionChoice>,
}

impl MoveRequest {
    /// The engine-facing view of this request.
    pub fn to_move(&self) -> Move {
        Move {
            from: self.from,
            to: self.to,
            promotion: self.promotion.map(PieceKind::from),
        }
    }
}

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// Everything a client may send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Register this session in a room, creating the room on first join.
    Join { username: String, room: String },

    /// Create a lobby explicitly; errors if the id is taken.
    CreateLobby {
        #[serde(rename = "roomId")]
        room_id: String,
        host: String,
        #[serde(rename = "isPrivate")]
        is_private: bool,
    },

    /// Ask for the open-lobby list.
    GetLobbies,

    /// Leave a lobby; the room closes when it empties.
    LeaveLobby {
        #[serde(rename = "roomId")]
        room_id: String,
        username: String,
    },

    /// Submit a move. Any client-side `board` field is ignored.
    Move {
        room: String,
        #[serde(rename = "boardType")]
        board_type: BoardName,
        #[serde(rename = "move")]
        mv: MoveRequest,
    },

    /// Immediate reset in a single-player room; records a vote otherwise.
    Reset { room: String },

    /// Record a reset vote for one color.
    VoteReset { room: String, color: Color },

    /// Room-scoped chat.
    ChatMessage {
        room: String,
        sender: String,
        message: String,
    },

    /// Legacy manual end: persist the result and reset the room.
    FinishGame {
        room: String,
        winner: String,
        /// Final board as the client rendered it; stored verbatim.
        #[serde(default)]
        board: serde_json::Value,
        moves: Vec<String>,
    },

    /// Request the current snapshot (creates the room if needed).
    GetGameState { room: String },
}

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// One row of the `lobby_list` reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyEntry {
    pub room: String,
    pub host: String,
    pub is_private: bool,
    /// Milliseconds since the Unix epoch.
    #[serde(rename = "createdAt")]
    pub created_at: u64,
}

/// Everything the server may send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Full snapshot on join / explicit request.
    GameState {
        #[serde(flatten)]
        snapshot: Box<GameSnapshot>,
    },

    /// Full snapshot after an accepted move.
    GameUpdate {
        #[serde(flatten)]
        snapshot: Box<GameSnapshot>,
    },

    /// Full snapshot after a reset.
    GameReset {
        #[serde(flatten)]
        snapshot: Box<GameSnapshot>,
    },

    /// A rejected move; sent only to the offender.
    MoveError {
        message: String,
        #[serde(rename = "expectedBoard", skip_serializing_if = "Option::is_none")]
        expected_board: Option<BoardName>,
        #[serde(rename = "actualBoard", skip_serializing_if = "Option::is_none")]
        actual_board: Option<BoardName>,
    },

    /// Open public lobbies; private rooms are filtered out server-side.
    LobbyList { lobbies: Vec<LobbyEntry> },

    ResetVotesUpdate { votes: ResetVotes },

    ChatMessage { sender: String, message: String },

    /// Someone joined; `color` is set once they are seated.
    PlayerJoined {
        color: Option<Color>,
        username: String,
    },

    /// Both seats are filled; each recipient gets their own color.
    GameStart { color: Color, username: String },

    PlayerLeft { username: String },

    PlayerDisconnected { username: String },

    RoomDeleted { room: String },

    /// Session-level failure (room full, unknown room, …).
    Error { message: String },
}
