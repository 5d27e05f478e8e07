//! Protocol module - JSON message types for the duel server
//!
//! Implements the line-delimited JSON protocol spoken by browser and bot clients.
//! Every message is one JSON object on one line, discriminated by `type`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{InitData, Notice};
use crate::types::{Goal, Layout, ParticipantId, ParticipantIdError, Pos};

// ============== Client -> Server Messages ==============

/// Opponent code as sent by clients: usually the string from `self_id`,
/// but plain numbers are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum OpponentCode {
    Text(String),
    Number(u64),
}

impl OpponentCode {
    fn parse(&self) -> Result<ParticipantId, ParticipantIdError> {
        match self {
            OpponentCode::Text(s) => s.parse(),
            OpponentCode::Number(n) => n.to_string().parse(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum InboundMessage {
    Play {
        #[serde(rename = "opponentId")]
        opponent_id: OpponentCode,
    },
    /// Any JSON number is accepted here; off-board values are dropped later.
    MoveTile {
        x: serde_json::Number,
        y: serde_json::Number,
    },
    TestWin,
}

const INBOUND_TYPES: [&str; 3] = ["play", "move_tile", "test_win"];

/// A validated request from a connected participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientRequest {
    /// Pair with the participant holding this code.
    Play(ParticipantId),
    /// Slide the tile at this position on the sender's own board.
    MoveTile(Pos),
    /// Ask whether the sender's session has been won.
    TestWin,
}

/// Why an inbound line was rejected.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown message type {0:?}")]
    UnknownType(String),
    #[error("invalid opponent id: {0}")]
    InvalidOpponentId(#[source] ParticipantIdError),
    #[error("coordinates ({x}, {y}) are off the board")]
    OutOfRange {
        x: serde_json::Number,
        y: serde_json::Number,
    },
}

impl ProtocolError {
    /// The `error` message sent back to the client, if any.
    ///
    /// Off-board coordinates are dropped without a reply.
    pub fn reply(&self) -> Option<ServerMessage> {
        let code = match self {
            ProtocolError::Json(_) => ErrorCode::InvalidMessage,
            ProtocolError::UnknownType(_) => ErrorCode::UnknownType,
            ProtocolError::InvalidOpponentId(_) => ErrorCode::InvalidId,
            ProtocolError::OutOfRange { .. } => return None,
        };
        Some(create_error(code, &self.to_string()))
    }
}

/// Parse one inbound line into a request.
pub fn parse_request(json: &str) -> Result<ClientRequest, ProtocolError> {
    let message = match serde_json::from_str::<InboundMessage>(json) {
        Ok(m) => m,
        Err(e) => {
            // A well-formed object with an unrecognized tag is reported separately.
            #[derive(Debug, Deserialize)]
            struct TypeOnly {
                #[serde(rename = "type")]
                msg_type: Option<String>,
            }
            let msg_type = serde_json::from_str::<TypeOnly>(json)
                .ok()
                .and_then(|t| t.msg_type);
            return Err(match msg_type {
                Some(t) if !INBOUND_TYPES.contains(&t.as_str()) => ProtocolError::UnknownType(t),
                _ => ProtocolError::Json(e),
            });
        }
    };

    match message {
        InboundMessage::Play { opponent_id } => opponent_id
            .parse()
            .map(ClientRequest::Play)
            .map_err(ProtocolError::InvalidOpponentId),
        InboundMessage::MoveTile { x, y } => x
            .as_i64()
            .zip(y.as_i64())
            .and_then(|(col, row)| Pos::new(col, row))
            .map(ClientRequest::MoveTile)
            .ok_or(ProtocolError::OutOfRange { x, y }),
        InboundMessage::TestWin => Ok(ClientRequest::TestWin),
    }
}

// ============== Server -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidMessage,
    UnknownType,
    InvalidId,
}

/// Every message the server writes to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The recipient's own six-digit code.
    SelfId { id: String },
    /// The recipient's starting board, its empty slot, and the shared goal.
    StartGame {
        table: Layout,
        #[serde(rename = "eptX")]
        ept_x: u8,
        #[serde(rename = "eptY")]
        ept_y: u8,
        goal: Goal,
    },
    GameEnd { win: bool },
    OpponentDisconnected,
    AlreadyPlaying,
    NotSelf,
    NotExistId,
    Error { code: ErrorCode, message: String },
}

impl From<InitData> for ServerMessage {
    fn from(init: InitData) -> Self {
        ServerMessage::StartGame {
            table: init.table,
            ept_x: init.empty.x(),
            ept_y: init.empty.y(),
            goal: init.goal,
        }
    }
}

impl From<Notice> for ServerMessage {
    fn from(notice: Notice) -> Self {
        match notice {
            Notice::SelfId(id) => ServerMessage::SelfId { id: id.to_string() },
            Notice::StartGame(init) => init.into(),
            Notice::GameEnd { win } => ServerMessage::GameEnd { win },
            Notice::OpponentDisconnected => ServerMessage::OpponentDisconnected,
            Notice::AlreadyPlaying => ServerMessage::AlreadyPlaying,
            Notice::NotSelf => ServerMessage::NotSelf,
            Notice::NotExistId => ServerMessage::NotExistId,
        }
    }
}

/// Create an error message
pub fn create_error(code: ErrorCode, message: &str) -> ServerMessage {
    ServerMessage::Error {
        code,
        message: message.to_string(),
    }
}
