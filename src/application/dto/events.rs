//! Server-to-client events
//!
//! Every outbound frame is `{"event": <name>, "data": <payload>}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ConnectionId, Message, MessageType, RoomKey};

/// Events delivered to connected clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    Ready(ReadyPayload),
    Joined(JoinedPayload),
    Left(LeftPayload),
    Presence(PresencePayload),
    NewMessage(OutboundMessage),
    Typing(TypingPayload),
    UserJoined(UserJoinedPayload),
    UserLeft(UserLeftPayload),
    MeetingUpdate(MeetingUpdatePayload),
    ScreenSharing(ScreenSharingPayload),
    HeartbeatAck,
    Error(ErrorPayload),
}

impl ServerEvent {
    /// Get the event name for logging and metrics
    pub fn event_name(&self) -> &'static str {
        match self {
            ServerEvent::Ready(_) => "ready",
            ServerEvent::Joined(_) => "joined",
            ServerEvent::Left(_) => "left",
            ServerEvent::Presence(_) => "presence",
            ServerEvent::NewMessage(_) => "newMessage",
            ServerEvent::Typing(_) => "typing",
            ServerEvent::UserJoined(_) => "userJoined",
            ServerEvent::UserLeft(_) => "userLeft",
            ServerEvent::MeetingUpdate(_) => "meetingUpdate",
            ServerEvent::ScreenSharing(_) => "screenSharing",
            ServerEvent::HeartbeatAck => "heartbeatAck",
            ServerEvent::Error(_) => "error",
        }
    }

    /// Build an error frame for a failed request.
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        ServerEvent::Error(ErrorPayload {
            code: code.to_string(),
            message: message.into(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyPayload {
    pub connection_id: ConnectionId,
    pub user_id: i64,
    pub heartbeat_interval_ms: u64,
}

/// Reply to a successful join: history oldest-to-newest, the room roster and
/// the current typers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinedPayload {
    pub room: RoomKey,
    pub recent_messages: Vec<OutboundMessage>,
    pub active_users: Vec<i64>,
    pub active_typers: Vec<ActiveTyper>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeftPayload {
    pub room: RoomKey,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresencePayload {
    pub room: RoomKey,
    pub active_users: Vec<i64>,
}

/// A persisted message enriched with the sender's display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    pub message_id: i64,
    pub room_id: i64,
    pub sender_id: i64,
    pub sender_name: String,
    pub body: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub created_at: DateTime<Utc>,
}

impl OutboundMessage {
    pub fn from_message(message: Message, sender_name: String) -> Self {
        Self {
            message_id: message.id,
            room_id: message.room_id,
            sender_id: message.sender_id,
            sender_name,
            body: message.body,
            message_type: message.message_type,
            created_at: message.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingPayload {
    pub room: RoomKey,
    pub active_typers: Vec<ActiveTyper>,
}

/// One user currently typing; `since` is epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTyper {
    pub user_id: i64,
    pub since: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserJoinedPayload {
    pub room: RoomKey,
    pub user_id: i64,
    pub name: String,
    pub role: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLeftPayload {
    pub room: RoomKey,
    pub user_id: i64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingUpdatePayload {
    pub meeting_id: i64,
    pub sender_id: i64,
    pub action: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenSharingPayload {
    pub meeting_id: i64,
    pub sender_id: i64,
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
}
