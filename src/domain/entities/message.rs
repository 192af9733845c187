//! Message entity and message store trait.
//!
//! Maps to the `messages` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Message kinds accepted by the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// Plain text body
    #[default]
    Text,
    /// Body references an uploaded file
    File,
}

impl MessageType {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "file" => Self::File,
            _ => Self::Text,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::File => "file",
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A persisted chat message.
///
/// Maps to the `messages` table:
/// - id: BIGSERIAL PRIMARY KEY
/// - room_id: BIGINT NOT NULL REFERENCES rooms(room_id)
/// - sender_id: BIGINT NOT NULL REFERENCES users(id)
/// - body: TEXT NOT NULL
/// - message_type: VARCHAR(20) NOT NULL DEFAULT 'text'
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
///
/// Messages are never mutated once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,
    pub room_id: i64,
    pub sender_id: i64,
    pub body: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub created_at: DateTime<Utc>,
    /// Sender display name, when the store joined it in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
}

/// Data access for chat messages.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a new message and return the stored row.
    async fn insert_message(
        &self,
        room_id: i64,
        sender_id: i64,
        body: &str,
        message_type: MessageType,
    ) -> Result<Message, AppError>;

    /// Most recent messages of a room, newest first.
    async fn recent_messages(&self, room_id: i64, limit: i64) -> Result<Vec<Message>, AppError>;
}
