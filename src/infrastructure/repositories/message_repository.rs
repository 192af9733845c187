//! Message Repository Implementation
//!
//! PostgreSQL implementation of the message store: append-only inserts and
//! the newest-first history window delivered on join.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Message, MessageStore, MessageType};
use crate::shared::error::AppError;

/// PostgreSQL message repository implementation.
pub struct PgMessageStore {
    pool: PgPool,
}

impl PgMessageStore {
    /// Creates a new PgMessageStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for message queries.
#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: i64,
    room_id: i64,
    sender_id: i64,
    body: String,
    message_type: String,
    created_at: DateTime<Utc>,
    sender_name: Option<String>,
}

impl MessageRow {
    /// Converts database row to domain Message entity.
    fn into_message(self) -> Message {
        Message {
            id: self.id,
            room_id: self.room_id,
            sender_id: self.sender_id,
            body: self.body,
            message_type: MessageType::from_str(&self.message_type),
            created_at: self.created_at,
            sender_name: self.sender_name,
        }
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    /// Insert a message and return the stored row.
    async fn insert_message(
        &self,
        room_id: i64,
        sender_id: i64,
        body: &str,
        message_type: MessageType,
    ) -> Result<Message, AppError> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            INSERT INTO messages (room_id, sender_id, body, message_type)
            VALUES ($1, $2, $3, $4)
            RETURNING id, room_id, sender_id, body, message_type, created_at,
                      NULL::text AS sender_name
            "#,
        )
        .bind(room_id)
        .bind(sender_id)
        .bind(body)
        .bind(message_type.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_message())
    }

    /// Latest messages of a room, newest first, with sender names joined in.
    async fn recent_messages(&self, room_id: i64, limit: i64) -> Result<Vec<Message>, AppError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT m.id, m.room_id, m.sender_id, m.body, m.message_type, m.created_at,
                   u.name AS sender_name
            FROM messages m
            LEFT JOIN users u ON u.id = m.sender_id
            WHERE m.room_id = $1
            ORDER BY m.created_at DESC, m.id DESC
            LIMIT $2
            "#,
        )
        .bind(room_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_message()).collect())
    }
}
