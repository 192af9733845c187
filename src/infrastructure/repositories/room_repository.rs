//! Room Directory Implementation
//!
//! PostgreSQL lookups of room existence, ownership and project membership.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::{RoomDirectory, RoomKey, RoomScope};
use crate::shared::error::AppError;

/// PostgreSQL room directory implementation.
pub struct PgRoomDirectory {
    pool: PgPool,
}

impl PgRoomDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoomDirectory for PgRoomDirectory {
    /// Owners of a chat room. Meeting rooms are not tenant- or
    /// project-scoped and always exist.
    async fn room_scope(&self, room: RoomKey) -> Result<RoomScope, AppError> {
        let RoomKey::Chat(room_id) = room else {
            return Ok(RoomScope::Known {
                company_id: None,
                project_id: None,
            });
        };

        let row: Option<(Option<i64>, Option<i64>)> = sqlx::query_as(
            r#"
            SELECT r.company_id::BIGINT, r.project_id::BIGINT
            FROM rooms r
            WHERE r.room_id = $1
            "#,
        )
        .bind(room_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match row {
            Some((company_id, project_id)) => RoomScope::Known {
                company_id,
                project_id,
            },
            None => RoomScope::Unknown,
        })
    }

    async fn is_project_member(&self, user_id: i64, project_id: i64) -> Result<bool, AppError> {
        let is_member: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM project_members
                WHERE project_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(is_member)
    }
}
