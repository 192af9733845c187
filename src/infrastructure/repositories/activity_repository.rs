//! Activity Log Implementation
//!
//! PostgreSQL implementation of the audit collaborator.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::{ActivityEntry, ActivityLog};
use crate::shared::error::AppError;

/// PostgreSQL activity log implementation.
pub struct PgActivityLog {
    pool: PgPool,
}

impl PgActivityLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityLog for PgActivityLog {
    async fn log_activity(&self, entry: ActivityEntry) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO activity_logs (user_id, project_id, action, details, timestamp)
            VALUES ($1, $2, $3, $4, NOW())
            "#,
        )
        .bind(entry.user_id)
        .bind(entry.project_id)
        .bind(&entry.action)
        .bind(entry.details.map(sqlx::types::Json))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
