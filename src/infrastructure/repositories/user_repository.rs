//! User Repository Implementation
//!
//! PostgreSQL implementation of the UserDirectory trait.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::UserDirectory;
use crate::shared::error::AppError;

/// PostgreSQL user directory implementation.
#[derive(Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    /// Create a new PgUserDirectory with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn display_name(&self, user_id: i64) -> Result<Option<String>, AppError> {
        let name: Option<Option<String>> = sqlx::query_scalar(
            r#"
            SELECT name
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(name.flatten())
    }
}
