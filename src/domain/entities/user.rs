//! User directory trait.
//!
//! Maps to the `users` table in the database schema. The collaboration layer
//! only needs display names; account management lives elsewhere.

use async_trait::async_trait;

use crate::shared::error::AppError;

/// Read-only access to user profile data.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Display name of the user, `None` if the user does not exist.
    async fn display_name(&self, user_id: i64) -> Result<Option<String>, AppError>;
}
