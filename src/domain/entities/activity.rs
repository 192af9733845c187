//! Activity log entry and audit trait.
//!
//! Maps to the `activity_logs` table:
//! - id: SERIAL PRIMARY KEY
//! - user_id: INTEGER REFERENCES users(id)
//! - project_id: INTEGER REFERENCES projects(id) NULL
//! - action: VARCHAR(100) NOT NULL
//! - details: JSONB NULL
//! - timestamp: TIMESTAMP DEFAULT NOW()

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Action recorded when a chat message is relayed.
pub const ACTION_SENT_MESSAGE: &str = "sent_message";

/// An entry written to the activity log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub user_id: i64,
    pub project_id: Option<i64>,
    pub action: String,
    pub details: Option<serde_json::Value>,
}

/// Fire-and-forget audit sink. Callers must never let a failure here reach
/// the user.
#[async_trait]
pub trait ActivityLog: Send + Sync {
    async fn log_activity(&self, entry: ActivityEntry) -> Result<(), AppError>;
}
