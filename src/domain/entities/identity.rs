//! Connection identity.
//!
//! The authenticated principal attached to a live connection. Derived once
//! from the verified handshake credential and never changed afterwards.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of one open connection.
pub type ConnectionId = Uuid;

/// Verified identity of a connected user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// User ID (primary key of `users`)
    pub user_id: i64,

    /// Application role (e.g. "admin", "project_manager", "member")
    pub role: String,

    /// Tenant the user belongs to, if any
    pub company_id: Option<i64>,
}

impl Identity {
    pub fn new(user_id: i64, role: impl Into<String>, company_id: Option<i64>) -> Self {
        Self {
            user_id,
            role: role.into(),
            company_id,
        }
    }
}
