//! Room keys and the room directory trait.
//!
//! Chat rooms map to the `rooms` table; meeting rooms are keyed by
//! `meetings.meeting_id`. Both share the same in-memory membership
//! machinery but live in separate key namespaces.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// A logical channel a connection can join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum RoomKey {
    /// Chat room (`rooms.room_id`)
    Chat(i64),
    /// Meeting room (`meetings.meeting_id`)
    Meeting(i64),
}

impl RoomKey {
    /// Raw numeric id, without namespace.
    pub fn id(&self) -> i64 {
        match self {
            RoomKey::Chat(id) | RoomKey::Meeting(id) => *id,
        }
    }

    pub fn is_meeting(&self) -> bool {
        matches!(self, RoomKey::Meeting(_))
    }
}

impl std::fmt::Display for RoomKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoomKey::Chat(id) => write!(f, "chat:{}", id),
            RoomKey::Meeting(id) => write!(f, "meeting:{}", id),
        }
    }
}

/// What the directory knows about a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomScope {
    /// No such room.
    Unknown,
    /// The room exists. Either owner may be absent.
    Known {
        company_id: Option<i64>,
        project_id: Option<i64>,
    },
}

impl RoomScope {
    /// Project owning the room, if it exists and has one.
    pub fn project_id(&self) -> Option<i64> {
        match self {
            RoomScope::Known { project_id, .. } => *project_id,
            RoomScope::Unknown => None,
        }
    }
}

/// Source of truth for room existence, ownership and project membership.
///
/// Authorization is re-checked through this trait on every join; results are
/// never cached by the caller.
#[async_trait]
pub trait RoomDirectory: Send + Sync {
    /// Existence and owners of the room.
    async fn room_scope(&self, room: RoomKey) -> Result<RoomScope, AppError>;

    /// Whether the user is a member of the project.
    async fn is_project_member(&self, user_id: i64, project_id: i64) -> Result<bool, AppError>;
}
