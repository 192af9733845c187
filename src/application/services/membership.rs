//! Room Membership Manager
//!
//! Tracks the single room each connection holds and moves connections
//! between rooms.
//!
//! A join first awaits every store lookup it needs (room existence, tenant,
//! project membership) and only then mutates in-memory state, in one
//! synchronous step. A rejected join therefore leaves the delivery lists, the presence set
//! and the typing state exactly as they were.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;

use super::presence::PresenceTracker;
use super::rooms::RoomBroadcaster;
use super::typing::TypingCoordinator;
use crate::application::dto::{ActiveTyper, OutboundMessage, ServerEvent, UserLeftPayload};
use crate::domain::{
    ConnectionSession, Identity, MessageStore, RoomDirectory, RoomKey, RoomScope, UserDirectory,
};
use crate::infrastructure::metrics;
use crate::shared::error::CollabError;

/// Display name used when the sender's profile cannot be resolved
pub const UNKNOWN_SENDER_NAME: &str = "Unknown User";

/// What a successful join hands back to the joining client.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinOutcome {
    pub room: RoomKey,
    /// Room left implicitly to satisfy the single-room rule
    pub previous_room: Option<RoomKey>,
    /// History, oldest first
    pub recent_messages: Vec<OutboundMessage>,
    pub active_users: Vec<i64>,
    /// Users already typing in the room
    pub active_typers: Vec<ActiveTyper>,
}

pub struct RoomMembershipManager {
    directory: Arc<dyn RoomDirectory>,
    messages: Arc<dyn MessageStore>,
    users: Arc<dyn UserDirectory>,
    rooms: Arc<dyn RoomBroadcaster>,
    presence: Arc<PresenceTracker>,
    typing: TypingCoordinator,
    history_limit: i64,
}

impl RoomMembershipManager {
    pub fn new(
        directory: Arc<dyn RoomDirectory>,
        messages: Arc<dyn MessageStore>,
        users: Arc<dyn UserDirectory>,
        rooms: Arc<dyn RoomBroadcaster>,
        presence: Arc<PresenceTracker>,
        typing: TypingCoordinator,
        history_limit: i64,
    ) -> Self {
        Self {
            directory,
            messages,
            users,
            rooms,
            presence,
            typing,
            history_limit,
        }
    }

    /// Authorize and join `room`, leaving any room the connection held.
    pub async fn join(
        &self,
        session: &mut ConnectionSession,
        room: RoomKey,
    ) -> Result<JoinOutcome, CollabError> {
        let user_id = session.user_id();

        self.authorize(session.identity(), room).await?;

        // From here on nothing awaits until in-memory state is consistent.
        let previous_room = match session.current_room() {
            Some(current) if current != room => self.detach(session),
            _ => None,
        };

        self.rooms.add_to_room(session.connection_id(), user_id, room);
        session.set_current_room(Some(room));
        self.presence.mark_connected(user_id, session.connection_id());
        self.presence.broadcast_room_presence(room);
        let active_users = self.presence.room_presence(room);
        let active_typers = self.typing.active_typers(room);

        tracing::info!(
            user_id = user_id,
            connection_id = %session.connection_id(),
            room = %room,
            "Joined room"
        );

        let recent_messages = match room {
            RoomKey::Chat(room_id) => match self.history(room_id).await {
                Ok(history) => history,
                Err(e) => {
                    // The previous room stays left; only the new one is undone.
                    self.detach(session);
                    return Err(e);
                }
            },
            RoomKey::Meeting(_) => Vec::new(),
        };

        Ok(JoinOutcome {
            room,
            previous_room,
            recent_messages,
            active_users,
            active_typers,
        })
    }

    /// Leave the current room. Returns the room left, `None` if there was none.
    pub fn leave(&self, session: &mut ConnectionSession) -> Option<RoomKey> {
        let left = self.detach(session);
        if let Some(room) = left {
            tracing::info!(
                user_id = session.user_id(),
                connection_id = %session.connection_id(),
                room = %room,
                "Left room"
            );
        }
        left
    }

    /// Tear down a closing connection: room, typing, presence.
    ///
    /// The room the user was last in is notified before the connection is
    /// unregistered from the transport.
    pub fn disconnect(&self, session: &mut ConnectionSession) -> Option<RoomKey> {
        let user_id = session.user_id();
        let room = self.detach(session);

        self.presence.mark_disconnected(user_id, session.connection_id());
        room
    }

    async fn authorize(&self, identity: &Identity, room: RoomKey) -> Result<(), CollabError> {
        let scope = self
            .directory
            .room_scope(room)
            .await
            .map_err(|e| CollabError::Store(e.to_string()))?;

        let project_id = match scope {
            RoomScope::Unknown => return Err(deny(identity, room, "Unknown room")),
            RoomScope::Known {
                company_id: Some(company_id),
                ..
            } if identity.company_id != Some(company_id) => {
                return Err(deny(identity, room, "Room belongs to another company"));
            }
            RoomScope::Known { project_id, .. } => project_id,
        };

        let Some(project_id) = project_id else {
            return Ok(());
        };

        let is_member = self
            .directory
            .is_project_member(identity.user_id, project_id)
            .await
            .map_err(|e| CollabError::Store(e.to_string()))?;

        if !is_member {
            tracing::debug!(project_id = project_id, "Not a project member");
            return Err(deny(identity, room, "Unauthorized room access"));
        }
        Ok(())
    }

    /// Remove the connection from its room and clear its typing entry.
    /// Meeting participants are told the user left. Idempotent when no room
    /// is held.
    fn detach(&self, session: &mut ConnectionSession) -> Option<RoomKey> {
        let room = session.current_room()?;
        let user_id = session.user_id();

        if room.is_meeting() {
            let event = ServerEvent::UserLeft(UserLeftPayload {
                room,
                user_id,
                timestamp: Utc::now(),
            });
            self.rooms
                .broadcast_to_room(room, &event, Some(session.connection_id()));
        }

        self.typing.stop(room, user_id);
        self.rooms.remove_from_room(session.connection_id(), room);
        session.set_current_room(None);
        self.presence.broadcast_room_presence(room);
        Some(room)
    }

    /// Latest messages of a chat room, reversed into display order.
    async fn history(&self, room_id: i64) -> Result<Vec<OutboundMessage>, CollabError> {
        let mut messages = self
            .messages
            .recent_messages(room_id, self.history_limit)
            .await
            .map_err(|e| CollabError::Store(e.to_string()))?;

        // Store returns newest first.
        messages.reverse();

        let mut names: HashMap<i64, String> = HashMap::new();
        let mut history = Vec::with_capacity(messages.len());
        for mut message in messages {
            let name = match message.sender_name.take() {
                Some(name) => name,
                None => match names.get(&message.sender_id) {
                    Some(name) => name.clone(),
                    None => {
                        let name = self.resolve_name(message.sender_id).await;
                        names.insert(message.sender_id, name.clone());
                        name
                    }
                },
            };
            history.push(OutboundMessage::from_message(message, name));
        }
        Ok(history)
    }

    async fn resolve_name(&self, user_id: i64) -> String {
        match self.users.display_name(user_id).await {
            Ok(Some(name)) => name,
            Ok(None) => UNKNOWN_SENDER_NAME.to_string(),
            Err(e) => {
                tracing::debug!(user_id = user_id, error = %e, "Sender name lookup failed");
                UNKNOWN_SENDER_NAME.to_string()
            }
        }
    }
}

fn deny(identity: &Identity, room: RoomKey, reason: &'static str) -> CollabError {
    metrics::record_authorization_denied();
    tracing::warn!(
        user_id = identity.user_id,
        company_id = ?identity.company_id,
        room = %room,
        "{}",
        reason
    );
    CollabError::Authorization(room.to_string())
}
