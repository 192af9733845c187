//! Collaboration Hub
//!
//! Wires the room, presence, typing, membership, relay and meeting services
//! around one shared room transport, and exposes the per-connection entry
//! points the socket layer calls.

use std::sync::Arc;
use std::time::Duration;

use super::meeting::MeetingSignaling;
use super::membership::RoomMembershipManager;
use super::message_relay::MessageRelay;
use super::presence::PresenceTracker;
use super::rooms::{EventSink, RoomBroadcaster, RoomRegistry};
use super::typing::TypingCoordinator;
use crate::application::dto::ActiveTyper;
use crate::domain::{ActivityLog, ConnectionSession, MessageStore, RoomDirectory, UserDirectory};
use crate::shared::error::CollabError;

/// External collaborators backing the hub
#[derive(Clone)]
pub struct Stores {
    pub directory: Arc<dyn RoomDirectory>,
    pub messages: Arc<dyn MessageStore>,
    pub users: Arc<dyn UserDirectory>,
    pub activity: Arc<dyn ActivityLog>,
}

/// Hub tunables
#[derive(Debug, Clone, Copy)]
pub struct HubOptions {
    pub typing_ttl: Duration,
    pub history_limit: i64,
}

pub struct CollabHub {
    rooms: Arc<RoomRegistry>,
    presence: Arc<PresenceTracker>,
    typing: TypingCoordinator,
    membership: Arc<RoomMembershipManager>,
    relay: MessageRelay,
    meetings: MeetingSignaling,
}

impl CollabHub {
    pub fn new(stores: Stores, sink: Arc<dyn EventSink>, options: HubOptions) -> Self {
        let rooms = Arc::new(RoomRegistry::new(sink));
        let broadcaster: Arc<dyn RoomBroadcaster> = rooms.clone();

        let presence = Arc::new(PresenceTracker::new(broadcaster.clone()));
        let typing = TypingCoordinator::new(broadcaster.clone(), options.typing_ttl);

        let membership = Arc::new(RoomMembershipManager::new(
            stores.directory.clone(),
            stores.messages.clone(),
            stores.users.clone(),
            broadcaster.clone(),
            presence.clone(),
            typing.clone(),
            options.history_limit,
        ));

        let relay = MessageRelay::new(
            stores.messages,
            stores.users.clone(),
            stores.directory,
            stores.activity,
            broadcaster.clone(),
        );

        let meetings = MeetingSignaling::new(membership.clone(), stores.users, broadcaster);

        Self {
            rooms,
            presence,
            typing,
            membership,
            relay,
            meetings,
        }
    }

    pub fn rooms(&self) -> &RoomRegistry {
        &self.rooms
    }

    pub fn presence(&self) -> &PresenceTracker {
        &self.presence
    }

    pub fn typing(&self) -> &TypingCoordinator {
        &self.typing
    }

    pub fn membership(&self) -> &RoomMembershipManager {
        &self.membership
    }

    pub fn relay(&self) -> &MessageRelay {
        &self.relay
    }

    pub fn meetings(&self) -> &MeetingSignaling {
        &self.meetings
    }

    /// Register a freshly authenticated connection in the presence set.
    pub fn connect(&self, session: &ConnectionSession) {
        if self
            .presence
            .mark_connected(session.user_id(), session.connection_id())
        {
            tracing::debug!(user_id = session.user_id(), "User came online");
        }
    }

    /// Keystroke in the session's current room.
    pub fn start_typing(&self, session: &ConnectionSession) -> Result<Vec<ActiveTyper>, CollabError> {
        let room = session.current_room().ok_or(CollabError::NotInRoom)?;
        Ok(self.typing.typing(room, session.user_id()))
    }

    /// Explicit end of typing in the session's current room.
    pub fn stop_typing(&self, session: &ConnectionSession) -> Result<bool, CollabError> {
        let room = session.current_room().ok_or(CollabError::NotInRoom)?;
        Ok(self.typing.stop(room, session.user_id()))
    }

    /// Reconcile all state held for a closing connection.
    pub fn disconnect(&self, session: &mut ConnectionSession) {
        let room = self.membership.disconnect(session);
        tracing::debug!(
            user_id = session.user_id(),
            connection_id = %session.connection_id(),
            last_room = ?room,
            remaining_connections = self.presence.connection_count(session.user_id()),
            "Connection state reconciled"
        );
    }
}
