//! Presence Tracker
//!
//! Owns the process-wide presence set. Presence is per **user**, not per
//! connection: a user stays present until the last of their connections is
//! gone, so each user maps to the set of connection ids keeping them online.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;

use super::rooms::RoomBroadcaster;
use crate::application::dto::{PresencePayload, ServerEvent};
use crate::domain::{ConnectionId, RoomKey};

/// Process-wide presence set with room-scoped broadcasts.
pub struct PresenceTracker {
    online: DashMap<i64, HashSet<ConnectionId>>,
    rooms: Arc<dyn RoomBroadcaster>,
}

impl PresenceTracker {
    pub fn new(rooms: Arc<dyn RoomBroadcaster>) -> Self {
        Self {
            online: DashMap::new(),
            rooms,
        }
    }

    /// Record a live connection for the user. Idempotent per connection.
    ///
    /// Returns `true` if the user was not present before.
    pub fn mark_connected(&self, user_id: i64, connection_id: ConnectionId) -> bool {
        let mut connections = self.online.entry(user_id).or_default();
        let was_offline = connections.is_empty();
        connections.insert(connection_id);
        was_offline
    }

    /// Drop one connection of the user; the user leaves the presence set only
    /// when no other connection remains.
    ///
    /// Returns `true` if the user went offline.
    pub fn mark_disconnected(&self, user_id: i64, connection_id: ConnectionId) -> bool {
        let went_offline = match self.online.get_mut(&user_id) {
            Some(mut connections) => {
                connections.remove(&connection_id);
                connections.is_empty()
            }
            None => return false,
        };

        if went_offline {
            self.online
                .remove_if(&user_id, |_, connections| connections.is_empty());
            tracing::debug!(user_id = user_id, "User went offline");
        }
        went_offline
    }

    /// Check if user is online (has at least one connection)
    pub fn is_online(&self, user_id: i64) -> bool {
        self.online
            .get(&user_id)
            .map(|connections| !connections.is_empty())
            .unwrap_or(false)
    }

    /// Number of live connections held by the user.
    pub fn connection_count(&self, user_id: i64) -> usize {
        self.online
            .get(&user_id)
            .map(|connections| connections.len())
            .unwrap_or(0)
    }

    /// All present users, ascending.
    pub fn online_users(&self) -> Vec<i64> {
        let mut users: Vec<i64> = self
            .online
            .iter()
            .filter(|entry| !entry.value().is_empty())
            .map(|entry| *entry.key())
            .collect();
        users.sort_unstable();
        users
    }

    /// Present users with a connection in the given room.
    pub fn room_presence(&self, room: RoomKey) -> Vec<i64> {
        self.rooms
            .room_users(room)
            .into_iter()
            .filter(|user_id| self.is_online(*user_id))
            .collect()
    }

    /// Send the room's current presence list to everyone in that room.
    pub fn broadcast_room_presence(&self, room: RoomKey) -> usize {
        self.rooms.broadcast_roster(room, &|users| {
            ServerEvent::Presence(PresencePayload {
                room,
                active_users: users
                    .into_iter()
                    .filter(|user_id| self.is_online(*user_id))
                    .collect(),
            })
        })
    }
}
