//! Room Registry
//!
//! Per-room delivery lists and the broadcast primitives every other
//! collaboration service goes through.
//!
//! Each room owns its own `parking_lot::Mutex`; the outer `DashMap` only
//! resolves a key to that lock. Broadcasts into one room are serialized by the
//! room lock, so events triggered in a given order are delivered in that order,
//! while unrelated rooms never contend. No lock here is ever held across an
//! `.await`.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::application::dto::ServerEvent;
use crate::domain::{ConnectionId, RoomKey};

/// Delivers one event to one connection.
///
/// Returns `false` if the connection is gone; callers treat that as a no-op.
pub trait EventSink: Send + Sync {
    fn deliver(&self, connection_id: ConnectionId, event: &ServerEvent) -> bool;
}

/// Minimal room transport: membership of connections in rooms and fan-out.
pub trait RoomBroadcaster: Send + Sync {
    /// Register a connection in a room's delivery list.
    fn add_to_room(&self, connection_id: ConnectionId, user_id: i64, room: RoomKey);

    /// Remove a connection from a room's delivery list. Returns whether it was present.
    fn remove_from_room(&self, connection_id: ConnectionId, room: RoomKey) -> bool;

    /// Deliver an event to every connection in the room, optionally skipping one.
    /// Returns the number of successful deliveries.
    fn broadcast_to_room(
        &self,
        room: RoomKey,
        event: &ServerEvent,
        except: Option<ConnectionId>,
    ) -> usize;

    /// Build an event from the room's current user roster and deliver it while
    /// the roster is still locked, so the snapshot cannot go stale in flight.
    fn broadcast_roster(&self, room: RoomKey, build: &dyn Fn(Vec<i64>) -> ServerEvent) -> usize;

    /// Distinct user ids with at least one connection in the room, ascending.
    fn room_users(&self, room: RoomKey) -> Vec<i64>;

    /// Connections currently in the room.
    fn room_connections(&self, room: RoomKey) -> Vec<ConnectionId>;
}

/// Delivery list of a single room: connection id -> user id.
#[derive(Debug, Default)]
struct RoomMembers {
    connections: HashMap<ConnectionId, i64>,
}

impl RoomMembers {
    fn users(&self) -> Vec<i64> {
        self.connections
            .values()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// In-process implementation of [`RoomBroadcaster`].
pub struct RoomRegistry {
    rooms: DashMap<RoomKey, Arc<Mutex<RoomMembers>>>,
    sink: Arc<dyn EventSink>,
}

impl RoomRegistry {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            rooms: DashMap::new(),
            sink,
        }
    }

    /// Number of rooms with at least one connection.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    fn room(&self, room: RoomKey) -> Option<Arc<Mutex<RoomMembers>>> {
        self.rooms.get(&room).map(|entry| entry.value().clone())
    }

    fn deliver_all(
        &self,
        members: &RoomMembers,
        event: &ServerEvent,
        except: Option<ConnectionId>,
    ) -> usize {
        members
            .connections
            .keys()
            .filter(|id| Some(**id) != except)
            .filter(|id| self.sink.deliver(**id, event))
            .count()
    }
}

impl RoomBroadcaster for RoomRegistry {
    fn add_to_room(&self, connection_id: ConnectionId, user_id: i64, room: RoomKey) {
        loop {
            let members = self.rooms.entry(room).or_default().value().clone();
            let mut guard = members.lock();
            // The entry may have been dropped as empty between lookup and lock.
            let still_current = self
                .rooms
                .get(&room)
                .map(|current| Arc::ptr_eq(current.value(), &members))
                .unwrap_or(false);
            if still_current {
                guard.connections.insert(connection_id, user_id);
                return;
            }
        }
    }

    fn remove_from_room(&self, connection_id: ConnectionId, room: RoomKey) -> bool {
        let Some(members) = self.room(room) else {
            return false;
        };
        let mut guard = members.lock();
        let removed = guard.connections.remove(&connection_id).is_some();
        if guard.connections.is_empty() {
            self.rooms
                .remove_if(&room, |_, current| Arc::ptr_eq(current, &members));
        }
        removed
    }

    fn broadcast_to_room(
        &self,
        room: RoomKey,
        event: &ServerEvent,
        except: Option<ConnectionId>,
    ) -> usize {
        match self.room(room) {
            Some(members) => {
                let guard = members.lock();
                self.deliver_all(&guard, event, except)
            }
            None => 0,
        }
    }

    fn broadcast_roster(&self, room: RoomKey, build: &dyn Fn(Vec<i64>) -> ServerEvent) -> usize {
        match self.room(room) {
            Some(members) => {
                let guard = members.lock();
                let event = build(guard.users());
                self.deliver_all(&guard, &event, None)
            }
            None => 0,
        }
    }

    fn room_users(&self, room: RoomKey) -> Vec<i64> {
        self.room(room)
            .map(|members| members.lock().users())
            .unwrap_or_default()
    }

    fn room_connections(&self, room: RoomKey) -> Vec<ConnectionId> {
        self.room(room)
            .map(|members| members.lock().connections.keys().copied().collect())
            .unwrap_or_default()
    }
}
