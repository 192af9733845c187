//! Connection session.
//!
//! One per open socket, owned by that socket's task and handed by `&mut`
//! into every handler. Created only after a successful handshake, so it always
//! carries a verified identity.

use tokio::time::Instant;
use uuid::Uuid;

use super::identity::{ConnectionId, Identity};
use super::room::RoomKey;

/// Per-connection state
#[derive(Debug)]
pub struct ConnectionSession {
    connection_id: ConnectionId,
    identity: Identity,
    current_room: Option<RoomKey>,
    last_heartbeat: Instant,
}

impl ConnectionSession {
    pub fn new(identity: Identity) -> Self {
        Self::with_id(Uuid::new_v4(), identity)
    }

    pub fn with_id(connection_id: ConnectionId, identity: Identity) -> Self {
        Self {
            connection_id,
            identity,
            current_room: None,
            last_heartbeat: Instant::now(),
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn user_id(&self) -> i64 {
        self.identity.user_id
    }

    /// The single room this connection is in, if any
    pub fn current_room(&self) -> Option<RoomKey> {
        self.current_room
    }

    pub fn set_current_room(&mut self, room: Option<RoomKey>) {
        self.current_room = room;
    }

    pub fn heartbeat(&mut self) {
        self.last_heartbeat = Instant::now();
    }

    pub fn is_alive(&self, timeout_ms: u64) -> bool {
        self.last_heartbeat.elapsed().as_millis() < timeout_ms as u128
    }
}
