//! WebSocket Gateway
//!
//! Registry of open connections. Each entry holds the sending half of the
//! channel drained by that connection's socket writer task.

use dashmap::DashMap;
use tokio::sync::mpsc;

use crate::application::dto::ServerEvent;
use crate::application::services::EventSink;
use crate::domain::ConnectionId;
use crate::infrastructure::metrics;

/// A connected session's outbound handle
#[derive(Debug)]
pub struct ConnectedSession {
    pub user_id: i64,
    pub sender: mpsc::UnboundedSender<ServerEvent>,
}

/// Gateway state shared across all connections
pub struct Gateway {
    /// Connection ID -> outbound handle
    sessions: DashMap<ConnectionId, ConnectedSession>,
    /// Heartbeat interval in milliseconds
    heartbeat_interval_ms: u64,
}

impl Gateway {
    pub fn new(heartbeat_interval_ms: u64) -> Self {
        Self {
            sessions: DashMap::new(),
            heartbeat_interval_ms,
        }
    }

    /// Get the heartbeat interval
    pub fn heartbeat_interval(&self) -> u64 {
        self.heartbeat_interval_ms
    }

    /// Register a new connected session
    pub fn register_session(
        &self,
        connection_id: ConnectionId,
        user_id: i64,
        sender: mpsc::UnboundedSender<ServerEvent>,
    ) {
        self.sessions
            .insert(connection_id, ConnectedSession { user_id, sender });
        metrics::set_websocket_connections(self.sessions.len());

        tracing::info!(
            user_id = user_id,
            connection_id = %connection_id,
            "Session registered"
        );
    }

    /// Unregister a session
    pub fn unregister_session(&self, connection_id: ConnectionId) {
        if let Some((_, session)) = self.sessions.remove(&connection_id) {
            metrics::set_websocket_connections(self.sessions.len());

            tracing::info!(
                user_id = session.user_id,
                connection_id = %connection_id,
                "Session unregistered"
            );
        }
    }

    /// Send event directly to a session
    pub fn send_to_session(&self, connection_id: ConnectionId, event: ServerEvent) -> bool {
        match self.sessions.get(&connection_id) {
            Some(session) => session.sender.send(event).is_ok(),
            None => false,
        }
    }

    /// Get session count
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

impl EventSink for Gateway {
    fn deliver(&self, connection_id: ConnectionId, event: &ServerEvent) -> bool {
        let delivered = self.send_to_session(connection_id, event.clone());
        if !delivered {
            tracing::trace!(
                connection_id = %connection_id,
                event = event.event_name(),
                "Dropped event for closed connection"
            );
        }
        delivered
    }
}
