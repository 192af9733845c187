//! Message Relay
//!
//! Persists a chat message and fans it out to the sender's room.
//!
//! The insert is the last suspension point before the broadcast, so the
//! broadcast follows persistence completion immediately and a failed insert
//! never reaches any client.

use std::sync::Arc;

use validator::Validate;

use super::membership::UNKNOWN_SENDER_NAME;
use super::rooms::RoomBroadcaster;
use crate::application::dto::{OutboundMessage, SendMessageRequest, ServerEvent};
use crate::domain::{
    ActivityEntry, ActivityLog, ConnectionSession, MessageStore, RoomDirectory, RoomKey,
    UserDirectory, ACTION_SENT_MESSAGE,
};
use crate::infrastructure::metrics;
use crate::shared::error::CollabError;
use crate::shared::validation::validation_error;

pub struct MessageRelay {
    messages: Arc<dyn MessageStore>,
    users: Arc<dyn UserDirectory>,
    directory: Arc<dyn RoomDirectory>,
    activity: Arc<dyn ActivityLog>,
    rooms: Arc<dyn RoomBroadcaster>,
}

impl MessageRelay {
    pub fn new(
        messages: Arc<dyn MessageStore>,
        users: Arc<dyn UserDirectory>,
        directory: Arc<dyn RoomDirectory>,
        activity: Arc<dyn ActivityLog>,
        rooms: Arc<dyn RoomBroadcaster>,
    ) -> Self {
        Self {
            messages,
            users,
            directory,
            activity,
            rooms,
        }
    }

    /// Persist and broadcast a message to the session's chat room.
    ///
    /// The sender receives the message through the room broadcast like
    /// everyone else; the returned value is the same outbound message.
    pub async fn send(
        &self,
        session: &ConnectionSession,
        request: SendMessageRequest,
    ) -> Result<OutboundMessage, CollabError> {
        let room_id = match session.current_room() {
            Some(RoomKey::Chat(room_id)) => room_id,
            _ => return Err(CollabError::NotInRoom),
        };
        request.validate().map_err(validation_error)?;

        let sender_id = session.user_id();
        let sender_name = self.sender_name(sender_id).await;

        let message = self
            .messages
            .insert_message(room_id, sender_id, &request.body, request.message_type)
            .await
            .map_err(|e| {
                metrics::record_message_persistence_failed();
                tracing::error!(
                    user_id = sender_id,
                    room_id = room_id,
                    error = %e,
                    "Failed to persist message"
                );
                CollabError::Persistence(e.to_string())
            })?;

        let outbound = OutboundMessage::from_message(message, sender_name);
        let delivered = self.rooms.broadcast_to_room(
            RoomKey::Chat(room_id),
            &ServerEvent::NewMessage(outbound.clone()),
            None,
        );
        metrics::record_message_relayed();

        tracing::debug!(
            user_id = sender_id,
            room_id = room_id,
            message_id = outbound.message_id,
            delivered = delivered,
            "Message relayed"
        );

        self.record_activity(sender_id, room_id, outbound.message_id);

        Ok(outbound)
    }

    async fn sender_name(&self, user_id: i64) -> String {
        match self.users.display_name(user_id).await {
            Ok(Some(name)) => name,
            Ok(None) => UNKNOWN_SENDER_NAME.to_string(),
            Err(e) => {
                tracing::debug!(user_id = user_id, error = %e, "Sender name lookup failed");
                UNKNOWN_SENDER_NAME.to_string()
            }
        }
    }

    /// Fire-and-forget audit entry; only rooms tied to a project are logged.
    fn record_activity(&self, user_id: i64, room_id: i64, message_id: i64) {
        let directory = self.directory.clone();
        let activity = self.activity.clone();

        tokio::spawn(async move {
            let project_id = match directory.room_scope(RoomKey::Chat(room_id)).await {
                Ok(scope) => match scope.project_id() {
                    Some(project_id) => project_id,
                    None => return,
                },
                Err(e) => {
                    tracing::warn!(user_id = user_id, room_id = room_id, error = %e, "Activity log skipped");
                    return;
                }
            };

            let entry = ActivityEntry {
                user_id,
                project_id: Some(project_id),
                action: ACTION_SENT_MESSAGE.to_string(),
                details: Some(serde_json::json!({
                    "roomId": room_id,
                    "messageId": message_id,
                })),
            };

            if let Err(e) = activity.log_activity(entry).await {
                tracing::warn!(user_id = user_id, room_id = room_id, error = %e, "Failed to log message activity");
            }
        });
    }
}
