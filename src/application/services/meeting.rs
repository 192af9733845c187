//! Meeting Signaling
//!
//! Meeting rooms reuse room membership keyed by meeting id. Control and
//! screen-share events are pure fan-out to the other participants: no
//! persistence, and no authorization beyond holding the meeting room.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use super::membership::{JoinOutcome, RoomMembershipManager, UNKNOWN_SENDER_NAME};
use super::rooms::RoomBroadcaster;
use crate::application::dto::{
    MeetingUpdatePayload, ScreenSharingPayload, ServerEvent, UserJoinedPayload,
};
use crate::domain::{ConnectionSession, RoomKey, UserDirectory};
use crate::shared::error::CollabError;

pub struct MeetingSignaling {
    membership: Arc<RoomMembershipManager>,
    users: Arc<dyn UserDirectory>,
    rooms: Arc<dyn RoomBroadcaster>,
}

impl MeetingSignaling {
    pub fn new(
        membership: Arc<RoomMembershipManager>,
        users: Arc<dyn UserDirectory>,
        rooms: Arc<dyn RoomBroadcaster>,
    ) -> Self {
        Self {
            membership,
            users,
            rooms,
        }
    }

    /// Join a meeting room and announce the participant to the others.
    pub async fn join_meeting(
        &self,
        session: &mut ConnectionSession,
        meeting_id: i64,
    ) -> Result<JoinOutcome, CollabError> {
        let room = RoomKey::Meeting(meeting_id);
        let outcome = self.membership.join(session, room).await?;

        let name = match self.users.display_name(session.user_id()).await {
            Ok(Some(name)) => name,
            _ => UNKNOWN_SENDER_NAME.to_string(),
        };

        let event = ServerEvent::UserJoined(UserJoinedPayload {
            room,
            user_id: session.user_id(),
            name,
            role: session.identity().role.clone(),
            timestamp: Utc::now(),
        });
        self.rooms
            .broadcast_to_room(room, &event, Some(session.connection_id()));

        Ok(outcome)
    }

    /// Leave the current meeting room; membership announces the departure.
    pub fn leave_meeting(&self, session: &mut ConnectionSession) -> Result<RoomKey, CollabError> {
        let room = self.meeting_room(session)?;
        self.membership.leave(session);
        Ok(room)
    }

    /// Relay a meeting control action (mute-all, lock, ...) to the others.
    pub fn control(&self, session: &ConnectionSession, action: Value) -> Result<usize, CollabError> {
        let room = self.meeting_room(session)?;
        let event = ServerEvent::MeetingUpdate(MeetingUpdatePayload {
            meeting_id: room.id(),
            sender_id: session.user_id(),
            action,
            timestamp: Utc::now(),
        });
        Ok(self
            .rooms
            .broadcast_to_room(room, &event, Some(session.connection_id())))
    }

    /// Relay a screen-share signal to the others.
    pub fn share_screen(
        &self,
        session: &ConnectionSession,
        payload: Value,
    ) -> Result<usize, CollabError> {
        let room = self.meeting_room(session)?;
        let event = ServerEvent::ScreenSharing(ScreenSharingPayload {
            meeting_id: room.id(),
            sender_id: session.user_id(),
            payload,
            timestamp: Utc::now(),
        });
        Ok(self
            .rooms
            .broadcast_to_room(room, &event, Some(session.connection_id())))
    }

    fn meeting_room(&self, session: &ConnectionSession) -> Result<RoomKey, CollabError> {
        match session.current_room() {
            Some(room) if room.is_meeting() => Ok(room),
            _ => Err(CollabError::NotInRoom),
        }
    }
}
