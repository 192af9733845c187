//! WebSocket Message Types
//!
//! Inbound frames are `{"event": <name>, "data": <payload>}`; `data` may be
//! omitted for events that carry none.

use serde::Deserialize;
use serde_json::Value;

use crate::application::dto::SendMessageRequest;
use crate::shared::error::CollabError;

/// Raw inbound frame before dispatch on the event name
#[derive(Debug, Deserialize)]
struct RawFrame {
    event: String,
    #[serde(default)]
    data: Value,
}

/// `join` payload
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub room_id: i64,
}

/// `joinMeeting` payload
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinMeetingRequest {
    pub meeting_id: i64,
}

/// `meetingControl` payload
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MeetingControlRequest {
    pub action: Value,
}

/// Events a client may send
#[derive(Debug, Clone)]
pub enum ClientEvent {
    Join(JoinRequest),
    Leave,
    Send(SendMessageRequest),
    Typing,
    StopTyping,
    JoinMeeting(JoinMeetingRequest),
    MeetingControl(MeetingControlRequest),
    ShareScreen(Value),
    LeaveMeeting,
    Heartbeat,
}

impl ClientEvent {
    /// Parse a text frame. Unknown events and malformed payloads are
    /// `InvalidPayload`.
    pub fn parse(text: &str) -> Result<Self, CollabError> {
        let frame: RawFrame = serde_json::from_str(text)
            .map_err(|e| CollabError::InvalidPayload(format!("Malformed frame: {}", e)))?;

        let event = match frame.event.as_str() {
            "join" => ClientEvent::Join(payload(frame.data)?),
            "leave" => ClientEvent::Leave,
            "send" => ClientEvent::Send(payload(frame.data)?),
            "typing" => ClientEvent::Typing,
            "stopTyping" => ClientEvent::StopTyping,
            "joinMeeting" => ClientEvent::JoinMeeting(payload(frame.data)?),
            "meetingControl" => ClientEvent::MeetingControl(payload(frame.data)?),
            "shareScreen" => ClientEvent::ShareScreen(match frame.data {
                Value::Object(mut data) => data.remove("payload").unwrap_or(Value::Null),
                _ => Value::Null,
            }),
            "leaveMeeting" => ClientEvent::LeaveMeeting,
            "heartbeat" => ClientEvent::Heartbeat,
            other => {
                return Err(CollabError::InvalidPayload(format!(
                    "Unknown event: {}",
                    other
                )))
            }
        };
        Ok(event)
    }

    /// Get the event name for logging
    pub fn event_name(&self) -> &'static str {
        match self {
            ClientEvent::Join(_) => "join",
            ClientEvent::Leave => "leave",
            ClientEvent::Send(_) => "send",
            ClientEvent::Typing => "typing",
            ClientEvent::StopTyping => "stopTyping",
            ClientEvent::JoinMeeting(_) => "joinMeeting",
            ClientEvent::MeetingControl(_) => "meetingControl",
            ClientEvent::ShareScreen(_) => "shareScreen",
            ClientEvent::LeaveMeeting => "leaveMeeting",
            ClientEvent::Heartbeat => "heartbeat",
        }
    }
}

fn payload<T: serde::de::DeserializeOwned>(data: Value) -> Result<T, CollabError> {
    serde_json::from_value(data).map_err(|e| CollabError::InvalidPayload(e.to_string()))
}
